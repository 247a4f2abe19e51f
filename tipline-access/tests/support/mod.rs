#![allow(dead_code)]

use chrono::Duration;
use tipline_access::{NewReport, ReportService, RequestCredentials, SubmittedReport};
use tipline_crypto::MasterKey;
use tipline_storage::TiplineStore;
use tipline_token::TokenSigner;
use tipline_types::{Company, CompanyId, SessionPrincipal, UserId};

pub fn signer() -> TokenSigner {
    TokenSigner::from_seed(&[3u8; 32])
}

pub fn service_with(store: TiplineStore) -> ReportService {
    ReportService::new(
        store,
        MasterKey::from_bytes([5u8; 32]),
        signer(),
        Duration::days(30),
    )
}

pub fn service() -> ReportService {
    service_with(TiplineStore::open_in_memory().unwrap())
}

pub fn company(service: &ReportService, name: &str) -> Company {
    service.store().create_company(name).unwrap()
}

pub async fn submit(service: &ReportService, company_id: CompanyId, title: &str) -> SubmittedReport {
    service
        .submit_report(NewReport {
            company_id,
            title: title.to_string(),
            content: format!("{title} details"),
            access_password: Some("correct horse".into()),
        })
        .await
        .unwrap()
}

pub fn reporter(token: &str) -> RequestCredentials {
    RequestCredentials::anonymous().with_bearer_token(token)
}

pub fn company_admin(company_id: CompanyId) -> SessionPrincipal {
    SessionPrincipal::CompanyAdmin {
        user_id: UserId::new(),
        company_id,
    }
}

pub fn super_admin() -> SessionPrincipal {
    SessionPrincipal::SuperAdmin {
        user_id: UserId::new(),
    }
}

pub fn session(principal: SessionPrincipal) -> RequestCredentials {
    RequestCredentials::anonymous().with_session(principal)
}
