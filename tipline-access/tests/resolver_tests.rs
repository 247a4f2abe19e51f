mod support;

use chrono::{Duration, Utc};
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use support::*;
use tipline_access::{Access, RequestCredentials};
use tipline_types::{ReportId, SessionPrincipal, UserId};

// ── Identifier resolution ────────────────────────────────────────

#[tokio::test]
async fn unknown_or_garbage_identifier_is_denied() {
    let svc = service();
    let acme = company(&svc, "Acme");
    let creds = session(super_admin());
    let unknown_id = ReportId::new().to_string();

    for ident in ["", "???", "not-a-code-at-all", unknown_id.as_str()] {
        let access = svc.resolver().resolve(&creds, ident).await.unwrap();
        assert_eq!(access, Access::Denied, "identifier {ident:?}");
    }

    let report = submit(&svc, acme.id, "Fraud").await;
    let by_code = svc
        .resolver()
        .resolve(&creds, report.short_code.as_str())
        .await
        .unwrap();
    let by_id = svc
        .resolver()
        .resolve(&creds, &report.report_id.to_string())
        .await
        .unwrap();
    assert_eq!(by_code.locator(), by_id.locator());
    assert_eq!(by_id.locator().unwrap().report_id, report.report_id);
}

// ── Reporter tokens ──────────────────────────────────────────────

#[tokio::test]
async fn reporter_token_grants_only_its_report() {
    let svc = service();
    let acme = company(&svc, "Acme");
    let r1 = submit(&svc, acme.id, "First").await;
    let r2 = submit(&svc, acme.id, "Second").await;

    let own = svc
        .resolver()
        .resolve(&reporter(&r1.token), &r1.report_id.to_string())
        .await
        .unwrap();
    assert!(matches!(own, Access::Reporter { locator } if locator.report_id == r1.report_id));

    let other = svc
        .resolver()
        .resolve(&reporter(&r1.token), &r2.report_id.to_string())
        .await
        .unwrap();
    assert_eq!(other, Access::Denied);
}

#[tokio::test]
async fn invalid_token_does_not_fall_through_to_session() {
    let svc = service();
    let acme = company(&svc, "Acme");
    let report = submit(&svc, acme.id, "Fraud").await;

    let creds = RequestCredentials::anonymous()
        .with_bearer_token("forged.token")
        .with_session(super_admin());
    let access = svc
        .resolver()
        .resolve(&creds, report.short_code.as_str())
        .await
        .unwrap();
    assert_eq!(access, Access::Denied);
}

#[tokio::test]
async fn expired_token_is_denied() {
    let svc = service();
    let acme = company(&svc, "Acme");
    let report = submit(&svc, acme.id, "Fraud").await;

    let stale = signer()
        .issue_at(
            report.report_id,
            acme.id,
            Duration::hours(1),
            Utc::now() - Duration::hours(2),
        )
        .unwrap();
    let access = svc
        .resolver()
        .resolve(&reporter(&stale), &report.report_id.to_string())
        .await
        .unwrap();
    assert_eq!(access, Access::Denied);
}

#[tokio::test]
async fn header_and_form_tokens_are_equivalent() {
    let svc = service();
    let acme = company(&svc, "Acme");
    let report = submit(&svc, acme.id, "Fraud").await;
    let ident = report.report_id.to_string();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", report.token)).unwrap(),
    );
    let via_header = RequestCredentials::from_headers(&headers);
    let via_form = RequestCredentials::anonymous().with_form_token(&report.token);
    let both = RequestCredentials::from_headers(&headers).with_form_token(&report.token);

    for creds in [via_header, via_form, both] {
        let access = svc.resolver().resolve(&creds, &ident).await.unwrap();
        assert!(matches!(access, Access::Reporter { .. }));
    }
}

#[tokio::test]
async fn differing_header_and_form_tokens_are_denied() {
    let svc = service();
    let acme = company(&svc, "Acme");
    let r1 = submit(&svc, acme.id, "First").await;
    let r2 = submit(&svc, acme.id, "Second").await;

    let creds = reporter(&r1.token).with_form_token(&r2.token);
    let access = svc
        .resolver()
        .resolve(&creds, &r1.report_id.to_string())
        .await
        .unwrap();
    assert_eq!(access, Access::Denied);
}

#[tokio::test]
async fn unreadable_bearer_header_does_not_fall_through_to_session() {
    let svc = service();
    let acme = company(&svc, "Acme");
    let report = submit(&svc, acme.id, "Fraud").await;

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_bytes(b"Bearer t\xc3\xb6ken").unwrap(),
    );
    let creds = RequestCredentials::from_headers(&headers).with_session(company_admin(acme.id));
    let access = svc
        .resolver()
        .resolve(&creds, report.short_code.as_str())
        .await
        .unwrap();
    assert_eq!(access, Access::Denied);
}

// ── Sessions ─────────────────────────────────────────────────────

#[tokio::test]
async fn company_admin_is_confined_to_own_company() {
    let svc = service();
    let acme = company(&svc, "Acme");
    let globex = company(&svc, "Globex");
    let acme_report = submit(&svc, acme.id, "Acme issue").await;
    let globex_report = submit(&svc, globex.id, "Globex issue").await;

    let admin = session(company_admin(acme.id));
    let own = svc
        .resolver()
        .resolve(&admin, acme_report.short_code.as_str())
        .await
        .unwrap();
    assert!(matches!(own, Access::CompanyAdmin { .. }));
    assert!(own.is_staff());

    let foreign = svc
        .resolver()
        .resolve(&admin, globex_report.short_code.as_str())
        .await
        .unwrap();
    assert_eq!(foreign, Access::Denied);
}

#[tokio::test]
async fn super_admin_reaches_every_company() {
    let svc = service();
    let user_id = UserId::new();
    let creds = session(SessionPrincipal::SuperAdmin { user_id });

    for name in ["Acme", "Globex"] {
        let c = company(&svc, name);
        let report = submit(&svc, c.id, name).await;
        let access = svc
            .resolver()
            .resolve(&creds, &report.report_id.to_string())
            .await
            .unwrap();
        assert!(matches!(access, Access::SuperAdmin { user_id: u, .. } if u == user_id));
    }
}

#[tokio::test]
async fn no_credentials_is_denied() {
    let svc = service();
    let acme = company(&svc, "Acme");
    let report = submit(&svc, acme.id, "Fraud").await;
    let access = svc
        .resolver()
        .resolve(&RequestCredentials::anonymous(), report.short_code.as_str())
        .await
        .unwrap();
    assert_eq!(access, Access::Denied);
    assert!(access.author_type().is_none());
}
