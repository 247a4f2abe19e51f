use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use tipline_token::{ReporterClaims, TokenSigner, TokenVerifier};
use tipline_types::{CompanyId, ReportId};

fn setup() -> (TokenSigner, TokenVerifier, ReportId, CompanyId) {
    let signer = TokenSigner::from_seed(&[9u8; 32]);
    let verifier = signer.verifier();
    (signer, verifier, ReportId::new(), CompanyId::new())
}

// ── Happy path ───────────────────────────────────────────────────

#[test]
fn valid_token_returns_claims() {
    let (signer, verifier, report, company) = setup();
    let token = signer.issue(report, company, Duration::days(30)).unwrap();

    let claims = verifier.verify(&token).unwrap();
    assert_eq!(claims.report_id, report);
    assert_eq!(claims.company_id, company);
    assert!(claims.exp > claims.iat);
    assert!(!claims.jti.is_empty());
}

#[test]
fn verifier_from_public_hex_accepts_tokens() {
    let (signer, verifier, report, company) = setup();
    let rebuilt = TokenVerifier::from_public_hex(&verifier.public_hex()).unwrap();
    let token = signer.issue(report, company, Duration::minutes(5)).unwrap();
    assert!(rebuilt.verify(&token).is_some());
}

#[test]
fn every_issue_has_a_fresh_jti() {
    let (signer, verifier, report, company) = setup();
    let a = signer.issue(report, company, Duration::hours(1)).unwrap();
    let b = signer.issue(report, company, Duration::hours(1)).unwrap();
    assert_ne!(a, b);
    assert_ne!(verifier.verify(&a).unwrap().jti, verifier.verify(&b).unwrap().jti);
}

// ── Scoping ──────────────────────────────────────────────────────

#[test]
fn token_is_scoped_to_report_and_company() {
    let (signer, verifier, report, company) = setup();
    let token = signer.issue(report, company, Duration::hours(1)).unwrap();

    assert!(verifier.verify_for(&token, &report, &company).is_some());
    assert!(verifier.verify_for(&token, &ReportId::new(), &company).is_none());
    assert!(verifier.verify_for(&token, &report, &CompanyId::new()).is_none());
}

#[test]
fn token_for_other_report_does_not_unlock_this_one() {
    let (signer, verifier, report_a, company) = setup();
    let report_b = ReportId::new();
    let _token_b = signer.issue(report_b, company, Duration::hours(1)).unwrap();
    let token_a = signer.issue(report_a, company, Duration::hours(1)).unwrap();

    assert!(verifier.verify_for(&token_a, &report_b, &company).is_none());
}

// ── Expiry ───────────────────────────────────────────────────────

#[test]
fn zero_ttl_fails_immediately() {
    let (signer, verifier, report, company) = setup();
    let token = signer.issue(report, company, Duration::zero()).unwrap();
    assert!(verifier.verify(&token).is_none());
}

#[test]
fn token_expires_after_ttl() {
    let (signer, verifier, report, company) = setup();
    let issued = Utc::now() - Duration::hours(2);
    let token = signer
        .issue_at(report, company, Duration::hours(1), issued)
        .unwrap();

    assert!(verifier.verify(&token).is_none());
    assert!(verifier
        .verify_at(&token, issued + Duration::minutes(59))
        .is_some());
}

// ── Forgery and malformation ─────────────────────────────────────

#[test]
fn other_signer_is_rejected() {
    let (_, verifier, report, company) = setup();
    let attacker = TokenSigner::from_seed(&[10u8; 32]);
    let token = attacker.issue(report, company, Duration::hours(1)).unwrap();
    assert!(verifier.verify(&token).is_none());
}

#[test]
fn swapped_claims_are_rejected() {
    let (signer, verifier, report, company) = setup();
    let token = signer.issue(report, company, Duration::hours(1)).unwrap();
    let (_, sig) = token.split_once('.').unwrap();

    let forged_claims = ReporterClaims {
        report_id: ReportId::new(),
        company_id: company,
        iat: Utc::now().timestamp(),
        exp: Utc::now().timestamp() + 3600,
        jti: "forged".into(),
    };
    let forged_segment = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
    let forged = format!("{forged_segment}.{sig}");

    assert!(verifier.verify(&forged).is_none());
}

#[test]
fn extended_expiry_is_rejected() {
    let (signer, verifier, report, company) = setup();
    let token = signer.issue(report, company, Duration::seconds(1)).unwrap();
    let (claims_segment, sig) = token.split_once('.').unwrap();

    let mut claims: ReporterClaims =
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(claims_segment).unwrap()).unwrap();
    claims.exp += 1_000_000;
    let tampered = format!(
        "{}.{sig}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap())
    );

    assert!(verifier.verify(&tampered).is_none());
}

#[test]
fn malformed_tokens_are_none_not_errors() {
    let (signer, verifier, report, company) = setup();
    let token = signer.issue(report, company, Duration::hours(1)).unwrap();

    let candidates: Vec<String> = vec![
        String::new(),
        ".".into(),
        "abc".into(),
        "abc.def".into(),
        "abc.def.ghi".into(),
        format!("{token}.extra"),
        token[..token.len() - 3].to_string(),
        token.replace('.', ""),
    ];
    for bad in &candidates {
        assert!(verifier.verify(bad).is_none(), "accepted {bad:?}");
    }
}

// ── Properties ───────────────────────────────────────────────────

mod props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn valid_until_exactly_exp(ttl in 1i64..10_000_000, offset in 0i64..10_000_000) {
            let (signer, verifier, report, company) = setup();
            let issued = Utc::now();
            let token = signer
                .issue_at(report, company, Duration::seconds(ttl), issued)
                .unwrap();

            let at = issued + Duration::seconds(offset);
            let accepted = verifier.verify_at(&token, at).is_some();
            prop_assert_eq!(accepted, offset < ttl);
        }

        #[test]
        fn never_grants_another_report(ttl in 1i64..100_000) {
            let (signer, verifier, report, company) = setup();
            let token = signer.issue(report, company, Duration::seconds(ttl)).unwrap();
            prop_assert!(verifier.verify_for(&token, &ReportId::new(), &company).is_none());
            prop_assert!(verifier.verify_for(&token, &report, &CompanyId::new()).is_none());
        }
    }
}
