//! Report service.
//!
//! The entry point API handlers call. Every report-scoped operation first
//! resolves [`Access`]; a denial of any kind becomes
//! [`ServiceError::Unauthorized`]. Reads are shaped through a [`FieldGate`]
//! chosen by role, and writes are sealed with the company's current key.

use crate::config::TiplineConfig;
use crate::credentials::{CredentialNames, RequestCredentials};
use crate::error::{ServiceError, ServiceResult};
use crate::gate::{admin_key, reporter_key, FieldGate};
use crate::key_store::{CompanyKeyStore, KeyGeneration};
use crate::repository::ReportLocator;
use crate::resolver::{Access, AccessResolver};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tipline_crypto::{
    encrypt_field, hash_access_password, looks_encrypted, verify_access_password, DataKey,
    FieldEncryptor, MasterKey,
};
use tipline_storage::{ReportPatch, TiplineStore};
use tipline_token::TokenSigner;
use tipline_types::{
    now_millis, AuthorType, Comment, CommentId, CompanyId, Report, ReportId, ReportStatus,
    SessionPrincipal, ShortCode,
};
use tracing::{debug, info};
use zeroize::Zeroizing;

/// A report as returned to a caller, fields already gated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportView {
    pub id: ReportId,
    pub short_code: ShortCode,
    pub company_id: CompanyId,
    pub title: String,
    pub content: String,
    pub status: ReportStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A comment as returned to a caller, content already gated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub author_type: AuthorType,
    pub is_internal: bool,
    pub content: String,
    pub created_at: i64,
}

/// A public report submission.
#[derive(Clone, Deserialize)]
pub struct NewReport {
    pub company_id: CompanyId,
    pub title: String,
    pub content: String,
    /// Lets the reporter obtain a fresh token later with the short code.
    #[serde(default)]
    pub access_password: Option<String>,
}

/// What the reporter takes away from a submission.
#[derive(Clone, Serialize)]
pub struct SubmittedReport {
    pub report_id: ReportId,
    pub short_code: ShortCode,
    pub token: String,
}

impl std::fmt::Debug for SubmittedReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmittedReport")
            .field("report_id", &self.report_id)
            .field("short_code", &self.short_code)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewComment {
    pub content: String,
    /// Staff-only note. Rejected for reporters.
    #[serde(default)]
    pub is_internal: bool,
}

/// Staff edit of a report. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<ReportStatus>,
}

/// Outcome of [`ReportService::encrypt_existing_content`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillSummary {
    pub reports_sealed: usize,
    pub comments_sealed: usize,
}

fn require_text(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_admin_of(principal: &SessionPrincipal, company_id: &CompanyId) -> ServiceResult<()> {
    if principal.administers(company_id) {
        Ok(())
    } else {
        debug!(%company_id, user_id = %principal.user_id(), "company action denied");
        Err(ServiceError::Unauthorized)
    }
}

/// Composes storage, access resolution, key management and token issuance.
#[derive(Clone)]
pub struct ReportService {
    store: TiplineStore,
    resolver: AccessResolver,
    keys: CompanyKeyStore,
    signer: Arc<TokenSigner>,
    token_ttl: chrono::Duration,
    credential_names: CredentialNames,
}

impl ReportService {
    pub fn new(
        store: TiplineStore,
        master: MasterKey,
        signer: TokenSigner,
        token_ttl: chrono::Duration,
    ) -> Self {
        let shared = Arc::new(store.clone());
        Self {
            resolver: AccessResolver::new(shared.clone(), signer.verifier()),
            keys: CompanyKeyStore::new(shared, master),
            store,
            signer: Arc::new(signer),
            token_ttl,
            credential_names: CredentialNames::default(),
        }
    }

    /// Reads credentials from the given header and form field instead of
    /// the defaults.
    pub fn with_credential_names(mut self, names: CredentialNames) -> Self {
        self.credential_names = names;
        self
    }

    /// Opens the configured database and builds the service.
    pub fn from_config(config: &TiplineConfig) -> ServiceResult<Self> {
        config.validate()?;
        let store = TiplineStore::open(&config.database_path)?;
        Ok(Self::new(
            store,
            config.master_key()?,
            config.token_signer()?,
            config.token_ttl()?,
        )
        .with_credential_names(config.credential_names()?))
    }

    pub fn credential_names(&self) -> &CredentialNames {
        &self.credential_names
    }

    /// Extracts request credentials using the configured key header and
    /// form token field. `form` looks up submitted multipart fields.
    pub fn credentials(
        &self,
        headers: &HeaderMap,
        form: impl Fn(&str) -> Option<String>,
    ) -> RequestCredentials {
        self.credential_names.read(headers, form)
    }

    pub fn store(&self) -> &TiplineStore {
        &self.store
    }

    pub fn keys(&self) -> &CompanyKeyStore {
        &self.keys
    }

    pub fn resolver(&self) -> &AccessResolver {
        &self.resolver
    }

    // ── Reporter-facing ─────────────────────────────────────────

    /// Accepts a public submission and returns the reporter's credentials.
    pub async fn submit_report(&self, new: NewReport) -> ServiceResult<SubmittedReport> {
        require_text("title", &new.title)?;
        require_text("content", &new.content)?;
        let access_password_hash = match new.access_password.as_deref() {
            Some(pw) if pw.is_empty() => {
                return Err(ServiceError::InvalidInput(
                    "access password must not be empty".into(),
                ));
            }
            Some(pw) => Some(hash_access_password(pw)?),
            None => None,
        };

        let sealer = self.keys.encryptor_for(&new.company_id).await?;
        let now = now_millis();
        let report = self.store.insert_report(Report {
            id: ReportId::new(),
            short_code: ShortCode::generate(),
            company_id: new.company_id,
            title: sealer.seal(&new.title)?,
            content: sealer.seal(&new.content)?,
            status: ReportStatus::New,
            access_password_hash,
            created_at: now,
            updated_at: now,
        })?;

        let token = self
            .signer
            .issue(report.id, report.company_id, self.token_ttl)?;
        info!(
            report_id = %report.id,
            company_id = %report.company_id,
            encrypted = sealer.is_encrypting(),
            "report submitted"
        );
        Ok(SubmittedReport {
            report_id: report.id,
            short_code: report.short_code,
            token,
        })
    }

    /// Issues a fresh token to a reporter who knows the short code and the
    /// access password chosen at submission.
    pub async fn reissue_token(&self, short_code: &str, password: &str) -> ServiceResult<String> {
        let Ok(code) = ShortCode::parse(short_code) else {
            return Err(ServiceError::Unauthorized);
        };
        let report = self
            .store
            .get_report_by_short_code(&code)?
            .ok_or(ServiceError::Unauthorized)?;
        let verified = report
            .access_password_hash
            .as_deref()
            .is_some_and(|phc| verify_access_password(password, phc));
        if !verified {
            debug!(report_id = %report.id, "token reissue refused");
            return Err(ServiceError::Unauthorized);
        }
        Ok(self
            .signer
            .issue(report.id, report.company_id, self.token_ttl)?)
    }

    // ── Report-scoped ───────────────────────────────────────────

    pub async fn fetch_report(
        &self,
        creds: &RequestCredentials,
        identifier: &str,
    ) -> ServiceResult<ReportView> {
        let access = self.authorize(creds, identifier).await?;
        let locator = granted(&access)?;
        let report = self
            .store
            .get_report(&locator.report_id)?
            .ok_or(ServiceError::Unauthorized)?;
        let gate = self.gate_for(&access, creds).await?;
        Ok(ReportView {
            id: report.id,
            short_code: report.short_code,
            company_id: report.company_id,
            title: gate.reveal(&report.title),
            content: gate.reveal(&report.content),
            status: report.status,
            created_at: report.created_at,
            updated_at: report.updated_at,
        })
    }

    /// Comments visible to the caller. Reporters never see internal notes.
    pub async fn list_comments(
        &self,
        creds: &RequestCredentials,
        identifier: &str,
    ) -> ServiceResult<Vec<CommentView>> {
        let access = self.authorize(creds, identifier).await?;
        let locator = granted(&access)?;
        let comments = self
            .store
            .list_comments(&locator.report_id, access.is_staff())?;
        let gate = self.gate_for(&access, creds).await?;
        Ok(comments
            .into_iter()
            .map(|c| CommentView {
                id: c.id,
                author_type: c.author_type,
                is_internal: c.is_internal,
                content: gate.reveal(&c.content),
                created_at: c.created_at,
            })
            .collect())
    }

    pub async fn add_comment(
        &self,
        creds: &RequestCredentials,
        identifier: &str,
        new: NewComment,
    ) -> ServiceResult<CommentView> {
        let access = self.authorize(creds, identifier).await?;
        let locator = *granted(&access)?;
        let author_type = access.author_type().ok_or(ServiceError::Unauthorized)?;
        require_text("content", &new.content)?;
        if new.is_internal && !access.is_staff() {
            return Err(ServiceError::InvalidInput(
                "reporters cannot post internal comments".into(),
            ));
        }

        let sealer = self.keys.encryptor_for(&locator.company_id).await?;
        let comment = Comment {
            id: CommentId::new(),
            report_id: locator.report_id,
            author_type,
            is_internal: new.is_internal,
            content: sealer.seal(&new.content)?,
            created_at: now_millis(),
        };
        self.store.insert_comment(&comment)?;
        debug!(report_id = %locator.report_id, author = author_type.as_str(), "comment added");

        Ok(CommentView {
            id: comment.id,
            author_type,
            is_internal: comment.is_internal,
            content: new.content,
            created_at: comment.created_at,
        })
    }

    /// Staff edit. New title and content are sealed with the current key.
    pub async fn update_report(
        &self,
        creds: &RequestCredentials,
        identifier: &str,
        update: ReportUpdate,
    ) -> ServiceResult<ReportView> {
        let access = self.authorize(creds, identifier).await?;
        let locator = *granted(&access)?;
        if !access.is_staff() {
            debug!(report_id = %locator.report_id, "reporter attempted a staff edit");
            return Err(ServiceError::Unauthorized);
        }
        if let Some(title) = &update.title {
            require_text("title", title)?;
        }
        if let Some(content) = &update.content {
            require_text("content", content)?;
        }

        let sealer = self.keys.encryptor_for(&locator.company_id).await?;
        let patch = ReportPatch {
            title: update.title.as_deref().map(|t| sealer.seal(t)).transpose()?,
            content: update.content.as_deref().map(|c| sealer.seal(c)).transpose()?,
            status: update.status,
        };
        if patch.is_empty() {
            return Err(ServiceError::InvalidInput("nothing to update".into()));
        }
        if !self.store.update_report(&locator.report_id, &patch)? {
            return Err(ServiceError::Unauthorized);
        }
        self.fetch_report(creds, &locator.report_id.to_string()).await
    }

    // ── Company key management ──────────────────────────────────

    /// Generates the company data key and returns it as hex for one-time
    /// display.
    pub async fn generate_company_key(
        &self,
        principal: &SessionPrincipal,
        company_id: &CompanyId,
        policy: KeyGeneration,
    ) -> ServiceResult<Zeroizing<String>> {
        require_admin_of(principal, company_id)?;
        let key = self.keys.generate(company_id, policy).await?;
        Ok(key.to_hex())
    }

    pub async fn verify_company_key(
        &self,
        principal: &SessionPrincipal,
        company_id: &CompanyId,
        candidate: &str,
    ) -> ServiceResult<bool> {
        require_admin_of(principal, company_id)?;
        Ok(self.keys.verify_hex(company_id, candidate).await?)
    }

    /// Seals every plaintext title, content and comment of the company with
    /// the supplied key, which must be the company's current key. Values
    /// that are already envelopes are left alone.
    pub async fn encrypt_existing_content(
        &self,
        principal: &SessionPrincipal,
        company_id: &CompanyId,
        key_hex: &str,
    ) -> ServiceResult<BackfillSummary> {
        require_admin_of(principal, company_id)?;
        let key = DataKey::from_hex(key_hex)
            .map_err(|_| ServiceError::InvalidInput("key must be 64 hex characters".into()))?;
        if !self.keys.verify(company_id, &key).await? {
            debug!(%company_id, "backfill refused: key does not match");
            return Err(ServiceError::Unauthorized);
        }

        let seal_plain = |value: &str| -> ServiceResult<Option<String>> {
            if looks_encrypted(value) {
                Ok(None)
            } else {
                Ok(Some(encrypt_field(value, &key)?))
            }
        };

        let mut summary = BackfillSummary::default();
        for report in self.store.list_reports(company_id)? {
            let title = seal_plain(&report.title)?;
            let content = seal_plain(&report.content)?;
            if title.is_some() || content.is_some() {
                self.store.rewrite_report_fields(
                    &report.id,
                    title.as_deref(),
                    content.as_deref(),
                )?;
                summary.reports_sealed += 1;
            }
            for comment in self.store.list_comments(&report.id, true)? {
                if let Some(sealed) = seal_plain(&comment.content)? {
                    self.store.update_comment_content(&comment.id, &sealed)?;
                    summary.comments_sealed += 1;
                }
            }
        }
        info!(
            %company_id,
            reports = summary.reports_sealed,
            comments = summary.comments_sealed,
            "existing content encrypted"
        );
        Ok(summary)
    }

    // ── Internals ───────────────────────────────────────────────

    async fn authorize(
        &self,
        creds: &RequestCredentials,
        identifier: &str,
    ) -> ServiceResult<Access> {
        let access = self.resolver.resolve(creds, identifier).await?;
        if access.is_granted() {
            Ok(access)
        } else {
            Err(ServiceError::Unauthorized)
        }
    }

    async fn gate_for(
        &self,
        access: &Access,
        creds: &RequestCredentials,
    ) -> ServiceResult<FieldGate> {
        let source = match access {
            Access::Reporter { locator } => {
                reporter_key(&self.keys, &locator.company_id, creds.encryption_key()).await?
            }
            Access::CompanyAdmin { .. } | Access::SuperAdmin { .. } => {
                admin_key(creds.encryption_key())
            }
            Access::Denied => return Err(ServiceError::Unauthorized),
        };
        Ok(FieldGate::new(source))
    }
}

fn granted(access: &Access) -> ServiceResult<&ReportLocator> {
    access.locator().ok_or(ServiceError::Unauthorized)
}

impl std::fmt::Debug for ReportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportService")
            .field("resolver", &self.resolver)
            .field("token_ttl_secs", &self.token_ttl.num_seconds())
            .finish_non_exhaustive()
    }
}
