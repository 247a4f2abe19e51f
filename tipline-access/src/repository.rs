//! Persistence seams used by the resolver and the key store.
//!
//! Both traits are implemented for [`TiplineStore`]; tests substitute
//! in-memory fakes.

use crate::error::{AccessResult, KeyStoreError, KeyStoreResult};
use async_trait::async_trait;
use tipline_crypto::WrappedDataKey;
use tipline_storage::{StorageError, TiplineStore};
use tipline_types::{CompanyId, ReportId, ReportIdentifier};

/// Canonical coordinates of a report: its id and owning company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportLocator {
    pub report_id: ReportId,
    pub company_id: CompanyId,
}

/// Resolves a caller-supplied identifier to a report.
#[async_trait]
pub trait ReportDirectory: Send + Sync {
    /// Returns `None` when no report matches.
    async fn locate(&self, identifier: &ReportIdentifier) -> AccessResult<Option<ReportLocator>>;
}

/// What a company row holds in its data-key slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySlot {
    Empty,
    Filled(WrappedDataKey),
}

/// Reads and writes the wrapped data key of a company.
#[async_trait]
pub trait CompanyKeyRepository: Send + Sync {
    /// Current key slot. Fails with [`KeyStoreError::CompanyNotFound`] for an
    /// unknown company and [`KeyStoreError::Corrupted`] when only one half of
    /// the wrapped key is present.
    async fn load_slot(&self, company_id: &CompanyId) -> KeyStoreResult<KeySlot>;

    /// Writes the key only if the slot is empty. Returns whether this call
    /// performed the write.
    async fn store_if_empty(
        &self,
        company_id: &CompanyId,
        wrapped: &WrappedDataKey,
    ) -> KeyStoreResult<bool>;

    /// Overwrites the slot.
    async fn replace(
        &self,
        company_id: &CompanyId,
        wrapped: &WrappedDataKey,
    ) -> KeyStoreResult<()>;
}

// ── TiplineStore ────────────────────────────────────────────────

#[async_trait]
impl ReportDirectory for TiplineStore {
    async fn locate(&self, identifier: &ReportIdentifier) -> AccessResult<Option<ReportLocator>> {
        Ok(self.find_report(identifier)?.map(|report| ReportLocator {
            report_id: report.id,
            company_id: report.company_id,
        }))
    }
}

fn not_found_as_company(company_id: &CompanyId, err: StorageError) -> KeyStoreError {
    match err {
        StorageError::NotFound(_) => KeyStoreError::CompanyNotFound(*company_id),
        other => KeyStoreError::Storage(other),
    }
}

#[async_trait]
impl CompanyKeyRepository for TiplineStore {
    async fn load_slot(&self, company_id: &CompanyId) -> KeyStoreResult<KeySlot> {
        let company = self
            .get_company(company_id)?
            .ok_or(KeyStoreError::CompanyNotFound(*company_id))?;
        match (company.encrypted_data_key, company.data_key_iv) {
            (None, None) => Ok(KeySlot::Empty),
            (Some(ciphertext), Some(iv)) => Ok(KeySlot::Filled(WrappedDataKey { ciphertext, iv })),
            _ => Err(KeyStoreError::Corrupted {
                company_id: *company_id,
                reason: "wrapped key and iv must both be present".into(),
            }),
        }
    }

    async fn store_if_empty(
        &self,
        company_id: &CompanyId,
        wrapped: &WrappedDataKey,
    ) -> KeyStoreResult<bool> {
        self.set_data_key_if_absent(company_id, &wrapped.ciphertext, &wrapped.iv)
            .map_err(|e| not_found_as_company(company_id, e))
    }

    async fn replace(
        &self,
        company_id: &CompanyId,
        wrapped: &WrappedDataKey,
    ) -> KeyStoreResult<()> {
        self.replace_data_key(company_id, &wrapped.ciphertext, &wrapped.iv)
            .map_err(|e| not_found_as_company(company_id, e))
    }
}
