//! Company data-key store.
//!
//! Each company has at most one data key, generated on demand and persisted
//! only in wrapped form (encrypted under the server [`MasterKey`] and bound to
//! the company id). The raw key leaves this module twice: once as the return
//! value of [`CompanyKeyStore::generate`] for one-time display, and on every
//! [`CompanyKeyStore::get`] for request-scoped use.

use crate::error::{KeyStoreError, KeyStoreResult};
use crate::repository::{CompanyKeyRepository, KeySlot};
use std::sync::Arc;
use tipline_crypto::{
    unwrap_data_key, wrap_data_key, DataKey, FieldEncryptor, KeyedEncryptor, MasterKey,
    PassthroughEncryptor,
};
use tipline_types::CompanyId;
use tracing::{debug, error, info, warn};

/// How [`CompanyKeyStore::generate`] treats an existing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGeneration {
    /// Fail with [`KeyStoreError::AlreadyConfigured`] if a key exists.
    FirstTime,
    /// Overwrite any existing key. Content sealed under the old key becomes
    /// unreadable through this store.
    ReplaceExisting,
}

/// Generates, unwraps and verifies company data keys.
#[derive(Clone)]
pub struct CompanyKeyStore {
    repo: Arc<dyn CompanyKeyRepository>,
    master: Arc<MasterKey>,
}

impl CompanyKeyStore {
    pub fn new(repo: Arc<dyn CompanyKeyRepository>, master: MasterKey) -> Self {
        Self {
            repo,
            master: Arc::new(master),
        }
    }

    /// Generates a key for `company_id` and returns it for one-time display.
    pub async fn generate(
        &self,
        company_id: &CompanyId,
        policy: KeyGeneration,
    ) -> KeyStoreResult<DataKey> {
        let key = DataKey::generate();
        let wrapped = wrap_data_key(&self.master, &key, &company_id.to_string())?;

        match policy {
            KeyGeneration::FirstTime => {
                if !self.repo.store_if_empty(company_id, &wrapped).await? {
                    debug!(%company_id, "refusing to overwrite existing data key");
                    return Err(KeyStoreError::AlreadyConfigured(*company_id));
                }
                info!(%company_id, "company data key generated");
            }
            KeyGeneration::ReplaceExisting => {
                self.repo.replace(company_id, &wrapped).await?;
                warn!(%company_id, "company data key replaced");
            }
        }
        Ok(key)
    }

    /// The company's data key, or `None` if none has been generated.
    pub async fn get(&self, company_id: &CompanyId) -> KeyStoreResult<Option<DataKey>> {
        let wrapped = match self.repo.load_slot(company_id).await {
            Ok(KeySlot::Empty) => return Ok(None),
            Ok(KeySlot::Filled(wrapped)) => wrapped,
            Err(KeyStoreError::Corrupted { company_id, reason }) => {
                error!(%company_id, %reason, "stored data key is corrupted");
                return Err(KeyStoreError::Corrupted { company_id, reason });
            }
            Err(e) => return Err(e),
        };

        match unwrap_data_key(&self.master, &wrapped, &company_id.to_string()) {
            Ok(key) => Ok(Some(key)),
            Err(e) => {
                error!(%company_id, error = %e, "failed to unwrap company data key");
                Err(KeyStoreError::Corrupted {
                    company_id: *company_id,
                    reason: e.to_string(),
                })
            }
        }
    }

    pub async fn is_configured(&self, company_id: &CompanyId) -> KeyStoreResult<bool> {
        Ok(matches!(
            self.repo.load_slot(company_id).await?,
            KeySlot::Filled(_)
        ))
    }

    /// Constant-time check of `candidate` against the company's key.
    /// `false` when the company has no key.
    pub async fn verify(&self, company_id: &CompanyId, candidate: &DataKey) -> KeyStoreResult<bool> {
        Ok(self
            .get(company_id)
            .await?
            .is_some_and(|key| key.ct_eq(candidate)))
    }

    /// [`verify`](Self::verify) for a raw hex string; unparsable input is
    /// simply not the key.
    pub async fn verify_hex(&self, company_id: &CompanyId, candidate: &str) -> KeyStoreResult<bool> {
        match DataKey::from_hex(candidate) {
            Ok(key) => self.verify(company_id, &key).await,
            Err(_) => Ok(false),
        }
    }

    /// Encryptor for new writes: the current key if configured, passthrough
    /// otherwise.
    pub async fn encryptor_for(
        &self,
        company_id: &CompanyId,
    ) -> KeyStoreResult<Box<dyn FieldEncryptor>> {
        Ok(match self.get(company_id).await? {
            Some(key) => Box::new(KeyedEncryptor::new(key)),
            None => Box::new(PassthroughEncryptor),
        })
    }
}

impl std::fmt::Debug for CompanyKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompanyKeyStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tipline_crypto::WrappedDataKey;
    use tokio::sync::RwLock;

    /// In-memory repository; companies must be registered first.
    #[derive(Default)]
    struct MemoryRepo {
        slots: RwLock<HashMap<CompanyId, KeySlot>>,
    }

    impl MemoryRepo {
        async fn with_company(company_id: CompanyId) -> Arc<Self> {
            let repo = Arc::new(Self::default());
            repo.slots.write().await.insert(company_id, KeySlot::Empty);
            repo
        }
    }

    #[async_trait]
    impl CompanyKeyRepository for MemoryRepo {
        async fn load_slot(&self, company_id: &CompanyId) -> KeyStoreResult<KeySlot> {
            self.slots
                .read()
                .await
                .get(company_id)
                .cloned()
                .ok_or(KeyStoreError::CompanyNotFound(*company_id))
        }

        async fn store_if_empty(
            &self,
            company_id: &CompanyId,
            wrapped: &WrappedDataKey,
        ) -> KeyStoreResult<bool> {
            let mut slots = self.slots.write().await;
            let slot = slots
                .get_mut(company_id)
                .ok_or(KeyStoreError::CompanyNotFound(*company_id))?;
            if *slot != KeySlot::Empty {
                return Ok(false);
            }
            *slot = KeySlot::Filled(wrapped.clone());
            Ok(true)
        }

        async fn replace(
            &self,
            company_id: &CompanyId,
            wrapped: &WrappedDataKey,
        ) -> KeyStoreResult<()> {
            let mut slots = self.slots.write().await;
            let slot = slots
                .get_mut(company_id)
                .ok_or(KeyStoreError::CompanyNotFound(*company_id))?;
            *slot = KeySlot::Filled(wrapped.clone());
            Ok(())
        }
    }

    fn master() -> MasterKey {
        MasterKey::from_bytes([7u8; 32])
    }

    #[tokio::test]
    async fn generate_then_get_returns_same_key() {
        let company = CompanyId::new();
        let store = CompanyKeyStore::new(MemoryRepo::with_company(company).await, master());

        assert!(store.get(&company).await.unwrap().is_none());
        let key = store.generate(&company, KeyGeneration::FirstTime).await.unwrap();
        let loaded = store.get(&company).await.unwrap().unwrap();
        assert!(key.ct_eq(&loaded));
        assert!(store.is_configured(&company).await.unwrap());
    }

    #[tokio::test]
    async fn first_time_refuses_to_overwrite() {
        let company = CompanyId::new();
        let store = CompanyKeyStore::new(MemoryRepo::with_company(company).await, master());
        let original = store.generate(&company, KeyGeneration::FirstTime).await.unwrap();

        let err = store
            .generate(&company, KeyGeneration::FirstTime)
            .await
            .unwrap_err();
        assert!(matches!(err, KeyStoreError::AlreadyConfigured(id) if id == company));
        assert!(store.verify(&company, &original).await.unwrap());
    }

    #[tokio::test]
    async fn replace_existing_rotates() {
        let company = CompanyId::new();
        let store = CompanyKeyStore::new(MemoryRepo::with_company(company).await, master());
        let old = store.generate(&company, KeyGeneration::FirstTime).await.unwrap();
        let new = store
            .generate(&company, KeyGeneration::ReplaceExisting)
            .await
            .unwrap();

        assert!(!store.verify(&company, &old).await.unwrap());
        assert!(store.verify(&company, &new).await.unwrap());
    }

    #[tokio::test]
    async fn verify_hex_rejects_garbage() {
        let company = CompanyId::new();
        let store = CompanyKeyStore::new(MemoryRepo::with_company(company).await, master());
        let key = store.generate(&company, KeyGeneration::FirstTime).await.unwrap();

        assert!(store.verify_hex(&company, &key.to_hex()).await.unwrap());
        assert!(!store.verify_hex(&company, "not hex").await.unwrap());
        assert!(!store.verify_hex(&company, "abcd").await.unwrap());
        assert!(!store.verify_hex(&company, &"00".repeat(32)).await.unwrap());
    }

    #[tokio::test]
    async fn verify_without_key_is_false() {
        let company = CompanyId::new();
        let store = CompanyKeyStore::new(MemoryRepo::with_company(company).await, master());
        assert!(!store.verify(&company, &DataKey::generate()).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_company_is_reported() {
        let store = CompanyKeyStore::new(Arc::new(MemoryRepo::default()), master());
        let err = store
            .generate(&CompanyId::new(), KeyGeneration::FirstTime)
            .await
            .unwrap_err();
        assert!(matches!(err, KeyStoreError::CompanyNotFound(_)));
    }

    #[tokio::test]
    async fn wrong_master_key_is_corruption_not_absence() {
        let company = CompanyId::new();
        let repo = MemoryRepo::with_company(company).await;
        CompanyKeyStore::new(repo.clone(), master())
            .generate(&company, KeyGeneration::FirstTime)
            .await
            .unwrap();

        let other = CompanyKeyStore::new(repo, MasterKey::from_bytes([8u8; 32]));
        let err = other.get(&company).await.unwrap_err();
        assert!(matches!(err, KeyStoreError::Corrupted { .. }));
    }

    #[tokio::test]
    async fn wrapped_key_is_bound_to_company() {
        let a = CompanyId::new();
        let b = CompanyId::new();
        let repo = Arc::new(MemoryRepo::default());
        repo.slots.write().await.insert(a, KeySlot::Empty);
        repo.slots.write().await.insert(b, KeySlot::Empty);
        let store = CompanyKeyStore::new(repo.clone(), master());
        store.generate(&a, KeyGeneration::FirstTime).await.unwrap();

        let copied = repo.slots.read().await.get(&a).cloned().unwrap();
        repo.slots.write().await.insert(b, copied);
        assert!(matches!(
            store.get(&b).await,
            Err(KeyStoreError::Corrupted { .. })
        ));
    }

    #[test]
    fn encryptor_follows_configuration() {
        tokio_test::block_on(async {
            let company = CompanyId::new();
            let store = CompanyKeyStore::new(MemoryRepo::with_company(company).await, master());
            assert!(!store.encryptor_for(&company).await.unwrap().is_encrypting());

            store.generate(&company, KeyGeneration::FirstTime).await.unwrap();
            assert!(store.encryptor_for(&company).await.unwrap().is_encrypting());
        });
    }
}
