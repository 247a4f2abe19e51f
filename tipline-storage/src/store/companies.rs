//! Company rows and the wrapped data key they carry.

use super::helpers::{company_from_row, read_company, COMPANY_COLUMNS};
use super::TiplineStore;
use crate::error::{StorageError, StorageResult};
use rusqlite::{params, OptionalExtension};
use tipline_types::{now_millis, Company, CompanyId};

impl TiplineStore {
    /// Create a company without a data key.
    pub fn create_company(&self, name: &str) -> StorageResult<Company> {
        let company = Company {
            id: CompanyId::new(),
            name: name.to_string(),
            encrypted_data_key: None,
            data_key_iv: None,
            created_at: now_millis(),
        };
        self.insert_company(&company)?;
        Ok(company)
    }

    /// Insert a fully formed company row.
    pub fn insert_company(&self, company: &Company) -> StorageResult<()> {
        let conn = self.lock_conn();
        conn.execute(
            "INSERT INTO companies (id, name, encrypted_data_key, data_key_iv, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                company.id.to_string(),
                company.name,
                company.encrypted_data_key,
                company.data_key_iv,
                company.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_company(&self, id: &CompanyId) -> StorageResult<Option<Company>> {
        let conn = self.lock_conn();
        let raw = conn
            .query_row(
                &format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = ?1"),
                params![id.to_string()],
                read_company,
            )
            .optional()?;
        raw.map(company_from_row).transpose()
    }

    pub fn list_companies(&self) -> StorageResult<Vec<Company>> {
        let conn = self.lock_conn();
        let mut stmt =
            conn.prepare(&format!("SELECT {COMPANY_COLUMNS} FROM companies ORDER BY created_at"))?;
        let rows = stmt
            .query_map([], read_company)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(company_from_row).collect()
    }

    /// Store a wrapped data key only if the company has none yet.
    ///
    /// Returns `true` when this call wrote the key and `false` when a key was
    /// already present. The check and the write are a single statement, so
    /// concurrent callers cannot both win.
    pub fn set_data_key_if_absent(
        &self,
        id: &CompanyId,
        encrypted_data_key: &str,
        data_key_iv: &str,
    ) -> StorageResult<bool> {
        let conn = self.lock_conn();
        let changed = conn.execute(
            "UPDATE companies SET encrypted_data_key = ?1, data_key_iv = ?2
             WHERE id = ?3 AND encrypted_data_key IS NULL",
            params![encrypted_data_key, data_key_iv, id.to_string()],
        )?;
        if changed == 1 {
            return Ok(true);
        }
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE id = ?1)",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        if exists {
            Ok(false)
        } else {
            Err(StorageError::NotFound(format!("company {id}")))
        }
    }

    /// Overwrite the wrapped data key unconditionally.
    pub fn replace_data_key(
        &self,
        id: &CompanyId,
        encrypted_data_key: &str,
        data_key_iv: &str,
    ) -> StorageResult<()> {
        let conn = self.lock_conn();
        let changed = conn.execute(
            "UPDATE companies SET encrypted_data_key = ?1, data_key_iv = ?2 WHERE id = ?3",
            params![encrypted_data_key, data_key_iv, id.to_string()],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("company {id}")));
        }
        Ok(())
    }
}
