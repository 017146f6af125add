//! SQLite store for contracts, users, and notification settings.

use std::path::Path;

use ejare_core::{EjareError, Result};
use rusqlite::{Connection, Row, params};

use crate::models::{
    AdminUser, Contract, IncomeRow, NewContract, NotificationSettings, STATUS_DRAFT,
    STATUS_SIGNED, STATUS_TERMINATED, StatusRow,
};

const CONTRACT_COLUMNS: &str = "id, contract_number, access_code, tenant_name, tenant_email, \
    tenant_phone, tenant_national_id, landlord_name, landlord_email, landlord_national_id, \
    property_address, property_type, property_size, property_features, rent_amount, deposit, \
    start_date, end_date, status, signature, national_id_image, notes, policies, created_at, \
    signed_at";

/// Database manager. One connection, shared behind a mutex by the gateway.
pub struct ContractStore {
    conn: Connection,
}

impl ContractStore {
    /// Open or create the database.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| EjareError::database(format!("DB open error: {e}")))?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Run schema migrations.
    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT DEFAULT 'admin',
                created_at TEXT DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS contracts (
                id TEXT PRIMARY KEY,
                contract_number TEXT UNIQUE NOT NULL,
                access_code TEXT NOT NULL,
                tenant_name TEXT NOT NULL,
                tenant_email TEXT NOT NULL,
                tenant_phone TEXT,
                tenant_national_id TEXT,
                landlord_name TEXT NOT NULL,
                landlord_email TEXT NOT NULL,
                landlord_national_id TEXT,
                property_address TEXT NOT NULL,
                property_type TEXT,
                property_size TEXT,
                property_features TEXT,
                rent_amount TEXT NOT NULL,
                deposit TEXT,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                status TEXT DEFAULT 'draft',
                signature TEXT,
                national_id_image TEXT,
                notes TEXT,
                policies TEXT,
                created_at TEXT DEFAULT (datetime('now')),
                signed_at TEXT
            );

            CREATE TABLE IF NOT EXISTS notification_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                email_enabled INTEGER DEFAULT 0,
                telegram_enabled INTEGER DEFAULT 0,
                whatsapp_enabled INTEGER DEFAULT 0,
                telegram_chat_id TEXT,
                whatsapp_number TEXT,
                email_from TEXT,
                created_at TEXT DEFAULT (datetime('now')),
                updated_at TEXT DEFAULT (datetime('now'))
            );
        ",
            )
            .map_err(|e| EjareError::database(format!("Migration error: {e}")))?;
        Ok(())
    }

    // ── Users ────────────────────────────────────

    /// Create an admin user (out-of-band seeding only).
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO users (id, username, password_hash, role) VALUES (?1,?2,?3,'admin')",
                params![id, username, password_hash],
            )
            .map_err(|e| EjareError::database(format!("Create user: {e}")))?;
        Ok(id)
    }

    /// Look up an admin row by username.
    pub fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        match self.conn.query_row(
            "SELECT id, username, password_hash, role, created_at FROM users \
             WHERE username=?1 AND role='admin'",
            params![username],
            |row| {
                Ok(AdminUser {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                    role: row.get(3)?,
                    created_at: row.get(4)?,
                })
            },
        ) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(EjareError::database(format!("Get user: {e}"))),
        }
    }

    // ── Contracts ────────────────────────────────────

    /// Insert a new contract in draft status.
    pub fn insert_contract(
        &self,
        id: &str,
        contract_number: &str,
        access_code: &str,
        data: &NewContract,
    ) -> Result<Contract> {
        self.conn
            .execute(
                "INSERT INTO contracts (id, contract_number, access_code, tenant_name, \
                 tenant_email, tenant_phone, tenant_national_id, landlord_name, landlord_email, \
                 landlord_national_id, property_address, property_type, property_size, \
                 property_features, rent_amount, deposit, start_date, end_date, status, notes, \
                 policies) \
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21)",
                params![
                    id,
                    contract_number,
                    access_code,
                    data.tenant_name,
                    data.tenant_email,
                    data.tenant_phone,
                    data.tenant_national_id,
                    data.landlord_name,
                    data.landlord_email,
                    data.landlord_national_id,
                    data.property_address,
                    data.property_type,
                    data.property_size,
                    data.property_features,
                    data.rent_amount,
                    data.deposit,
                    data.start_date,
                    data.end_date,
                    STATUS_DRAFT,
                    data.notes,
                    data.policies,
                ],
            )
            .map_err(|e| EjareError::database(format!("Insert contract: {e}")))?;

        self.get_contract(id)?
            .ok_or_else(|| EjareError::database("Insert contract: row vanished after insert"))
    }

    /// Get a contract by its opaque id.
    pub fn get_contract(&self, id: &str) -> Result<Option<Contract>> {
        self.contract_query(
            &format!("SELECT {CONTRACT_COLUMNS} FROM contracts WHERE id=?1"),
            params![id],
        )
    }

    /// Get a contract by its contract number.
    pub fn get_contract_by_number(&self, contract_number: &str) -> Result<Option<Contract>> {
        self.contract_query(
            &format!("SELECT {CONTRACT_COLUMNS} FROM contracts WHERE contract_number=?1"),
            params![contract_number],
        )
    }

    /// Tenant login lookup: number + access code must both match, and
    /// terminated contracts can no longer authenticate.
    pub fn find_tenant_credentials(
        &self,
        contract_number: &str,
        access_code: &str,
    ) -> Result<Option<Contract>> {
        self.contract_query(
            &format!(
                "SELECT {CONTRACT_COLUMNS} FROM contracts \
                 WHERE contract_number=?1 AND access_code=?2 AND status != '{STATUS_TERMINATED}'"
            ),
            params![contract_number, access_code],
        )
    }

    fn contract_query(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Option<Contract>> {
        match self.conn.query_row(sql, params, contract_from_row) {
            Ok(contract) => Ok(Some(contract)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(EjareError::database(format!("Get contract: {e}"))),
        }
    }

    /// List all contracts, newest first.
    pub fn list_contracts(&self) -> Result<Vec<Contract>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {CONTRACT_COLUMNS} FROM contracts ORDER BY created_at DESC, rowid DESC"
            ))
            .map_err(|e| EjareError::database(format!("Prepare: {e}")))?;

        let contracts = stmt
            .query_map([], contract_from_row)
            .map_err(|e| EjareError::database(format!("Query: {e}")))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(contracts)
    }

    /// Record a signature. Returns the number of affected rows so the caller
    /// can turn a zero-row update into a not-found error. Signing an already
    /// signed contract overwrites the previous signature.
    pub fn sign_contract(
        &self,
        contract_number: &str,
        signature: &str,
        national_id_image: Option<&str>,
    ) -> Result<usize> {
        self.conn
            .execute(
                "UPDATE contracts SET signature=?1, national_id_image=?2, status=?3, \
                 signed_at=datetime('now') WHERE contract_number=?4",
                params![signature, national_id_image, STATUS_SIGNED, contract_number],
            )
            .map_err(|e| EjareError::database(format!("Sign contract: {e}")))
    }

    /// Administrative termination. Returns the affected-row count.
    pub fn terminate_contract(&self, contract_number: &str) -> Result<usize> {
        self.conn
            .execute(
                "UPDATE contracts SET status=?1 WHERE contract_number=?2",
                params![STATUS_TERMINATED, contract_number],
            )
            .map_err(|e| EjareError::database(format!("Terminate contract: {e}")))
    }

    // ── Reporting ────────────────────────────────────

    /// Monthly income over signed contracts: most recent 12 calendar months
    /// of `created_at`, newest first.
    pub fn income_by_month(&self) -> Result<Vec<IncomeRow>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT strftime('%Y-%m', created_at) AS month, \
                 COALESCE(SUM(CAST(rent_amount AS REAL)), 0), COUNT(*) \
                 FROM contracts WHERE status=?1 \
                 GROUP BY month ORDER BY month DESC LIMIT 12",
            )
            .map_err(|e| EjareError::database(format!("Prepare: {e}")))?;

        let rows = stmt
            .query_map(params![STATUS_SIGNED], |row| {
                Ok(IncomeRow {
                    month: row.get(0)?,
                    income: row.get(1)?,
                    contracts: row.get(2)?,
                })
            })
            .map_err(|e| EjareError::database(format!("Query: {e}")))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Contract counts grouped by status code.
    pub fn status_counts(&self) -> Result<Vec<StatusRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM contracts GROUP BY status ORDER BY status")
            .map_err(|e| EjareError::database(format!("Prepare: {e}")))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(StatusRow {
                    status: row.get(0)?,
                    count: row.get(1)?,
                })
            })
            .map_err(|e| EjareError::database(format!("Query: {e}")))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    // ── Notification settings (singleton row) ────────────────────────────────────

    /// Read the singleton settings row, if it exists.
    pub fn get_settings(&self) -> Result<Option<NotificationSettings>> {
        match self.conn.query_row(
            "SELECT email_enabled, telegram_enabled, whatsapp_enabled, telegram_chat_id, \
             whatsapp_number, email_from, created_at, updated_at \
             FROM notification_settings WHERE id=1",
            [],
            |row| {
                Ok(NotificationSettings {
                    email_enabled: row.get::<_, i64>(0)? != 0,
                    telegram_enabled: row.get::<_, i64>(1)? != 0,
                    whatsapp_enabled: row.get::<_, i64>(2)? != 0,
                    telegram_chat_id: row.get(3)?,
                    whatsapp_number: row.get(4)?,
                    email_from: row.get(5)?,
                    created_at: row.get(6)?,
                    updated_at: row.get(7)?,
                })
            },
        ) {
            Ok(settings) => Ok(Some(settings)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(EjareError::database(format!("Get settings: {e}"))),
        }
    }

    /// Insert-with-id-1, update-on-conflict.
    pub fn upsert_settings(&self, settings: &NotificationSettings) -> Result<NotificationSettings> {
        self.conn
            .execute(
                "INSERT INTO notification_settings (id, email_enabled, telegram_enabled, \
                 whatsapp_enabled, telegram_chat_id, whatsapp_number, email_from, updated_at) \
                 VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, datetime('now')) \
                 ON CONFLICT(id) DO UPDATE SET \
                   email_enabled = excluded.email_enabled, \
                   telegram_enabled = excluded.telegram_enabled, \
                   whatsapp_enabled = excluded.whatsapp_enabled, \
                   telegram_chat_id = excluded.telegram_chat_id, \
                   whatsapp_number = excluded.whatsapp_number, \
                   email_from = excluded.email_from, \
                   updated_at = datetime('now')",
                params![
                    settings.email_enabled as i32,
                    settings.telegram_enabled as i32,
                    settings.whatsapp_enabled as i32,
                    settings.telegram_chat_id,
                    settings.whatsapp_number,
                    settings.email_from,
                ],
            )
            .map_err(|e| EjareError::database(format!("Upsert settings: {e}")))?;

        self.get_settings()?
            .ok_or_else(|| EjareError::database("Upsert settings: row missing after upsert"))
    }
}

fn contract_from_row(row: &Row<'_>) -> rusqlite::Result<Contract> {
    Ok(Contract {
        id: row.get(0)?,
        contract_number: row.get(1)?,
        access_code: row.get(2)?,
        tenant_name: row.get(3)?,
        tenant_email: row.get(4)?,
        tenant_phone: row.get(5)?,
        tenant_national_id: row.get(6)?,
        landlord_name: row.get(7)?,
        landlord_email: row.get(8)?,
        landlord_national_id: row.get(9)?,
        property_address: row.get(10)?,
        property_type: row.get(11)?,
        property_size: row.get(12)?,
        property_features: row.get(13)?,
        rent_amount: row.get(14)?,
        deposit: row.get(15)?,
        start_date: row.get(16)?,
        end_date: row.get(17)?,
        status: row.get(18)?,
        signature: row.get(19)?,
        national_id_image: row.get(20)?,
        notes: row.get(21)?,
        policies: row.get(22)?,
        created_at: row.get(23)?,
        signed_at: row.get(24)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_db() -> ContractStore {
        ContractStore::open(&PathBuf::from(":memory:")).unwrap()
    }

    fn sample(tenant: &str, rent: &str) -> NewContract {
        NewContract {
            tenant_name: tenant.into(),
            tenant_email: format!("{tenant}@example.com"),
            tenant_phone: None,
            tenant_national_id: None,
            landlord_name: "Landlord".into(),
            landlord_email: "landlord@example.com".into(),
            landlord_national_id: None,
            property_address: "Tehran, Valiasr St.".into(),
            property_type: Some("apartment".into()),
            property_size: None,
            property_features: None,
            rent_amount: rent.into(),
            deposit: None,
            start_date: "2026-01-01".into(),
            end_date: "2027-01-01".into(),
            notes: None,
            policies: None,
        }
    }

    fn insert(store: &ContractStore, number: &str, code: &str, tenant: &str, rent: &str) -> Contract {
        let id = uuid::Uuid::new_v4().to_string();
        store.insert_contract(&id, number, code, &sample(tenant, rent)).unwrap()
    }

    #[test]
    fn test_create_and_list_contracts() {
        let store = temp_db();
        let c = insert(&store, "RC-1001", "123456", "ali", "10000000");
        assert_eq!(c.status, STATUS_DRAFT);
        assert_eq!(c.contract_number, "RC-1001");
        assert_eq!(c.access_code, "123456");
        assert!(c.signature.is_none());
        assert!(c.signed_at.is_none());

        insert(&store, "RC-1002", "654321", "sara", "20000000");
        let all = store.list_contracts().unwrap();
        assert_eq!(all.len(), 2);
        // newest first
        assert_eq!(all[0].contract_number, "RC-1002");
    }

    #[test]
    fn test_tenant_credential_lookup() {
        let store = temp_db();
        insert(&store, "RC-2001", "111222", "ali", "5000000");

        assert!(store.find_tenant_credentials("RC-2001", "111222").unwrap().is_some());
        // wrong code
        assert!(store.find_tenant_credentials("RC-2001", "999999").unwrap().is_none());
        // wrong number
        assert!(store.find_tenant_credentials("RC-9999", "111222").unwrap().is_none());
    }

    #[test]
    fn test_terminated_contract_cannot_authenticate() {
        let store = temp_db();
        insert(&store, "RC-2002", "111222", "ali", "5000000");
        assert_eq!(store.terminate_contract("RC-2002").unwrap(), 1);
        assert!(store.find_tenant_credentials("RC-2002", "111222").unwrap().is_none());
    }

    #[test]
    fn test_sign_contract() {
        let store = temp_db();
        insert(&store, "RC-3001", "111222", "ali", "5000000");

        let affected = store.sign_contract("RC-3001", "sig-blob", Some("id-image")).unwrap();
        assert_eq!(affected, 1);

        let c = store.get_contract_by_number("RC-3001").unwrap().unwrap();
        assert_eq!(c.status, STATUS_SIGNED);
        assert_eq!(c.signature.as_deref(), Some("sig-blob"));
        assert_eq!(c.national_id_image.as_deref(), Some("id-image"));
        assert!(c.signed_at.is_some());
    }

    #[test]
    fn test_sign_twice_overwrites() {
        let store = temp_db();
        insert(&store, "RC-3002", "111222", "ali", "5000000");
        store.sign_contract("RC-3002", "first", None).unwrap();
        store.sign_contract("RC-3002", "second", Some("img")).unwrap();

        let c = store.get_contract_by_number("RC-3002").unwrap().unwrap();
        assert_eq!(c.signature.as_deref(), Some("second"));
        assert_eq!(c.national_id_image.as_deref(), Some("img"));
    }

    #[test]
    fn test_sign_unknown_number_affects_zero_rows() {
        let store = temp_db();
        assert_eq!(store.sign_contract("RC-0000", "sig", None).unwrap(), 0);
    }

    #[test]
    fn test_income_by_month() {
        let store = temp_db();
        insert(&store, "RC-4001", "111222", "ali", "10000000");
        insert(&store, "RC-4002", "111223", "sara", "20000000");
        insert(&store, "RC-4003", "111224", "reza", "40000000");
        store.sign_contract("RC-4001", "s", None).unwrap();
        store.sign_contract("RC-4002", "s", None).unwrap();
        // RC-4003 stays draft and must not count

        let rows = store.income_by_month().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].income, 30_000_000.0);
        assert_eq!(rows[0].contracts, 2);
        assert!(rows.len() <= 12);
    }

    #[test]
    fn test_income_empty_when_nothing_signed() {
        let store = temp_db();
        insert(&store, "RC-4004", "111222", "ali", "10000000");
        assert!(store.income_by_month().unwrap().is_empty());
    }

    #[test]
    fn test_status_counts() {
        let store = temp_db();
        insert(&store, "RC-5001", "111222", "ali", "1000");
        insert(&store, "RC-5002", "111223", "sara", "1000");
        insert(&store, "RC-5003", "111224", "reza", "1000");
        store.sign_contract("RC-5001", "s", None).unwrap();
        store.terminate_contract("RC-5002").unwrap();

        let rows = store.status_counts().unwrap();
        let statuses: Vec<&str> = rows.iter().map(|r| r.status.as_str()).collect();
        assert_eq!(statuses, vec![STATUS_DRAFT, STATUS_SIGNED, STATUS_TERMINATED]);
        assert!(rows.iter().all(|r| r.count == 1));
    }

    #[test]
    fn test_settings_absent_by_default() {
        let store = temp_db();
        assert!(store.get_settings().unwrap().is_none());
    }

    #[test]
    fn test_settings_upsert() {
        let store = temp_db();
        let saved = store
            .upsert_settings(&NotificationSettings {
                email_enabled: true,
                telegram_enabled: true,
                telegram_chat_id: Some("-100123".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(saved.email_enabled);
        assert!(saved.telegram_enabled);
        assert!(!saved.whatsapp_enabled);
        assert_eq!(saved.telegram_chat_id.as_deref(), Some("-100123"));

        // second upsert updates the same singleton row
        let saved = store
            .upsert_settings(&NotificationSettings {
                email_enabled: false,
                whatsapp_enabled: true,
                whatsapp_number: Some("+989120000000".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(!saved.email_enabled);
        assert!(saved.whatsapp_enabled);
        assert!(saved.telegram_chat_id.is_none());
    }

    #[test]
    fn test_user_crud() {
        let store = temp_db();
        let hash = "$2b$10$fake_hash_for_testing";
        let id = store.create_user("admin", hash).unwrap();

        let user = store.get_admin_by_username("admin").unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, "admin");
        assert_eq!(user.password_hash, hash);

        assert!(store.get_admin_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_contract_number_rejected() {
        let store = temp_db();
        insert(&store, "RC-6001", "111222", "ali", "1000");
        let id = uuid::Uuid::new_v4().to_string();
        assert!(
            store
                .insert_contract(&id, "RC-6001", "333444", &sample("sara", "1000"))
                .is_err()
        );
    }
}
