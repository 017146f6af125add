//! Row types for the contracts, users, and settings tables.

use serde::{Deserialize, Serialize};

/// Contract lifecycle states.
pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_SIGNED: &str = "signed";
pub const STATUS_TERMINATED: &str = "terminated";

/// A lease contract. `contract_number` and `access_code` are set at creation
/// and never change; `signature`, `national_id_image`, and `signed_at` are
/// written only by the sign operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    pub contract_number: String,
    pub access_code: String,
    pub tenant_name: String,
    pub tenant_email: String,
    pub tenant_phone: Option<String>,
    pub tenant_national_id: Option<String>,
    pub landlord_name: String,
    pub landlord_email: String,
    pub landlord_national_id: Option<String>,
    pub property_address: String,
    pub property_type: Option<String>,
    pub property_size: Option<String>,
    pub property_features: Option<String>,
    /// Decimal-as-string; arithmetic happens only in aggregate SQL.
    pub rent_amount: String,
    pub deposit: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub signature: Option<String>,
    pub national_id_image: Option<String>,
    pub notes: Option<String>,
    pub policies: Option<String>,
    pub created_at: String,
    pub signed_at: Option<String>,
}

/// Fields supplied by the admin when creating a contract. The number, access
/// code, id, and status are generated server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContract {
    pub tenant_name: String,
    pub tenant_email: String,
    #[serde(default)]
    pub tenant_phone: Option<String>,
    #[serde(default)]
    pub tenant_national_id: Option<String>,
    pub landlord_name: String,
    pub landlord_email: String,
    #[serde(default)]
    pub landlord_national_id: Option<String>,
    pub property_address: String,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub property_size: Option<String>,
    #[serde(default)]
    pub property_features: Option<String>,
    pub rent_amount: String,
    #[serde(default)]
    pub deposit: Option<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub policies: Option<String>,
}

/// Admin user row. Created only via out-of-band seeding.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
}

/// Singleton notification-channel configuration (row id = 1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub email_enabled: bool,
    #[serde(default)]
    pub telegram_enabled: bool,
    #[serde(default)]
    pub whatsapp_enabled: bool,
    #[serde(default)]
    pub telegram_chat_id: Option<String>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(default)]
    pub email_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One month of signed-contract income.
#[derive(Debug, Clone, Serialize)]
pub struct IncomeRow {
    /// Month key in `YYYY-MM` form.
    pub month: String,
    pub income: f64,
    pub contracts: u32,
}

/// Contract count for one status code.
#[derive(Debug, Clone, Serialize)]
pub struct StatusRow {
    pub status: String,
    pub count: u32,
}
