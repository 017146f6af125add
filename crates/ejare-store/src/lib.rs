//! # Ejare Store
//!
//! SQLite persistence for the rental-contract platform: the contracts table,
//! the admin users table, and the singleton notification-settings row.

pub mod models;
pub mod store;

pub use models::{AdminUser, Contract, IncomeRow, NewContract, NotificationSettings, StatusRow};
pub use store::ContractStore;
