//! # Ejare Gateway
//!
//! HTTP/JSON API for the rental-contract platform: login, contract CRUD and
//! signing, admin charts, notification settings, and the interactive
//! notification test action. All responses carry localized Persian strings.

pub mod auth;
pub mod error;
pub mod messages;
pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
