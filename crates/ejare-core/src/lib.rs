//! # Ejare Core
//!
//! Shared foundation for the rental-contract platform: the platform-wide
//! error type and the typed configuration read once from the process
//! environment and injected into the other crates.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{EjareError, Result};
