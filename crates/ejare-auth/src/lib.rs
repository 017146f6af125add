//! # Ejare Auth
//!
//! JWT token service for the two platform roles (admin, tenant) plus
//! bcrypt password hashing. The signing secret is injected at construction;
//! nothing here reads the environment.

use chrono::Utc;
use ejare_core::{EjareError, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TENANT: &str = "tenant";

/// Sessions expire 24 hours after issuance; there is no refresh.
const TOKEN_TTL_HOURS: i64 = 24;

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub role: String,
    /// Set for admin tokens only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Set for tenant tokens only; references the contract the tenant may act on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    pub fn is_tenant(&self) -> bool {
        self.role == ROLE_TENANT
    }
}

/// Issues and verifies signed, time-limited tokens.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
}

impl TokenService {
    /// Build the service from an injected signing secret.
    /// An empty secret is a configuration error.
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(EjareError::config("JWT signing secret is not configured"));
        }
        Ok(Self { secret })
    }

    /// Issue an admin token bound to a user id.
    pub fn issue_admin(&self, user_id: &str) -> Result<String> {
        self.issue(ROLE_ADMIN, Some(user_id.to_string()), None)
    }

    /// Issue a tenant token scoped to a single contract.
    pub fn issue_tenant(&self, contract_id: &str) -> Result<String> {
        self.issue(ROLE_TENANT, None, Some(contract_id.to_string()))
    }

    fn issue(&self, role: &str, user_id: Option<String>, contract_id: Option<String>) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            role: role.to_string(),
            user_id,
            contract_id,
            iat: now.timestamp() as usize,
            exp: (now + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
        };

        encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .map_err(|e| EjareError::Auth(format!("Token creation failed: {e}")))
    }

    /// Validate and decode a token. Bad signature and expiry collapse into
    /// the single invalid-token error.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &DecodingKey::from_secret(self.secret.as_bytes()), &validation)
            .map(|data| data.claims)
            .map_err(|_| EjareError::InvalidToken)
    }
}

/// Hash a password using bcrypt (cost 10).
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, 10).map_err(|e| EjareError::Auth(format!("Hash error: {e}")))
}

/// Verify a password against a bcrypt hash. Malformed hashes verify false.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
