//! Environment configuration.
//!
//! All secrets and channel credentials are read here exactly once and passed
//! explicitly into the token service and the notification dispatcher.
//! Business logic never touches the process environment directly.

use std::env;
use std::path::PathBuf;

use crate::error::{EjareError, Result};

/// Full platform configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// JWT signing secret. Required; startup fails without it.
    pub jwt_secret: String,
    pub email: Option<EmailConfig>,
    pub telegram: Option<TelegramConfig>,
    pub whatsapp: Option<WhatsAppConfig>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

/// Transactional-email provider credentials.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

/// Telegram bot credentials.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// WhatsApp messaging-API account (Twilio-style, Basic auth).
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub to_number: Option<String>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| EjareError::config(format!("SERVER_PORT: {e}")))?;

        let db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "ejare.db".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| EjareError::config("JWT_SECRET must be set"))?;

        // Email sender is optional; the dispatcher degrades to a logged no-op.
        let email = match env::var("EMAIL_API_KEY") {
            Ok(api_key) => Some(EmailConfig {
                api_url: env::var("EMAIL_API_URL")
                    .unwrap_or_else(|_| "https://api.resend.com/emails".to_string()),
                api_key,
                from: env::var("EMAIL_FROM")
                    .map_err(|_| EjareError::config("EMAIL_FROM must be set when EMAIL_API_KEY is provided"))?,
            }),
            Err(_) => None,
        };

        let telegram = match (env::var("TELEGRAM_BOT_TOKEN"), env::var("TELEGRAM_CHAT_ID")) {
            (Ok(bot_token), Ok(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => None,
        };

        let whatsapp = match (
            env::var("WHATSAPP_ACCOUNT_SID"),
            env::var("WHATSAPP_AUTH_TOKEN"),
            env::var("WHATSAPP_FROM_NUMBER"),
        ) {
            (Ok(account_sid), Ok(auth_token), Ok(from_number)) => Some(WhatsAppConfig {
                account_sid,
                auth_token,
                from_number,
                to_number: env::var("WHATSAPP_TO_NUMBER").ok(),
            }),
            _ => None,
        };

        Ok(Config {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                path: PathBuf::from(db_path),
            },
            jwt_secret,
            email,
            telegram,
            whatsapp,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
