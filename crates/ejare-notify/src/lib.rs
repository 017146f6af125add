//! # Ejare Notify
//!
//! Outbound notification dispatch: email, Telegram, and WhatsApp senders over
//! HTTP, each optional. The `send_*` methods propagate failures (used by the
//! interactive test action); the `best_effort_*` wrappers log and swallow
//! them (used inside contract workflows).

pub mod email;
pub mod telegram;
pub mod whatsapp;

use ejare_core::config::Config;
use ejare_core::{EjareError, Result};

use email::EmailSender;
use telegram::TelegramSender;
use whatsapp::WhatsAppSender;

/// Fire-and-forget entry point for all outbound channels.
pub struct Dispatcher {
    email: Option<EmailSender>,
    telegram: Option<TelegramSender>,
    whatsapp: Option<WhatsAppSender>,
}

impl Dispatcher {
    /// Build from injected configuration. One shared HTTP client.
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::new();
        Self {
            email: config
                .email
                .clone()
                .map(|c| EmailSender::new(c, client.clone())),
            telegram: config
                .telegram
                .clone()
                .map(|c| TelegramSender::new(c, client.clone())),
            whatsapp: config
                .whatsapp
                .clone()
                .map(|c| WhatsAppSender::new(c, client.clone())),
        }
    }

    /// Dispatcher with no channels configured. Every best-effort send is a
    /// logged no-op.
    pub fn disabled() -> Self {
        Self {
            email: None,
            telegram: None,
            whatsapp: None,
        }
    }

    // ── Propagating sends (interactive test action) ────────────────────────

    pub async fn send_email(&self, from: Option<&str>, to: &str, subject: &str, body: &str) -> Result<()> {
        match &self.email {
            Some(sender) => sender.send(from, to, subject, body).await,
            None => Err(EjareError::notify("Email sender is not configured")),
        }
    }

    pub async fn send_telegram(&self, chat_id: Option<&str>, message: &str) -> Result<()> {
        match &self.telegram {
            Some(sender) => sender.send(chat_id, message).await,
            None => Err(EjareError::notify("Telegram sender is not configured")),
        }
    }

    pub async fn send_whatsapp(&self, to: Option<&str>, message: &str) -> Result<()> {
        match &self.whatsapp {
            Some(sender) => sender.send(to, message).await,
            None => Err(EjareError::notify("WhatsApp sender is not configured")),
        }
    }

    // ── Best-effort sends (contract workflows) ────────────────────────

    /// Send an email; failures are logged, never surfaced.
    pub async fn best_effort_email(&self, from: Option<&str>, to: &str, subject: &str, body: &str) {
        match &self.email {
            None => tracing::debug!("email sender not configured, skipping message to {to}"),
            Some(sender) => {
                if let Err(e) = sender.send(from, to, subject, body).await {
                    tracing::warn!("best-effort email to {to} failed: {e}");
                }
            }
        }
    }

    /// Send a Telegram message; failures are logged, never surfaced.
    pub async fn best_effort_telegram(&self, chat_id: Option<&str>, message: &str) {
        match &self.telegram {
            None => tracing::debug!("telegram sender not configured, skipping message"),
            Some(sender) => {
                if let Err(e) = sender.send(chat_id, message).await {
                    tracing::warn!("best-effort telegram send failed: {e}");
                }
            }
        }
    }

    /// Send a WhatsApp message; failures are logged, never surfaced.
    pub async fn best_effort_whatsapp(&self, to: Option<&str>, message: &str) {
        match &self.whatsapp {
            None => tracing::debug!("whatsapp sender not configured, skipping message"),
            Some(sender) => {
                if let Err(e) = sender.send(to, message).await {
                    tracing::warn!("best-effort whatsapp send failed: {e}");
                }
            }
        }
    }
}
