//! Telegram bot sender.

use ejare_core::config::TelegramConfig;
use ejare_core::{EjareError, Result};

pub struct TelegramSender {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramSender {
    pub fn new(config: TelegramConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Post a message via the bot API. The admin-configured chat id from the
    /// settings row overrides the environment default.
    pub async fn send(&self, chat_id: Option<&str>, message: &str) -> Result<()> {
        let chat_id = chat_id.unwrap_or(&self.config.chat_id);
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.config.bot_token);
        let payload = serde_json::json!({"chat_id": chat_id, "text": message});

        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| EjareError::notify(format!("Telegram send: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(EjareError::notify(format!("Telegram API {status}: {text}")));
        }
        Ok(())
    }
}
