//! Transactional-email sender (Resend-style HTTP API).

use ejare_core::config::EmailConfig;
use ejare_core::{EjareError, Result};

pub struct EmailSender {
    config: EmailConfig,
    client: reqwest::Client,
}

impl EmailSender {
    pub fn new(config: EmailConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Post one message to the provider. `from` falls back to the configured
    /// sender address when no override is given.
    pub async fn send(&self, from: Option<&str>, to: &str, subject: &str, body: &str) -> Result<()> {
        let payload = serde_json::json!({
            "from": from.unwrap_or(&self.config.from),
            "to": [to],
            "subject": subject,
            "html": body,
        });

        let resp = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| EjareError::notify(format!("Email send: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(EjareError::notify(format!("Email provider {status}: {text}")));
        }
        Ok(())
    }
}
