//! WhatsApp sender over a Twilio-style messaging API (Basic auth).

use ejare_core::config::WhatsAppConfig;
use ejare_core::{EjareError, Result};

pub struct WhatsAppSender {
    config: WhatsAppConfig,
    client: reqwest::Client,
}

impl WhatsAppSender {
    pub fn new(config: WhatsAppConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Post a message. A destination must come from the settings row or the
    /// environment; without one the send is an error.
    pub async fn send(&self, to: Option<&str>, message: &str) -> Result<()> {
        let to = to
            .or(self.config.to_number.as_deref())
            .ok_or_else(|| EjareError::notify("WhatsApp destination number is not configured"))?;

        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );
        let form = [
            ("From", format!("whatsapp:{}", self.config.from_number)),
            ("To", format!("whatsapp:{to}")),
            ("Body", message.to_string()),
        ];

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| EjareError::notify(format!("WhatsApp send: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(EjareError::notify(format!("WhatsApp API {status}: {text}")));
        }
        Ok(())
    }
}
