//! Callback query endpoints.

use crate::TelegramClient;
use ferry_core::Result;
use serde::Serialize;

/// Callback query endpoints
pub struct CallbacksApi<'a> {
    client: &'a TelegramClient,
}

#[derive(Serialize)]
struct AnswerCallbackRequest<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    show_alert: bool,
}

impl<'a> CallbacksApi<'a> {
    pub(crate) fn new(client: &'a TelegramClient) -> Self {
        Self { client }
    }

    /// Acknowledge a button press without showing anything
    pub async fn answer(&self, callback_id: &str) -> Result<()> {
        self.send(callback_id, None).await
    }

    /// Acknowledge a button press with a modal alert
    pub async fn alert(&self, callback_id: &str, text: &str) -> Result<()> {
        self.send(callback_id, Some(text)).await
    }

    async fn send(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        let request = AnswerCallbackRequest {
            callback_query_id: callback_id,
            text,
            show_alert: text.is_some(),
        };
        let _: bool = self
            .client
            .call_unthrottled("answerCallbackQuery", &request)
            .await?;
        Ok(())
    }
}
