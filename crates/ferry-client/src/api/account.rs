//! Bot account endpoints.

use crate::TelegramClient;
use ferry_core::{Result, User};

/// Bot account endpoints
pub struct AccountApi<'a> {
    client: &'a TelegramClient,
}

impl<'a> AccountApi<'a> {
    pub(crate) fn new(client: &'a TelegramClient) -> Self {
        Self { client }
    }

    /// Get the bot's own user record. Useful to validate the token.
    pub async fn me(&self) -> Result<User> {
        self.client
            .call_unthrottled("getMe", &serde_json::json!({}))
            .await
    }
}
