//! Main Bot API client implementation.

use crate::api::*;
use crate::config::RetryConfig;
use ferry_core::{ApiResponse, FerryError, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// The Bot API base URL
const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Default request timeout. Must exceed the long-poll timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Outbound messages per second the platform tolerates from one bot
const DEFAULT_MESSAGES_PER_SECOND: u32 = 30;

/// How a failed call may be repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    /// Puts a message in a chat; a timed-out attempt may already have landed
    Delivery,
    /// Reads, or acknowledgements that are harmless to repeat
    Query,
}

impl CallKind {
    const fn may_resend(self, err: &FerryError) -> bool {
        match self {
            Self::Delivery => err.is_rejected(),
            Self::Query => true,
        }
    }
}

/// Main Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    token: String,
    base_url: String,
    timeout: Duration,
    retry_config: RetryConfig,
    limiter: DefaultDirectRateLimiter,
}

impl TelegramClient {
    /// Create a new client with the given bot token using default settings
    pub fn new(token: impl Into<String>) -> Result<Self> {
        TelegramClientBuilder::new(token).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(token: impl Into<String>) -> TelegramClientBuilder {
        TelegramClientBuilder::new(token)
    }

    /// Access message endpoints
    #[must_use]
    pub fn messages(&self) -> MessagesApi<'_> {
        MessagesApi::new(self)
    }

    /// Access callback query endpoints
    #[must_use]
    pub fn callbacks(&self) -> CallbacksApi<'_> {
        CallbacksApi::new(self)
    }

    /// Access update endpoints
    #[must_use]
    pub fn updates(&self) -> UpdatesApi<'_> {
        UpdatesApi::new(self)
    }

    /// Access bot account endpoints
    #[must_use]
    pub fn account(&self) -> AccountApi<'_> {
        AccountApi::new(self)
    }

    /// Call a method that sends something to a chat. Throttled, and only
    /// resent when the server rejected the previous attempt.
    pub(crate) async fn call<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T> {
        self.with_retry(method, body, CallKind::Delivery).await
    }

    /// Call a method that is not subject to the send limit and may be repeated
    pub(crate) async fn call_unthrottled<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T> {
        self.with_retry(method, body, CallKind::Query).await
    }

    async fn with_retry<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
        kind: CallKind,
    ) -> Result<T> {
        let retry = &self.inner.retry_config;
        let mut attempt = 0;

        loop {
            if kind == CallKind::Delivery {
                self.inner.limiter.until_ready().await;
            }

            match self.post(method, body).await {
                Err(err)
                    if attempt < retry.max_retries
                        && retry.should_retry(&err)
                        && kind.may_resend(&err) =>
                {
                    let delay = retry.delay_for(&err, attempt);
                    warn!(method, attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Perform one POST request with a JSON body
    async fn post<T: DeserializeOwned, B: Serialize>(&self, method: &str, body: &B) -> Result<T> {
        let url = self.method_url(method);
        debug!(method, "POST request");

        let response = self
            .inner
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response(method, response).await
    }

    /// Build the method URL. The token is part of the path, so never log it.
    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.inner.base_url, self.inner.token, method)
    }

    fn transport_error(&self, err: reqwest::Error) -> FerryError {
        if err.is_timeout() {
            FerryError::Timeout(self.inner.timeout)
        } else {
            // reqwest includes the URL in its message; strip it to keep the token out of logs.
            FerryError::Http(err.without_url().to_string())
        }
    }

    /// Decode the response envelope
    async fn handle_response<T: DeserializeOwned>(
        &self,
        method: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !(200..300).contains(&status) => {
                return Err(map_error(status, body, None));
            }
            Err(e) => return Err(FerryError::Json(e)),
        };

        if envelope.ok {
            return envelope.result.ok_or_else(|| {
                FerryError::Internal(format!("{method} returned ok without a result"))
            });
        }

        let code = envelope.error_code.unwrap_or(status);
        let retry_after = envelope.parameters.and_then(|p| p.retry_after);
        Err(map_error(
            code,
            envelope.description.unwrap_or_default(),
            retry_after,
        ))
    }
}

/// Convert an error response to a [`FerryError`]
fn map_error(code: u16, description: String, retry_after: Option<u64>) -> FerryError {
    match code {
        401 => FerryError::Unauthorized,
        403 if description.to_lowercase().contains("blocked") => FerryError::BlockedByRecipient,
        404 => FerryError::NotFound {
            resource: description,
        },
        429 => {
            warn!(?retry_after, "rate limited by the Bot API");
            FerryError::RateLimited { retry_after }
        }
        _ => FerryError::Api {
            code,
            message: description,
        },
    }
}

/// Builder for configuring a [`TelegramClient`]
pub struct TelegramClientBuilder {
    token: String,
    base_url: String,
    timeout: Duration,
    user_agent: String,
    retry_config: RetryConfig,
    messages_per_second: u32,
}

impl TelegramClientBuilder {
    /// Create a new builder with the given bot token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("ferry/{}", env!("CARGO_PKG_VERSION")),
            retry_config: RetryConfig::default(),
            messages_per_second: DEFAULT_MESSAGES_PER_SECOND,
        }
    }

    /// Set the base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set retry configuration
    #[must_use]
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Set the outbound send rate
    #[must_use]
    pub fn messages_per_second(mut self, rate: u32) -> Self {
        self.messages_per_second = rate;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<TelegramClient> {
        if self.token.trim().is_empty() {
            return Err(FerryError::Config("bot token is empty".into()));
        }

        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| FerryError::Config(format!("failed to build HTTP client: {e}")))?;

        let rate = NonZeroU32::new(self.messages_per_second).unwrap_or(NonZeroU32::MIN);

        Ok(TelegramClient {
            inner: Arc::new(ClientInner {
                http,
                token: self.token,
                base_url: self.base_url,
                timeout: self.timeout,
                retry_config: self.retry_config,
                limiter: RateLimiter::direct(Quota::per_second(rate)),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_error_codes() {
        assert!(matches!(
            map_error(401, "Unauthorized".into(), None),
            FerryError::Unauthorized
        ));
        assert!(map_error(403, "Forbidden: bot was blocked by the user".into(), None)
            .is_blocked_by_recipient());
        assert!(matches!(
            map_error(403, "Forbidden: bot can't initiate conversation".into(), None),
            FerryError::Api { code: 403, .. }
        ));
        assert!(matches!(
            map_error(429, String::new(), Some(7)),
            FerryError::RateLimited {
                retry_after: Some(7)
            }
        ));
        assert!(matches!(
            map_error(400, "Bad Request: message to copy not found".into(), None),
            FerryError::Api { code: 400, .. }
        ));
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(
            TelegramClient::new("  "),
            Err(FerryError::Config(_))
        ));
    }

    #[test]
    fn test_method_url_trims_base() {
        let client = TelegramClient::builder("123:abc")
            .base_url("http://localhost:8081/")
            .build()
            .unwrap();
        assert_eq!(
            client.method_url("getMe"),
            "http://localhost:8081/bot123:abc/getMe"
        );
    }
}
