//! Outbound Slack Web API client.
//!
//! Only `chat.postMessage` is used. Failures are logged here and returned to
//! the caller, which treats them as best-effort.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use standup_core::config::SlackConfig;
use standup_core::{DeliveryError, MessageSender, PostReceipt};
use thiserror::Error;
use tracing::{debug, warn};

pub const POST_MESSAGE_METHOD: &str = "chat.postMessage";

#[derive(Debug, Error)]
#[error("failed to build slack http client: {0}")]
pub struct ClientBuildError(#[from] reqwest::Error);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PostMessageRequest<'a> {
    pub channel: &'a str,
    pub text: &'a str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PostMessageResponse {
    pub ok: bool,
    pub error: Option<String>,
    pub channel: Option<String>,
    pub ts: Option<String>,
}

#[derive(Clone)]
pub struct SlackWebClient {
    http: reqwest::Client,
    bot_token: SecretString,
    post_message_url: String,
}

impl SlackWebClient {
    pub fn new(
        bot_token: SecretString,
        api_base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ClientBuildError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let post_message_url =
            format!("{}/{POST_MESSAGE_METHOD}", api_base_url.trim_end_matches('/'));
        Ok(Self { http, bot_token, post_message_url })
    }

    pub fn from_config(config: &SlackConfig) -> Result<Self, ClientBuildError> {
        Self::new(config.bot_token.clone(), &config.api_base_url, config.post_timeout())
    }

    pub fn post_message_url(&self) -> &str {
        &self.post_message_url
    }
}

#[async_trait]
impl MessageSender for SlackWebClient {
    async fn send(&self, channel_id: &str, text: &str) -> Result<PostReceipt, DeliveryError> {
        let response = self
            .http
            .post(&self.post_message_url)
            .bearer_auth(self.bot_token.expose_secret())
            .json(&PostMessageRequest { channel: channel_id, text })
            .send()
            .await
            .map_err(|error| {
                let mapped = if error.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Transport(error.to_string())
                };
                warn!(
                    event_name = "egress.slack.post_failed",
                    channel_id,
                    error = %mapped,
                    "failed to post slack message"
                );
                mapped
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(event_name = "egress.slack.error_body", channel_id, body = %body);
            warn!(
                event_name = "egress.slack.post_failed",
                channel_id,
                status = status.as_u16(),
                "slack returned a non-success status"
            );
            return Err(DeliveryError::Status { status: status.as_u16() });
        }

        let payload = match response.json::<PostMessageResponse>().await {
            Ok(payload) => payload,
            Err(error) => {
                let mapped = if error.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Transport(error.to_string())
                };
                warn!(
                    event_name = "egress.slack.post_failed",
                    channel_id,
                    error = %mapped,
                    "failed to read slack response"
                );
                return Err(mapped);
            }
        };

        if !payload.ok {
            let reason = payload.error.unwrap_or_else(|| "unknown_error".to_owned());
            warn!(
                event_name = "egress.slack.post_rejected",
                channel_id,
                reason = %reason,
                "slack rejected the message"
            );
            return Err(DeliveryError::Rejected(reason));
        }

        debug!(
            event_name = "egress.slack.posted",
            channel_id,
            ts = payload.ts.as_deref().unwrap_or(""),
            "slack message posted"
        );
        Ok(PostReceipt { channel_id: payload.channel, message_ts: payload.ts })
    }
}
