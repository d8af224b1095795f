use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub channel_id: String,
    pub text: String,
}

impl OutboundMessage {
    pub fn new(channel_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { channel_id: channel_id.into(), text: text.into() }
    }
}

/// What the chat provider acknowledged for a successful post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostReceipt {
    pub channel_id: Option<String>,
    pub message_ts: Option<String>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("message request failed: {0}")]
    Transport(String),
    #[error("message request timed out")]
    Timeout,
    #[error("message endpoint returned status {status}")]
    Status { status: u16 },
    #[error("message was rejected: {0}")]
    Rejected(String),
}

/// Outbound chat delivery.
///
/// Implementations log their own failures. Callers treat every send as
/// best-effort: no retries, and a failed send never undoes state changes.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, channel_id: &str, text: &str) -> Result<PostReceipt, DeliveryError>;
}

/// Records every post and optionally fails them all.
#[derive(Clone, Default)]
pub struct InMemoryMessageSender {
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    failure: Option<DeliveryError>,
}

impl InMemoryMessageSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send is still recorded, then answered with `error`.
    pub fn failing(error: DeliveryError) -> Self {
        Self { sent: Arc::default(), failure: Some(error) }
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn sent_to(&self, channel_id: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|message| message.channel_id == channel_id)
            .map(|message| message.text)
            .collect()
    }
}

#[async_trait]
impl MessageSender for InMemoryMessageSender {
    async fn send(&self, channel_id: &str, text: &str) -> Result<PostReceipt, DeliveryError> {
        let message = OutboundMessage::new(channel_id, text);
        match self.sent.lock() {
            Ok(mut sent) => sent.push(message),
            Err(poisoned) => poisoned.into_inner().push(message),
        }

        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(PostReceipt { channel_id: Some(channel_id.to_owned()), message_ts: None }),
        }
    }
}
