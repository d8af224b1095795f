use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use standup_core::{DispatchReport, InboundMessage, StandupDispatcher};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const BOT_MESSAGE_SUBTYPE: &str = "bot_message";

/// Outer Events API payload. Every field defaults so a partial body still decodes.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EventsApiEnvelope {
    pub token: String,
    pub challenge: String,
    #[serde(rename = "type")]
    pub envelope_type: String,
    pub team_id: String,
    pub api_app_id: String,
    pub event: Value,
    pub authed_teams: Vec<String>,
    pub event_id: String,
    pub event_time: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessageEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub subtype: String,
    pub bot_id: String,
    pub channel: String,
    pub user: String,
    pub text: String,
    pub ts: String,
    pub event_ts: String,
    pub channel_type: String,
}

impl MessageEvent {
    pub fn is_bot_authored(&self) -> bool {
        self.subtype == BOT_MESSAGE_SUBTYPE
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SlackRequest {
    UrlVerification { challenge: String },
    EventCallback { correlation_id: String, event: Value },
    Unsupported { request_type: String },
}

/// Classifies an Events API body. An undecodable body is logged and treated
/// as an empty envelope, which classifies as unsupported.
pub fn parse_request(body: &[u8]) -> SlackRequest {
    let envelope = match serde_json::from_slice::<EventsApiEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(error) => {
            error!(
                event_name = "ingress.slack.decode_failed",
                error = %error,
                "failed to decode a slack events payload"
            );
            EventsApiEnvelope::default()
        }
    };

    match envelope.envelope_type.as_str() {
        "url_verification" => SlackRequest::UrlVerification { challenge: envelope.challenge },
        "event_callback" => SlackRequest::EventCallback {
            correlation_id: correlation_id(&envelope.event_id),
            event: envelope.event,
        },
        _ => SlackRequest::Unsupported { request_type: envelope.envelope_type },
    }
}

fn correlation_id(event_id: &str) -> String {
    if event_id.trim().is_empty() {
        format!("evt-{}", Uuid::new_v4().simple())
    } else {
        event_id.to_owned()
    }
}

/// Reduces a raw message event to `(user, channel, text)`.
///
/// Bot-authored events yield `None` so the bot never answers itself. A decode
/// failure is logged and yields the zero-valued message.
pub fn normalize_event(raw: &Value, correlation_id: &str) -> Option<InboundMessage> {
    let message = match MessageEvent::deserialize(raw) {
        Ok(message) => message,
        Err(error) => {
            error!(
                event_name = "ingress.slack.event_decode_failed",
                correlation_id,
                error = %error,
                event = %raw,
                "failed to unmarshal event"
            );
            MessageEvent::default()
        }
    };

    if message.is_bot_authored() {
        debug!(
            event_name = "ingress.slack.bot_message_ignored",
            correlation_id,
            bot_id = %message.bot_id,
            "ignoring bot-authored message"
        );
        return None;
    }

    Some(InboundMessage::new(message.user, message.channel, message.text))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    Challenge(String),
    Dispatched(DispatchReport),
    Ignored,
}

/// Entry point for `POST /slack-events` bodies.
///
/// Never fails: dispatch errors are logged and the event is acknowledged
/// anyway, since Slack would otherwise redeliver it.
pub struct EventsApiHandler {
    dispatcher: Arc<StandupDispatcher>,
}

impl EventsApiHandler {
    pub fn new(dispatcher: Arc<StandupDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn handle(&self, body: &[u8]) -> HandlerResult {
        let (correlation_id, event) = match parse_request(body) {
            SlackRequest::UrlVerification { challenge } => {
                info!(event_name = "ingress.slack.url_verification", "answering url verification");
                return HandlerResult::Challenge(challenge);
            }
            SlackRequest::Unsupported { request_type } => {
                debug!(
                    event_name = "ingress.slack.unsupported",
                    request_type = %request_type,
                    "ignoring unsupported slack request"
                );
                return HandlerResult::Ignored;
            }
            SlackRequest::EventCallback { correlation_id, event } => (correlation_id, event),
        };

        let Some(message) = normalize_event(&event, &correlation_id) else {
            return HandlerResult::Ignored;
        };

        info!(
            event_name = "ingress.slack.message_received",
            correlation_id = %correlation_id,
            user_id = %message.user_id,
            channel_id = %message.channel_id,
            "received slack message"
        );

        match self.dispatcher.handle(&message, &correlation_id).await {
            Ok(report) => HandlerResult::Dispatched(report),
            Err(error) => {
                warn!(
                    event_name = "ingress.slack.dispatch_failed",
                    correlation_id = %correlation_id,
                    user_id = %message.user_id,
                    error_kind = error.kind(),
                    error = %error,
                    "standup dispatch failed; event acknowledged"
                );
                HandlerResult::Ignored
            }
        }
    }
}
