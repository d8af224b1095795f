use serde::{Deserialize, Serialize};

use crate::domain::interview::UserId;

/// A chat message reduced to what the standup flow needs.
///
/// `Default` is the zero-valued message used when an inbound event cannot be
/// decoded: empty user, empty channel, empty text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub user_id: UserId,
    pub channel_id: String,
    pub text: String,
}

impl InboundMessage {
    pub fn new(
        user_id: impl Into<String>,
        channel_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self { user_id: UserId(user_id.into()), channel_id: channel_id.into(), text: text.into() }
    }
}
