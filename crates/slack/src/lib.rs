//! Slack integration for the standup bot.
//!
//! - **Events** (`events`) - Events API envelopes, bot filtering, message normalization
//! - **Commands** (`commands`) - the `report here` slash command
//! - **Client** (`client`) - `chat.postMessage` delivery
//!
//! # Architecture
//!
//! ```text
//! POST /slack-events → parse_request → normalize_event → StandupDispatcher
//!                                                             ↓
//!                                      SlackWebClient ← prompts / report
//! ```
//!
//! # Key Types
//!
//! - `EventsApiHandler` - Answers URL verification and feeds message events to the dispatcher
//! - `CommandRouter` - Applies slash commands to the report channel
//! - `SlackWebClient` - `MessageSender` backed by the Slack Web API

pub mod client;
pub mod commands;
pub mod events;
