//! Standup interview core: the per-user state machine, its store, and the
//! dispatcher that turns normalized chat messages into posts.
//!
//! ```text
//! InboundMessage → StandupDispatcher → InterviewEngine (pure transition)
//!                        ↓                    ↓
//!                  InterviewStore        MessageSender (prompts, report)
//! ```

pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod report;
pub mod report_channel;
pub mod standup;
pub mod store;

pub use delivery::{
    DeliveryError, InMemoryMessageSender, MessageSender, OutboundMessage, PostReceipt,
};
pub use dispatcher::{DispatchOutcome, DispatchReport, StandupDispatcher};
pub use domain::interview::{Interview, UserId};
pub use domain::message::InboundMessage;
pub use errors::{ApplicationError, DomainError};
pub use report::StandupReport;
pub use report_channel::ReportChannel;
pub use standup::{InterviewEngine, InterviewState, Question};
pub use store::{InMemoryInterviewStore, InterviewStore, StoreError};
