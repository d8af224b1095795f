use thiserror::Error;

use crate::domain::interview::UserId;
use crate::standup::states::{InterviewState, Question};
use crate::store::StoreError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("interview for `{user_id}` is already finished")]
    InterviewAlreadyFinished { user_id: UserId },
    #[error("interview for `{user_id}` is not finished (state {state:?})")]
    InterviewIncomplete { user_id: UserId, state: InterviewState },
    #[error("finished interview has no answer for {question:?}")]
    MissingAnswer { question: Question },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApplicationError {
    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain",
            Self::Store(_) => "store",
        }
    }
}
