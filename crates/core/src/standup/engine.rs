use chrono::{DateTime, Utc};

use crate::domain::interview::{Interview, UserId};
use crate::errors::DomainError;
use crate::standup::states::{
    InterviewAction, InterviewState, Question, StoreChange, TransitionOutcome,
};

/// Exact text that opens an interview for a user who has none.
pub const TRIGGER_TEXT: &str = "start";

/// Pure transition function for the standup interview.
///
/// The engine never touches storage or the network: it reads the user's
/// current interview (if any) and returns the store change plus the posts to
/// emit. Callers apply the change first and deliver afterwards.
#[derive(Clone, Debug, Default)]
pub struct InterviewEngine;

impl InterviewEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(
        &self,
        current: Option<Interview>,
        user_id: &UserId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, DomainError> {
        let Some(mut interview) = current else {
            return Ok(open_or_nudge(user_id, text, now));
        };

        // Any text counts as an answer once an interview exists, `start` included.
        let from = interview.state;
        let to = interview.record_answer(text, now)?;

        if to == InterviewState::Finished {
            let user_id = interview.user_id.clone();
            let report = interview.into_report()?;
            return Ok(TransitionOutcome {
                from: Some(from),
                to: Some(to),
                change: StoreChange::Remove(user_id),
                actions: vec![
                    InterviewAction::PublishReport(report),
                    InterviewAction::ConfirmCompletion,
                ],
            });
        }

        let next = interview.pending_question().ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "interview for `{}` in {to:?} has no pending question",
                interview.user_id
            ))
        })?;

        Ok(TransitionOutcome {
            from: Some(from),
            to: Some(to),
            change: StoreChange::Update(interview),
            actions: vec![InterviewAction::Ask(next)],
        })
    }
}

fn open_or_nudge(user_id: &UserId, text: &str, now: DateTime<Utc>) -> TransitionOutcome {
    if text != TRIGGER_TEXT {
        return TransitionOutcome {
            from: None,
            to: None,
            change: StoreChange::Unchanged,
            actions: vec![InterviewAction::NudgeToStart],
        };
    }

    TransitionOutcome {
        from: None,
        to: Some(InterviewState::Started),
        change: StoreChange::Create(Interview::begin(user_id.clone(), now)),
        actions: vec![InterviewAction::Ask(Question::Yesterday)],
    }
}
