use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::report::StandupReport;
use crate::standup::states::{InterviewState, Question};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// One user's in-progress standup.
///
/// Answers are filled strictly in question order; `state` names the last
/// answered step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub user_id: UserId,
    pub state: InterviewState,
    pub yesterday: Option<String>,
    pub today: Option<String>,
    pub blockers: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Interview {
    pub fn begin(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            state: InterviewState::Started,
            yesterday: None,
            today: None,
            blockers: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// The question the next answer belongs to.
    pub fn pending_question(&self) -> Option<Question> {
        match self.state {
            InterviewState::Started => Some(Question::Yesterday),
            InterviewState::YesterdayAnswered => Some(Question::Today),
            InterviewState::TodayAnswered => Some(Question::Blockers),
            InterviewState::Finished => None,
        }
    }

    /// Stores `text` verbatim as the answer to the pending question and
    /// advances one step.
    pub fn record_answer(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<InterviewState, DomainError> {
        let question = self.pending_question().ok_or_else(|| {
            DomainError::InterviewAlreadyFinished { user_id: self.user_id.clone() }
        })?;

        let slot = match question {
            Question::Yesterday => &mut self.yesterday,
            Question::Today => &mut self.today,
            Question::Blockers => &mut self.blockers,
        };
        *slot = Some(text.to_owned());

        self.state = question.answered_state();
        self.updated_at = now;
        Ok(self.state)
    }

    pub fn is_finished(&self) -> bool {
        self.state == InterviewState::Finished
    }

    pub fn into_report(self) -> Result<StandupReport, DomainError> {
        if !self.is_finished() {
            return Err(DomainError::InterviewIncomplete {
                user_id: self.user_id,
                state: self.state,
            });
        }

        let missing = |question| DomainError::MissingAnswer { question };
        Ok(StandupReport {
            yesterday: self.yesterday.ok_or_else(|| missing(Question::Yesterday))?,
            today: self.today.ok_or_else(|| missing(Question::Today))?,
            blockers: self.blockers.ok_or_else(|| missing(Question::Blockers))?,
            user_id: self.user_id,
        })
    }
}
