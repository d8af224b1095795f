use serde::{Deserialize, Serialize};

use crate::domain::interview::{Interview, UserId};
use crate::report::StandupReport;

/// Progress of one interview. Ordered; an interview only ever moves forward.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum InterviewState {
    Started,
    YesterdayAnswered,
    TodayAnswered,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Question {
    Yesterday,
    Today,
    Blockers,
}

impl Question {
    pub const ALL: [Question; 3] = [Question::Yesterday, Question::Today, Question::Blockers];

    pub fn text(self) -> &'static str {
        match self {
            Self::Yesterday => "What did you accomplish yesterday?",
            Self::Today => "What are you working on today?",
            Self::Blockers => "Is anything standing in your way?",
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::Yesterday => 1,
            Self::Today => 2,
            Self::Blockers => 3,
        }
    }

    pub fn answered_state(self) -> InterviewState {
        match self {
            Self::Yesterday => InterviewState::YesterdayAnswered,
            Self::Today => InterviewState::TodayAnswered,
            Self::Blockers => InterviewState::Finished,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewAction {
    NudgeToStart,
    Ask(Question),
    PublishReport(StandupReport),
    ConfirmCompletion,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreChange {
    Unchanged,
    Create(Interview),
    Update(Interview),
    Remove(UserId),
}

/// `None` on either side means the user has no stored interview.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: Option<InterviewState>,
    pub to: Option<InterviewState>,
    pub change: StoreChange,
    pub actions: Vec<InterviewAction>,
}
