use serde::{Deserialize, Serialize};

use crate::domain::interview::UserId;
use crate::standup::states::Question;

pub const NUDGE_TEXT: &str = "Type `start` when you're ready";
pub const CLOSING_CONFIRMATION: &str = "Well done! If you want to start again, just type `start`";

/// A completed standup, ready to be posted to the report channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandupReport {
    pub user_id: UserId,
    pub yesterday: String,
    pub today: String,
    pub blockers: String,
}

impl StandupReport {
    pub fn answer(&self, question: Question) -> &str {
        match question {
            Question::Yesterday => &self.yesterday,
            Question::Today => &self.today,
            Question::Blockers => &self.blockers,
        }
    }

    /// Mentions the user, then each numbered question followed by its answer
    /// on the next line. No trailing newline.
    pub fn render(&self) -> String {
        let mut text = format!("<@{}>", self.user_id);
        for question in Question::ALL {
            text.push_str(&format!(
                "\n{}. {}\n{}",
                question.number(),
                question.text(),
                self.answer(question)
            ));
        }
        text
    }
}
