pub mod engine;
pub mod states;

pub use engine::{InterviewEngine, TRIGGER_TEXT};
pub use states::{InterviewAction, InterviewState, Question, StoreChange, TransitionOutcome};
