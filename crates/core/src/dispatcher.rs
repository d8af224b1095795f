use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::delivery::MessageSender;
use crate::domain::interview::UserId;
use crate::domain::message::InboundMessage;
use crate::errors::{ApplicationError, DomainError};
use crate::report::{CLOSING_CONFIRMATION, NUDGE_TEXT};
use crate::report_channel::ReportChannel;
use crate::standup::{InterviewAction, InterviewEngine, InterviewState, StoreChange};
use crate::store::{InterviewStore, StoreError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Nudged,
    Started,
    Advanced { state: InterviewState },
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchReport {
    pub outcome: DispatchOutcome,
    pub attempted_posts: usize,
    pub delivered_posts: usize,
}

/// Drives every user's standup interview from normalized chat messages.
///
/// Each transition (read, decide, write) runs behind one async mutex, so
/// concurrent events never interleave on the store. Posts go out after the
/// store change has been committed and the mutex released.
pub struct StandupDispatcher {
    store: Arc<dyn InterviewStore>,
    sender: Arc<dyn MessageSender>,
    report_channel: ReportChannel,
    engine: InterviewEngine,
    transition_gate: Mutex<()>,
}

impl StandupDispatcher {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        sender: Arc<dyn MessageSender>,
        report_channel: ReportChannel,
    ) -> Self {
        Self {
            store,
            sender,
            report_channel,
            engine: InterviewEngine::new(),
            transition_gate: Mutex::new(()),
        }
    }

    pub fn report_channel(&self) -> &ReportChannel {
        &self.report_channel
    }

    pub async fn handle(
        &self,
        message: &InboundMessage,
        correlation_id: &str,
    ) -> Result<DispatchReport, ApplicationError> {
        let outcome = {
            let _gate = self.transition_gate.lock().await;
            let current = self.store.get(&message.user_id).await?;
            let outcome =
                self.engine.apply(current, &message.user_id, &message.text, Utc::now())?;
            self.commit(&outcome.change).await?;
            outcome
        };

        info!(
            event_name = "standup.interview.transition_applied",
            correlation_id,
            user_id = %message.user_id,
            channel_id = %message.channel_id,
            from = ?outcome.from,
            to = ?outcome.to,
            "interview transition committed"
        );

        let dispatch_outcome = match (outcome.from, outcome.to) {
            (None, None) => DispatchOutcome::Nudged,
            (None, Some(_)) => DispatchOutcome::Started,
            (Some(_), Some(InterviewState::Finished)) => DispatchOutcome::Completed,
            (Some(_), Some(state)) => DispatchOutcome::Advanced { state },
            (Some(_), None) => {
                return Err(DomainError::InvariantViolation(
                    "transition left an interview without a state".to_owned(),
                )
                .into());
            }
        };

        let mut report =
            DispatchReport { outcome: dispatch_outcome, attempted_posts: 0, delivered_posts: 0 };
        for action in outcome.actions {
            let (destination, text) = self.render_action(action, message, correlation_id).await;
            report.attempted_posts += 1;
            if self.deliver(&destination, &text, correlation_id).await {
                report.delivered_posts += 1;
            }
        }

        Ok(report)
    }

    pub async fn active_interviews(&self) -> Result<usize, ApplicationError> {
        Ok(self.store.count().await?)
    }

    /// Drops interviews that have not advanced for `max_idle`.
    pub async fn evict_idle(&self, max_idle: Duration) -> Result<Vec<UserId>, ApplicationError> {
        let Ok(max_idle) = chrono::Duration::from_std(max_idle) else {
            return Ok(Vec::new());
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(max_idle) else {
            return Ok(Vec::new());
        };
        self.evict_idle_before(cutoff).await
    }

    pub async fn evict_idle_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<UserId>, ApplicationError> {
        let _gate = self.transition_gate.lock().await;
        let evicted = self.store.evict_idle(cutoff).await?;
        if !evicted.is_empty() {
            info!(
                event_name = "standup.interview.evicted",
                evicted = evicted.len(),
                cutoff = %cutoff.to_rfc3339(),
                "evicted idle interviews"
            );
        }
        Ok(evicted)
    }

    async fn commit(&self, change: &StoreChange) -> Result<(), StoreError> {
        match change {
            StoreChange::Unchanged => Ok(()),
            StoreChange::Create(interview) => self.store.create(interview.clone()).await,
            StoreChange::Update(interview) => self.store.update(interview.clone()).await,
            StoreChange::Remove(user_id) => self.store.delete(user_id).await.map(|_| ()),
        }
    }

    async fn render_action(
        &self,
        action: InterviewAction,
        message: &InboundMessage,
        correlation_id: &str,
    ) -> (String, String) {
        match action {
            InterviewAction::NudgeToStart => (message.channel_id.clone(), NUDGE_TEXT.to_owned()),
            InterviewAction::Ask(question) => {
                (message.channel_id.clone(), question.text().to_owned())
            }
            InterviewAction::PublishReport(report) => {
                let destination = match self.report_channel.get().await {
                    Some(channel_id) => channel_id,
                    None => {
                        warn!(
                            event_name = "standup.report.channel_unset",
                            correlation_id,
                            user_id = %message.user_id,
                            "report channel is not configured; posting without a destination"
                        );
                        String::new()
                    }
                };
                (destination, report.render())
            }
            InterviewAction::ConfirmCompletion => {
                (message.channel_id.clone(), CLOSING_CONFIRMATION.to_owned())
            }
        }
    }

    async fn deliver(&self, channel_id: &str, text: &str, correlation_id: &str) -> bool {
        match self.sender.send(channel_id, text).await {
            Ok(_) => true,
            Err(error) => {
                debug!(
                    event_name = "standup.delivery.dropped",
                    correlation_id,
                    channel_id,
                    error = %error,
                    "post failed; not retried"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;

    use super::{DispatchOutcome, StandupDispatcher};
    use crate::delivery::{DeliveryError, InMemoryMessageSender, OutboundMessage};
    use crate::domain::interview::{Interview, UserId};
    use crate::domain::message::InboundMessage;
    use crate::report::{CLOSING_CONFIRMATION, NUDGE_TEXT};
    use crate::report_channel::ReportChannel;
    use crate::standup::InterviewState;
    use crate::store::{InMemoryInterviewStore, InterviewStore};

    const REPORTS: &str = "C-REPORTS";

    struct Harness {
        dispatcher: StandupDispatcher,
        store: Arc<InMemoryInterviewStore>,
        sender: InMemoryMessageSender,
    }

    fn harness_with(sender: InMemoryMessageSender, report_channel: ReportChannel) -> Harness {
        let store = Arc::new(InMemoryInterviewStore::new());
        let dispatcher =
            StandupDispatcher::new(store.clone(), Arc::new(sender.clone()), report_channel);
        Harness { dispatcher, store, sender }
    }

    fn harness() -> Harness {
        harness_with(InMemoryMessageSender::new(), ReportChannel::new(Some(REPORTS.to_owned())))
    }

    async fn say(harness: &Harness, user: &str, channel: &str, text: &str) -> DispatchOutcome {
        harness
            .dispatcher
            .handle(&InboundMessage::new(user, channel, text), "test")
            .await
            .expect("dispatch")
            .outcome
    }

    async fn stored(harness: &Harness, user: &str) -> Option<Interview> {
        harness.store.get(&UserId::from(user)).await.expect("store get")
    }

    #[tokio::test]
    async fn non_trigger_text_without_interview_nudges_and_creates_nothing() {
        let harness = harness();

        for text in ["hello", "START", "", "report here"] {
            assert_eq!(say(&harness, "U1", "C1", text).await, DispatchOutcome::Nudged);
        }

        assert!(stored(&harness, "U1").await.is_none());
        assert_eq!(harness.sender.sent_to("C1"), vec![NUDGE_TEXT.to_owned(); 4]);
    }

    #[tokio::test]
    async fn start_creates_interview_and_posts_only_the_first_prompt() {
        let harness = harness();

        assert_eq!(say(&harness, "U1", "C1", "start").await, DispatchOutcome::Started);

        let interview = stored(&harness, "U1").await.expect("interview stored");
        assert_eq!(interview.state, InterviewState::Started);
        assert_eq!(
            harness.sender.sent(),
            vec![OutboundMessage::new("C1", "What did you accomplish yesterday?")]
        );
    }

    #[tokio::test]
    async fn full_interview_posts_prompts_report_and_confirmation() {
        let harness = harness();

        say(&harness, "U1", "C1", "start").await;
        assert_eq!(
            say(&harness, "U1", "C1", "Shipped the parser").await,
            DispatchOutcome::Advanced { state: InterviewState::YesterdayAnswered }
        );
        assert_eq!(
            say(&harness, "U1", "C1", "Fix tests").await,
            DispatchOutcome::Advanced { state: InterviewState::TodayAnswered }
        );
        assert_eq!(say(&harness, "U1", "C1", "Flaky CI").await, DispatchOutcome::Completed);

        assert_eq!(
            harness.sender.sent(),
            vec![
                OutboundMessage::new("C1", "What did you accomplish yesterday?"),
                OutboundMessage::new("C1", "What are you working on today?"),
                OutboundMessage::new("C1", "Is anything standing in your way?"),
                OutboundMessage::new(
                    REPORTS,
                    "<@U1>\n1. What did you accomplish yesterday?\nShipped the parser\n2. What are you working on today?\nFix tests\n3. Is anything standing in your way?\nFlaky CI"
                ),
                OutboundMessage::new("C1", CLOSING_CONFIRMATION),
            ]
        );
        assert!(stored(&harness, "U1").await.is_none());
    }

    #[tokio::test]
    async fn answers_are_stored_verbatim_one_step_at_a_time() {
        let harness = harness();
        say(&harness, "U1", "C1", "start").await;

        say(&harness, "U1", "C1", "  padded answer\n").await;
        let interview = stored(&harness, "U1").await.expect("interview");
        assert_eq!(interview.state, InterviewState::YesterdayAnswered);
        assert_eq!(interview.yesterday.as_deref(), Some("  padded answer\n"));
        assert!(interview.today.is_none());
    }

    #[tokio::test]
    async fn start_mid_interview_is_an_answer_not_a_reset() {
        let harness = harness();
        say(&harness, "U1", "C1", "start").await;
        say(&harness, "U1", "C1", "start").await;

        let interview = stored(&harness, "U1").await.expect("interview");
        assert_eq!(interview.state, InterviewState::YesterdayAnswered);
        assert_eq!(interview.yesterday.as_deref(), Some("start"));
    }

    #[tokio::test]
    async fn start_after_completion_behaves_like_first_start() {
        let harness = harness();
        for text in ["start", "a", "b", "c"] {
            say(&harness, "U1", "C1", text).await;
        }
        let before = harness.sender.sent().len();

        assert_eq!(say(&harness, "U1", "C1", "start").await, DispatchOutcome::Started);

        let after = harness.sender.sent();
        assert_eq!(after.len(), before + 1);
        assert_eq!(
            after.last(),
            Some(&OutboundMessage::new("C1", "What did you accomplish yesterday?"))
        );
        let interview = stored(&harness, "U1").await.expect("interview");
        assert_eq!(interview.state, InterviewState::Started);
        assert!(interview.yesterday.is_none());
    }

    #[tokio::test]
    async fn interleaved_users_do_not_share_answers() {
        let harness = harness();
        say(&harness, "U1", "C1", "start").await;
        say(&harness, "U2", "C2", "start").await;
        say(&harness, "U1", "C1", "u1 yesterday").await;
        say(&harness, "U2", "C2", "u2 yesterday").await;
        say(&harness, "U2", "C2", "u2 today").await;

        let first = stored(&harness, "U1").await.expect("U1");
        let second = stored(&harness, "U2").await.expect("U2");
        assert_eq!(first.yesterday.as_deref(), Some("u1 yesterday"));
        assert!(first.today.is_none());
        assert_eq!(second.yesterday.as_deref(), Some("u2 yesterday"));
        assert_eq!(second.today.as_deref(), Some("u2 today"));
        assert_eq!(second.state, InterviewState::TodayAnswered);
    }

    #[tokio::test]
    async fn failed_delivery_does_not_roll_back_transition() {
        let harness = harness_with(
            InMemoryMessageSender::failing(DeliveryError::Status { status: 500 }),
            ReportChannel::new(Some(REPORTS.to_owned())),
        );

        let report = harness
            .dispatcher
            .handle(&InboundMessage::new("U1", "C1", "start"), "test")
            .await
            .expect("dispatch does not surface delivery errors");

        assert_eq!(report.attempted_posts, 1);
        assert_eq!(report.delivered_posts, 0);
        assert!(stored(&harness, "U1").await.is_some());
        assert_eq!(harness.sender.sent().len(), 1, "no retry after failure");
    }

    #[tokio::test]
    async fn unset_report_channel_posts_report_to_empty_destination() {
        let harness = harness_with(InMemoryMessageSender::new(), ReportChannel::default());
        for text in ["start", "a", "b", "c"] {
            say(&harness, "U1", "C1", text).await;
        }

        let reports = harness.sender.sent_to("");
        assert_eq!(reports.len(), 1);
        assert!(reports[0].starts_with("<@U1>\n"));
    }

    #[tokio::test]
    async fn report_channel_changes_apply_to_next_report() {
        let harness = harness();
        for text in ["start", "a", "b"] {
            say(&harness, "U1", "C1", text).await;
        }
        harness.dispatcher.report_channel().set("C-NEW").await;
        say(&harness, "U1", "C1", "c").await;

        assert_eq!(harness.sender.sent_to("C-NEW").len(), 1);
        assert!(harness.sender.sent_to(REPORTS).is_empty());
    }

    #[tokio::test]
    async fn concurrent_messages_for_many_users_all_commit() {
        let harness = Arc::new(harness());
        let mut tasks = Vec::new();
        for index in 0..32 {
            let harness = harness.clone();
            tasks.push(tokio::spawn(async move {
                let user = format!("U{index}");
                let channel = format!("C{index}");
                for text in ["start", "y", "t"] {
                    harness
                        .dispatcher
                        .handle(&InboundMessage::new(&user, &channel, text), "test")
                        .await
                        .expect("dispatch");
                }
            }));
        }
        for task in tasks {
            task.await.expect("task");
        }

        assert_eq!(harness.dispatcher.active_interviews().await.expect("count"), 32);
        let interview = stored(&harness, "U17").await.expect("U17");
        assert_eq!(interview.state, InterviewState::TodayAnswered);
        assert_eq!(interview.today.as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn eviction_is_disabled_unless_requested_and_removes_idle_interviews() {
        let harness = harness();
        say(&harness, "U1", "C1", "start").await;

        let evicted =
            harness.dispatcher.evict_idle(Duration::from_secs(3600)).await.expect("evict");
        assert!(evicted.is_empty());

        let evicted = harness
            .dispatcher
            .evict_idle_before(Utc::now() + chrono::Duration::seconds(1))
            .await
            .expect("evict");
        assert_eq!(evicted, vec![UserId::from("U1")]);
        assert!(stored(&harness, "U1").await.is_none());
    }
}
