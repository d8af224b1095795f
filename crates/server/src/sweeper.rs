use std::sync::Arc;
use std::time::Duration;

use standup_core::StandupDispatcher;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Starts the idle-interview sweeper, or returns `None` when eviction is off.
pub fn spawn(
    dispatcher: Arc<StandupDispatcher>,
    max_idle: Option<Duration>,
    every: Duration,
) -> Option<JoinHandle<()>> {
    let max_idle = max_idle?;
    info!(
        event_name = "system.sweeper.start",
        correlation_id = "bootstrap",
        max_idle_secs = max_idle.as_secs(),
        interval_secs = every.as_secs(),
        "idle interview sweeper started"
    );

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(&dispatcher, max_idle).await;
        }
    }))
}

pub async fn sweep_once(dispatcher: &StandupDispatcher, max_idle: Duration) -> usize {
    match dispatcher.evict_idle(max_idle).await {
        Ok(evicted) => evicted.len(),
        Err(error) => {
            warn!(
                event_name = "system.sweeper.failed",
                error_kind = error.kind(),
                error = %error,
                "idle interview sweep failed"
            );
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use standup_core::{
        InMemoryInterviewStore, InMemoryMessageSender, InboundMessage, ReportChannel,
        StandupDispatcher,
    };

    use crate::sweeper::{spawn, sweep_once};

    fn dispatcher() -> Arc<StandupDispatcher> {
        Arc::new(StandupDispatcher::new(
            Arc::new(InMemoryInterviewStore::new()),
            Arc::new(InMemoryMessageSender::new()),
            ReportChannel::default(),
        ))
    }

    #[tokio::test]
    async fn disabled_without_idle_timeout() {
        assert!(spawn(dispatcher(), None, Duration::from_secs(1)).is_none());
    }

    #[tokio::test]
    async fn sweep_keeps_fresh_interviews() {
        let dispatcher = dispatcher();
        dispatcher.handle(&InboundMessage::new("U1", "D1", "start"), "test").await.expect("start");

        assert_eq!(sweep_once(&dispatcher, Duration::from_secs(3600)).await, 0);
        assert_eq!(dispatcher.active_interviews().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn sweep_evicts_interviews_past_the_idle_limit() {
        let dispatcher = dispatcher();
        dispatcher.handle(&InboundMessage::new("U1", "D1", "start"), "test").await.expect("start");
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(sweep_once(&dispatcher, Duration::from_millis(1)).await, 1);
        assert_eq!(dispatcher.active_interviews().await.expect("count"), 0);
    }
}
