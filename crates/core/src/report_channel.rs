use std::sync::Arc;

use tokio::sync::RwLock;

/// Process-wide destination for completed standup reports.
///
/// Cloning shares the same value. Unset until configured.
#[derive(Clone, Debug, Default)]
pub struct ReportChannel {
    channel_id: Arc<RwLock<Option<String>>>,
}

impl ReportChannel {
    pub fn new(initial: Option<String>) -> Self {
        Self { channel_id: Arc::new(RwLock::new(initial)) }
    }

    pub async fn get(&self) -> Option<String> {
        self.channel_id.read().await.clone()
    }

    /// Returns the previous destination.
    pub async fn set(&self, channel_id: impl Into<String>) -> Option<String> {
        self.channel_id.write().await.replace(channel_id.into())
    }

    pub async fn is_configured(&self) -> bool {
        self.channel_id.read().await.is_some()
    }
}
