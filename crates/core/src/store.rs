//! Storage for in-progress interviews.
//!
//! Only the in-memory implementation exists: interviews are lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::interview::{Interview, UserId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("an interview already exists for `{0}`")]
    AlreadyExists(UserId),
    #[error("no interview exists for `{0}`")]
    NotFound(UserId),
}

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn get(&self, user_id: &UserId) -> Result<Option<Interview>, StoreError>;
    async fn create(&self, interview: Interview) -> Result<(), StoreError>;
    async fn update(&self, interview: Interview) -> Result<(), StoreError>;
    async fn delete(&self, user_id: &UserId) -> Result<Option<Interview>, StoreError>;
    async fn count(&self) -> Result<usize, StoreError>;
    /// Removes every interview last touched before `cutoff`.
    async fn evict_idle(&self, cutoff: DateTime<Utc>) -> Result<Vec<UserId>, StoreError>;
}

#[derive(Default)]
pub struct InMemoryInterviewStore {
    interviews: RwLock<HashMap<UserId, Interview>>,
}

impl InMemoryInterviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InterviewStore for InMemoryInterviewStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<Interview>, StoreError> {
        let interviews = self.interviews.read().await;
        Ok(interviews.get(user_id).cloned())
    }

    async fn create(&self, interview: Interview) -> Result<(), StoreError> {
        let mut interviews = self.interviews.write().await;
        if interviews.contains_key(&interview.user_id) {
            return Err(StoreError::AlreadyExists(interview.user_id));
        }
        interviews.insert(interview.user_id.clone(), interview);
        Ok(())
    }

    async fn update(&self, interview: Interview) -> Result<(), StoreError> {
        let mut interviews = self.interviews.write().await;
        let Some(slot) = interviews.get_mut(&interview.user_id) else {
            return Err(StoreError::NotFound(interview.user_id));
        };
        *slot = interview;
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> Result<Option<Interview>, StoreError> {
        let mut interviews = self.interviews.write().await;
        Ok(interviews.remove(user_id))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.interviews.read().await.len())
    }

    async fn evict_idle(&self, cutoff: DateTime<Utc>) -> Result<Vec<UserId>, StoreError> {
        let mut interviews = self.interviews.write().await;
        let mut evicted = interviews
            .values()
            .filter(|interview| interview.updated_at < cutoff)
            .map(|interview| interview.user_id.clone())
            .collect::<Vec<_>>();
        evicted.sort();
        for user_id in &evicted {
            interviews.remove(user_id);
        }
        Ok(evicted)
    }
}
