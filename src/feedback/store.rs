//! Feedback event storage.
//!
//! The engine never persists directly; it appends and reads through
//! [`FeedbackStore`]. [`InMemoryFeedbackStore`] keeps a bounded,
//! arrival-ordered history per subject.

use crate::error::Result;
use crate::types::{FeedbackEvent, SubjectId};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Storage capability for per-subject feedback history
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Append an event to its subject's history
    async fn append(&self, event: FeedbackEvent) -> Result<()>;

    /// Most recent `n` events for a subject, oldest first
    async fn recent_window(&self, subject_id: &SubjectId, n: usize) -> Result<Vec<FeedbackEvent>>;
}

/// In-process store with oldest-first eviction
///
/// Appends take the write lock, so they are serialized and a reader never
/// observes a partially appended event. Reads return an owned snapshot.
pub struct InMemoryFeedbackStore {
    retention: usize,
    histories: RwLock<HashMap<SubjectId, VecDeque<FeedbackEvent>>>,
}

impl InMemoryFeedbackStore {
    /// Create a store keeping at most `retention` events per subject
    pub fn new(retention: usize) -> Self {
        Self {
            retention: retention.max(1),
            histories: RwLock::new(HashMap::new()),
        }
    }

    /// Subjects with at least one recorded event
    pub async fn subjects(&self) -> Vec<SubjectId> {
        let histories = self.histories.read().await;
        let mut subjects: Vec<SubjectId> = histories.keys().cloned().collect();
        subjects.sort();
        subjects
    }

    /// Number of retained events for a subject
    pub async fn len(&self, subject_id: &SubjectId) -> usize {
        self.histories
            .read()
            .await
            .get(subject_id)
            .map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn append(&self, event: FeedbackEvent) -> Result<()> {
        event.validate()?;

        let mut histories = self.histories.write().await;
        let history = histories
            .entry(event.subject_id.clone())
            .or_insert_with(|| VecDeque::with_capacity(self.retention));

        history.push_back(event);
        while history.len() > self.retention {
            if let Some(evicted) = history.pop_front() {
                debug!(
                    "Evicted feedback {} for subject {}",
                    evicted.id, evicted.subject_id
                );
            }
        }

        Ok(())
    }

    async fn recent_window(&self, subject_id: &SubjectId, n: usize) -> Result<Vec<FeedbackEvent>> {
        let histories = self.histories.read().await;
        let window = histories
            .get(subject_id)
            .map(|history| {
                let skip = history.len().saturating_sub(n);
                history.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default();
        Ok(window)
    }
}
