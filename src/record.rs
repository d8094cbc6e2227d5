//! Optional remote bookkeeping of sessions. Failures here never affect the
//! live session.

use crate::store::ConversationDialog;
use apika_types::TokenUsage;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SessionRecordUpdate {
    pub usage: Option<TokenUsage>,
    pub dialogs: Vec<ConversationDialog>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionRecorder: Send + Sync {
    /// Creates the record for a new session and returns its id.
    async fn create_record(&self, model: &str) -> anyhow::Result<String>;

    async fn update_record(&self, record_id: &str, update: SessionRecordUpdate)
    -> anyhow::Result<()>;
}

/// Keeps no records.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

#[async_trait]
impl SessionRecorder for NoopRecorder {
    async fn create_record(&self, _model: &str) -> anyhow::Result<String> {
        Ok(String::new())
    }

    async fn update_record(
        &self,
        _record_id: &str,
        _update: SessionRecordUpdate,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

pub(crate) async fn create_best_effort(recorder: &dyn SessionRecorder, model: &str) -> Option<String> {
    match recorder.create_record(model).await {
        Ok(id) if !id.is_empty() => Some(id),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("failed to create session record: {}", e);
            None
        }
    }
}

/// Fires an update without waiting for it.
pub(crate) fn spawn_update(
    recorder: Arc<dyn SessionRecorder>,
    record_id: String,
    update: SessionRecordUpdate,
) {
    tokio::spawn(async move {
        if let Err(e) = recorder.update_record(&record_id, update).await {
            tracing::warn!("failed to update session record {}: {}", record_id, e);
        }
    });
}
