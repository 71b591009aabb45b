//! Starts sessions and answers status / result queries.

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use super::pipeline::Pipeline;
use super::store::{SessionStore, StoreError};
use super::wait::{wait_for_settled, PollPolicy, WaitOutcome};
use super::writer::SessionWriter;
use super::{SearchSession, SessionSnapshot, SessionStatus};
use crate::analysis::SearchReport;
use crate::errors::AppError;
use crate::models::criteria::SearchCriteria;

#[derive(Clone)]
pub struct SessionController {
    store: Arc<dyn SessionStore>,
    pipeline: Arc<Pipeline>,
    defaults: Arc<SearchCriteria>,
}

impl SessionController {
    pub fn new(
        store: Arc<dyn SessionStore>,
        pipeline: Arc<Pipeline>,
        defaults: SearchCriteria,
    ) -> Self {
        Self {
            store,
            pipeline,
            defaults: Arc::new(defaults),
        }
    }

    /// Registers a pending session and runs it in the background.
    /// Returns as soon as the session is stored.
    pub async fn start(&self, criteria: SearchCriteria) -> Result<SessionSnapshot, AppError> {
        let criteria = criteria.merged_over(&self.defaults);
        criteria.validate().map_err(AppError::Validation)?;

        let positions = criteria.positions.len();
        let session = SearchSession::new(Uuid::new_v4(), criteria);
        let snapshot = session.snapshot();
        self.store.put(session).await.map_err(|e| match e {
            StoreError::AlreadyExists(id) => {
                AppError::Internal(anyhow::anyhow!("session id collision: {id}"))
            }
            other => AppError::Internal(anyhow::anyhow!(other)),
        })?;

        info!(session_id = %snapshot.session_id, positions, "Session created");
        tokio::spawn(supervise(
            Arc::clone(&self.store),
            Arc::clone(&self.pipeline),
            snapshot.session_id,
        ));

        Ok(snapshot)
    }

    pub async fn status(&self, id: Uuid) -> Result<SessionSnapshot, AppError> {
        self.store
            .get(id)
            .await
            .map(|s| s.snapshot())
            .ok_or(AppError::SessionNotFound(id))
    }

    /// The report of a completed session. Repeated calls return the same report.
    pub async fn result(&self, id: Uuid) -> Result<Arc<SearchReport>, AppError> {
        let session = self.store.get(id).await.ok_or(AppError::SessionNotFound(id))?;
        match session.status {
            SessionStatus::Complete => session
                .report
                .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session {id} complete without report"))),
            SessionStatus::Error => Err(AppError::SessionFailed(
                session.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
            SessionStatus::Pending | SessionStatus::Running => Err(AppError::NotReady(id)),
        }
    }

    pub async fn wait(&self, id: Uuid, policy: PollPolicy) -> Result<WaitOutcome, AppError> {
        wait_for_settled(self.store.as_ref(), id, policy).await
    }
}

/// Drives one session to a terminal state. The pipeline runs in its own task
/// so a panic there still lands the session in `error`.
async fn supervise(
    store: Arc<dyn SessionStore>,
    pipeline: Arc<Pipeline>,
    id: Uuid,
) {
    let mut writer = match SessionWriter::attach(Arc::clone(&store), id).await {
        Ok(w) => w,
        Err(e) => {
            error!(session_id = %id, "Cannot attach session writer: {e}");
            return;
        }
    };
    if let Err(e) = writer.mark_running().await {
        error!(session_id = %id, "Cannot mark session running: {e}");
        return;
    }

    let task = tokio::spawn(async move {
        let criteria = writer.criteria().clone();
        let outcome = pipeline.run(&mut writer, criteria).await;
        (writer, outcome)
    });

    let finished = match task.await {
        Ok((mut writer, Ok(report))) => writer.complete(report).await,
        Ok((mut writer, Err(e))) => writer.fail(e.to_string()).await,
        Err(join_error) => {
            // The writer died with the task; nothing else writes this session.
            match SessionWriter::attach(store, id).await {
                Ok(mut writer) => writer.fail(format!("search task crashed: {join_error}")).await,
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = finished {
        error!(session_id = %id, "Cannot record session outcome: {e}");
    }
}
