//! The single writer for a session. Every change goes through compare-and-swap
//! against the version this writer last saw.

use std::sync::Arc;

use anyhow::anyhow;
use tracing::{info, warn};
use uuid::Uuid;

use super::store::{SessionStore, StoreError};
use super::{SearchSession, SessionStatus};
use crate::analysis::SearchReport;
use crate::errors::AppError;
use crate::models::criteria::SearchCriteria;

pub struct SessionWriter {
    store: Arc<dyn SessionStore>,
    current: SearchSession,
}

impl SessionWriter {
    /// Takes over writing for an existing session, starting from its stored version.
    pub async fn attach(store: Arc<dyn SessionStore>, id: Uuid) -> Result<Self, AppError> {
        let current = store.get(id).await.ok_or(AppError::SessionNotFound(id))?;
        Ok(Self { store, current })
    }

    pub fn id(&self) -> Uuid {
        self.current.id
    }

    /// The merged criteria the session was started with.
    pub fn criteria(&self) -> &SearchCriteria {
        &self.current.criteria
    }

    /// Updates the headline progress message and records it in the log.
    pub async fn progress(&mut self, message: impl Into<String>) -> Result<(), AppError> {
        let message = message.into();
        info!(session_id = %self.id(), "{}", message);
        self.commit(|s| {
            s.message = message.clone();
            s.append_log(message);
            Ok(())
        })
        .await
    }

    /// Appends a detail line without touching the headline message.
    pub async fn log(&mut self, message: impl Into<String>) -> Result<(), AppError> {
        let message = message.into();
        info!(session_id = %self.id(), "{}", message);
        self.commit(|s| {
            s.append_log(message);
            Ok(())
        })
        .await
    }

    pub async fn mark_running(&mut self) -> Result<(), AppError> {
        let message = "Search started".to_string();
        info!(session_id = %self.id(), "{}", message);
        self.commit(|s| {
            s.transition(SessionStatus::Running)?;
            s.message = message.clone();
            s.append_log(message);
            Ok(())
        })
        .await
    }

    pub async fn complete(&mut self, report: SearchReport) -> Result<(), AppError> {
        let jobs = report.jobs.len();
        self.commit(|s| {
            s.transition(SessionStatus::Complete)?;
            s.message = format!("Search complete: {jobs} jobs ranked");
            s.append_log(s.message.clone());
            s.report = Some(Arc::new(report));
            Ok(())
        })
        .await?;
        info!(session_id = %self.id(), jobs, "Session complete");
        Ok(())
    }

    pub async fn fail(&mut self, reason: impl Into<String>) -> Result<(), AppError> {
        let reason = reason.into();
        warn!(session_id = %self.id(), error = %reason, "Session failed");
        self.commit(|s| {
            s.transition(SessionStatus::Error)?;
            s.message = "Search failed".to_string();
            s.append_log(format!("Error: {reason}"));
            s.error = Some(reason);
            Ok(())
        })
        .await
    }

    async fn commit<F>(&mut self, change: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut SearchSession) -> Result<(), super::SessionError>,
    {
        let mut next = self.current.clone();
        change(&mut next).map_err(|e| AppError::Internal(anyhow!(e)))?;
        let stored = self
            .store
            .compare_and_swap(self.current.id, self.current.version, next)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(id) => AppError::SessionNotFound(id),
                other => AppError::Internal(anyhow!(other)),
            })?;
        self.current = stored;
        Ok(())
    }
}
