//! Search sessions: one end-to-end search-and-score run, polled independently.
//!
//! State machine: pending → running → {complete, error}; pending → error.
//! Terminal states never change again.

pub mod controller;
pub mod handlers;
pub mod pipeline;
pub mod store;
pub mod wait;
pub mod writer;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::analysis::SearchReport;
use crate::models::criteria::SearchCriteria;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Running,
    Complete,
    Error,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Complete | SessionStatus::Error)
    }

    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Pending, Running) | (Pending, Error) | (Running, Complete) | (Running, Error)
        )
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("invalid session transition {from:?} -> {to:?}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Full session state as held by the store.
#[derive(Debug, Clone)]
pub struct SearchSession {
    pub id: Uuid,
    pub status: SessionStatus,
    pub message: String,
    /// Append-only.
    pub log: Vec<LogLine>,
    pub criteria: SearchCriteria,
    /// Present only once `status` is `Complete`.
    pub report: Option<Arc<SearchReport>>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by the store on every successful compare-and-swap.
    pub version: u64,
}

impl SearchSession {
    pub fn new(id: Uuid, criteria: SearchCriteria) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: SessionStatus::Pending,
            message: "Search queued".to_string(),
            log: vec![],
            criteria,
            report: None,
            error: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn transition(&mut self, next: SessionStatus) -> Result<(), SessionError> {
        if !self.status.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn append_log(&mut self, message: impl Into<String>) {
        let now = Utc::now();
        self.log.push(LogLine {
            at: now,
            message: message.into(),
        });
        self.updated_at = now;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            status: self.status,
            message: self.message.clone(),
            log: self.log.clone(),
            complete: self.status.is_terminal(),
            error: self.error.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// What a polling caller sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub message: String,
    pub log: Vec<LogLine>,
    /// True once the session reached a terminal state (complete or error).
    pub complete: bool,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
