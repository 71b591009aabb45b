//! Waiting for a session to settle, bounded by a deadline.

use std::time::Duration;

use tokio::time::{interval, timeout, MissedTickBehavior};
use uuid::Uuid;

use super::store::SessionStore;
use super::SessionSnapshot;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1500),
            timeout: Duration::from_secs(180),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    /// The session reached `complete` or `error`.
    Settled(SessionSnapshot),
    /// The deadline passed first. The session itself keeps running.
    TimedOut(SessionSnapshot),
}

impl WaitOutcome {
    pub fn snapshot(&self) -> &SessionSnapshot {
        match self {
            WaitOutcome::Settled(s) | WaitOutcome::TimedOut(s) => s,
        }
    }
}

/// Polls the store until the session is terminal or `policy.timeout` elapses.
/// Giving up only stops this caller from waiting; nothing is cancelled.
pub async fn wait_for_settled(
    store: &dyn SessionStore,
    id: Uuid,
    policy: PollPolicy,
) -> Result<WaitOutcome, AppError> {
    let poll = async {
        let mut ticker = interval(policy.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let session = store.get(id).await.ok_or(AppError::SessionNotFound(id))?;
            if session.status.is_terminal() {
                return Ok(session.snapshot());
            }
        }
    };

    match timeout(policy.timeout, poll).await {
        Ok(settled) => settled.map(WaitOutcome::Settled),
        Err(_) => {
            let session = store.get(id).await.ok_or(AppError::SessionNotFound(id))?;
            Ok(WaitOutcome::TimedOut(session.snapshot()))
        }
    }
}
