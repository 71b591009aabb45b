//! Job Source: fetches raw listings for a set of search criteria.
//!
//! `SessionController` holds an `Arc<dyn JobSource>`; `AdzunaClient` is the
//! production backend.

pub mod adzuna;

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::AppError;
use crate::models::criteria::SearchCriteria;
use crate::models::job::JobListing;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected payload: {0}")]
    Payload(String),
}

impl SourceError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Http(_) => true,
            SourceError::Api { status, .. } => *status == 429 || *status >= 500,
            SourceError::Payload(_) => false,
        }
    }
}

impl From<SourceError> for AppError {
    fn from(e: SourceError) -> Self {
        AppError::SourceApi(e.to_string())
    }
}

#[async_trait]
pub trait JobSource: Send + Sync {
    /// Human-readable name recorded on every listing and in session logs.
    fn name(&self) -> &str;

    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<JobListing>, SourceError>;
}
