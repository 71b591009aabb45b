//! One end-to-end run: profile → fetch → filter → score → analyze.

use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinSet;

use super::writer::SessionWriter;
use crate::analysis::{MarketAnalyst, PipelineCounts, ReportInput, SearchReport};
use crate::errors::AppError;
use crate::job_source::JobSource;
use crate::matching::filter::apply_filters;
use crate::matching::scorer::{rank, MatchScorer, ScoredJob};
use crate::models::criteria::SearchCriteria;
use crate::profile::ProfileLoader;

/// Collaborators shared by every session.
pub struct Pipeline {
    pub profile: ProfileLoader,
    pub source: Arc<dyn JobSource>,
    pub scorer: Arc<MatchScorer>,
    pub analyst: MarketAnalyst,
    /// Upper bound on listings scored at once.
    pub scoring_concurrency: usize,
}

impl Pipeline {
    pub async fn run(
        &self,
        writer: &mut SessionWriter,
        criteria: SearchCriteria,
    ) -> Result<SearchReport, AppError> {
        writer.progress("Loading candidate profile").await?;
        let profile = Arc::new(self.profile.load().await?);
        let summary: Arc<str> = Arc::from(profile.summary());
        writer
            .log(format!(
                "Profile loaded: {} skills, {} roles, {} years of experience",
                profile.all_skills().len(),
                profile.roles().len(),
                profile.years_of_experience()
            ))
            .await?;

        writer
            .progress(format!(
                "Searching {} for {} position(s) in {} location(s)",
                self.source.name(),
                criteria.positions.len(),
                criteria.locations.len().max(1)
            ))
            .await?;
        let listings = self.source.search(&criteria).await?;
        let fetched = listings.len();
        writer.log(format!("Fetched {fetched} listings")).await?;

        let outcome = apply_filters(listings, &criteria.filters);
        for summary in &outcome.summaries {
            writer
                .log(format!("Filter '{}' matched {} listings", summary.name, summary.matched))
                .await?;
        }
        if outcome.duplicates_removed > 0 {
            writer
                .log(format!("Removed {} duplicate listings", outcome.duplicates_removed))
                .await?;
        }

        let total = outcome.listings.len();
        writer.progress(format!("Scoring {total} listings")).await?;

        let criteria = Arc::new(criteria);
        let limit = self.scoring_concurrency.max(1);
        let mut pending = outcome.listings.into_iter();
        let mut in_flight = JoinSet::new();
        let mut jobs: Vec<ScoredJob> = Vec::with_capacity(total);

        loop {
            while in_flight.len() < limit {
                let Some(listing) = pending.next() else { break };
                let scorer = Arc::clone(&self.scorer);
                let profile = Arc::clone(&profile);
                let criteria = Arc::clone(&criteria);
                let summary = Arc::clone(&summary);
                in_flight.spawn(async move {
                    scorer
                        .score_listing(listing, &profile, &criteria, &summary)
                        .await
                });
            }

            let Some(joined) = in_flight.join_next().await else { break };
            let job = joined.map_err(|e| AppError::Internal(anyhow!("scoring task failed: {e}")))?;
            if job.unscored_semantic {
                writer
                    .log(format!(
                        "Semantic assessment unavailable for '{}' at {}; ranked on keyword overlap",
                        job.listing.title, job.listing.company
                    ))
                    .await?;
            }
            jobs.push(job);
            writer
                .progress(format!("Scored {}/{} listings", jobs.len(), total))
                .await?;
        }

        rank(&mut jobs);
        let counts = PipelineCounts {
            fetched,
            duplicates_removed: outcome.duplicates_removed,
            filtered: total,
            unscored_semantic: jobs.iter().filter(|j| j.unscored_semantic).count(),
        };

        writer.progress("Analyzing market and preparing report").await?;
        let report = self
            .analyst
            .report(ReportInput {
                session_id: writer.id(),
                criteria: criteria.as_ref(),
                jobs,
                filters: &outcome.summaries,
                counts,
                profile_summary: summary.as_ref(),
            })
            .await;

        Ok(report)
    }
}
