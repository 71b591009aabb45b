//! Match Scorer: combines the traditional and semantic scores with the
//! location and salary multipliers.
//!
//! combined = (0.4·traditional + 0.6·semantic) × location × salary
//!
//! When the semantic call fails after all retries the listing is flagged
//! `unscored_semantic`, its semantic score is 0 and the traditional score
//! stands in for the weighted sum.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::LanguageModel;
use crate::matching::multipliers::{location_multiplier, salary_range_multiplier, MultiplierConfig};
use crate::matching::semantic::assess;
use crate::matching::traditional::{traditional_score, TraditionalBreakdown, TraditionalWeights};
use crate::models::criteria::SearchCriteria;
use crate::models::job::JobListing;
use crate::models::profile::Profile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub traditional: f64,
    pub semantic: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            traditional: 0.4,
            semantic: 0.6,
        }
    }
}

/// A listing with every score that went into its ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredJob {
    pub listing: JobListing,
    pub traditional_score: f64,
    pub semantic_score: f64,
    pub combined_score: f64,
    pub location_multiplier: f64,
    pub salary_range_multiplier: f64,
    pub semantic_rationale: Option<String>,
    /// True when the language model could not score this listing.
    pub unscored_semantic: bool,
    pub breakdown: TraditionalBreakdown,
}

/// Weighted sum times multipliers. Inputs are clamped so the result stays in [0, 1].
/// `semantic = None` means the semantic score is unavailable.
pub fn combine(
    traditional: f64,
    semantic: Option<f64>,
    location: f64,
    salary: f64,
    weights: &ScoringWeights,
) -> f64 {
    let traditional = traditional.clamp(0.0, 1.0);
    let base = match semantic {
        Some(semantic) => {
            let total = weights.traditional + weights.semantic;
            if total <= 0.0 {
                0.0
            } else {
                (weights.traditional * traditional + weights.semantic * semantic.clamp(0.0, 1.0))
                    / total
            }
        }
        None => traditional,
    };
    (base * location.clamp(0.0, 1.0) * salary.clamp(0.0, 1.0)).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Default)]
pub struct ScorerConfig {
    pub weights: ScoringWeights,
    pub traditional: TraditionalWeights,
    pub multipliers: MultiplierConfig,
}

pub struct MatchScorer {
    model: Arc<dyn LanguageModel>,
    config: ScorerConfig,
}

impl MatchScorer {
    pub fn new(model: Arc<dyn LanguageModel>, config: ScorerConfig) -> Self {
        Self { model, config }
    }

    /// Scores one listing. Never fails: a semantic failure degrades to the
    /// traditional score and is logged.
    pub async fn score_listing(
        &self,
        listing: JobListing,
        profile: &Profile,
        criteria: &SearchCriteria,
        profile_summary: &str,
    ) -> ScoredJob {
        let breakdown = traditional_score(&listing, profile, criteria, &self.config.traditional);
        let location = location_multiplier(&listing, &criteria.locations, &self.config.multipliers);
        let salary = salary_range_multiplier(&listing, &criteria.salary, &self.config.multipliers);

        let semantic = match assess(self.model.as_ref(), &listing, profile_summary).await {
            Ok(assessment) => Some(assessment),
            Err(e) => {
                warn!(
                    "Semantic scoring failed for listing {} ({}), using traditional score only: {e}",
                    listing.id, listing.title
                );
                None
            }
        };

        let combined = combine(
            breakdown.score,
            semantic.as_ref().map(|s| s.score),
            location,
            salary,
            &self.config.weights,
        );

        ScoredJob {
            traditional_score: breakdown.score,
            semantic_score: semantic.as_ref().map(|s| s.score).unwrap_or(0.0),
            combined_score: combined,
            location_multiplier: location,
            salary_range_multiplier: salary,
            unscored_semantic: semantic.is_none(),
            semantic_rationale: semantic.map(|s| s.rationale),
            breakdown,
            listing,
        }
    }
}

/// Highest combined score first; ties broken by traditional score, then id.
pub fn rank(jobs: &mut [ScoredJob]) {
    jobs.sort_by(|a, b| {
        b.combined_score
            .total_cmp(&a.combined_score)
            .then_with(|| b.traditional_score.total_cmp(&a.traditional_score))
            .then_with(|| a.listing.id.cmp(&b.listing.id))
    });
}
