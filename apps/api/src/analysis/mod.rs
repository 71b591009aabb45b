//! Analysis Reporter: aggregates scored listings into market statistics and
//! asks the language model for narrative recommendations.

pub mod prompts;
pub mod stats;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::analysis::prompts::{NARRATIVE_PROMPT_TEMPLATE, NARRATIVE_SYSTEM};
use crate::analysis::stats::{analyze, MarketAnalysis};
use crate::llm_client::prompts::render;
use crate::llm_client::{complete_json, LanguageModel};
use crate::matching::filter::FilterSummary;
use crate::matching::scorer::ScoredJob;
use crate::models::criteria::SearchCriteria;

const HIGH_SALARY_THRESHOLD: f64 = 150_000.0;
const STRONG_DEMAND_THRESHOLD: usize = 5;
const MAX_NARRATIVE_RECOMMENDATIONS: usize = 5;
const TOP_MATCHES_IN_PROMPT: usize = 5;

/// Market statistics for the listings one filter rule kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterAnalysis {
    pub name: String,
    pub matched: usize,
    pub analysis: MarketAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub summary: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Counters describing how the listing set was narrowed down.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineCounts {
    pub fetched: usize,
    pub duplicates_removed: usize,
    pub filtered: usize,
    pub unscored_semantic: usize,
}

/// The final output of one search session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub session_id: Uuid,
    pub criteria: SearchCriteria,
    /// Ranked, best match first.
    pub jobs: Vec<ScoredJob>,
    pub analysis: MarketAnalysis,
    pub filters: Vec<FilterAnalysis>,
    pub recommendations: Vec<String>,
    /// `None` when the language model could not produce one.
    pub narrative: Option<Narrative>,
    pub counts: PipelineCounts,
    pub generated_at: DateTime<Utc>,
}

/// Inputs to `MarketAnalyst::report` that come out of the earlier pipeline stages.
pub struct ReportInput<'a> {
    pub session_id: Uuid,
    pub criteria: &'a SearchCriteria,
    pub jobs: Vec<ScoredJob>,
    pub filters: &'a [FilterSummary],
    pub counts: PipelineCounts,
    pub profile_summary: &'a str,
}

pub struct MarketAnalyst {
    model: Arc<dyn LanguageModel>,
}

impl MarketAnalyst {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Builds the report. A narrative failure is logged and leaves `narrative`
    /// empty; the rule-based recommendations are always present.
    pub async fn report(&self, input: ReportInput<'_>) -> SearchReport {
        let all: Vec<&ScoredJob> = input.jobs.iter().collect();
        let analysis = analyze(&all);

        let filters: Vec<FilterAnalysis> = input
            .filters
            .iter()
            .map(|summary| {
                let subset: Vec<&ScoredJob> = input
                    .jobs
                    .iter()
                    .filter(|j| summary.listing_ids.contains(&j.listing.id))
                    .collect();
                FilterAnalysis {
                    name: summary.name.clone(),
                    matched: summary.matched,
                    analysis: analyze(&subset),
                }
            })
            .collect();

        let recommendations = rule_based_recommendations(
            &analysis,
            &filters,
            &input.jobs,
            &input.criteria.salary.currency,
        );

        let narrative = if input.jobs.is_empty() {
            None
        } else {
            let prompt = build_narrative_prompt(
                input.criteria,
                &analysis,
                &input.jobs,
                input.profile_summary,
            );
            match complete_json::<Narrative>(self.model.as_ref(), &prompt, NARRATIVE_SYSTEM).await {
                Ok(mut narrative) => {
                    narrative
                        .recommendations
                        .truncate(MAX_NARRATIVE_RECOMMENDATIONS);
                    Some(narrative)
                }
                Err(e) => {
                    warn!(
                        "Narrative recommendations unavailable for session {}: {e}",
                        input.session_id
                    );
                    None
                }
            }
        };

        SearchReport {
            session_id: input.session_id,
            criteria: input.criteria.clone(),
            jobs: input.jobs,
            analysis,
            filters,
            recommendations,
            narrative,
            counts: input.counts,
            generated_at: Utc::now(),
        }
    }
}

/// Deterministic advice derived from the statistics alone.
pub fn rule_based_recommendations(
    overall: &MarketAnalysis,
    filters: &[FilterAnalysis],
    jobs: &[ScoredJob],
    currency: &str,
) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(best) = jobs.first() {
        out.push(format!(
            "Best match: {} at {} (score {:.2})",
            best.listing.title, best.listing.company, best.combined_score
        ));
    } else {
        out.push("No listings matched; consider widening positions, locations or salary bounds."
            .to_string());
        return out;
    }

    for filter in filters {
        if let Some(stats) = &filter.analysis.salary_stats {
            if stats.avg > HIGH_SALARY_THRESHOLD {
                out.push(format!(
                    "High potential in {} with average salary {currency} {}",
                    filter.name,
                    format_thousands(stats.avg)
                ));
            }
        }
        if filter.analysis.total_jobs > STRONG_DEMAND_THRESHOLD {
            out.push(format!(
                "Strong demand in {} with {} positions",
                filter.name, filter.analysis.total_jobs
            ));
        }
    }

    if let Some(top) = overall.top_employers.first().filter(|e| e.count > 1) {
        out.push(format!(
            "{} is hiring most actively ({} openings)",
            top.company, top.count
        ));
    }

    let unscored = jobs.iter().filter(|j| j.unscored_semantic).count();
    if unscored > 0 {
        out.push(format!(
            "{unscored} listing(s) could not be assessed by the language model and are ranked on keyword overlap only"
        ));
    }

    out
}

fn build_narrative_prompt(
    criteria: &SearchCriteria,
    analysis: &MarketAnalysis,
    jobs: &[ScoredJob],
    profile_summary: &str,
) -> String {
    let top_matches = jobs
        .iter()
        .take(TOP_MATCHES_IN_PROMPT)
        .map(|j| {
            format!(
                "- {} at {} ({}), score {:.2}",
                j.listing.title, j.listing.company, j.listing.location, j.combined_score
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let criteria = serde_json::to_string(criteria).unwrap_or_default();
    let market = serde_json::to_string(analysis).unwrap_or_default();
    render(
        NARRATIVE_PROMPT_TEMPLATE,
        &[
            ("criteria", criteria.as_str()),
            ("market", market.as_str()),
            ("top_matches", top_matches.as_str()),
            ("profile", profile_summary),
        ],
    )
}

/// 152000.4 → "152,000"
fn format_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.max(0.0));
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
