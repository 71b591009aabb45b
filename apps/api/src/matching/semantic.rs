//! Semantic score: the language model's view of qualitative fit, returned
//! through a typed `{score, rationale}` contract.

use serde::{Deserialize, Serialize};

use crate::llm_client::prompts::{render, UNTRUSTED_INPUT_INSTRUCTION};
use crate::llm_client::{complete_json, LanguageModel, LlmError};
use crate::matching::prompts::{SEMANTIC_PROMPT_TEMPLATE, SEMANTIC_SYSTEM};
use crate::models::job::JobListing;
use crate::models::profile::truncate_chars;

const DESCRIPTION_MAX_CHARS: usize = 4_000;
const RATIONALE_MAX_CHARS: usize = 600;

/// Score as the model may express it: a number or a coarse label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    Numeric(f64),
    Label(String),
}

impl RawScore {
    /// High/Medium/Low map to 1.0/0.6/0.2; numbers are clamped to [0, 1].
    pub fn resolve(&self) -> Option<f64> {
        match self {
            RawScore::Numeric(v) if v.is_finite() => Some(v.clamp(0.0, 1.0)),
            RawScore::Numeric(_) => None,
            RawScore::Label(label) => match label.trim().to_lowercase().as_str() {
                "high" => Some(1.0),
                "medium" => Some(0.6),
                "low" => Some(0.2),
                other => other.parse::<f64>().ok().map(|v| v.clamp(0.0, 1.0)),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawAssessment {
    score: RawScore,
    #[serde(default)]
    rationale: String,
}

/// Typed result of one semantic scoring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticAssessment {
    pub score: f64,
    pub rationale: String,
}

pub fn build_prompt(listing: &JobListing, profile_summary: &str) -> String {
    let description = truncate_chars(&listing.description, DESCRIPTION_MAX_CHARS);
    render(
        SEMANTIC_PROMPT_TEMPLATE,
        &[
            ("untrusted_instruction", UNTRUSTED_INPUT_INSTRUCTION),
            ("title", listing.title.as_str()),
            ("company", listing.company.as_str()),
            ("location", listing.location.as_str()),
            ("description", description.as_str()),
            ("profile", profile_summary),
        ],
    )
}

/// Asks the model for a semantic score. Retries live in the model client;
/// an error here means the call is exhausted or the reply broke the contract.
pub async fn assess(
    model: &dyn LanguageModel,
    listing: &JobListing,
    profile_summary: &str,
) -> Result<SemanticAssessment, LlmError> {
    let prompt = build_prompt(listing, profile_summary);
    let raw: RawAssessment = complete_json(model, &prompt, SEMANTIC_SYSTEM).await?;
    let score = raw.score.resolve().ok_or_else(|| {
        LlmError::InvalidResponse(format!("unrecognised score {:?}", raw.score))
    })?;
    Ok(SemanticAssessment {
        score,
        rationale: truncate_chars(raw.rationale.trim(), RATIONALE_MAX_CHARS),
    })
}
