use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Advertised salary band of a listing. Either bound may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: String,
}

impl SalaryRange {
    /// True when the listing advertises no salary at all.
    pub fn is_unknown(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// The highest figure on offer, used for minimum-salary filters and sorting.
    pub fn best(&self) -> f64 {
        self.max.unwrap_or(0.0).max(self.min.unwrap_or(0.0))
    }

    /// Single representative figure: the midpoint when both bounds exist.
    pub fn representative(&self) -> Option<f64> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            (Some(v), None) | (None, Some(v)) => Some(v),
            (None, None) => None,
        }
    }
}

/// A single posting returned by the job source. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    /// Administrative areas from the source, broadest first (country, region, city).
    #[serde(default)]
    pub area: Vec<String>,
    pub description: String,
    pub salary: SalaryRange,
    /// e.g. "permanent", "contract". `None` when the source does not say.
    pub contract_type: Option<String>,
    /// e.g. "full_time", "part_time".
    pub contract_time: Option<String>,
    pub url: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub source: String,
}

impl JobListing {
    /// Lower-cased text searched by keyword filters and skill matching.
    pub fn searchable_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.company).to_lowercase()
    }
}
