//! Traditional score: rule-based overlap between a listing and the profile.
//! No language model involved.
//!
//! traditional = 0.4·title + 0.4·skills + 0.2·experience

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

use crate::models::criteria::SearchCriteria;
use crate::models::job::JobListing;
use crate::models::profile::Profile;
use crate::profile::extract::required_years;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraditionalWeights {
    pub title: f64,
    pub skills: f64,
    pub experience: f64,
}

impl Default for TraditionalWeights {
    fn default() -> Self {
        Self {
            title: 0.4,
            skills: 0.4,
            experience: 0.2,
        }
    }
}

/// Per-component detail kept on every scored listing for transparency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraditionalBreakdown {
    pub title_match: f64,
    pub skills_match: f64,
    pub experience_match: f64,
    pub matched_skills: Vec<String>,
    pub score: f64,
}

pub fn traditional_score(
    listing: &JobListing,
    profile: &Profile,
    criteria: &SearchCriteria,
    weights: &TraditionalWeights,
) -> TraditionalBreakdown {
    let title_match = title_match(&listing.title, profile, criteria);
    let (skills_match, matched_skills) = skills_match(listing, profile);
    let experience_match = experience_match(&listing.description, profile);

    let total_weight = weights.title + weights.skills + weights.experience;
    let score = if total_weight > 0.0 {
        (weights.title * title_match
            + weights.skills * skills_match
            + weights.experience * experience_match)
            / total_weight
    } else {
        0.0
    };

    TraditionalBreakdown {
        title_match,
        skills_match,
        experience_match,
        matched_skills,
        score: score.clamp(0.0, 1.0),
    }
}

/// Best similarity between the listing title and any past role or requested position.
fn title_match(title: &str, profile: &Profile, criteria: &SearchCriteria) -> f64 {
    let title = title.trim().to_lowercase();
    if title.is_empty() {
        return 0.0;
    }
    profile
        .roles()
        .iter()
        .chain(criteria.positions.iter())
        .map(|candidate| normalized_levenshtein(&title, &candidate.trim().to_lowercase()))
        .fold(0.0, f64::max)
}

/// Share of profile skills mentioned anywhere in the listing.
fn skills_match(listing: &JobListing, profile: &Profile) -> (f64, Vec<String>) {
    let skills = profile.all_skills();
    if skills.is_empty() {
        return (0.0, vec![]);
    }
    let text = listing.searchable_text();
    let matched: Vec<String> = skills
        .iter()
        .filter(|s| contains_term(&text, &s.to_lowercase()))
        .map(|s| s.to_string())
        .collect();
    let ratio = (matched.len() as f64 / skills.len() as f64).min(1.0);
    (ratio, matched)
}

/// Years proximity when the listing states a requirement; otherwise the share
/// of profile roles the description mentions.
fn experience_match(description: &str, profile: &Profile) -> f64 {
    if let Some(required) = required_years(description) {
        return (profile.years_of_experience() / required).clamp(0.0, 1.0);
    }
    let roles = profile.roles();
    if roles.is_empty() || description.trim().is_empty() {
        return 0.0;
    }
    let text = description.to_lowercase();
    let mentioned = roles
        .iter()
        .filter(|r| contains_term(&text, &r.to_lowercase()))
        .count();
    (mentioned as f64 / roles.len() as f64).min(1.0)
}

/// Substring match that refuses to match inside a longer word ("go" in "google").
fn contains_term(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_source::testing::listing;
    use crate::models::profile::WorkHistoryEntry;
    use chrono::{Datelike, NaiveDate, Utc};

    fn profile(skills: &[&str], roles: &[&str], years: i32) -> Profile {
        let today = Utc::now().date_naive();
        let start = NaiveDate::from_ymd_opt(today.year() - years, 1, 1);
        Profile {
            technical_skills: skills.iter().map(|s| s.to_string()).collect(),
            work_history: roles
                .iter()
                .map(|r| WorkHistoryEntry {
                    title: r.to_string(),
                    company: "Acme".to_string(),
                    started_on: start,
                    finished_on: None,
                    description: None,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn criteria(positions: &[&str]) -> SearchCriteria {
        SearchCriteria {
            positions: positions.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_title_scores_one() {
        let job = listing("1", "Head of Technology", "Acme", 1.0, 2.0);
        let score = title_match(&job.title, &Profile::default(), &criteria(&["Head of Technology"]));
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_skills_ratio_counts_whole_terms() {
        let job = listing("1", "CTO", "Acme", 1.0, 2.0);
        let p = profile(&["Python", "AWS", "Go", "Scala"], &[], 0);
        let (ratio, matched) = skills_match(&job, &p);
        assert_eq!(matched, vec!["AWS", "Python"]);
        assert!((ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_experience_proximity_uses_required_years() {
        let p = profile(&[], &["Director"], 5);
        let m = experience_match("Requires 10+ years in leadership", &p);
        assert!((m - 0.5).abs() < 1e-9, "got {m}");
        let m = experience_match("Requires 3+ years", &p);
        assert_eq!(m, 1.0);
    }

    #[test]
    fn test_experience_falls_back_to_role_mentions() {
        let p = profile(&[], &["Director", "Architect"], 5);
        let m = experience_match("Reporting to the Director of Operations", &p);
        assert!((m - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_profile_scores_only_on_title() {
        let job = listing("1", "CTO", "Acme", 1.0, 2.0);
        let breakdown = traditional_score(&job, &Profile::default(), &criteria(&["CTO"]), &TraditionalWeights::default());
        assert_eq!(breakdown.skills_match, 0.0);
        assert_eq!(breakdown.experience_match, 0.0);
        assert!((breakdown.score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_score_bounded() {
        let job = listing("1", "CTO", "Acme", 1.0, 2.0);
        let p = profile(&["Python", "AWS", "Kubernetes", "Leadership"], &["CTO"], 20);
        let breakdown = traditional_score(&job, &p, &criteria(&["CTO"]), &TraditionalWeights::default());
        assert!((0.0..=1.0).contains(&breakdown.score));
    }

    #[test]
    fn test_contains_term_boundaries() {
        assert!(contains_term("we use go daily", "go"));
        assert!(!contains_term("we use google", "go"));
        assert!(contains_term("aws, gcp", "aws"));
    }
}
