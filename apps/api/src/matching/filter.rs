//! Filter rules, duplicate removal and salary ordering.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::criteria::FilterRule;
use crate::models::job::JobListing;

/// How many listings one filter rule kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSummary {
    pub name: String,
    pub matched: usize,
    /// Listing ids kept by this rule, in salary order.
    pub listing_ids: Vec<String>,
}

/// Output of applying every rule to one batch of listings.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub summaries: Vec<FilterSummary>,
    /// De-duplicated union of everything any rule kept, in salary order.
    pub listings: Vec<JobListing>,
    pub duplicates_removed: usize,
}

/// Identity used for duplicate removal. Two postings with the same title and
/// company but a different location or salary band are treated as distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey {
    title: String,
    company: String,
    location: String,
    salary_min: Option<u64>,
    salary_max: Option<u64>,
}

impl DedupKey {
    fn of(listing: &JobListing) -> Self {
        Self {
            title: normalize(&listing.title),
            company: normalize(&listing.company),
            location: normalize(&listing.location),
            salary_min: listing.salary.min.map(|v| v.round() as u64),
            salary_max: listing.salary.max.map(|v| v.round() as u64),
        }
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// True when `listing` satisfies every constraint set on `rule`.
pub fn meets_rule(listing: &JobListing, rule: &FilterRule) -> bool {
    if let Some(min_salary) = rule.min_salary {
        if listing.salary.best() < min_salary {
            return false;
        }
    }

    if let Some(wanted) = rule.contract_type.as_deref().filter(|c| !c.trim().is_empty()) {
        match listing.contract_type.as_deref() {
            Some(actual) if actual.trim().eq_ignore_ascii_case(wanted.trim()) => {}
            _ => return false,
        }
    }

    if !rule.keywords.is_empty() {
        let text = listing.searchable_text();
        let all_present = rule
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .all(|k| text.contains(&k));
        if !all_present {
            return false;
        }
    }

    true
}

/// Removes duplicates, keeping the first occurrence. Returns the number dropped.
pub fn dedup(listings: Vec<JobListing>) -> (Vec<JobListing>, usize) {
    let before = listings.len();
    let mut seen = HashSet::new();
    let unique: Vec<JobListing> = listings
        .into_iter()
        .filter(|l| seen.insert(DedupKey::of(l)))
        .collect();
    let dropped = before - unique.len();
    (unique, dropped)
}

/// Highest maximum salary first, then highest minimum.
pub fn sort_by_salary(listings: &mut [JobListing]) {
    listings.sort_by(|a, b| {
        let key = |l: &JobListing| (l.salary.best(), l.salary.min.unwrap_or(0.0));
        let (a_best, a_min) = key(a);
        let (b_best, b_min) = key(b);
        b_best
            .total_cmp(&a_best)
            .then_with(|| b_min.total_cmp(&a_min))
    });
}

/// Applies every rule. With no rules, every listing passes under an implicit "all" rule.
pub fn apply_filters(listings: Vec<JobListing>, rules: &[FilterRule]) -> FilterOutcome {
    let (mut unique, duplicates_removed) = dedup(listings);
    sort_by_salary(&mut unique);

    if rules.is_empty() {
        return FilterOutcome {
            summaries: vec![FilterSummary {
                name: "all".to_string(),
                matched: unique.len(),
                listing_ids: unique.iter().map(|l| l.id.clone()).collect(),
            }],
            listings: unique,
            duplicates_removed,
        };
    }

    let summaries: Vec<FilterSummary> = rules
        .iter()
        .map(|rule| {
            let listing_ids: Vec<String> = unique
                .iter()
                .filter(|l| meets_rule(l, rule))
                .map(|l| l.id.clone())
                .collect();
            FilterSummary {
                name: rule.name.clone(),
                matched: listing_ids.len(),
                listing_ids,
            }
        })
        .collect();

    let kept: HashSet<&str> = summaries
        .iter()
        .flat_map(|s| s.listing_ids.iter().map(String::as_str))
        .collect();
    let listings = unique
        .iter()
        .filter(|l| kept.contains(l.id.as_str()))
        .cloned()
        .collect();

    FilterOutcome {
        summaries,
        listings,
        duplicates_removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_source::testing::listing;

    fn rule(name: &str) -> FilterRule {
        FilterRule {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_min_salary_uses_best_figure() {
        let job = listing("1", "CTO", "Acme", 70_000.0, 100_000.0);
        let mut r = rule("min");
        r.min_salary = Some(90_000.0);
        assert!(meets_rule(&job, &r));
        r.min_salary = Some(110_000.0);
        assert!(!meets_rule(&job, &r));
    }

    #[test]
    fn test_missing_contract_type_fails_rule() {
        let mut job = listing("1", "CTO", "Acme", 70_000.0, 100_000.0);
        let mut r = rule("perm");
        r.contract_type = Some("Permanent".to_string());
        assert!(meets_rule(&job, &r));
        job.contract_type = None;
        assert!(!meets_rule(&job, &r));
    }

    #[test]
    fn test_all_keywords_required() {
        let job = listing("1", "CTO", "Acme", 70_000.0, 100_000.0);
        let mut r = rule("kw");
        r.keywords = vec!["aws".to_string(), "Kubernetes".to_string()];
        assert!(meets_rule(&job, &r));
        r.keywords.push("golang".to_string());
        assert!(!meets_rule(&job, &r));
    }

    #[test]
    fn test_dedup_keys_on_title_company_location_salary() {
        let a = listing("1", "CTO", "Acme", 100_000.0, 120_000.0);
        let mut same = listing("2", "  cto ", "ACME", 100_000.0, 120_000.0);
        same.location = "london,  uk".to_string();
        let mut elsewhere = listing("3", "CTO", "Acme", 100_000.0, 120_000.0);
        elsewhere.location = "Leeds".to_string();
        let other_band = listing("4", "CTO", "Acme", 90_000.0, 110_000.0);

        let (unique, dropped) = dedup(vec![a, same, elsewhere, other_band]);
        assert_eq!(dropped, 1);
        let ids: Vec<&str> = unique.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "4"]);
    }

    #[test]
    fn test_sorted_by_max_then_min_salary() {
        let mut jobs = vec![
            listing("low", "A", "X", 50_000.0, 60_000.0),
            listing("high", "B", "Y", 90_000.0, 150_000.0),
            listing("high-min", "C", "Z", 120_000.0, 150_000.0),
        ];
        sort_by_salary(&mut jobs);
        let ids: Vec<&str> = jobs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["high-min", "high", "low"]);
    }

    #[test]
    fn test_union_of_rules_without_duplicates() {
        let jobs = vec![
            listing("1", "CTO", "Acme", 150_000.0, 180_000.0),
            listing("2", "Head of Data", "Initech", 80_000.0, 90_000.0),
        ];
        let mut rich = rule("rich");
        rich.min_salary = Some(140_000.0);
        let mut any_aws = rule("aws");
        any_aws.keywords = vec!["aws".to_string()];

        let outcome = apply_filters(jobs, &[rich, any_aws]);
        assert_eq!(outcome.summaries[0].matched, 1);
        assert_eq!(outcome.summaries[1].matched, 2);
        assert_eq!(outcome.listings.len(), 2);
    }

    #[test]
    fn test_no_rules_keeps_everything() {
        let jobs = vec![listing("1", "CTO", "Acme", 1.0, 2.0)];
        let outcome = apply_filters(jobs, &[]);
        assert_eq!(outcome.listings.len(), 1);
        assert_eq!(outcome.summaries[0].name, "all");
    }
}
