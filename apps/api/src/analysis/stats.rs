//! Market statistics over a set of scored listings.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::matching::scorer::ScoredJob;

const TOP_EMPLOYERS: usize = 5;
const UNSPECIFIED_CONTRACT: &str = "Not specified";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Listings that advertised any salary.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployerCount {
    pub company: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub total_jobs: usize,
    pub salary_stats: Option<SalaryStats>,
    pub top_employers: Vec<EmployerCount>,
    pub contract_distribution: BTreeMap<String, usize>,
    pub average_combined_score: Option<f64>,
}

pub fn analyze(jobs: &[&ScoredJob]) -> MarketAnalysis {
    MarketAnalysis {
        total_jobs: jobs.len(),
        salary_stats: salary_stats(jobs),
        top_employers: top_employers(jobs, TOP_EMPLOYERS),
        contract_distribution: contract_distribution(jobs),
        average_combined_score: if jobs.is_empty() {
            None
        } else {
            Some(jobs.iter().map(|j| j.combined_score).sum::<f64>() / jobs.len() as f64)
        },
    }
}

fn salary_stats(jobs: &[&ScoredJob]) -> Option<SalaryStats> {
    let salaries: Vec<f64> = jobs
        .iter()
        .filter_map(|j| j.listing.salary.representative())
        .filter(|s| *s > 0.0)
        .collect();
    if salaries.is_empty() {
        return None;
    }
    Some(SalaryStats {
        min: salaries.iter().copied().fold(f64::INFINITY, f64::min),
        max: salaries.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        avg: salaries.iter().sum::<f64>() / salaries.len() as f64,
        count: salaries.len(),
    })
}

/// Companies with the most openings; ties ordered by name.
fn top_employers(jobs: &[&ScoredJob], limit: usize) -> Vec<EmployerCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for job in jobs {
        let company = job.listing.company.trim();
        if !company.is_empty() {
            *counts.entry(company).or_default() += 1;
        }
    }
    let mut ranked: Vec<EmployerCount> = counts
        .into_iter()
        .map(|(company, count)| EmployerCount {
            company: company.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.company.cmp(&b.company)));
    ranked.truncate(limit);
    ranked
}

fn contract_distribution(jobs: &[&ScoredJob]) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for job in jobs {
        let key = job
            .listing
            .contract_type
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNSPECIFIED_CONTRACT)
            .to_string();
        *distribution.entry(key).or_insert(0) += 1;
    }
    distribution
}
