//! Adzuna job search API client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::{JobSource, SourceError};
use crate::models::criteria::SearchCriteria;
use crate::models::job::{JobListing, SalaryRange};
use crate::retry::{retry_with_backoff, RetryPolicy};

const ADZUNA_BASE_URL: &str = "https://api.adzuna.com/v1/api/jobs";
const SOURCE_NAME: &str = "Adzuna";

#[derive(Debug, Clone)]
pub struct AdzunaConfig {
    pub app_id: String,
    pub api_key: String,
    /// Lower-case ISO country code, e.g. "gb".
    pub country: String,
    pub results_per_page: u32,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

/// One `what`/`where` combination sent to the search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct AdzunaQuery {
    pub what: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    results: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: Option<RawCompany>,
    #[serde(default)]
    location: Option<RawLocation>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    salary_min: Option<f64>,
    #[serde(default)]
    salary_max: Option<f64>,
    #[serde(default)]
    redirect_url: Option<String>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    category: Option<RawCategory>,
    #[serde(default)]
    contract_type: Option<String>,
    #[serde(default)]
    contract_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCompany {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    display_name: Option<String>,
    #[serde(default)]
    area: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    label: Option<String>,
}

pub struct AdzunaClient {
    client: Client,
    config: AdzunaConfig,
}

impl AdzunaClient {
    pub fn new(config: AdzunaConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.timeout)
                .build()
                .expect("Failed to build HTTP client"),
            config,
        }
    }

    fn search_url(&self) -> String {
        format!("{ADZUNA_BASE_URL}/{}/search/1", self.config.country)
    }

    /// Query parameters for one request. Contract flags are only sent when a
    /// single contract type (or time) is requested; Adzuna ANDs them.
    fn query_params(&self, query: &AdzunaQuery, criteria: &SearchCriteria) -> Vec<(String, String)> {
        let mut params = vec![
            ("app_id".to_string(), self.config.app_id.clone()),
            ("app_key".to_string(), self.config.api_key.clone()),
            (
                "results_per_page".to_string(),
                self.config.results_per_page.to_string(),
            ),
            ("what".to_string(), query.what.clone()),
            ("content-type".to_string(), "application/json".to_string()),
        ];
        if let Some(location) = &query.location {
            params.push(("where".to_string(), location.clone()));
        }
        if let Some(min) = criteria.salary.min {
            params.push(("salary_min".to_string(), format!("{min:.0}")));
        }
        if let Some(max) = criteria.salary.max {
            params.push(("salary_max".to_string(), format!("{max:.0}")));
        }

        let wanted: Vec<String> = criteria
            .contract_types
            .iter()
            .map(|c| normalize_contract(c))
            .collect();
        let kinds: Vec<&String> = wanted
            .iter()
            .filter(|c| *c == "permanent" || *c == "contract")
            .collect();
        if let [kind] = kinds.as_slice() {
            params.push((kind.to_string(), "1".to_string()));
        }
        let times: Vec<&String> = wanted
            .iter()
            .filter(|c| *c == "full_time" || *c == "part_time")
            .collect();
        if let [time] = times.as_slice() {
            params.push((time.to_string(), "1".to_string()));
        }
        params
    }

    async fn fetch(
        &self,
        query: &AdzunaQuery,
        criteria: &SearchCriteria,
    ) -> Result<Vec<JobListing>, SourceError> {
        let params = self.query_params(query, criteria);
        let url = self.search_url();
        let label = format!("Adzuna search '{}'", query.what);
        let (url, params) = (&url, &params);

        let response: SearchResponse = retry_with_backoff(
            self.config.retry,
            &label,
            SourceError::is_retryable,
            move || self.send_once(url, params),
        )
        .await?;

        info!(
            "Adzuna '{}' in {:?}: {} total, {} returned",
            query.what,
            query.location,
            response.count.unwrap_or_default(),
            response.results.len()
        );

        let currency = currency_for_country(&self.config.country);
        Ok(response
            .results
            .into_iter()
            .filter_map(|raw| to_listing(raw, currency))
            .collect())
    }

    async fn send_once(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<SearchResponse, SourceError> {
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SourceError::Payload(e.to_string()))
    }
}

#[async_trait]
impl JobSource for AdzunaClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<JobListing>, SourceError> {
        let queries = build_queries(criteria);
        let mut listings = Vec::new();
        let mut last_error = None;
        let mut succeeded = 0;

        for query in &queries {
            match self.fetch(query, criteria).await {
                Ok(batch) => {
                    succeeded += 1;
                    listings.extend(batch);
                }
                Err(e) => {
                    warn!(
                        "Adzuna query '{}' in {:?} failed: {e}",
                        query.what, query.location
                    );
                    last_error = Some(e);
                }
            }
        }

        if succeeded == 0 {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        listings.retain(|l| contract_matches(l, &criteria.contract_types));
        Ok(listings)
    }
}

/// One query per position × location; positions alone when no location is given.
pub fn build_queries(criteria: &SearchCriteria) -> Vec<AdzunaQuery> {
    let positions = criteria.positions.iter().filter(|p| !p.trim().is_empty());
    if criteria.locations.is_empty() {
        return positions
            .map(|p| AdzunaQuery {
                what: p.trim().to_string(),
                location: None,
            })
            .collect();
    }
    positions
        .flat_map(|p| {
            criteria.locations.iter().map(move |l| AdzunaQuery {
                what: p.trim().to_string(),
                location: Some(l.trim().to_string()),
            })
        })
        .collect()
}

/// Contract type (permanent/contract) and contract time (full/part time) are
/// checked separately. A listing passes a dimension the caller asked about when
/// its value there is unknown or one of the wanted values.
fn contract_matches(listing: &JobListing, wanted: &[String]) -> bool {
    let (times, types): (Vec<String>, Vec<String>) = wanted
        .iter()
        .map(|w| normalize_contract(w))
        .partition(|w| CONTRACT_TIMES.contains(&w.as_str()));
    dimension_matches(listing.contract_type.as_deref(), &types)
        && dimension_matches(listing.contract_time.as_deref(), &times)
}

const CONTRACT_TIMES: [&str; 2] = ["full_time", "part_time"];

fn dimension_matches(value: Option<&str>, wanted: &[String]) -> bool {
    match value {
        _ if wanted.is_empty() => true,
        None => true,
        Some(v) => wanted.contains(&normalize_contract(v)),
    }
}

fn normalize_contract(raw: &str) -> String {
    raw.trim().to_lowercase().replace([' ', '-'], "_")
}

fn to_listing(raw: RawJob, currency: &str) -> Option<JobListing> {
    let id = match raw.id {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let title = raw.title.filter(|t| !t.trim().is_empty())?;
    let (location, area) = raw
        .location
        .map(|l| (l.display_name.unwrap_or_default(), l.area))
        .unwrap_or_default();

    Some(JobListing {
        id,
        title: title.trim().to_string(),
        company: raw
            .company
            .and_then(|c| c.display_name)
            .unwrap_or_default(),
        location,
        area,
        description: raw.description.unwrap_or_default(),
        salary: SalaryRange {
            min: raw.salary_min,
            max: raw.salary_max,
            currency: currency.to_string(),
        },
        contract_type: raw.contract_type,
        contract_time: raw.contract_time,
        url: raw.redirect_url,
        posted_at: raw
            .created
            .as_deref()
            .and_then(|c| DateTime::parse_from_rfc3339(c).ok())
            .map(|d| d.with_timezone(&Utc)),
        category: raw.category.and_then(|c| c.label),
        source: SOURCE_NAME.to_string(),
    })
}

/// Adzuna reports salaries in the local currency of the country searched.
fn currency_for_country(country: &str) -> &'static str {
    match country {
        "gb" => "GBP",
        "us" => "USD",
        "ca" => "CAD",
        "au" => "AUD",
        "nz" => "NZD",
        "in" => "INR",
        "sg" => "SGD",
        "za" => "ZAR",
        "br" => "BRL",
        "mx" => "MXN",
        "pl" => "PLN",
        "ch" => "CHF",
        "at" | "be" | "de" | "es" | "fr" | "it" | "nl" => "EUR",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::criteria::SalaryBounds;

    const PAYLOAD: &str = r#"{
        "count": 2,
        "results": [
            {
                "id": "4412345678",
                "title": "Head of Technology",
                "company": {"display_name": "Acme Ltd"},
                "location": {"display_name": "London, UK", "area": ["UK", "London"]},
                "description": "Lead our engineering teams...",
                "salary_min": 95000,
                "salary_max": 120000,
                "redirect_url": "https://www.adzuna.co.uk/jobs/details/4412345678",
                "created": "2024-05-01T09:30:00Z",
                "category": {"label": "IT Jobs"},
                "contract_type": "permanent",
                "contract_time": "full_time"
            },
            {
                "id": 99,
                "title": "CTO",
                "description": "Early-stage startup"
            },
            {
                "id": "no-title"
            }
        ]
    }"#;

    fn client() -> AdzunaClient {
        AdzunaClient::new(AdzunaConfig {
            app_id: "id".to_string(),
            api_key: "key".to_string(),
            country: "gb".to_string(),
            results_per_page: 20,
            timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
        })
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            positions: vec!["Head of Technology".to_string(), "CTO".to_string()],
            locations: vec!["London".to_string(), "Manchester".to_string()],
            salary: SalaryBounds {
                min: Some(80_000.0),
                max: Some(150_000.0),
                currency: "GBP".to_string(),
            },
            contract_types: vec!["permanent".to_string()],
            filters: vec![],
        }
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_payload_maps_to_listings() {
        let response: SearchResponse = serde_json::from_str(PAYLOAD).unwrap();
        let listings: Vec<JobListing> = response
            .results
            .into_iter()
            .filter_map(|r| to_listing(r, "GBP"))
            .collect();

        assert_eq!(listings.len(), 2, "listing without a title is dropped");
        let first = &listings[0];
        assert_eq!(first.id, "4412345678");
        assert_eq!(first.company, "Acme Ltd");
        assert_eq!(first.area, vec!["UK", "London"]);
        assert_eq!(first.salary.max, Some(120_000.0));
        assert_eq!(first.salary.currency, "GBP");
        assert_eq!(first.contract_type.as_deref(), Some("permanent"));
        assert!(first.posted_at.is_some());
        assert_eq!(listings[1].id, "99");
        assert!(listings[1].salary.is_unknown());
    }

    #[test]
    fn test_queries_cover_each_position_and_location() {
        let queries = build_queries(&criteria());
        assert_eq!(queries.len(), 4);
        assert_eq!(
            queries[0],
            AdzunaQuery {
                what: "Head of Technology".to_string(),
                location: Some("London".to_string()),
            }
        );
    }

    #[test]
    fn test_queries_without_locations() {
        let mut c = criteria();
        c.locations.clear();
        let queries = build_queries(&c);
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|q| q.location.is_none()));
    }

    #[test]
    fn test_query_params_include_filters() {
        let client = client();
        let c = criteria();
        let params = client.query_params(&build_queries(&c)[0], &c);
        assert_eq!(param(&params, "what"), Some("Head of Technology"));
        assert_eq!(param(&params, "where"), Some("London"));
        assert_eq!(param(&params, "salary_min"), Some("80000"));
        assert_eq!(param(&params, "salary_max"), Some("150000"));
        assert_eq!(param(&params, "permanent"), Some("1"));
        assert_eq!(param(&params, "contract"), None);
    }

    #[test]
    fn test_ambiguous_contract_types_send_no_flag() {
        let client = client();
        let mut c = criteria();
        c.contract_types = vec!["permanent".to_string(), "contract".to_string()];
        let params = client.query_params(&build_queries(&c)[0], &c);
        assert_eq!(param(&params, "permanent"), None);
        assert_eq!(param(&params, "contract"), None);
    }

    #[test]
    fn test_contract_matching() {
        let response: SearchResponse = serde_json::from_str(PAYLOAD).unwrap();
        let listings: Vec<JobListing> = response
            .results
            .into_iter()
            .filter_map(|r| to_listing(r, "GBP"))
            .collect();
        let wanted = vec!["Full Time".to_string()];
        assert!(contract_matches(&listings[0], &wanted));
        assert!(contract_matches(&listings[1], &wanted), "unknown passes");
        assert!(!contract_matches(&listings[0], &["contract".to_string()]));
    }

    #[test]
    fn test_unknown_contract_type_passes_when_time_is_known() {
        let mut job = crate::job_source::testing::listing("9", "CTO", "Acme", 100_000.0, 120_000.0);
        job.contract_type = None;
        job.contract_time = Some("full_time".to_string());

        let types = vec!["permanent".to_string(), "contract".to_string()];
        assert!(contract_matches(&job, &types));
        assert!(contract_matches(&job, &["Full Time".to_string()]));
        assert!(!contract_matches(&job, &["part_time".to_string()]));

        job.contract_type = Some("contract".to_string());
        assert!(!contract_matches(&job, &["permanent".to_string()]));
        assert!(contract_matches(&job, &["permanent".to_string(), "contract".to_string(), "full_time".to_string()]));
    }

    #[test]
    fn test_search_url_uses_country() {
        assert_eq!(
            client().search_url(),
            "https://api.adzuna.com/v1/api/jobs/gb/search/1"
        );
    }
}
