use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Requested salary band. Bounds are optional. An empty currency is filled in
/// by `SearchCriteria::merged_over`, falling back to GBP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryBounds {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub currency: String,
}

const FALLBACK_CURRENCY: &str = "GBP";

/// A named post-fetch filter. Every set field must hold for a listing to pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    pub name: String,
    #[serde(default)]
    pub min_salary: Option<f64>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Everything a caller can ask for when starting a search session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub positions: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub salary: SalaryBounds,
    #[serde(default)]
    pub contract_types: Vec<String>,
    #[serde(default)]
    pub filters: Vec<FilterRule>,
}

impl SearchCriteria {
    /// Fills every empty field from `defaults`. Fields the caller set win.
    pub fn merged_over(mut self, defaults: &SearchCriteria) -> Self {
        if self.positions.is_empty() {
            self.positions = defaults.positions.clone();
        }
        if self.locations.is_empty() {
            self.locations = defaults.locations.clone();
        }
        if self.salary.min.is_none() && self.salary.max.is_none() {
            self.salary.min = defaults.salary.min;
            self.salary.max = defaults.salary.max;
        }
        if self.salary.currency.trim().is_empty() {
            self.salary.currency = defaults.salary.currency.clone();
        }
        self.salary.currency = match self.salary.currency.trim() {
            "" => FALLBACK_CURRENCY.to_string(),
            code => code.to_uppercase(),
        };
        if self.contract_types.is_empty() {
            self.contract_types = defaults.contract_types.clone();
        }
        if self.filters.is_empty() {
            self.filters = defaults.filters.clone();
        }
        self.positions = clean(self.positions);
        self.locations = clean(self.locations);
        self.contract_types = clean(self.contract_types);
        self
    }

    /// Rejects criteria that cannot drive a search.
    pub fn validate(&self) -> Result<(), String> {
        if self.positions.iter().all(|p| p.trim().is_empty()) {
            return Err("at least one position is required".to_string());
        }
        if let (Some(min), Some(max)) = (self.salary.min, self.salary.max) {
            if min > max {
                return Err(format!(
                    "salary.min ({min}) must not exceed salary.max ({max})"
                ));
            }
        }
        if self.salary.min.is_some_and(|v| v < 0.0) || self.salary.max.is_some_and(|v| v < 0.0) {
            return Err("salary bounds must be non-negative".to_string());
        }
        Ok(())
    }

    /// Reads default criteria from a YAML file. A missing file yields empty defaults.
    pub fn load_defaults(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read search config {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("Invalid search config {}", path.display()))
    }
}

/// Drops blank entries left behind by comma-split form fields.
fn clean(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> SearchCriteria {
        SearchCriteria {
            positions: vec!["CTO".to_string()],
            locations: vec!["London".to_string()],
            salary: SalaryBounds {
                min: Some(90_000.0),
                max: None,
                currency: "GBP".to_string(),
            },
            contract_types: vec!["permanent".to_string()],
            filters: vec![FilterRule {
                name: "senior".to_string(),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_merge_keeps_caller_fields() {
        let request = SearchCriteria {
            positions: vec!["Head of Technology".to_string()],
            ..Default::default()
        };
        let merged = request.merged_over(&defaults());
        assert_eq!(merged.positions, vec!["Head of Technology"]);
        assert_eq!(merged.locations, vec!["London"]);
        assert_eq!(merged.salary.min, Some(90_000.0));
        assert_eq!(merged.filters.len(), 1);
    }

    #[test]
    fn test_merge_drops_blank_entries() {
        let request = SearchCriteria {
            positions: vec!["CTO".to_string(), " ".to_string(), "".to_string()],
            locations: vec![" Leeds ".to_string()],
            ..Default::default()
        };
        let merged = request.merged_over(&SearchCriteria::default());
        assert_eq!(merged.positions, vec!["CTO"]);
        assert_eq!(merged.locations, vec!["Leeds"]);
    }

    #[test]
    fn test_validate_requires_position() {
        let err = SearchCriteria::default().validate().unwrap_err();
        assert!(err.contains("position"));
    }

    #[test]
    fn test_validate_rejects_inverted_salary() {
        let criteria = SearchCriteria {
            positions: vec!["CTO".to_string()],
            salary: SalaryBounds {
                min: Some(150_000.0),
                max: Some(80_000.0),
                currency: "GBP".to_string(),
            },
            ..Default::default()
        };
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn test_load_defaults_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search_config.yaml");
        std::fs::write(
            &path,
            "positions: [CTO, VP Engineering]\n\
             locations: [London]\n\
             salary: {min: 100000}\n\
             filters:\n  - name: high-salary\n    min_salary: 150000\n",
        )
        .unwrap();
        let defaults = SearchCriteria::load_defaults(&path).unwrap();
        assert_eq!(defaults.positions, vec!["CTO", "VP Engineering"]);
        assert_eq!(defaults.salary.min, Some(100_000.0));
        assert!(defaults.salary.currency.is_empty());
        assert_eq!(defaults.filters[0].min_salary, Some(150_000.0));
    }

    #[test]
    fn test_missing_defaults_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let defaults = SearchCriteria::load_defaults(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(defaults, SearchCriteria::default());
    }

    #[test]
    fn test_deserialize_minimal_document() {
        let json = r#"{"positions": ["Head of Technology"], "salary": {"min": 80000}}"#;
        let criteria: SearchCriteria = serde_json::from_str(json).unwrap();
        assert!(criteria.salary.currency.is_empty());
        assert_eq!(criteria.salary.min, Some(80_000.0));
        assert!(criteria.locations.is_empty());

        let merged = criteria.merged_over(&SearchCriteria::default());
        assert_eq!(merged.salary.currency, "GBP");
    }

    #[test]
    fn test_merge_keeps_requested_currency_with_default_bounds() {
        let json = r#"{"positions": ["CTO"], "salary": {"currency": "usd"}}"#;
        let request: SearchCriteria = serde_json::from_str(json).unwrap();
        let merged = request.merged_over(&defaults());
        assert_eq!(merged.salary.currency, "USD");
        assert_eq!(merged.salary.min, Some(90_000.0));
    }

    #[test]
    fn test_merge_takes_default_currency_when_unset() {
        let mut defaults = defaults();
        defaults.salary.currency = "EUR".to_string();
        let request = SearchCriteria {
            positions: vec!["CTO".to_string()],
            salary: SalaryBounds {
                min: Some(120_000.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let merged = request.merged_over(&defaults);
        assert_eq!(merged.salary.currency, "EUR");
        assert_eq!(merged.salary.min, Some(120_000.0));
        assert_eq!(merged.salary.max, None);
    }
}
