use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on the profile text sent to the language model.
const SUMMARY_MAX_CHARS: usize = 2_000;

/// One position from the work-history export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkHistoryEntry {
    pub title: String,
    pub company: String,
    pub started_on: Option<NaiveDate>,
    /// `None` for the current position.
    pub finished_on: Option<NaiveDate>,
    pub description: Option<String>,
}

/// A free-text writing sample (article or post).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritingSample {
    pub title: String,
    pub content: String,
}

/// The operator's profile, assembled once per session and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub technical_skills: BTreeSet<String>,
    pub soft_skills: BTreeSet<String>,
    pub tools: BTreeSet<String>,
    /// Role titles mentioned in the CV that are not tied to a dated position.
    pub cv_roles: BTreeSet<String>,
    pub work_history: Vec<WorkHistoryEntry>,
    pub writing_samples: Vec<WritingSample>,
    pub cv_text: String,
}

impl Profile {
    /// Every skill across the three skill sets, de-duplicated.
    pub fn all_skills(&self) -> BTreeSet<&str> {
        self.technical_skills
            .iter()
            .chain(&self.soft_skills)
            .chain(&self.tools)
            .map(String::as_str)
            .collect()
    }

    /// Role titles from the work history and the CV, de-duplicated case-insensitively.
    pub fn roles(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.work_history
            .iter()
            .map(|e| e.title.clone())
            .chain(self.cv_roles.iter().cloned())
            .filter(|r| seen.insert(r.to_lowercase()))
            .collect()
    }

    /// Whole years between the earliest dated start and the latest end (or today).
    pub fn years_of_experience(&self) -> f64 {
        self.years_of_experience_at(Utc::now().date_naive())
    }

    pub fn years_of_experience_at(&self, today: NaiveDate) -> f64 {
        let earliest = self.work_history.iter().filter_map(|e| e.started_on).min();
        let Some(earliest) = earliest else {
            return 0.0;
        };
        let latest = self
            .work_history
            .iter()
            .map(|e| e.finished_on.unwrap_or(today))
            .max()
            .unwrap_or(today);
        let months = (latest.year() - earliest.year()) * 12 + latest.month() as i32
            - earliest.month() as i32;
        (months.max(0) as f64 / 12.0).floor()
    }

    /// Compact description handed to the language model alongside each listing.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Years of experience: {}\n",
            self.years_of_experience()
        ));
        let roles = self.roles();
        if !roles.is_empty() {
            out.push_str(&format!("Roles: {}\n", roles.join(", ")));
        }
        push_set(&mut out, "Technical skills", &self.technical_skills);
        push_set(&mut out, "Soft skills", &self.soft_skills);
        push_set(&mut out, "Tools", &self.tools);
        for entry in self.work_history.iter().take(5) {
            out.push_str(&format!("- {} at {}\n", entry.title, entry.company));
        }
        if !self.writing_samples.is_empty() {
            let titles: Vec<&str> = self
                .writing_samples
                .iter()
                .take(5)
                .map(|s| s.title.as_str())
                .collect();
            out.push_str(&format!("Writing: {}\n", titles.join("; ")));
        }
        truncate_chars(&out, SUMMARY_MAX_CHARS)
    }
}

fn push_set(out: &mut String, label: &str, set: &BTreeSet<String>) {
    if !set.is_empty() {
        let items: Vec<&str> = set.iter().map(String::as_str).collect();
        out.push_str(&format!("{label}: {}\n", items.join(", ")));
    }
}

/// Truncates on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, 1)
    }

    fn entry(title: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> WorkHistoryEntry {
        WorkHistoryEntry {
            title: title.to_string(),
            company: "Acme Ltd".to_string(),
            started_on: start,
            finished_on: end,
            description: None,
        }
    }

    #[test]
    fn test_years_span_earliest_start_to_latest_end() {
        let profile = Profile {
            work_history: vec![
                entry("Engineer", date(2010, 1), date(2015, 1)),
                entry("Director", date(2015, 1), date(2022, 7)),
            ],
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(profile.years_of_experience_at(today), 12.0);
    }

    #[test]
    fn test_current_role_counts_until_today() {
        let profile = Profile {
            work_history: vec![entry("CTO", date(2020, 1), None)],
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(profile.years_of_experience_at(today), 6.0);
    }

    #[test]
    fn test_no_dates_means_zero_years() {
        let profile = Profile {
            work_history: vec![entry("CTO", None, None)],
            ..Default::default()
        };
        assert_eq!(profile.years_of_experience(), 0.0);
    }

    #[test]
    fn test_roles_deduplicate_case_insensitively() {
        let mut profile = Profile {
            work_history: vec![entry("Director", None, None)],
            ..Default::default()
        };
        profile.cv_roles.insert("DIRECTOR".to_string());
        profile.cv_roles.insert("Architect".to_string());
        assert_eq!(profile.roles(), vec!["Director", "Architect"]);
    }

    #[test]
    fn test_summary_is_bounded() {
        let mut profile = Profile::default();
        for i in 0..2_000 {
            profile.technical_skills.insert(format!("Skill{i}"));
        }
        assert!(profile.summary().chars().count() <= SUMMARY_MAX_CHARS);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
