//! Vocabulary-based extraction of skills and role titles from free text.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

const TECHNICAL_SKILLS: &[&str] = &[
    "Python", "Java", "Rust", "Go", "AWS", "Azure", "GCP", "Cloud", "AI", "ML", "DevOps",
    "Agile", "Kubernetes", "Docker", "Microservices", "Terraform", "SQL", "Data Platform",
    "Machine Learning", "Project Management",
];

const SOFT_SKILLS: &[&str] = &[
    "Leadership", "Management", "Communication", "Strategy", "Vision", "Innovation",
    "Problem Solving", "Team Building", "Stakeholder Management", "Mentoring",
];

const ROLE_TITLES: &[&str] = &[
    "Technical Program Manager", "Program Director", "Program Manager", "Head of Technology",
    "Head of Engineering", "Engineering Manager", "Director", "Engineer", "Head", "Lead",
    "Architect", "CTO", "CIO", "VP Engineering",
];

fn vocabulary_regex(cell: &'static OnceLock<Regex>, words: &[&str]) -> &'static Regex {
    cell.get_or_init(|| {
        // Longest first so "Program Manager" wins over "Manager".
        let mut sorted: Vec<&str> = words.to_vec();
        sorted.sort_by_key(|w| std::cmp::Reverse(w.len()));
        let alternation = sorted
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b({alternation})\b")).expect("vocabulary regex is valid")
    })
}

fn find_all(re: &Regex, text: &str) -> BTreeSet<String> {
    re.find_iter(text)
        .map(|m| canonical_case(m.as_str()))
        .collect()
}

/// Technical skills mentioned in `text`.
pub fn technical_skills(text: &str) -> BTreeSet<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    find_all(vocabulary_regex(&RE, TECHNICAL_SKILLS), text)
}

/// Soft skills mentioned in `text`.
pub fn soft_skills(text: &str) -> BTreeSet<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    find_all(vocabulary_regex(&RE, SOFT_SKILLS), text)
}

/// Role titles mentioned in `text`.
pub fn roles(text: &str) -> BTreeSet<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    find_all(vocabulary_regex(&RE, ROLE_TITLES), text)
}

/// Minimum years of experience a description asks for ("5+ years", "10 years of").
pub fn required_years(text: &str) -> Option<f64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:years|yrs)\b").expect("years regex is valid")
    });
    re.captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse::<f64>().ok())
        .filter(|y| *y > 0.0)
        .reduce(f64::max)
}

/// Title-cases each word, keeping all-caps acronyms (AWS, CTO) intact.
pub fn canonical_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            if word.len() <= 4 && word.chars().all(|c| c.is_ascii_uppercase()) {
                return word.to_string();
            }
            if let Some(known) = acronym(word) {
                return known.to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn acronym(word: &str) -> Option<&'static str> {
    const ACRONYMS: &[&str] = &["AI", "ML", "AWS", "GCP", "SQL", "CTO", "CIO", "VP"];
    ACRONYMS
        .iter()
        .find(|a| a.eq_ignore_ascii_case(word))
        .copied()
}
