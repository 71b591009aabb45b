//! Profile Loader: reads the operator's documents from a fixed directory
//! layout into an immutable `Profile`.
//!
//! ```text
//! <profile_dir>/cv.txt | cv.pdf            required
//! <profile_dir>/skills.json                optional {technical, soft, tools}
//! <profile_dir>/linkedin_experience.json   optional {positions: [...]}
//! <profile_dir>/medium_posts.json          optional [{title, content}]
//! ```

pub mod extract;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::models::profile::{Profile, WorkHistoryEntry, WritingSample};

const CV_TEXT: &str = "cv.txt";
const CV_PDF: &str = "cv.pdf";
const SKILLS: &str = "skills.json";
const LINKEDIN_EXPERIENCE: &str = "linkedin_experience.json";
const MEDIUM_POSTS: &str = "medium_posts.json";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("required profile document missing: {0}")]
    MissingDocument(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed profile document {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        AppError::Configuration(e.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
struct SkillsDocument {
    #[serde(default)]
    technical: Vec<String>,
    #[serde(default)]
    soft: Vec<String>,
    #[serde(default)]
    tools: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExperienceDocument {
    #[serde(default)]
    positions: Vec<PositionRecord>,
}

#[derive(Debug, Deserialize)]
struct PositionRecord {
    title: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    started_on: Option<String>,
    #[serde(default)]
    finished_on: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostRecord {
    title: String,
    #[serde(default)]
    content: String,
}

/// Loads a `Profile` from the fixed document set in one directory.
#[derive(Debug, Clone)]
pub struct ProfileLoader {
    dir: PathBuf,
}

impl ProfileLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Reads every document. The CV is required; the rest are optional.
    pub async fn load(&self) -> Result<Profile, ProfileError> {
        let dir = self.dir.clone();
        // pdf-extract and std::fs are blocking.
        tokio::task::spawn_blocking(move || load_blocking(&dir))
            .await
            .map_err(|e| ProfileError::Malformed {
                path: self.dir.clone(),
                message: format!("profile loading task failed: {e}"),
            })?
    }
}

fn load_blocking(dir: &Path) -> Result<Profile, ProfileError> {
    let cv_text = read_cv(dir)?;

    let mut profile = Profile {
        technical_skills: extract::technical_skills(&cv_text),
        soft_skills: extract::soft_skills(&cv_text),
        cv_roles: extract::roles(&cv_text),
        ..Default::default()
    };

    if let Some(skills) = read_optional_json::<SkillsDocument>(&dir.join(SKILLS))? {
        profile.technical_skills.extend(normalize(skills.technical));
        profile.soft_skills.extend(normalize(skills.soft));
        profile.tools.extend(normalize(skills.tools));
    }

    if let Some(experience) =
        read_optional_json::<ExperienceDocument>(&dir.join(LINKEDIN_EXPERIENCE))?
    {
        profile.work_history = experience
            .positions
            .into_iter()
            .map(|p| WorkHistoryEntry {
                title: extract::canonical_case(p.title.trim()),
                company: p.company.trim().to_string(),
                started_on: p.started_on.as_deref().and_then(parse_partial_date),
                finished_on: p.finished_on.as_deref().and_then(parse_partial_date),
                description: p.description,
            })
            .collect();
    }

    if let Some(posts) = read_optional_json::<Vec<PostRecord>>(&dir.join(MEDIUM_POSTS))? {
        profile.writing_samples = posts
            .into_iter()
            .map(|p| WritingSample {
                title: p.title,
                content: p.content,
            })
            .collect();
    }

    profile.cv_text = cv_text;

    info!(
        "Profile loaded from {}: {} skills, {} positions, {} writing samples",
        dir.display(),
        profile.all_skills().len(),
        profile.work_history.len(),
        profile.writing_samples.len()
    );
    Ok(profile)
}

fn read_cv(dir: &Path) -> Result<String, ProfileError> {
    let text_path = dir.join(CV_TEXT);
    if text_path.is_file() {
        return std::fs::read_to_string(&text_path).map_err(|source| ProfileError::Io {
            path: text_path,
            source,
        });
    }

    let pdf_path = dir.join(CV_PDF);
    if pdf_path.is_file() {
        debug!("Extracting CV text from {}", pdf_path.display());
        return pdf_extract::extract_text(&pdf_path).map_err(|e| ProfileError::Malformed {
            path: pdf_path,
            message: e.to_string(),
        });
    }

    Err(ProfileError::MissingDocument(text_path))
}

fn read_optional_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ProfileError> {
    if !path.is_file() {
        warn!("Optional profile document not found: {}", path.display());
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| ProfileError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

fn normalize(items: Vec<String>) -> BTreeSet<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(extract::canonical_case)
        .collect()
}

/// Accepts `YYYY`, `YYYY-MM` or `YYYY-MM-DD`; partial dates resolve to the first day.
fn parse_partial_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let mut parts = raw.split('-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next().map(|m| m.parse::<u32>().ok()).unwrap_or(Some(1))?;
    let day = parts.next().map(|d| d.parse::<u32>().ok()).unwrap_or(Some(1))?;
    NaiveDate::from_ymd_opt(year, month, day)
}
