//! Content directory loading and manifest generation.
//!
//! Stage 1 of the build. Reads the JSON documents and `config.toml` from the
//! content root and produces a validated [`Manifest`] for the generator.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── config.toml          # Site configuration (optional)
//! ├── profile.json         # Name, bio, location, social links (required)
//! ├── experience.json      # Work history, newest first (optional)
//! ├── projects.json        # Project cards (optional)
//! └── assets/              # Copied verbatim to the output root (optional)
//!     ├── favicon.ico
//!     └── og-image.jpg
//! ```
//!
//! ## Validation
//!
//! - `profile.name` must be non-empty.
//! - Experience ids and project ids must be unique within their file.
//! - Social links must have a URL.

use crate::config::{self, SiteConfig};
use crate::types::{Experience, Profile, Project};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PROFILE_FILE: &str = "profile.json";
pub const EXPERIENCE_FILE: &str = "experience.json";
pub const PROJECTS_FILE: &str = "projects.json";
pub const ASSETS_DIR: &str = "assets";

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Missing required file: {0}")]
    Missing(PathBuf),
    #[error("Duplicate {kind} id {id:?} in {file}")]
    DuplicateId {
        kind: &'static str,
        id: String,
        file: &'static str,
    },
    #[error("Invalid content in {file}: {reason}")]
    Invalid { file: &'static str, reason: String },
}

/// Everything the generator needs.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub profile: Profile,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
    pub config: SiteConfig,
    /// `assets/` in the content root, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<PathBuf>,
}

pub fn load(root: &Path) -> Result<Manifest, ContentError> {
    let profile: Profile = read_json(&root.join(PROFILE_FILE))?
        .ok_or_else(|| ContentError::Missing(root.join(PROFILE_FILE)))?;
    let experience: Vec<Experience> =
        read_json(&root.join(EXPERIENCE_FILE))?.unwrap_or_default();
    let projects: Vec<Project> = read_json(&root.join(PROJECTS_FILE))?.unwrap_or_default();

    let config = config::load_config(root)?;

    let assets = root.join(ASSETS_DIR);
    let manifest = Manifest {
        profile,
        experience,
        projects,
        config,
        assets_dir: assets.is_dir().then_some(assets),
    };
    check(&manifest)?;
    Ok(manifest)
}

/// Deserialize a JSON file. `Ok(None)` if the file doesn't exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ContentError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&content).map_err(|source| ContentError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

fn check(manifest: &Manifest) -> Result<(), ContentError> {
    if manifest.profile.name.trim().is_empty() {
        return Err(ContentError::Invalid {
            file: PROFILE_FILE,
            reason: "name must not be empty".to_string(),
        });
    }
    if let Some(link) = manifest
        .profile
        .social_links
        .iter()
        .find(|l| l.url.trim().is_empty())
    {
        return Err(ContentError::Invalid {
            file: PROFILE_FILE,
            reason: format!("social link {:?} has no url", link.platform),
        });
    }
    unique_ids(
        manifest.experience.iter().map(|e| e.id.as_str()),
        "experience",
        EXPERIENCE_FILE,
    )?;
    unique_ids(
        manifest.projects.iter().map(|p| p.id.as_str()),
        "project",
        PROJECTS_FILE,
    )?;
    Ok(())
}

fn unique_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    kind: &'static str,
    file: &'static str,
) -> Result<(), ContentError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ContentError::DuplicateId {
                kind,
                id: id.to_string(),
                file,
            });
        }
    }
    Ok(())
}
