//! Shared test utilities for the folio test suite.
//!
//! Provides fixture setup and lookup helpers over the loaded [`Manifest`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = content::load(tmp.path()).unwrap();
//!
//! let project = find_project(&manifest, "netpulse");
//! assert!(project.featured);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::content::Manifest;
use crate::types::{Experience, Project};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    for entry in walkdir::WalkDir::new(&fixtures) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(&fixtures).unwrap();
        let dst = tmp.path().join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dst).unwrap();
        } else {
            std::fs::copy(entry.path(), &dst).unwrap();
        }
    }
    tmp
}

/// Load the fixture manifest directly, for tests that don't touch files.
pub fn fixture_manifest() -> Manifest {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    crate::content::load(&fixtures).unwrap()
}

// =========================================================================
// Manifest lookups: panic with a clear message on miss
// =========================================================================

/// Find a project by id. Panics if not found.
pub fn find_project<'a>(manifest: &'a Manifest, id: &str) -> &'a Project {
    manifest
        .projects
        .iter()
        .find(|p| p.id == id)
        .unwrap_or_else(|| {
            let ids: Vec<&str> = manifest.projects.iter().map(|p| p.id.as_str()).collect();
            panic!("project '{id}' not found. Available: {ids:?}")
        })
}

/// Find an experience entry by id. Panics if not found.
pub fn find_experience<'a>(manifest: &'a Manifest, id: &str) -> &'a Experience {
    manifest
        .experience
        .iter()
        .find(|e| e.id == id)
        .unwrap_or_else(|| {
            let ids: Vec<&str> = manifest.experience.iter().map(|e| e.id.as_str()).collect();
            panic!("experience '{id}' not found. Available: {ids:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All company names in file order.
pub fn experience_companies(manifest: &Manifest) -> Vec<&str> {
    manifest
        .experience
        .iter()
        .map(|e| e.company.as_str())
        .collect()
}

/// All project titles in file order.
pub fn project_titles(manifest: &Manifest) -> Vec<&str> {
    manifest.projects.iter().map(|p| p.title.as_str()).collect()
}
