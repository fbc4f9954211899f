//! Fixture loading and management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Function being tested.
    pub function: String,
    /// POSIX/C spec section reference.
    pub spec_section: String,
    /// Input parameters. Byte strings are JSON arrays (taken verbatim) or
    /// JSON strings (a NUL is appended).
    pub inputs: serde_json::Value,
    /// Expected output, rendered the way [`crate::exec`] renders results.
    pub expected_output: String,
    /// Expected errno after the call.
    pub expected_errno: i32,
    /// `strict`, `hardened`, or `both`.
    pub mode: String,
}

impl FixtureCase {
    /// Whether this case runs under `active_mode`.
    #[must_use]
    pub fn applies_to(&self, active_mode: &str) -> bool {
        self.mode.eq_ignore_ascii_case(active_mode) || self.mode.eq_ignore_ascii_case("both")
    }
}

/// A collection of fixture cases for a function family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Function family name.
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

/// Failure to read or parse fixture files.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed parsing '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no fixture JSON files found in {0}")]
    Empty(PathBuf),
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| FixtureError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load every `*.json` fixture set under `dir`, sorted by file name.
///
/// A path naming a single file loads just that file.
pub fn load_fixture_sets(path: &Path) -> Result<Vec<FixtureSet>, FixtureError> {
    if path.is_file() {
        return Ok(vec![FixtureSet::from_file(path)?]);
    }

    let entries = std::fs::read_dir(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(FixtureError::Empty(path.to_path_buf()));
    }
    paths.iter().map(|p| FixtureSet::from_file(p)).collect()
}
