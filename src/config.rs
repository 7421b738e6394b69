//! Accessor configuration.
//!
//! Loaded from an optional JSON file; anything omitted falls back to the
//! defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Branch-reference namespace that default-branch candidates are qualified under.
pub const BRANCH_NAMESPACE: &str = "refs/heads/";
pub const TAG_NAMESPACE: &str = "refs/tags/";

/// Conventional main-line names, highest priority first.
pub const DEFAULT_BRANCH_CANDIDATES: [&str; 4] = ["master", "gh-pages", "default", "trunk"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryStrategy {
    /// libgit2 revision walker sorted by commit time.
    #[default]
    Revwalk,
    /// `git log` subprocess in the repository directory.
    GitLog,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessorConfig {
    pub default_branch_candidates: Vec<String>,
    pub history_strategy: HistoryStrategy,
    pub git_program: PathBuf,
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            default_branch_candidates: DEFAULT_BRANCH_CANDIDATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            history_strategy: HistoryStrategy::default(),
            git_program: PathBuf::from("git"),
        }
    }
}

impl AccessorConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Candidate names qualified under the branch namespace, in priority order.
    pub fn qualified_candidates(&self) -> Vec<String> {
        self.default_branch_candidates
            .iter()
            .map(|name| qualify(name, BRANCH_NAMESPACE))
            .collect()
    }
}

/// Prefix `name` with `namespace` unless it is already a full reference name.
pub fn qualify(name: &str, namespace: &str) -> String {
    if name.starts_with("refs/") {
        name.to_string()
    } else {
        format!("{}{}", namespace, name)
    }
}
