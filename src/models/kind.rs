//! Source kind definitions
//!
//! Centralized enum for the source kinds this crate models, so kind
//! names are never hardcoded as strings across the CLI and watcher.

use std::fmt;
use std::str::FromStr;

use super::git_repository::GIT_REPOSITORY_KIND;
use super::helm_chart::HELM_CHART_KIND;

/// Enumeration of supported source kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    GitRepository,
    HelmChart,
}

impl SourceKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::GitRepository => GIT_REPOSITORY_KIND,
            SourceKind::HelmChart => HELM_CHART_KIND,
        }
    }

    /// Try to parse an exact kind name, returning None if invalid
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Get all source kinds
    pub fn all() -> &'static [Self] {
        &[SourceKind::GitRepository, SourceKind::HelmChart]
    }

    /// Command aliases accepted on the command line
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            SourceKind::GitRepository => &["gitrepository", "gitrepo", "gitrepositories"],
            SourceKind::HelmChart => &["helmchart", "helmcharts", "hc"],
        }
    }

    /// Try to parse a string (case-insensitive, aliases allowed)
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.aliases().contains(&lower.as_str()))
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<SourceKind> for String {
    fn from(kind: SourceKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            GIT_REPOSITORY_KIND => Ok(SourceKind::GitRepository),
            HELM_CHART_KIND => Ok(SourceKind::HelmChart),
            _ => Err(format!("Unknown source kind: {}", s)),
        }
    }
}
