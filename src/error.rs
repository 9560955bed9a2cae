use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CreateProject,
    LaunchCrawl,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateProject => f.write_str("create project"),
            Self::LaunchCrawl => f.write_str("launch crawl"),
        }
    }
}

/// A remote call that did not produce an HTTP status the pipeline can act on.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{stage}: request failed: {source}")]
    Network {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },
    #[error("{stage}: decode response body: {source}")]
    Decode {
        stage: Stage,
        #[source]
        source: serde_json::Error,
    },
}

impl StageError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Network { stage, .. } | Self::Decode { stage, .. } => *stage,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("line {line}: {reason}")]
pub struct MalformedRow {
    pub line: u64,
    pub reason: String,
    /// Whatever columns could be read, in order.
    pub fields: Vec<String>,
}

/// Why a row stopped before its crawl was launched.
#[derive(Debug, Error)]
pub enum RowFailure {
    #[error("malformed row: {0}")]
    Malformed(#[from] MalformedRow),
    #[error("max pages is not a whole number: {value:?}")]
    InvalidMaxPages { value: String },
    #[error("project creation returned status {status}")]
    ProjectCreation { status: u16 },
    #[error("crawl launch returned status {status}")]
    CrawlLaunch { status: u16 },
    #[error(transparent)]
    Transport(#[from] StageError),
}

impl RowFailure {
    /// HTTP status echoed in debug output, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ProjectCreation { status } | Self::CrawlLaunch { status } => Some(*status),
            Self::Malformed(_) | Self::InvalidMaxPages { .. } | Self::Transport(_) => None,
        }
    }
}
