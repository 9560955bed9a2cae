use serde::{Deserialize, Serialize};

/// One data row of the input CSV. Columns are positional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub start_url: String,
    pub project_name: String,
    /// Passed through to the API untouched.
    pub max_pages: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateProjectRequest {
    pub name: String,
    pub start_url: String,
    pub max_nb_pages: String,
    pub owner: String,
    pub with_scheduling: String,
    pub crawl_subdomains: String,
}

impl CreateProjectRequest {
    pub fn new(row: &CsvRow, owner: &str) -> Self {
        Self {
            name: row.project_name.clone(),
            start_url: row.start_url.clone(),
            max_nb_pages: row.max_pages.clone(),
            owner: owner.to_owned(),
            with_scheduling: "off".to_owned(),
            crawl_subdomains: "on".to_owned(),
        }
    }
}

/// Body of a `201` from `POST /v1/projects`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedProject {
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "creationDate")]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
}

/// Body of a `201` from `POST /v1/analyses/{org}/{project}/create/launch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchedAnalysis {
    pub analysis_slug: String,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCreationResult {
    pub status_code: u16,
    /// Present only when `status_code` is 201.
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlLaunchResult {
    pub status_code: u16,
    /// Present only when `status_code` is 201.
    pub analysis_slug: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rows: usize,
    pub created: usize,
    pub launched: usize,
    pub failed: usize,
}
