use anyhow::Context as _;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::config::Config;
use crate::error::{Stage, StageError};
use crate::formats::{
    CrawlLaunchResult, CreateProjectRequest, CreatedProject, CsvRow, LaunchedAnalysis,
    ProjectCreationResult,
};

/// The two remote operations a row goes through.
///
/// A non-201 status is a normal result, not an error; `Err` is reserved for
/// calls that produced nothing the pipeline can act on.
pub trait ProjectService {
    fn create_project(&self, row: &CsvRow) -> Result<ProjectCreationResult, StageError>;

    fn launch_crawl(&self, project_slug: &str) -> Result<CrawlLaunchResult, StageError>;
}

pub fn projects_endpoint(api_url: &str) -> String {
    let api_url = api_url.trim_end_matches('/');
    format!("{api_url}/v1/projects")
}

pub fn launch_endpoint(api_url: &str, organization: &str, project_slug: &str) -> String {
    let api_url = api_url.trim_end_matches('/');
    format!("{api_url}/v1/analyses/{organization}/{project_slug}/create/launch")
}

pub struct BotifyClient {
    http: reqwest::blocking::Client,
    api_url: String,
    organization: String,
}

impl BotifyClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Token {}", config.token))
            .context("build authorization header")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .build()
            .context("build http client")?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            organization: config.organization.clone(),
        })
    }
}

impl ProjectService for BotifyClient {
    fn create_project(&self, row: &CsvRow) -> Result<ProjectCreationResult, StageError> {
        let stage = Stage::CreateProject;
        let endpoint = projects_endpoint(&self.api_url);
        let payload = CreateProjectRequest::new(row, &self.organization);
        tracing::debug!(%endpoint, name = %payload.name, "POST create project");

        let response = self
            .http
            .post(&endpoint)
            .json(&payload)
            .send()
            .map_err(|source| StageError::Network { stage, source })?;

        let status = response.status();
        if status != StatusCode::CREATED {
            tracing::debug!(%status, "create project rejected");
            return Ok(ProjectCreationResult {
                status_code: status.as_u16(),
                slug: None,
            });
        }

        let raw = response
            .text()
            .map_err(|source| StageError::Network { stage, source })?;
        let project: CreatedProject =
            serde_json::from_str(&raw).map_err(|source| StageError::Decode { stage, source })?;

        Ok(ProjectCreationResult {
            status_code: status.as_u16(),
            slug: Some(project.slug),
        })
    }

    fn launch_crawl(&self, project_slug: &str) -> Result<CrawlLaunchResult, StageError> {
        let stage = Stage::LaunchCrawl;
        let endpoint = launch_endpoint(&self.api_url, &self.organization, project_slug);
        tracing::debug!(%endpoint, "POST launch crawl");

        let response = self
            .http
            .post(&endpoint)
            .send()
            .map_err(|source| StageError::Network { stage, source })?;

        let status = response.status();
        if status != StatusCode::CREATED {
            tracing::debug!(%status, "launch crawl rejected");
            return Ok(CrawlLaunchResult {
                status_code: status.as_u16(),
                analysis_slug: None,
            });
        }

        let raw = response
            .text()
            .map_err(|source| StageError::Network { stage, source })?;
        let analysis: LaunchedAnalysis =
            serde_json::from_str(&raw).map_err(|source| StageError::Decode { stage, source })?;

        Ok(CrawlLaunchResult {
            status_code: status.as_u16(),
            analysis_slug: Some(analysis.analysis_slug),
        })
    }
}
