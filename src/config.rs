use std::fmt;

use anyhow::Context as _;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.botify.com";

pub const ENV_API_URL: &str = "BOTIFY_API_URL";
pub const ENV_API_TOKEN: &str = "BOTIFY_API_TOKEN";
pub const ENV_ORGANIZATION: &str = "BOTIFY_ORGANIZATION";
pub const ENV_DEBUG: &str = "BOTIFY_DEBUG";

/// Settings loaded once at startup and shared read-only for the whole run.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub token: String,
    pub organization: String,
    /// Echo HTTP status codes under error lines.
    pub debug: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("organization", &self.organization)
            .field("debug", &self.debug)
            .finish()
    }
}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> anyhow::Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(err).context("load .env"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = get(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let parsed = Url::parse(&api_url).with_context(|| format!("parse {ENV_API_URL}"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("{ENV_API_URL} must be http/https: {api_url}");
        }

        let token =
            get(ENV_API_TOKEN).ok_or_else(|| anyhow::anyhow!("{ENV_API_TOKEN} is not set"))?;
        let organization = get(ENV_ORGANIZATION)
            .ok_or_else(|| anyhow::anyhow!("{ENV_ORGANIZATION} is not set"))?;
        let debug = get(ENV_DEBUG).is_some_and(|value| parse_bool(&value));

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_owned(),
            token,
            organization,
            debug,
        })
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
