use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const TOKEN_VAR: &str = "NOTION_TOKEN";
pub const DATABASE_ID_VAR: &str = "NOTION_DATABASE_ID";
pub const DATA_SOURCE_VAR: &str = "NOTION_DATA_SOURCE";
pub const API_URL_VAR: &str = "NOTION_API_URL";
pub const OUTPUT_VAR: &str = "NOTION2HUGO_OUTPUT";
pub const ASSET_TIMEOUT_VAR: &str = "NOTION2HUGO_ASSET_TIMEOUT_SECS";

/// Everything an export run needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Integration token sent as a bearer credential.
    pub token: String,
    pub database_id: String,
    /// Name of the data source inside the database whose pages are exported.
    pub data_source: String,
    /// Base URL of the REST API, always ending in `/`.
    pub api_url: Url,
    /// Directory the page bundles are written under.
    pub output_dir: PathBuf,
    /// Upper bound on a single asset download.
    pub asset_timeout: Duration,
}

impl ExportConfig {
    pub const DEFAULT_API_URL: &'static str = "https://api.notion.com/v1/";
    pub const DEFAULT_DATA_SOURCE: &'static str = "Posts";
    pub const DEFAULT_OUTPUT_DIR: &'static str = "content/posts";
    pub const DEFAULT_ASSET_TIMEOUT_SECS: u64 = 30;

    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `NOTION_TOKEN`: integration token
    /// - `NOTION_DATABASE_ID`: database holding the posts
    ///
    /// Optional env vars:
    /// - `NOTION_DATA_SOURCE` (default: `Posts`)
    /// - `NOTION_API_URL` (default: `https://api.notion.com/v1/`)
    /// - `NOTION2HUGO_OUTPUT` (default: `content/posts`)
    /// - `NOTION2HUGO_ASSET_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup, so callers
    /// can layer command line values over the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup(TOKEN_VAR).ok_or(ConfigError::MissingEnv { var: TOKEN_VAR })?;
        let database_id = lookup(DATABASE_ID_VAR).ok_or(ConfigError::MissingEnv {
            var: DATABASE_ID_VAR,
        })?;
        let data_source =
            lookup(DATA_SOURCE_VAR).unwrap_or_else(|| Self::DEFAULT_DATA_SOURCE.to_string());

        let mut api_url_str =
            lookup(API_URL_VAR).unwrap_or_else(|| Self::DEFAULT_API_URL.to_string());
        // Url::join drops the last path segment unless the base ends in a slash
        if !api_url_str.ends_with('/') {
            api_url_str.push('/');
        }
        let api_url = Url::parse(&api_url_str).map_err(|e| ConfigError::UrlParse {
            url: api_url_str.clone(),
            message: e.to_string(),
        })?;

        let output_dir = lookup(OUTPUT_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_OUTPUT_DIR));

        let asset_timeout = match lookup(ASSET_TIMEOUT_VAR) {
            Some(value) => {
                let secs = value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                    var: ASSET_TIMEOUT_VAR,
                    value: value.clone(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(Self::DEFAULT_ASSET_TIMEOUT_SECS),
        };

        Ok(Self {
            token,
            database_id,
            data_source,
            api_url,
            output_dir,
            asset_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config =
            ExportConfig::from_lookup(lookup(&[(TOKEN_VAR, "secret"), (DATABASE_ID_VAR, "db")]))
                .unwrap();

        assert_eq!(config.token, "secret");
        assert_eq!(config.database_id, "db");
        assert_eq!(config.data_source, "Posts");
        assert_eq!(config.api_url.as_str(), "https://api.notion.com/v1/");
        assert_eq!(config.output_dir, PathBuf::from("content/posts"));
        assert_eq!(config.asset_timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_token_is_reported() {
        let err = ExportConfig::from_lookup(lookup(&[(DATABASE_ID_VAR, "db")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv { var: TOKEN_VAR }));
    }

    #[test]
    fn api_url_gets_trailing_slash() {
        let config = ExportConfig::from_lookup(lookup(&[
            (TOKEN_VAR, "t"),
            (DATABASE_ID_VAR, "db"),
            (API_URL_VAR, "http://127.0.0.1:9000/v1"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:9000/v1/");
        assert_eq!(
            config.api_url.join("blocks/x/children").unwrap().as_str(),
            "http://127.0.0.1:9000/v1/blocks/x/children"
        );
    }

    #[test]
    fn rejects_bad_timeout() {
        let err = ExportConfig::from_lookup(lookup(&[
            (TOKEN_VAR, "t"),
            (DATABASE_ID_VAR, "db"),
            (ASSET_TIMEOUT_VAR, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }
}
