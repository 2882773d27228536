//! Error types for talking to the block source and loading configuration.

use miette::Diagnostic;
use thiserror::Error;

/// Failures fetching or decoding content from the block source.
///
/// Every variant is fatal to an export run.
#[derive(Debug, Error, Diagnostic)]
pub enum SourceError {
    #[error("request to {url} failed")]
    #[diagnostic(
        code(notion::transport),
        help("check network connectivity and NOTION_API_URL")
    )]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("notion api returned {status} for {url}: {message}")]
    #[diagnostic(code(notion::api))]
    Api {
        url: String,
        status: u16,
        code: String,
        message: String,
    },

    #[error("failed to decode response from {url}")]
    #[diagnostic(code(notion::decode))]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid block json")]
    #[diagnostic(code(notion::invalid_json))]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("block {id} of kind `{kind}` has a malformed payload: {reason}")]
    #[diagnostic(code(notion::malformed_block))]
    MalformedBlock {
        id: String,
        kind: String,
        reason: String,
    },

    #[error("data source `{name}` not found in database {database_id}")]
    #[diagnostic(
        code(notion::data_source_not_found),
        help("set NOTION_DATA_SOURCE to the name of one of the database's data sources")
    )]
    DataSourceNotFound { database_id: String, name: String },

    #[error("cannot build endpoint `{path}`: {message}")]
    #[diagnostic(code(notion::endpoint))]
    Endpoint { path: String, message: String },
}

impl SourceError {
    pub(crate) fn malformed(id: &str, kind: &str, reason: impl Into<String>) -> Self {
        Self::MalformedBlock {
            id: id.to_owned(),
            kind: kind.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("missing required environment variable {var}")]
    #[diagnostic(
        code(config::missing_env),
        help("set it in the environment, in .env, or pass the matching command line flag")
    )]
    MissingEnv { var: &'static str },

    #[error("invalid URL {url}: {message}")]
    #[diagnostic(code(config::url_parse))]
    UrlParse { url: String, message: String },

    #[error("{var} must be a whole number, got `{value}`")]
    #[diagnostic(code(config::invalid_number))]
    InvalidNumber { var: &'static str, value: String },
}
