use std::path::PathBuf;

use miette::Diagnostic;
use notion2hugo_common::SourceError;
use thiserror::Error;

/// Top-level error for an export run. Every variant aborts the run.
#[derive(Debug, Error, Diagnostic)]
pub enum ExportError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    FrontMatter(#[from] FrontMatterError),

    #[error("failed to write {}", path.display())]
    #[diagnostic(code(export::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Page properties that cannot be turned into front matter.
#[derive(Debug, Error, Diagnostic)]
pub enum FrontMatterError {
    #[error("page {page_id} is missing required property `{property}`")]
    #[diagnostic(
        code(front_matter::missing_property),
        help("every exported page needs a non-empty title and a date")
    )]
    MissingProperty {
        page_id: String,
        property: &'static str,
    },

    #[error("page {page_id} property `{property}` is not of type {expected}")]
    #[diagnostic(code(front_matter::wrong_type))]
    WrongType {
        page_id: String,
        property: &'static str,
        expected: &'static str,
    },

    #[error("page {page_id} has slug `{slug}`, which is not a single directory name")]
    #[diagnostic(
        code(front_matter::invalid_slug),
        help("slugs may not contain path separators, `.` or `..`")
    )]
    InvalidSlug { page_id: String, slug: String },

    #[error("failed to serialize front matter: {message}")]
    #[diagnostic(code(front_matter::emit))]
    Emit { message: String },
}

/// A failed asset download. Never fatal: the renderer logs it and moves on.
#[derive(Debug, Error, Diagnostic)]
pub enum AssetError {
    #[error("failed to download {filename} from {url}")]
    #[diagnostic(code(asset::network))]
    Network {
        url: String,
        filename: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("download of {filename} from {url} returned HTTP {status}")]
    #[diagnostic(code(asset::status))]
    Status {
        url: String,
        filename: String,
        status: u16,
    },

    #[error("failed to save asset to {}", path.display())]
    #[diagnostic(code(asset::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssetError {
    /// Whether trying the same download again could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AssetError::Network { .. } => true,
            AssetError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            AssetError::Io { .. } => false,
        }
    }
}
