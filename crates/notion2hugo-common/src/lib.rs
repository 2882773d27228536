//! Shared pieces of the notion2hugo exporter: the Notion content model, the
//! collaborator traits the renderer walks the tree through, the HTTP client
//! implementing them, and configuration.

pub mod client;
pub mod config;
pub mod error;
pub mod source;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::client::NotionClient;
pub use crate::config::ExportConfig;
pub use crate::error::{ConfigError, SourceError};
pub use crate::source::{BlockSource, MemoryBlockSource, PageSource};
pub use crate::types::{
    Annotations, Block, BlockKind, CodeBlock, DataSourceRef, DateRange, ImageBlock, ImageOrigin,
    Page, PropertyValue, RichText, SelectOption, TextRun,
};
