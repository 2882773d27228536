//! notion2hugo renderer
//!
//! Turns a tree of Notion blocks into Hugo page bundles: a Markdown body with
//! front matter, plus any images the page embeds downloaded next to it.
//!

pub mod assets;
pub mod error;
pub mod notion;
pub mod static_site;
pub mod utils;

pub use crate::assets::{AssetExtractor, HttpAssetExtractor};
pub use crate::error::{AssetError, ExportError, FrontMatterError};
pub use crate::notion::{MarkdownConverter, render_inline};
pub use crate::static_site::{ExportOptions, ExportSummary, StaticSiteExporter};
