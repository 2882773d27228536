//! Static site export
//!
//! Writes each page of a Notion data source as a Hugo page bundle:
//! `<output>/<slug>/index.md` holding front matter plus the rendered body,
//! with the page's images saved beside it. Pages are exported one at a time
//! in the order the data source returns them, and the first fatal error stops
//! the run.

pub mod front_matter;
pub mod writer;

use std::path::PathBuf;

use notion2hugo_common::{BlockSource, ExportConfig, Page, PageSource};
use tracing::Instrument;

use crate::assets::AssetExtractor;
use crate::error::ExportError;
use crate::notion::MarkdownConverter;
use crate::static_site::front_matter::FrontMatter;
use crate::static_site::writer::{render_document, write_atomically};

pub const INDEX_FILE: &str = "index.md";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Directory the page bundles are created in.
    pub output_dir: PathBuf,
    pub database_id: String,
    /// Name of the data source inside the database.
    pub data_source: String,
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            database_id: config.database_id.clone(),
            data_source: config.data_source.clone(),
        }
    }
}

/// Outcome of exporting one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPage {
    pub path: PathBuf,
    pub failed_assets: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Written `index.md` files, in export order.
    pub pages: Vec<PathBuf>,
    pub failed_assets: usize,
}

pub struct StaticSiteExporter<'a, S, X> {
    source: &'a S,
    assets: &'a X,
    options: ExportOptions,
}

impl<'a, S, X> StaticSiteExporter<'a, S, X>
where
    S: BlockSource + PageSource,
    X: AssetExtractor,
{
    pub fn new(source: &'a S, assets: &'a X, options: ExportOptions) -> Self {
        Self {
            source,
            assets,
            options,
        }
    }

    /// Export every page of the configured data source.
    pub async fn export_all(&self) -> Result<ExportSummary, ExportError> {
        let data_source_id = self
            .source
            .resolve_data_source(&self.options.database_id, &self.options.data_source)
            .await?;
        let pages = self.source.query_pages(&data_source_id).await?;
        tracing::info!(
            data_source = %self.options.data_source,
            count = pages.len(),
            "exporting pages"
        );

        let mut summary = ExportSummary::default();
        for page in &pages {
            let exported = self.export_page(page).await?;
            summary.failed_assets += exported.failed_assets;
            summary.pages.push(exported.path);
        }
        Ok(summary)
    }

    /// Render one page into its bundle directory and write `index.md`.
    pub async fn export_page(&self, page: &Page) -> Result<ExportedPage, ExportError> {
        let front_matter = FrontMatter::from_page(page)?;
        let slug = front_matter.slug().unwrap_or_else(|| page.id.clone());

        async {
            let page_dir = self.options.output_dir.join(&slug);
            let converter = MarkdownConverter::new(self.source, self.assets);
            let body = converter.render_subtree(&page.id, &page_dir).await?;

            let document = render_document(&front_matter.to_yaml()?, &body);
            let path = page_dir.join(INDEX_FILE);
            write_atomically(&path, &document).await?;

            let failed_assets = converter.failed_assets();
            tracing::info!(path = %path.display(), failed_assets, "exported page");
            Ok::<_, ExportError>(ExportedPage {
                path,
                failed_assets,
            })
        }
        .instrument(tracing::info_span!("export_page", slug = %slug))
        .await
    }
}

#[cfg(test)]
mod tests;
