use std::collections::HashMap;
use std::future::Future;

use crate::error::SourceError;
use crate::types::{Block, DataSourceRef, Page};

/// Tree navigation over the source document structure.
pub trait BlockSource {
    /// The immediate children of `block_id`, in display order.
    ///
    /// Implementations resolve pagination before returning; the renderer
    /// always receives the complete list.
    fn list_children(
        &self,
        block_id: &str,
    ) -> impl Future<Output = Result<Vec<Block>, SourceError>> + Send;
}

/// Content queries over the pages to export.
pub trait PageSource {
    /// Look up the id of the data source called `name` inside `database_id`.
    fn resolve_data_source(
        &self,
        database_id: &str,
        name: &str,
    ) -> impl Future<Output = Result<String, SourceError>> + Send;

    /// Every page in the data source, in API order.
    fn query_pages(
        &self,
        data_source_id: &str,
    ) -> impl Future<Output = Result<Vec<Page>, SourceError>> + Send;
}

/// A [`BlockSource`] and [`PageSource`] backed by maps held in memory.
///
/// Unknown parent ids have no children.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockSource {
    children: HashMap<String, Vec<Block>>,
    data_sources: HashMap<String, Vec<DataSourceRef>>,
    pages: HashMap<String, Vec<Page>>,
}

impl MemoryBlockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_children(&mut self, parent_id: impl Into<String>, blocks: Vec<Block>) {
        self.children.insert(parent_id.into(), blocks);
    }

    pub fn with_children(mut self, parent_id: impl Into<String>, blocks: Vec<Block>) -> Self {
        self.insert_children(parent_id, blocks);
        self
    }

    /// Register a data source on a database along with the pages it holds.
    pub fn with_data_source(
        mut self,
        database_id: impl Into<String>,
        data_source: DataSourceRef,
        pages: Vec<Page>,
    ) -> Self {
        self.pages.insert(data_source.id.clone(), pages);
        self.data_sources
            .entry(database_id.into())
            .or_default()
            .push(data_source);
        self
    }
}

impl BlockSource for MemoryBlockSource {
    async fn list_children(&self, block_id: &str) -> Result<Vec<Block>, SourceError> {
        Ok(self.children.get(block_id).cloned().unwrap_or_default())
    }
}

impl PageSource for MemoryBlockSource {
    async fn resolve_data_source(
        &self,
        database_id: &str,
        name: &str,
    ) -> Result<String, SourceError> {
        self.data_sources
            .get(database_id)
            .and_then(|sources| sources.iter().find(|source| source.name == name))
            .map(|source| source.id.clone())
            .ok_or_else(|| SourceError::DataSourceNotFound {
                database_id: database_id.to_owned(),
                name: name.to_owned(),
            })
    }

    async fn query_pages(&self, data_source_id: &str) -> Result<Vec<Page>, SourceError> {
        Ok(self.pages.get(data_source_id).cloned().unwrap_or_default())
    }
}
