use reqwest::RequestBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::Url;

use crate::config::ExportConfig;
use crate::error::SourceError;
use crate::source::{BlockSource, PageSource};
use crate::types::{Block, Database, Page, PaginatedList};

/// API version pinned for every request. Data sources need 2025-09-03 or later.
pub const NOTION_VERSION: &str = "2025-09-03";

const PAGE_SIZE: u32 = 100;

/// Async client for the subset of the Notion REST API the exporter uses.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl NotionClient {
    /// `base_url` must end in `/`, see [`ExportConfig::api_url`].
    pub fn new(base_url: Url, token: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url, token)
    }

    pub fn with_http_client(http: reqwest::Client, base_url: Url, token: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            token: token.into(),
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.api_url.clone(), config.token.clone())
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        self.base_url
            .join(path)
            .map_err(|e| SourceError::Endpoint {
                path: path.to_owned(),
                message: e.to_string(),
            })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, SourceError> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|source| SourceError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ApiErrorBody>().await.ok();
            let (code, message) = body
                .map(|body| (body.code, body.message))
                .unwrap_or_else(|| (String::new(), status.to_string()));
            return Err(SourceError::Api {
                url: url.to_string(),
                status: status.as_u16(),
                code,
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| SourceError::Decode {
                url: url.to_string(),
                source,
            })
    }

    /// One page of a block's children, undecoded.
    pub async fn list_children_page(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<PaginatedList<Value>, SourceError> {
        let mut url = self.endpoint(&format!("blocks/{block_id}/children"))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page_size", &PAGE_SIZE.to_string());
            if let Some(cursor) = start_cursor {
                query.append_pair("start_cursor", cursor);
            }
        }
        self.send(self.http.get(url.clone()), &url).await
    }

    /// One page of a data source query.
    pub async fn query_data_source_page(
        &self,
        data_source_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<PaginatedList<Page>, SourceError> {
        let url = self.endpoint(&format!("data_sources/{data_source_id}/query"))?;
        let mut body = Map::new();
        body.insert("page_size".into(), Value::from(PAGE_SIZE));
        if let Some(cursor) = start_cursor {
            body.insert("start_cursor".into(), Value::from(cursor));
        }
        self.send(self.http.post(url.clone()).json(&body), &url)
            .await
    }

    pub async fn retrieve_database(&self, database_id: &str) -> Result<Database, SourceError> {
        let url = self.endpoint(&format!("databases/{database_id}"))?;
        self.send(self.http.get(url.clone()), &url).await
    }
}

impl BlockSource for NotionClient {
    async fn list_children(&self, block_id: &str) -> Result<Vec<Block>, SourceError> {
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.list_children_page(block_id, cursor.as_deref()).await?;
            for raw in page.results {
                blocks.push(Block::from_value(raw)?);
            }
            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }
        tracing::debug!(block_id, count = blocks.len(), "fetched children");
        Ok(blocks)
    }
}

impl PageSource for NotionClient {
    async fn resolve_data_source(
        &self,
        database_id: &str,
        name: &str,
    ) -> Result<String, SourceError> {
        let database = self.retrieve_database(database_id).await?;
        database
            .data_sources
            .into_iter()
            .find(|source| source.name == name)
            .map(|source| source.id)
            .ok_or_else(|| SourceError::DataSourceNotFound {
                database_id: database_id.to_owned(),
                name: name.to_owned(),
            })
    }

    async fn query_pages(&self, data_source_id: &str) -> Result<Vec<Page>, SourceError> {
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let batch = self
                .query_data_source_page(data_source_id, cursor.as_deref())
                .await?;
            pages.extend(batch.results);
            match batch.next_cursor {
                Some(next) if batch.has_more => cursor = Some(next),
                _ => break,
            }
        }
        tracing::debug!(data_source_id, count = pages.len(), "queried pages");
        Ok(pages)
    }
}
