//! Downloading embedded media next to the rendered page.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;

use crate::error::AssetError;

/// Persists a remote resource under a deterministic local name.
pub trait AssetExtractor {
    /// Save the resource at `url` as `dest_dir/filename`, replacing any file
    /// already there, and return the written path.
    fn extract_asset(
        &self,
        url: &str,
        dest_dir: &Path,
        filename: &str,
    ) -> impl Future<Output = Result<PathBuf, AssetError>> + Send;
}

/// [`AssetExtractor`] that fetches over HTTP(S).
///
/// The body is streamed into `<filename>.part` and renamed into place once
/// complete, so an interrupted download never leaves a truncated asset behind.
#[derive(Debug, Clone)]
pub struct HttpAssetExtractor {
    client: reqwest::Client,
}

impl HttpAssetExtractor {
    /// Build an extractor whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl AssetExtractor for HttpAssetExtractor {
    async fn extract_asset(
        &self,
        url: &str,
        dest_dir: &Path,
        filename: &str,
    ) -> Result<PathBuf, AssetError> {
        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|source| AssetError::Io {
                path: dest_dir.to_path_buf(),
                source,
            })?;

        let network_error = |source| AssetError::Network {
            url: url.to_owned(),
            filename: filename.to_owned(),
            source,
        };

        let mut response = self.client.get(url).send().await.map_err(network_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                url: url.to_owned(),
                filename: filename.to_owned(),
                status: status.as_u16(),
            });
        }

        let target = dest_dir.join(filename);
        let partial = dest_dir.join(format!("{filename}.part"));
        if let Err(err) = stream_to_file(&mut response, &partial, network_error).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(err);
        }
        if let Err(source) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(AssetError::Io {
                path: target,
                source,
            });
        }

        tracing::debug!(path = %target.display(), "saved asset");
        Ok(target)
    }
}

async fn stream_to_file(
    response: &mut reqwest::Response,
    path: &Path,
    network_error: impl Fn(reqwest::Error) -> AssetError,
) -> Result<(), AssetError> {
    let io_error = |source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::create(path).await.map_err(io_error)?;
    while let Some(chunk) = response.chunk().await.map_err(&network_error)? {
        file.write_all(&chunk).await.map_err(io_error)?;
    }
    file.flush().await.map_err(io_error)?;
    Ok(())
}
