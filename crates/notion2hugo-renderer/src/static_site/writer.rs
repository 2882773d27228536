use std::path::Path;

use crate::error::ExportError;

/// Frame a rendered body with its front matter header.
pub fn render_document(front_matter_yaml: &str, body: &str) -> String {
    format!("---\n{front_matter_yaml}---\n\n{body}")
}

/// Write `contents` to `dest` via a sibling `.tmp` file and a rename, creating
/// the parent directory when it does not exist yet.
pub async fn write_atomically(dest: &Path, contents: &str) -> Result<(), ExportError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ExportError::Io { path, source }
    };

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_error(parent))?;
    }

    let mut tmp_name = dest.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = Path::new(&tmp_name);

    if let Err(err) = tokio::fs::write(tmp, contents).await {
        let _ = tokio::fs::remove_file(tmp).await;
        return Err(io_error(tmp)(err));
    }
    tokio::fs::rename(tmp, dest).await.map_err(io_error(dest))?;
    Ok(())
}
