use std::path::Path;

use url::Url;

/// Extension used for images whose URL path carries none.
pub const FALLBACK_IMAGE_EXTENSION: &str = ".png";

/// Turn a page title into a URL-safe directory name.
///
/// Lower-cases, replaces every non-alphanumeric character with `-`, collapses
/// runs of `-` and trims them from both ends.
///
/// ```
/// use notion2hugo_renderer::utils::slugify;
///
/// assert_eq!(slugify("Hello, World! 2024"), "hello-world-2024");
/// assert_eq!(slugify("--a--b--"), "a-b");
/// ```
pub fn slugify(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .to_lowercase()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// The extension of the last path segment of `url`, with its leading dot.
///
/// Query strings and fragments are ignored, so signed storage URLs resolve to
/// the extension of the stored object.
pub fn url_extension(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let last = url.path_segments()?.next_back()?;
    let extension = Path::new(last).extension()?.to_str()?;
    Some(format!(".{extension}"))
}

/// Local filename for an asset embedded by block `block_id`.
///
/// Block ids are unique within an export, so assets from sibling or nested
/// blocks never collide.
pub fn asset_filename(block_id: &str, url: &str) -> String {
    let extension =
        url_extension(url).unwrap_or_else(|| FALLBACK_IMAGE_EXTENSION.to_string());
    format!("{block_id}{extension}")
}
