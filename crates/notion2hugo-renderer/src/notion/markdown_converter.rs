use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use notion2hugo_common::{Block, BlockKind, BlockSource, CodeBlock, ImageBlock, SourceError};

use super::rich_text::render_inline;
use crate::assets::AssetExtractor;
use crate::utils::asset_filename;

/// Nested content is shifted right by this much per tree level.
const INDENT: &str = "    ";

/// What follows a block's body in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Spacing {
    /// End the line and leave an empty one.
    BlankLine,
    /// End the line only, keeping consecutive list items tight.
    Newline,
}

struct Fragment {
    prefix: &'static str,
    body: String,
    spacing: Spacing,
}

impl Fragment {
    fn block(prefix: &'static str, body: String) -> Self {
        Self {
            prefix,
            body,
            spacing: Spacing::BlankLine,
        }
    }

    fn list_item(body: String) -> Self {
        Self {
            prefix: "  - ",
            body,
            spacing: Spacing::Newline,
        }
    }
}

/// Walks a block tree depth first and renders it as Markdown.
///
/// Children are fetched from the [`BlockSource`] one level at a time; images
/// are handed to the [`AssetExtractor`] as they are encountered. Everything
/// runs sequentially in document order.
pub struct MarkdownConverter<'a, S, X> {
    source: &'a S,
    assets: &'a X,
    failed_assets: AtomicUsize,
}

impl<'a, S, X> MarkdownConverter<'a, S, X>
where
    S: BlockSource,
    X: AssetExtractor,
{
    pub fn new(source: &'a S, assets: &'a X) -> Self {
        Self {
            source,
            assets,
            failed_assets: AtomicUsize::new(0),
        }
    }

    /// Number of asset downloads that have failed so far.
    pub fn failed_assets(&self) -> usize {
        self.failed_assets.load(Ordering::Relaxed)
    }

    /// Render every descendant of `block_id`, saving images into `asset_dir`.
    ///
    /// Leading and trailing whitespace is stripped from the result; blank
    /// lines between blocks are kept.
    pub async fn render_subtree(
        &self,
        block_id: &str,
        asset_dir: &Path,
    ) -> Result<String, SourceError> {
        let lines = self.render_lines(block_id, asset_dir).await?;
        Ok(lines.join("\n"))
    }

    async fn render_lines(
        &self,
        block_id: &str,
        asset_dir: &Path,
    ) -> Result<Vec<String>, SourceError> {
        let blocks = self.source.list_children(block_id).await?;
        let mut lines = Vec::new();

        for block in &blocks {
            let fragment = self.convert_block(block, asset_dir).await;
            let text = format!("{}{}", fragment.prefix, fragment.body);
            lines.extend(text.split('\n').map(str::to_owned));

            if block.has_children {
                let children = Box::pin(self.render_lines(&block.id, asset_dir)).await?;
                if !children.is_empty() {
                    if fragment.spacing == Spacing::BlankLine {
                        lines.push(String::new());
                    }
                    lines.extend(children.into_iter().map(indent));
                }
            }

            if fragment.spacing == Spacing::BlankLine {
                lines.push(String::new());
            }
        }

        trim_lines(&mut lines);
        Ok(lines)
    }

    async fn convert_block(&self, block: &Block, asset_dir: &Path) -> Fragment {
        match &block.kind {
            BlockKind::Paragraph(text) => Fragment::block("", render_inline(text)),
            BlockKind::Heading1(text) => Fragment::block("# ", render_inline(text)),
            BlockKind::Heading2(text) => Fragment::block("## ", render_inline(text)),
            BlockKind::BulletedListItem(text) | BlockKind::NumberedListItem(text) => {
                Fragment::list_item(render_inline(text))
            }
            BlockKind::Code(code) => Fragment::block("", convert_code(code)),
            BlockKind::Image(image) => {
                Fragment::block("", self.convert_image(&block.id, image, asset_dir).await)
            }
            // Kinds without a rendering rule become empty content rather than
            // an error, matching what earlier exports produced for them.
            BlockKind::Unsupported(_) => Fragment::block("", String::new()),
        }
    }

    /// Download the image and reference the local copy. The reference is
    /// emitted even when the download fails.
    async fn convert_image(&self, block_id: &str, image: &ImageBlock, asset_dir: &Path) -> String {
        let caption = render_inline(&image.caption);
        let filename = asset_filename(block_id, &image.url);

        if let Err(err) = self
            .assets
            .extract_asset(&image.url, asset_dir, &filename)
            .await
        {
            self.failed_assets.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                filename = %filename,
                retryable = err.is_retryable(),
                "failed to save image: {err}"
            );
        }

        format!("![{caption}]({filename})")
    }
}

fn convert_code(code: &CodeBlock) -> String {
    format!(
        "```{}\n{}\n```",
        code.language,
        render_inline(&code.rich_text)
    )
}

// Deliberately departs from indenting every line: blank lines stay empty so
// nested output carries no trailing whitespace. The rendered Markdown is the same.
fn indent(line: String) -> String {
    if line.is_empty() {
        line
    } else {
        format!("{INDENT}{line}")
    }
}

/// Strip leading and trailing whitespace from the text the lines make up.
fn trim_lines(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    let leading = lines
        .iter()
        .take_while(|line| line.trim().is_empty())
        .count();
    lines.drain(..leading);

    if let Some(first) = lines.first_mut() {
        let trimmed = first.trim_start();
        if trimmed.len() != first.len() {
            *first = trimmed.to_owned();
        }
    }
    if let Some(last) = lines.last_mut() {
        let trimmed_len = last.trim_end().len();
        last.truncate(trimmed_len);
    }
}
