mod markdown_converter;
mod rich_text;

pub use markdown_converter::MarkdownConverter;
pub use rich_text::render_inline;
