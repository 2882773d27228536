//! The subset of the Notion content model the exporter understands.
//!
//! Blocks arrive from the API as loosely typed JSON where the kind-specific
//! payload sits under a key named after the block's `type`. [`Block::from_value`]
//! turns that into a [`BlockKind`] with a typed payload, failing fast when a
//! known kind is missing the fields rendering relies on.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SourceError;

/// Styling flags carried by a [`TextRun`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub code: bool,
}

/// One styled run of rich text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub plain_text: String,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub href: Option<String>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            annotations: Annotations::default(),
            href: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.annotations.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.annotations.italic = true;
        self
    }

    pub fn code(mut self) -> Self {
        self.annotations.code = true;
        self
    }

    pub fn link(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// Ordered sequence of runs making up the readable text of a block.
pub type RichText = Vec<TextRun>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
    pub has_children: bool,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            has_children: false,
        }
    }

    pub fn with_children(mut self) -> Self {
        self.has_children = true;
        self
    }

    /// Decode one block object as returned by the API.
    pub fn from_value(value: Value) -> Result<Self, SourceError> {
        let raw: RawBlock =
            serde_json::from_value(value).map_err(|source| SourceError::InvalidJson { source })?;
        Self::try_from(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph(RichText),
    Heading1(RichText),
    Heading2(RichText),
    BulletedListItem(RichText),
    NumberedListItem(RichText),
    Code(CodeBlock),
    Image(ImageBlock),
    /// Any kind the exporter has no rendering rule for, keyed by its API name.
    Unsupported(String),
}

impl BlockKind {
    /// The API `type` tag for this kind.
    pub fn name(&self) -> &str {
        match self {
            BlockKind::Paragraph(_) => "paragraph",
            BlockKind::Heading1(_) => "heading_1",
            BlockKind::Heading2(_) => "heading_2",
            BlockKind::BulletedListItem(_) => "bulleted_list_item",
            BlockKind::NumberedListItem(_) => "numbered_list_item",
            BlockKind::Code(_) => "code",
            BlockKind::Image(_) => "image",
            BlockKind::Unsupported(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub rich_text: RichText,
}

/// Where an image's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    /// Linked from an arbitrary URL.
    External,
    /// Uploaded to and served by Notion (signed, expiring URL).
    Hosted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlock {
    pub origin: ImageOrigin,
    /// Download location, already resolved for the origin.
    pub url: String,
    pub caption: RichText,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    has_children: bool,
    #[serde(flatten)]
    payloads: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct TextPayload {
    rich_text: RichText,
}

#[derive(Debug, Deserialize)]
struct CodePayload {
    language: String,
    rich_text: RichText,
}

#[derive(Debug, Deserialize)]
struct ImagePayload {
    #[serde(rename = "type")]
    origin: String,
    #[serde(default)]
    external: Option<FileLocation>,
    #[serde(default)]
    file: Option<FileLocation>,
    #[serde(default)]
    caption: RichText,
}

#[derive(Debug, Deserialize)]
struct FileLocation {
    url: String,
}

fn take_payload<T: DeserializeOwned>(raw: &mut RawBlock) -> Result<T, SourceError> {
    let value = raw
        .payloads
        .remove(&raw.kind)
        .ok_or_else(|| SourceError::malformed(&raw.id, &raw.kind, "missing payload object"))?;
    serde_json::from_value(value)
        .map_err(|err| SourceError::malformed(&raw.id, &raw.kind, err.to_string()))
}

impl TryFrom<RawBlock> for Block {
    type Error = SourceError;

    fn try_from(mut raw: RawBlock) -> Result<Self, Self::Error> {
        let kind_name = raw.kind.clone();
        let kind = match kind_name.as_str() {
            "paragraph" => BlockKind::Paragraph(take_payload::<TextPayload>(&mut raw)?.rich_text),
            "heading_1" => BlockKind::Heading1(take_payload::<TextPayload>(&mut raw)?.rich_text),
            "heading_2" => BlockKind::Heading2(take_payload::<TextPayload>(&mut raw)?.rich_text),
            "bulleted_list_item" => {
                BlockKind::BulletedListItem(take_payload::<TextPayload>(&mut raw)?.rich_text)
            }
            "numbered_list_item" => {
                BlockKind::NumberedListItem(take_payload::<TextPayload>(&mut raw)?.rich_text)
            }
            "code" => {
                let code: CodePayload = take_payload(&mut raw)?;
                BlockKind::Code(CodeBlock {
                    language: code.language,
                    rich_text: code.rich_text,
                })
            }
            "image" => {
                let image: ImagePayload = take_payload(&mut raw)?;
                let (origin, location) = if image.origin == "external" {
                    (ImageOrigin::External, image.external)
                } else {
                    (ImageOrigin::Hosted, image.file)
                };
                let location = location.ok_or_else(|| {
                    SourceError::malformed(
                        &raw.id,
                        &raw.kind,
                        format!("image of type `{}` has no url", image.origin),
                    )
                })?;
                BlockKind::Image(ImageBlock {
                    origin,
                    url: location.url,
                    caption: image.caption,
                })
            }
            other => BlockKind::Unsupported(other.to_owned()),
        };

        Ok(Block {
            id: raw.id,
            kind,
            has_children: raw.has_children,
        })
    }
}

/// A database row; its properties feed the front matter.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl Page {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// Page property values. Only the property types used for front matter are
/// modelled, everything else collapses to [`PropertyValue::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        title: RichText,
    },
    RichText {
        rich_text: RichText,
    },
    Date {
        date: Option<DateRange>,
    },
    Checkbox {
        checkbox: bool,
    },
    MultiSelect {
        multi_select: Vec<SelectOption>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

/// A data source listed on a database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataSourceRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub data_sources: Vec<DataSourceRef>,
}

/// Cursor-paginated list envelope used by the list and query endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedList<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}
