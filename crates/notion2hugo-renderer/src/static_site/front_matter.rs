use std::path::{Component, Path};

use notion2hugo_common::{Page, PropertyValue, RichText};
use yaml_rust2::yaml::Hash;
use yaml_rust2::{Yaml, YamlEmitter};

use crate::error::FrontMatterError;
use crate::utils::slugify;

pub const TITLE_PROPERTY: &str = "Name";
pub const DATE_PROPERTY: &str = "Date";
pub const DRAFT_PROPERTY: &str = "Draft";
pub const SUMMARY_PROPERTY: &str = "Summary";
pub const TAGS_PROPERTY: &str = "Tags";
pub const SLUG_PROPERTY: &str = "Slug";

/// Hugo metadata for one page, taken from the page's database properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub date: String,
    pub draft: bool,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    /// Explicit directory name; not part of the emitted header.
    pub slug: Option<String>,
}

impl FrontMatter {
    pub fn from_page(page: &Page) -> Result<Self, FrontMatterError> {
        let title = match page.property(TITLE_PROPERTY) {
            Some(PropertyValue::Title { title }) => first_run(title),
            Some(_) => return Err(wrong_type(page, TITLE_PROPERTY, "title")),
            None => None,
        }
        .ok_or_else(|| missing(page, TITLE_PROPERTY))?;

        let date = match page.property(DATE_PROPERTY) {
            Some(PropertyValue::Date { date }) => date
                .as_ref()
                .map(|range| range.start.clone())
                .filter(|start| !start.is_empty()),
            Some(_) => return Err(wrong_type(page, DATE_PROPERTY, "date")),
            None => None,
        }
        .ok_or_else(|| missing(page, DATE_PROPERTY))?;

        let draft = match page.property(DRAFT_PROPERTY) {
            Some(PropertyValue::Checkbox { checkbox }) => *checkbox,
            Some(_) => return Err(wrong_type(page, DRAFT_PROPERTY, "checkbox")),
            None => false,
        };

        let summary = match page.property(SUMMARY_PROPERTY) {
            Some(PropertyValue::RichText { rich_text }) => Some(plain_text(rich_text)),
            Some(_) => return Err(wrong_type(page, SUMMARY_PROPERTY, "rich_text")),
            None => None,
        }
        .filter(|summary| !summary.is_empty());

        let tags = match page.property(TAGS_PROPERTY) {
            Some(PropertyValue::MultiSelect { multi_select }) => multi_select
                .iter()
                .map(|option| option.name.clone())
                .collect(),
            Some(_) => return Err(wrong_type(page, TAGS_PROPERTY, "multi_select")),
            None => Vec::new(),
        };

        let slug = match page.property(SLUG_PROPERTY) {
            Some(PropertyValue::RichText { rich_text }) => {
                first_run(rich_text).map(|slug| slug.trim().to_owned())
            }
            Some(_) => return Err(wrong_type(page, SLUG_PROPERTY, "rich_text")),
            None => None,
        };
        if let Some(slug) = slug.as_deref().filter(|slug| !is_single_segment(slug)) {
            return Err(FrontMatterError::InvalidSlug {
                page_id: page.id.clone(),
                slug: slug.to_owned(),
            });
        }

        Ok(Self {
            title,
            date,
            draft,
            summary,
            tags,
            slug,
        })
    }

    /// Directory name for the page: the explicit slug if set, otherwise one
    /// derived from the title. `None` when neither yields any characters.
    pub fn slug(&self) -> Option<String> {
        self.slug
            .clone()
            .or_else(|| Some(slugify(&self.title)).filter(|slug| !slug.is_empty()))
    }

    /// YAML mapping lines, newline terminated, without document markers.
    pub fn to_yaml(&self) -> Result<String, FrontMatterError> {
        let mut map = Hash::new();
        map.insert(key("title"), Yaml::String(self.title.clone()));
        map.insert(key("date"), Yaml::String(self.date.clone()));
        map.insert(key("draft"), Yaml::Boolean(self.draft));
        if let Some(summary) = &self.summary {
            map.insert(key("summary"), Yaml::String(summary.clone()));
        }
        map.insert(
            key("tags"),
            Yaml::Array(self.tags.iter().cloned().map(Yaml::String).collect()),
        );

        let mut out = String::new();
        YamlEmitter::new(&mut out)
            .dump(&Yaml::Hash(map))
            .map_err(|e| FrontMatterError::Emit {
                message: e.to_string(),
            })?;

        let mut yaml = out
            .strip_prefix("---\n")
            .unwrap_or(&out)
            .to_owned();
        yaml.push('\n');
        Ok(yaml)
    }
}

/// A slug is joined onto the output directory, so it must name exactly one
/// directory below it.
fn is_single_segment(slug: &str) -> bool {
    let mut components = Path::new(slug).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn key(name: &str) -> Yaml {
    Yaml::String(name.to_owned())
}

fn first_run(text: &RichText) -> Option<String> {
    text.first()
        .map(|run| run.plain_text.clone())
        .filter(|text| !text.trim().is_empty())
}

fn plain_text(text: &RichText) -> String {
    text.iter().map(|run| run.plain_text.as_str()).collect()
}

fn missing(page: &Page, property: &'static str) -> FrontMatterError {
    FrontMatterError::MissingProperty {
        page_id: page.id.clone(),
        property,
    }
}

fn wrong_type(page: &Page, property: &'static str, expected: &'static str) -> FrontMatterError {
    FrontMatterError::WrongType {
        page_id: page.id.clone(),
        property,
        expected,
    }
}
