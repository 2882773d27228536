use std::collections::HashMap;
use std::path::Path;

use notion2hugo_common::{
    Block, BlockKind, DataSourceRef, DateRange, ImageBlock, ImageOrigin, MemoryBlockSource,
    PropertyValue, SelectOption, SourceError, TextRun,
};
use yaml_rust2::YamlLoader;

use super::*;
use crate::error::{AssetError, FrontMatterError};

/// Writes a placeholder file for every image, failing for URLs containing
/// `missing`.
struct FakeDownloads;

impl AssetExtractor for FakeDownloads {
    async fn extract_asset(
        &self,
        url: &str,
        dest_dir: &Path,
        filename: &str,
    ) -> Result<PathBuf, AssetError> {
        if url.contains("missing") {
            return Err(AssetError::Status {
                url: url.to_owned(),
                filename: filename.to_owned(),
                status: 404,
            });
        }
        let path = dest_dir.join(filename);
        tokio::fs::create_dir_all(dest_dir).await.unwrap();
        tokio::fs::write(&path, url.as_bytes()).await.unwrap();
        Ok(path)
    }
}

fn title(text: &str) -> PropertyValue {
    PropertyValue::Title {
        title: vec![TextRun::plain(text)],
    }
}

fn rich_text(text: &str) -> PropertyValue {
    PropertyValue::RichText {
        rich_text: vec![TextRun::plain(text)],
    }
}

fn date(start: &str) -> PropertyValue {
    PropertyValue::Date {
        date: Some(DateRange {
            start: start.into(),
            end: None,
        }),
    }
}

fn page(id: &str, properties: Vec<(&str, PropertyValue)>) -> Page {
    Page {
        id: id.into(),
        properties: properties
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect::<HashMap<_, _>>(),
    }
}

fn post(id: &str, name: &str) -> Page {
    page(id, vec![("Name", title(name)), ("Date", date("2024-03-01"))])
}

fn options(output_dir: &Path) -> ExportOptions {
    ExportOptions {
        output_dir: output_dir.to_path_buf(),
        database_id: "db".into(),
        data_source: "Posts".into(),
    }
}

fn posts_source(pages: Vec<Page>) -> MemoryBlockSource {
    MemoryBlockSource::new().with_data_source(
        "db",
        DataSourceRef {
            id: "ds-posts".into(),
            name: "Posts".into(),
        },
        pages,
    )
}

#[test]
fn front_matter_yaml_keeps_key_order() {
    let page = page(
        "p1",
        vec![
            ("Tags", PropertyValue::MultiSelect { multi_select: vec![] }),
            ("Summary", rich_text("A short one")),
            ("Draft", PropertyValue::Checkbox { checkbox: true }),
            ("Date", date("2024-03-01")),
            ("Name", title("Hello World")),
        ],
    );
    let yaml = FrontMatter::from_page(&page).unwrap().to_yaml().unwrap();

    insta::assert_snapshot!(yaml, @r"
    title: Hello World
    date: 2024-03-01
    draft: true
    summary: A short one
    tags: []
    ");
}

#[test]
fn front_matter_defaults_and_tags() {
    let page = page(
        "p1",
        vec![
            ("Name", title("Tagged: a post")),
            ("Date", date("2024-03-01T10:00:00.000+00:00")),
            ("Summary", rich_text("")),
            (
                "Tags",
                PropertyValue::MultiSelect {
                    multi_select: vec![
                        SelectOption { name: "rust".into() },
                        SelectOption { name: "notion".into() },
                    ],
                },
            ),
        ],
    );
    let front_matter = FrontMatter::from_page(&page).unwrap();
    assert!(!front_matter.draft);
    assert_eq!(front_matter.summary, None);

    let yaml = front_matter.to_yaml().unwrap();
    assert!(!yaml.contains("summary"));
    let docs = YamlLoader::load_from_str(&yaml).unwrap();
    let doc = &docs[0];
    assert_eq!(doc["title"].as_str(), Some("Tagged: a post"));
    assert_eq!(doc["date"].as_str(), Some("2024-03-01T10:00:00.000+00:00"));
    assert_eq!(doc["draft"].as_bool(), Some(false));
    assert_eq!(doc["tags"][0].as_str(), Some("rust"));
    assert_eq!(doc["tags"][1].as_str(), Some("notion"));
}

#[test]
fn missing_title_is_fatal() {
    let err = FrontMatter::from_page(&page("p1", vec![("Date", date("2024-03-01"))]))
        .unwrap_err();
    assert!(matches!(
        err,
        FrontMatterError::MissingProperty {
            property: "Name",
            ..
        }
    ));

    let err = FrontMatter::from_page(&page(
        "p1",
        vec![("Name", title("   ")), ("Date", date("2024-03-01"))],
    ))
    .unwrap_err();
    assert!(matches!(err, FrontMatterError::MissingProperty { .. }));
}

#[test]
fn empty_date_is_fatal() {
    let err = FrontMatter::from_page(&page(
        "p1",
        vec![("Name", title("t")), ("Date", PropertyValue::Date { date: None })],
    ))
    .unwrap_err();
    assert!(matches!(
        err,
        FrontMatterError::MissingProperty {
            property: "Date",
            ..
        }
    ));
}

#[test]
fn wrong_property_type_is_reported() {
    let err = FrontMatter::from_page(&page(
        "p1",
        vec![
            ("Name", title("t")),
            ("Date", date("2024-03-01")),
            ("Draft", rich_text("yes")),
        ],
    ))
    .unwrap_err();
    assert!(matches!(
        err,
        FrontMatterError::WrongType {
            property: "Draft",
            expected: "checkbox",
            ..
        }
    ));
}

#[test]
fn explicit_slug_wins_over_title() {
    let mut with_slug = post("p1", "Hello, World! 2024");
    with_slug
        .properties
        .insert("Slug".into(), rich_text("custom-path"));
    assert_eq!(
        FrontMatter::from_page(&with_slug).unwrap().slug().as_deref(),
        Some("custom-path")
    );

    let derived = post("p2", "Hello, World! 2024");
    assert_eq!(
        FrontMatter::from_page(&derived).unwrap().slug().as_deref(),
        Some("hello-world-2024")
    );

    let unsluggable = post("p3", "!!!");
    assert_eq!(FrontMatter::from_page(&unsluggable).unwrap().slug(), None);
}

#[test]
fn document_frames_front_matter() {
    assert_eq!(
        writer::render_document("title: x\n", "body"),
        "---\ntitle: x\n---\n\nbody"
    );
}

#[tokio::test]
async fn write_atomically_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested/index.md");

    writer::write_atomically(&dest, "first").await.unwrap();
    writer::write_atomically(&dest, "second").await.unwrap();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "second");
    let entries: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries, ["index.md"]);
}

#[tokio::test]
async fn exports_page_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let source = posts_source(vec![post("page-1", "Hello World")])
        .with_children(
            "page-1",
            vec![
                Block::new("h1", BlockKind::Heading1(vec![TextRun::plain("Title")])).with_children(),
                Block::new(
                    "img1",
                    BlockKind::Image(ImageBlock {
                        origin: ImageOrigin::External,
                        url: "https://cdn.example.com/pic.jpg".into(),
                        caption: vec![],
                    }),
                ),
            ],
        )
        .with_children(
            "h1",
            vec![Block::new(
                "p1",
                BlockKind::Paragraph(vec![TextRun::plain("hi").bold()]),
            )],
        );

    let exporter = StaticSiteExporter::new(&source, &FakeDownloads, options(dir.path()));
    let summary = exporter.export_all().await.unwrap();

    let bundle = dir.path().join("hello-world");
    assert_eq!(summary.pages, vec![bundle.join("index.md")]);
    assert_eq!(summary.failed_assets, 0);
    assert_eq!(
        std::fs::read_to_string(bundle.join("index.md")).unwrap(),
        "---\ntitle: Hello World\ndate: 2024-03-01\ndraft: false\ntags: []\n---\n\n\
         # Title\n\n    **hi**\n\n![](img1.jpg)"
    );
    assert_eq!(
        std::fs::read_to_string(bundle.join("img1.jpg")).unwrap(),
        "https://cdn.example.com/pic.jpg"
    );
    assert!(!bundle.join("index.md.tmp").exists());
}

#[tokio::test]
async fn failed_assets_are_counted_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let source = posts_source(vec![post("page-1", "Broken images")]).with_children(
        "page-1",
        vec![Block::new(
            "img1",
            BlockKind::Image(ImageBlock {
                origin: ImageOrigin::Hosted,
                url: "https://files.example.com/missing.png".into(),
                caption: vec![TextRun::plain("gone")],
            }),
        )],
    );

    let summary = StaticSiteExporter::new(&source, &FakeDownloads, options(dir.path()))
        .export_all()
        .await
        .unwrap();

    assert_eq!(summary.failed_assets, 1);
    let index = std::fs::read_to_string(dir.path().join("broken-images/index.md")).unwrap();
    assert!(index.ends_with("![gone](img1.png)"));
    assert!(!dir.path().join("broken-images/img1.png").exists());
}

#[tokio::test]
async fn first_fatal_error_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let source = posts_source(vec![
        post("page-1", "First"),
        page("page-2", vec![("Name", title("No date"))]),
        post("page-3", "Third"),
    ]);

    let err = StaticSiteExporter::new(&source, &FakeDownloads, options(dir.path()))
        .export_all()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExportError::FrontMatter(FrontMatterError::MissingProperty { .. })
    ));
    assert!(dir.path().join("first/index.md").exists());
    assert!(!dir.path().join("third").exists());
}

#[tokio::test]
async fn unknown_data_source_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let source = posts_source(vec![]);
    let mut options = options(dir.path());
    options.data_source = "Drafts".into();

    let err = StaticSiteExporter::new(&source, &FakeDownloads, options)
        .export_all()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExportError::Source(SourceError::DataSourceNotFound { .. })
    ));
}

#[tokio::test]
async fn unsluggable_title_falls_back_to_page_id() {
    let dir = tempfile::tempdir().unwrap();
    let source = posts_source(vec![]);
    let exporter = StaticSiteExporter::new(&source, &FakeDownloads, options(dir.path()));

    let exported = exporter.export_page(&post("abc123", "???")).await.unwrap();

    assert_eq!(exported.path, dir.path().join("abc123/index.md"));
    assert_eq!(
        std::fs::read_to_string(&exported.path).unwrap(),
        "---\ntitle: \"???\"\ndate: 2024-03-01\ndraft: false\ntags: []\n---\n\n"
    );
}

#[test]
fn slug_must_be_a_single_directory_name() {
    for slug in ["../../escaped", "/etc/passwd", "nested/path", "..", "."] {
        let mut page = post("p1", "Title");
        page.properties.insert("Slug".into(), rich_text(slug));
        let err = FrontMatter::from_page(&page).unwrap_err();
        assert!(
            matches!(err, FrontMatterError::InvalidSlug { .. }),
            "slug {slug:?} gave {err:?}"
        );
    }

    let mut padded = post("p2", "Title");
    padded.properties.insert("Slug".into(), rich_text("  my-post  "));
    assert_eq!(
        FrontMatter::from_page(&padded).unwrap().slug().as_deref(),
        Some("my-post")
    );
}

#[tokio::test]
async fn escaping_slug_writes_nothing() {
    let root = tempfile::tempdir().unwrap();
    let output_dir = root.path().join("content/posts");
    let outside = tempfile::tempdir().unwrap();

    let mut relative = post("page-1", "Relative");
    relative
        .properties
        .insert("Slug".into(), rich_text("../../escaped"));
    let mut absolute = post("page-2", "Absolute");
    absolute.properties.insert(
        "Slug".into(),
        rich_text(outside.path().to_str().unwrap()),
    );

    let source = posts_source(vec![]);
    let exporter = StaticSiteExporter::new(&source, &FakeDownloads, options(&output_dir));
    for page in [relative, absolute] {
        let err = exporter.export_page(&page).await.unwrap_err();
        assert!(matches!(
            err,
            ExportError::FrontMatter(FrontMatterError::InvalidSlug { .. })
        ));
    }

    assert!(!root.path().join("escaped").exists());
    assert!(!outside.path().join("index.md").exists());
    assert!(!output_dir.exists());
}
