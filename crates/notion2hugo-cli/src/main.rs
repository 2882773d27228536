use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use notion2hugo_common::config::{
    API_URL_VAR, ASSET_TIMEOUT_VAR, DATA_SOURCE_VAR, DATABASE_ID_VAR, OUTPUT_VAR, TOKEN_VAR,
};
use notion2hugo_common::{ExportConfig, NotionClient};
use notion2hugo_renderer::{ExportOptions, HttpAssetExtractor, StaticSiteExporter};

#[derive(Parser)]
#[command(version, about = "Export a Notion database as Hugo page bundles", long_about = None)]
struct Cli {
    /// Notion integration token
    #[arg(long, env = TOKEN_VAR, hide_env_values = true)]
    token: Option<String>,

    /// Database holding the posts
    #[arg(long, env = DATABASE_ID_VAR)]
    database_id: Option<String>,

    /// Name of the data source inside the database [default: Posts]
    #[arg(long, env = DATA_SOURCE_VAR)]
    data_source: Option<String>,

    /// Base URL of the Notion API
    #[arg(long, env = API_URL_VAR)]
    api_url: Option<String>,

    /// Directory the page bundles are written to [default: content/posts]
    #[arg(short, long, env = OUTPUT_VAR)]
    output: Option<PathBuf>,

    /// Seconds before an image download is abandoned [default: 30]
    #[arg(long, env = ASSET_TIMEOUT_VAR)]
    asset_timeout: Option<u64>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn value_of(&self, var: &str) -> Option<String> {
        match var {
            TOKEN_VAR => self.token.clone(),
            DATABASE_ID_VAR => self.database_id.clone(),
            DATA_SOURCE_VAR => self.data_source.clone(),
            API_URL_VAR => self.api_url.clone(),
            OUTPUT_VAR => self
                .output
                .as_ref()
                .map(|path| path.to_string_lossy().into_owned()),
            ASSET_TIMEOUT_VAR => self.asset_timeout.map(|secs| secs.to_string()),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette()?;
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ExportConfig::from_lookup(|var| cli.value_of(var))?;
    let client = NotionClient::from_config(&config);
    let assets = HttpAssetExtractor::new(config.asset_timeout).into_diagnostic()?;

    tracing::info!(
        database_id = %config.database_id,
        output = %config.output_dir.display(),
        "starting export"
    );
    let exporter = StaticSiteExporter::new(&client, &assets, ExportOptions::from(&config));
    let summary = exporter.export_all().await?;

    println!(
        "Exported {} pages to {} ({} asset downloads failed)",
        summary.pages.len(),
        config.output_dir.display(),
        summary.failed_assets
    );
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn init_miette() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();
    Ok(())
}
