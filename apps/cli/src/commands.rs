//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use marksync_collector::{DemoSource, FileSource, SourceAdapter};
use marksync_core::{Pipeline, ProgressReporter, RunOutcome, ScrapeRequest, ScrapeResponse};
use marksync_extract::FieldExtractor;
use marksync_sheets::{
    GoogleSheetsClient, MemorySheetClient, ServiceAccountKey, SpreadsheetClient, Synchronizer,
};
use marksync_shared::{
    AppConfig, SourceConfig, SourceKind, init_config, load_config, resolve_credentials_path,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// marksync: trademark cancellation records into Google Sheets.
#[derive(Parser)]
#[command(
    name = "marksync",
    version,
    about = "Extract trademark cancellation records and sync them into a Google Sheets spreadsheet.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Where raw documents come from.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum SourceArg {
    /// Fixed five-sample demo set.
    Demo,
    /// Every .html/.htm/.txt file in --dir.
    Files,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Demo => SourceKind::Demo,
            SourceArg::Files => SourceKind::Files,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Collect records for a query and append them to a spreadsheet.
    ///
    /// WARNING: if row 1 of the target sheet is not exactly the marksync
    /// header, the whole sheet is cleared before the header and records are
    /// written. Use --dry-run to preview.
    Scrape {
        /// Search query passed to the source.
        #[arg(short, long)]
        formula: String,

        /// Google Sheets URL (https://docs.google.com/spreadsheets/d/<ID>/...).
        #[arg(short, long)]
        sheet: String,

        /// Document source (overrides [source].kind).
        #[arg(long, value_enum)]
        source: Option<SourceArg>,

        /// Document directory for the files source (overrides [source].dir).
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Write to an in-memory sheet and print it instead of touching the
        /// real spreadsheet.
        #[arg(long)]
        dry_run: bool,

        /// Print the response body as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Service-account credential helpers.
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

/// Credentials subcommands.
#[derive(Subcommand)]
pub(crate) enum CredentialsAction {
    /// Locate and validate the service-account key, and print the account
    /// the spreadsheet must be shared with.
    Check,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "marksync=info",
        1 => "marksync=debug",
        _ => "marksync=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scrape {
            formula,
            sheet,
            source,
            dir,
            dry_run,
            json,
        } => {
            let mut config = load_config()?;
            apply_source_overrides(&mut config.source, source, dir);
            let request = ScrapeRequest {
                formula,
                spreadsheet_url: sheet,
            };
            cmd_scrape(&config, &request, dry_run, json).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
        Command::Credentials { action } => match action {
            CredentialsAction::Check => cmd_credentials_check().await,
        },
    }
}

/// CLI flags win over the config file.
fn apply_source_overrides(
    source_config: &mut SourceConfig,
    source: Option<SourceArg>,
    dir: Option<PathBuf>,
) {
    if let Some(kind) = source {
        source_config.kind = kind.into();
    }
    if let Some(dir) = dir {
        source_config.dir = Some(dir.to_string_lossy().into_owned());
    }
}

fn build_source(config: &SourceConfig) -> Result<Arc<dyn SourceAdapter>> {
    match config.kind {
        SourceKind::Demo => Ok(Arc::new(DemoSource)),
        SourceKind::Files => {
            let dir = config
                .dir
                .as_deref()
                .ok_or_else(|| eyre!("the files source needs --dir or [source].dir"))?;
            Ok(Arc::new(FileSource::new(dir)))
        }
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_scrape(
    config: &AppConfig,
    request: &ScrapeRequest,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let source = build_source(&config.source)?;
    let extractor = FieldExtractor::from_config(&config.openrouter)?;
    if !extractor.has_primary() {
        warn!(
            env = %config.openrouter.api_key_env,
            "no extraction API key set, using pattern extraction only"
        );
    }

    let preview = dry_run.then(|| Arc::new(MemorySheetClient::new()));
    let client: Arc<dyn SpreadsheetClient> = match &preview {
        Some(memory) => Arc::clone(memory) as Arc<dyn SpreadsheetClient>,
        None => Arc::new(GoogleSheetsClient::from_config(&config.sheets)?),
    };

    let synchronizer = Synchronizer::new(
        client,
        Duration::from_secs(config.sheets.write_timeout_secs),
    );
    let pipeline = Pipeline::new(source, extractor, synchronizer);

    info!(
        formula = %request.formula,
        source = pipeline.source_name(),
        dry_run,
        "scraping"
    );

    let reporter = CliProgress::new();
    let result = marksync_core::handle(&pipeline, request, &reporter).await;
    reporter.spinner.finish_and_clear();

    let response = match result {
        Ok(response) if dry_run => response.into_dry_run(),
        Ok(response) => response,
        Err(failure) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&failure)?);
            }
            return Err(eyre!(failure));
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_summary(&response);
    }

    if let Some(memory) = preview {
        print_preview(&memory.rows().await);
    }

    Ok(())
}

fn print_summary(response: &ScrapeResponse) {
    println!();
    println!("  {}", response.message);
    if let Some(records) = &response.data {
        for record in records {
            println!(
                "  - {:<20} {:<10} {}",
                record.mark, record.us_serial_number, record.correspondent_email
            );
        }
    }
    println!();
}

fn print_preview(rows: &[Vec<String>]) {
    println!("  Dry run: an empty sheet would now contain {} row(s):", rows.len());
    for (i, row) in rows.iter().enumerate() {
        println!("  {:>3} | {}", i + 1, row.join(" | "));
    }
    println!();
    println!("  A sheet whose first row differs from the header is cleared first.");
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, outcome: &RunOutcome) {
        self.spinner.finish_and_clear();
        if *outcome == RunOutcome::NoData {
            info!("source returned no documents");
        }
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

async fn cmd_credentials_check() -> Result<()> {
    let config = load_config()?;

    let path = match resolve_credentials_path(&config.sheets) {
        Ok(path) => path,
        Err(e) => {
            print_credentials_guide(&config.sheets.credentials_env, &config.sheets.default_credentials_file);
            return Err(e.into());
        }
    };

    let key = ServiceAccountKey::from_file(&path)?;
    info!(path = %path.display(), "service-account key is valid");

    println!();
    println!("  Key file:        {}", path.display());
    println!("  Service account: {}", key.client_email);
    println!("  Token endpoint:  {}", key.token_uri);
    println!();
    println!("  Share the target spreadsheet with the service account as an Editor.");
    println!();
    Ok(())
}

fn print_credentials_guide(env_var: &str, default_file: &str) {
    println!();
    println!("  No Google service-account key found.");
    println!();
    println!("  1. In Google Cloud Console, enable the Google Sheets API and Google Drive API.");
    println!("  2. Create a service account and download a JSON key for it.");
    println!("  3. Either save the key as ./{default_file}");
    println!("     or export {env_var}=/path/to/key.json");
    println!("  4. Share the spreadsheet with the service account's email as an Editor.");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scrape_help_warns_about_clearing() {
        let mut cmd = Cli::command();
        let help = cmd
            .find_subcommand_mut("scrape")
            .expect("scrape subcommand")
            .render_long_help()
            .to_string();
        assert!(help.contains("cleared"));
    }

    #[test]
    fn flags_override_source_config() {
        let cli = Cli::parse_from([
            "marksync",
            "scrape",
            "--formula",
            "DEMO",
            "--sheet",
            "https://docs.google.com/spreadsheets/d/abc/edit",
            "--source",
            "files",
            "--dir",
            "saved",
        ]);
        let Command::Scrape { source, dir, .. } = cli.command else {
            panic!("expected scrape");
        };

        let mut config = SourceConfig::default();
        apply_source_overrides(&mut config, source, dir);
        assert_eq!(config.kind, SourceKind::Files);
        assert_eq!(config.dir.as_deref(), Some("saved"));
        assert!(build_source(&config).is_ok());
    }

    #[test]
    fn files_source_needs_a_directory() {
        let config = SourceConfig {
            kind: SourceKind::Files,
            dir: None,
        };
        assert!(build_source(&config).is_err());
    }
}
