use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use fieldsuggest_indexer::{
    IndexStats, MarkdownVault, Settings, VaultWatcher, SETTINGS_FILE_NAME,
};
use fieldsuggest_protocol::{serialize_json, serialize_json_pretty, CompositeValue, TriggerSpan};
use log::info;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

mod session;

pub use session::{SuggestSession, SuggestionContext};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "fieldsuggest")]
#[command(about = "Autocomplete for inline `field:: value` metadata", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Vault directory (defaults to current directory)
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,

    /// Settings file (defaults to <vault>/.fieldsuggest.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the suggestion index and print it
    Index(IndexArgs),

    /// Rank suggestions for the span under the cursor
    Suggest(SuggestArgs),

    /// Replace the span under the cursor with a chosen value
    Complete(CompleteArgs),

    /// Keep the index up to date with vault changes until interrupted
    Watch,
}

#[derive(Args)]
struct IndexArgs {
    /// Print statistics only
    #[arg(long)]
    stats_only: bool,
}

#[derive(Args)]
struct SuggestArgs {
    /// Line being edited
    #[arg(long, allow_hyphen_values = true)]
    line: String,

    /// Cursor position, in characters from the start of the line
    #[arg(long)]
    cursor: usize,

    /// Also render highlighted values with `<mark>` tags
    #[arg(long)]
    marked: bool,
}

#[derive(Args)]
struct CompleteArgs {
    /// Line being edited
    #[arg(long, allow_hyphen_values = true)]
    line: String,

    /// Cursor position, in characters from the start of the line
    #[arg(long)]
    cursor: usize,

    /// Composite value to insert
    #[arg(long, allow_hyphen_values = true)]
    value: String,
}

#[derive(Serialize)]
struct IndexOutput<'a> {
    stats: &'a IndexStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<&'a [CompositeValue]>,
}

#[derive(Serialize)]
struct SuggestOutput {
    span: TriggerSpan,
    suggestions: Vec<SuggestionView>,
}

#[derive(Serialize)]
struct SuggestionView {
    value: CompositeValue,
    score: u32,
    highlights: Vec<std::ops::Range<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    marked: Option<String>,
}

impl SuggestOutput {
    fn new(context: SuggestionContext, marked: bool) -> Self {
        let suggestions = context
            .suggestions
            .into_iter()
            .map(|s| SuggestionView {
                marked: marked.then(|| s.marked()),
                value: s.value,
                score: s.score,
                highlights: s.highlights,
            })
            .collect();
        Self {
            span: context.span,
            suggestions,
        }
    }
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Index(args) => run_index(&cli.vault, cli.config.as_deref(), args)?,
        Commands::Suggest(args) => run_suggest(&cli.vault, cli.config.as_deref(), args)?,
        Commands::Complete(args) => run_complete(args)?,
        Commands::Watch => run_watch(&cli.vault, cli.config.as_deref()).await?,
    }

    Ok(())
}

fn load_settings(vault: &Path, config: Option<&Path>) -> Result<Settings> {
    match config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => Settings::load_or_default(&vault.join(SETTINGS_FILE_NAME))
            .context("Failed to load vault settings"),
    }
}

fn open_session(vault: &Path, config: Option<&Path>) -> Result<SuggestSession<MarkdownVault>> {
    let settings = load_settings(vault, config)?;
    let source = MarkdownVault::open(vault).context("Invalid vault path")?;
    let mut session = SuggestSession::new(source, settings).context("Invalid filter patterns")?;
    let stats = session.initialize();
    info!(
        "Indexed {} documents ({} ignored) into {} values in {} ms",
        stats.documents_indexed, stats.documents_ignored, stats.unique_values, stats.time_ms
    );
    Ok(session)
}

fn run_index(vault: &Path, config: Option<&Path>, args: IndexArgs) -> Result<()> {
    let session = open_session(vault, config)?;
    let Some(stats) = session.last_build() else {
        bail!("index was not built");
    };
    let output = IndexOutput {
        stats,
        values: (!args.stats_only).then(|| session.index().values()),
    };
    print_stdout(&serialize_json_pretty(&output)?)
}

fn run_suggest(vault: &Path, config: Option<&Path>, args: SuggestArgs) -> Result<()> {
    let mut session = open_session(vault, config)?;
    let output = session
        .suggest(&args.line, args.cursor)
        .map(|context| SuggestOutput::new(context, args.marked));
    print_stdout(&serialize_json_pretty(&output)?)
}

fn run_complete(args: CompleteArgs) -> Result<()> {
    let Some(span) = fieldsuggest_trigger::resolve(&args.line, args.cursor) else {
        bail!("cursor {} is not inside a trigger span", args.cursor);
    };
    print_stdout(&fieldsuggest_trigger::apply_completion(
        &args.line,
        &span,
        &args.value,
    ))
}

async fn run_watch(vault: &Path, config: Option<&Path>) -> Result<()> {
    let mut session = open_session(vault, config)?;
    let mut watcher =
        VaultWatcher::start(session.source().root()).context("Failed to start watcher")?;
    info!(
        "Watching {} for changes (Ctrl-C to stop)",
        watcher.root().display()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watcher");
                break;
            }
            batch = watcher.next_events() => {
                let Some(events) = batch else {
                    break;
                };
                for event in events {
                    let line = serialize_json(&event)?;
                    session.handle_event(event);
                    info!("{line} -> {} unique values", session.index().len());
                }
            }
        }
    }
    Ok(())
}
