mod script;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use markup::clock::{Clock, ManualClock, SystemClock};
use markup::config::{ConfigError, EditorConfig};
use markup::engine::EngineCore;
use markup::persist::{self, PersistError};
use markup::transform::{Rotation, Viewport};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Document(#[from] PersistError),
    #[error("invalid script: {0}")]
    Script(serde_json::Error),
    #[error("scale must be positive, got {0}")]
    InvalidScale(f64),
}

#[derive(Parser, Debug)]
#[command(name = "markup-cli", about = "Headless replay and inspection for the markup engine")]
struct Cli {
    /// Engine config JSON; missing fields use the defaults.
    #[arg(long, env = "MARKUP_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feed a scripted event list into the engine and print the resulting document.
    Replay(ReplayArgs),
    /// Print per-page annotation counts for a document.
    Summary {
        /// Document snapshot path, or - for stdin.
        doc: String,
    },
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// Script path, or - for stdin.
    #[arg(long)]
    script: String,

    /// Document snapshot to start from.
    #[arg(long)]
    doc: Option<String>,

    #[arg(long, default_value_t = 612.0)]
    page_width: f64,

    #[arg(long, default_value_t = 792.0)]
    page_height: f64,

    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Intrinsic page rotation in degrees (snapped to quarter turns).
    #[arg(long, default_value_t = 0)]
    page_rotation: u16,

    /// View rotation in degrees (snapped to quarter turns).
    #[arg(long, default_value_t = 0)]
    view_rotation: u16,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::from_json(&read_source(&path.to_string_lossy())?)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Replay(args) => run_replay(args, config),
        Command::Summary { doc } => run_summary(&doc),
    }
}

fn run_replay(args: ReplayArgs, config: EditorConfig) -> Result<(), CliError> {
    if args.scale <= 0.0 || !args.scale.is_finite() {
        return Err(CliError::InvalidScale(args.scale));
    }
    let mut viewport = Viewport::new(args.page_width, args.page_height, args.scale);
    viewport.page_rotation = Rotation::from(args.page_rotation);
    viewport.view_rotation = Rotation::from(args.view_rotation);

    let clock = ManualClock::new(SystemClock.now_ms());
    let mut core = EngineCore::new(viewport, config, Rc::new(clock.clone()));
    if let Some(doc) = &args.doc {
        core.load_document(persist::from_json(&read_source(doc)?)?);
    }

    let events = script::parse(&read_source(&args.script)?).map_err(CliError::Script)?;
    let event_count = events.len();
    let emitted = script::replay(&mut core, &clock, events);
    tracing::info!(events = event_count, actions = emitted, undo_depth = core.history.past_len(), "replay finished");

    println!("{}", persist::to_json(&core.store)?);
    Ok(())
}

fn run_summary(doc: &str) -> Result<(), CliError> {
    let annotations = persist::from_json(&read_source(doc)?)?;
    let pages = script::summarize(&annotations);
    if pages.is_empty() {
        println!("no annotations");
        return Ok(());
    }
    for (page, kinds) in pages {
        let counts: Vec<String> = kinds.iter().map(|(kind, n)| format!("{n} {kind}")).collect();
        println!("page {page}: {}", counts.join(", "));
    }
    Ok(())
}

/// Read a file, or stdin for `-`.
fn read_source(path: &str) -> Result<String, CliError> {
    let read_err = |source| CliError::Read { path: path.to_owned(), source };
    if path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map_err(read_err)?;
        return Ok(buf);
    }
    fs::read_to_string(Path::new(path)).map_err(read_err)
}
