use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use tubescribe_core::ScribeError;

mod commands;
mod prompt;
mod ui;

#[derive(Subcommand, Clone, Copy, Default)]
enum Mode {
    /// Fetch metadata and captions for every video, write lessons and reports
    #[default]
    Extract,
    /// Survey caption availability and map videos to curriculum weeks
    Analyze,
    /// Download every subtitle file with yt-dlp and build one markdown digest
    Subtitles,
}

#[derive(Parser)]
#[command(name = "tubescribe")]
#[command(
    about = "Extract YouTube playlist captions into lesson markdown, JSON, CSV and text reports"
)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Playlist URL. Defaults to the bootcamp playlist.
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Output directory. Each mode has its own default.
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Caption language code
    #[arg(short, long, global = true, default_value = "en")]
    lang: String,

    /// Pause between two videos, in milliseconds
    #[arg(long, global = true, default_value_t = 500)]
    delay_ms: u64,

    /// Skip the interactive confirmations
    #[arg(short, long, global = true)]
    yes: bool,

    /// yt-dlp executable to run
    #[arg(long, global = true, env = "TUBESCRIBE_YTDLP", default_value = "yt-dlp")]
    ytdlp: String,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tubescribe=info,tubescribe_core=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let outcome = match cli.mode.unwrap_or_default() {
        Mode::Extract => commands::run_extract(&cli).await,
        Mode::Analyze => commands::run_analyze(&cli).await,
        Mode::Subtitles => commands::run_subtitles(&cli).await,
    };

    if let Err(e) = outcome {
        if let Some(ScribeError::MissingDependency { tool }) = e.downcast_ref::<ScribeError>() {
            eprintln!(
                "{} {} is required but was not found.",
                style("Error:").red().bold(),
                tool
            );
            eprintln!("\nPlease install it:\n  pip install yt-dlp");
            std::process::exit(1);
        }
        return Err(e);
    }

    Ok(())
}
