//! ProClip CLI: cut a long video into fixed-length clips.
//!
//! Usage:
//!   proclip plan <VIDEO> [OPTIONS]      Print the clip plan without rendering
//!   proclip export <VIDEO> [OPTIONS]    Render every clip of a job
//!   proclip probe <PATH>                Show media source information
//!   proclip check                       Check system capabilities

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "proclip",
    about = "Cut videos into looped, reframed clip batches",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that describes a clip job.
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Foreground video file
    pub video: PathBuf,

    /// Length of each clip in seconds
    #[arg(short = 'd', long, default_value = "10")]
    pub clip_secs: f64,

    /// Background audio file
    #[arg(short, long)]
    pub background: Option<PathBuf>,

    /// Audio mode: background|mix|original
    #[arg(long, default_value = "mix")]
    pub audio: String,

    /// Number of clips: auto or a positive number
    #[arg(short, long, default_value = "auto")]
    pub count: String,

    /// Output resolution: original|4k|1080p|720p|480p|360p|240p|144p|<N>p
    #[arg(short, long, default_value = "original")]
    pub resolution: String,

    /// Output frame rate: source or a number
    #[arg(long, default_value = "source")]
    pub fps: String,

    /// Output aspect ratio: original or W:H (9:16, 16:9, 1:1, 4:5)
    #[arg(short, long, default_value = "original")]
    pub aspect: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the planned clips as JSON without rendering
    Plan {
        #[command(flatten)]
        job: JobArgs,
    },

    /// Render every clip of a job
    Export {
        #[command(flatten)]
        job: JobArgs,

        /// Output directory (defaults to the configured export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show media source information
    Probe {
        /// Path to a media file
        path: PathBuf,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = proclip_common::config::AppConfig::load();
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    proclip_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Plan { job } => commands::plan::run(job, &config).await,
        Commands::Export { job, output } => commands::export::run(job, output, &config).await,
        Commands::Probe { path } => commands::probe::run(path).await,
        Commands::Check => commands::check::run(&config),
    }
}
