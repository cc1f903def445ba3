//! VidShim CLI - Offline inspection of the HTML5 backend
//!
//! Features:
//! - Codec strings derived from a stream info document
//! - The `canPlayType` queries a browser would be asked
//! - Probe dry-runs against a declared capability list
//! - Live seek URL construction

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

/// VidShim CLI - HTML5 backend inspection toolkit
#[derive(Parser)]
#[command(name = "vidshim-cli")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "Inspect how the HTML5 video backend treats a stream", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List codec strings for every track of a stream
    Codecs {
        /// Path to the stream info JSON
        info: PathBuf,
    },

    /// Show the capability queries the probe would issue
    Queries {
        /// Namespaced MIME, e.g. html5/video/mp4
        mime: String,

        /// Path to the stream info JSON
        info: PathBuf,

        /// Simultaneous track limit of the source
        #[arg(short, long, default_value = "1")]
        simul: usize,
    },

    /// Run the capability probe against a declared capability list
    Probe {
        /// Namespaced MIME, e.g. html5/video/mp4
        mime: String,

        /// Source URL
        url: String,

        /// Path to the stream info JSON
        info: PathBuf,

        /// Query strings the simulated browser can play
        #[arg(long = "supports", num_args = 1..)]
        supports: Vec<String>,

        /// Protocol of the simulated page
        #[arg(long, default_value = "https:")]
        page_protocol: String,

        /// User agent of the simulated browser
        #[arg(long, default_value = "Mozilla/5.0 (X11; Linux x86_64)")]
        user_agent: String,

        /// Simultaneous track limit of the source
        #[arg(short, long, default_value = "1")]
        simul: usize,

        /// Optional shim config JSON
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the URL a live seek would load
    SeekUrl {
        /// Live source URL
        url: String,

        /// Seconds from the live edge (zero or negative)
        #[arg(allow_hyphen_values = true)]
        offset: f64,
    },

    /// List the MIME types this backend accepts
    Mimes,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    vidshim_core::init();

    match cli.command {
        Commands::Codecs { info } => {
            commands::codecs(&info, &cli.format)?;
        }
        Commands::Queries { mime, info, simul } => {
            commands::queries(&mime, &info, simul, &cli.format)?;
        }
        Commands::Probe {
            mime,
            url,
            info,
            supports,
            page_protocol,
            user_agent,
            simul,
            config,
        } => {
            let simulated = commands::Simulation {
                supports,
                page_protocol,
                user_agent,
                config,
            };
            let supported = commands::probe(&mime, &url, &info, simul, simulated, &cli.format)?;
            if !supported {
                std::process::exit(1);
            }
        }
        Commands::SeekUrl { url, offset } => {
            commands::seek_url(&url, offset, &cli.format)?;
        }
        Commands::Mimes => {
            commands::mimes(&cli.format);
        }
    }

    Ok(())
}
