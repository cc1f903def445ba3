//! CLI command implementations

use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::Tabled;
use tracing::debug;

use vidshim_core::{
    codec_string, distinct_codecs, source_url::with_start_offset, CapabilityProbe, MemoryLogger,
    Mime, ProbePlan, ShimConfig, SourceDescriptor, StaticCapabilities, StaticEnvironment,
    StreamInfo, SUPPORTED_MIMES,
};

use crate::output::{table, to_json, OutputFormat};

/// Simulated browser for a probe dry-run
pub struct Simulation {
    pub supports: Vec<String>,
    pub page_protocol: String,
    pub user_agent: String,
    pub config: Option<PathBuf>,
}

#[derive(Serialize, Tabled)]
struct CodecRow {
    track: String,
    #[tabled(rename = "type")]
    kind: String,
    codec: String,
    #[tabled(rename = "codec string")]
    codec_string: String,
}

#[derive(Serialize)]
struct ProbeReport<'a> {
    mime: &'a str,
    url: &'a str,
    queries: Vec<&'a str>,
    supported: bool,
    log: Vec<String>,
}

fn load_info(path: &Path) -> anyhow::Result<StreamInfo> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading stream info {}", path.display()))?;
    let info = StreamInfo::from_json(&json)?;
    debug!(tracks = info.meta.tracks.len(), live = info.is_live(), "Stream info loaded");
    Ok(info)
}

/// List codec strings for every track
pub fn codecs(info_path: &Path, format: &str) -> anyhow::Result<()> {
    let info = load_info(info_path)?;

    let rows: Vec<CodecRow> = info
        .meta
        .tracks
        .iter()
        .map(|(id, track)| CodecRow {
            track: id.clone(),
            kind: track.kind.clone(),
            codec: track.codec.clone(),
            codec_string: if track.is_meta() {
                "-".to_string()
            } else {
                codec_string(track)
            },
        })
        .collect();
    let distinct = distinct_codecs(info.meta.tracks.values());

    match OutputFormat::from(format) {
        OutputFormat::Json => {
            println!(
                "{}",
                to_json(&serde_json::json!({ "tracks": rows, "distinct": distinct }))
            );
        }
        OutputFormat::Text => {
            println!("{}", table(rows));
            println!("\nDistinct: {}", distinct.join(", "));
        }
    }
    Ok(())
}

/// Show the capability queries a probe would issue
pub fn queries(mime: &str, info_path: &Path, simul: usize, format: &str) -> anyhow::Result<()> {
    let info = load_info(info_path)?;
    let source = SourceDescriptor::new(mime, "").with_simul_tracks(simul);
    let plan = ProbePlan::build(&Mime::parse(mime), &source, &info);

    match OutputFormat::from(format) {
        OutputFormat::Json => {
            let required = match &plan {
                ProbePlan::AtLeast { required, .. } => Some(*required),
                _ => None,
            };
            println!(
                "{}",
                to_json(&serde_json::json!({ "queries": plan.queries(), "at_least": required }))
            );
        }
        OutputFormat::Text => match &plan {
            ProbePlan::AtLeast { queries, required } => {
                println!("At least {} of these must be playable:", required);
                for q in queries {
                    println!("  {}", q);
                }
            }
            ProbePlan::Single(q) => println!("  {}", q),
            ProbePlan::TooFewTracks { remaining, required } => {
                println!("No query: {} usable tracks, {} required", remaining, required);
            }
        },
    }
    Ok(())
}

/// Dry-run the capability probe
pub fn probe(
    mime: &str,
    url: &str,
    info_path: &Path,
    simul: usize,
    simulation: Simulation,
    format: &str,
) -> anyhow::Result<bool> {
    let info = load_info(info_path)?;
    let config = match &simulation.config {
        Some(path) => ShimConfig::from_json(
            &std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?,
        )?,
        None => ShimConfig::default(),
    };

    let source = SourceDescriptor::new(mime, url).with_simul_tracks(simul);
    let caps = StaticCapabilities::new(simulation.supports);
    let env = StaticEnvironment::new(simulation.page_protocol, simulation.user_agent);
    let logger = MemoryLogger::new();

    let supported = CapabilityProbe::new(&caps, &env, &logger, &config)
        .is_browser_supported(mime, &source, &info);
    let plan = ProbePlan::build(&Mime::parse(mime), &source, &info);

    let report = ProbeReport {
        mime,
        url,
        queries: plan.queries(),
        supported,
        log: logger.lines(),
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&report)),
        OutputFormat::Text => {
            println!("Probing {} for {}", report.mime, report.url);
            for line in &report.log {
                println!("  log: {}", line);
            }
            for q in &report.queries {
                println!("  query: {}", q);
            }
            println!("Supported: {}", if supported { "yes" } else { "no" });
        }
    }
    Ok(supported)
}

/// Print the URL a live seek would load
pub fn seek_url(url: &str, offset: f64, format: &str) -> anyhow::Result<()> {
    let config = ShimConfig::default();
    let offset = offset.min(0.0);
    let target = with_start_offset(url, &config.start_offset_param, offset)?;

    match OutputFormat::from(format) {
        OutputFormat::Json => println!(
            "{}",
            to_json(&serde_json::json!({ "offset": offset, "url": target }))
        ),
        OutputFormat::Text => println!("{}", target),
    }
    Ok(())
}

/// List accepted MIME types
pub fn mimes(format: &str) {
    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&SUPPORTED_MIMES)),
        OutputFormat::Text => {
            for mime in SUPPORTED_MIMES {
                println!("{}", mime);
            }
        }
    }
}
