//! RemoteMedia FLV Probe - Tag-level inspection of FLV streams
//!
//! Reads an FLV file (or stdin) and prints every tag with its type, size,
//! millisecond timestamp and the timestamp converted to its media clock.
//!
//! # Usage
//!
//! ```bash
//! # Inspect a recording
//! remotemedia-flv-probe ./camera.flv
//!
//! # Pipe a live feed, JSON lines, first 100 tags
//! ffmpeg -i rtsp://camera/stream -c copy -f flv - | remotemedia-flv-probe - --json --max-tags 100
//!
//! # Use 44.1kHz for audio clock timestamps
//! remotemedia-flv-probe ./camera.flv --audio-clock-rate 44100
//! ```

mod config;
mod report;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use remotemedia_ingest_flv::{FlvTransport, Source};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::ProbeConfig;
use report::{Summary, TagRecord};

/// RemoteMedia FLV Probe - Inspect FLV streams tag by tag
#[derive(Parser)]
#[command(name = "remotemedia-flv-probe")]
#[command(author, version)]
#[command(about = "Print the tags of an FLV stream with converted media clock timestamps")]
struct Args {
    /// FLV file to read, or `-` for stdin
    #[arg(default_value = "-")]
    input: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Audio clock rate in Hz (overrides config)
    #[arg(long)]
    audio_clock_rate: Option<u32>,

    /// Video clock rate in Hz (overrides config)
    #[arg(long)]
    video_clock_rate: Option<u32>,

    /// Stop after this many tags
    #[arg(short = 'n', long)]
    max_tags: Option<u64>,

    /// Print one JSON object per tag instead of text
    #[arg(long)]
    json: bool,

    /// Only print the summary
    #[arg(short, long)]
    quiet: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let config = match &args.config {
        Some(path) => ProbeConfig::from_file(path)?,
        None => ProbeConfig::default(),
    }
    .with_overrides(args.audio_clock_rate, args.video_clock_rate, args.max_tags)?;

    tracing::debug!("Probe configuration: {:?}", config);

    let source: Box<dyn Source> = if args.input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("Failed to open {}", args.input))?;
        Box::new(BufReader::new(file))
    };

    let transport = FlvTransport::open(source)
        .with_context(|| format!("Failed to open FLV stream {}", args.input))?;
    tracing::info!("Opened FLV stream: {}", args.input);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = probe(transport, &config, &args, &mut out)?;

    if args.json {
        writeln!(out, "{}", serde_json::to_string(&summary)?)?;
    } else {
        writeln!(out, "{}", summary)?;
    }
    out.flush()?;

    Ok(())
}

/// Walk the stream, printing each tag, until it ends or `max_tags` is reached
fn probe<S: Source, W: Write>(
    mut transport: FlvTransport<S>,
    config: &ProbeConfig,
    args: &Args,
    out: &mut W,
) -> Result<Summary> {
    let mut summary = Summary::default();

    while config.max_tags.map_or(true, |max| summary.tags < max) {
        let Some(tag) = transport
            .next_tag()
            .with_context(|| format!("Failed after {} tags", summary.tags))?
        else {
            break;
        };

        if !args.quiet {
            let record = TagRecord::new(summary.tags, &tag, &config.clock);
            if args.json {
                writeln!(out, "{}", serde_json::to_string(&record)?)?;
            } else {
                writeln!(out, "{}", record)?;
            }
        }
        summary.record(&tag);
    }

    transport.close().context("Failed to close FLV stream")?;
    Ok(summary)
}
