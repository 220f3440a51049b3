//! Waypoint CLI
//!
//! Command-line interface for building and querying checkpoint indexes:
//! - Build an index from a checkpoint listing
//! - Floor-search an index for a timestamp
//! - Inspect index metadata

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waypoint::config::Config;
use waypoint::index::{
    BTreeIndex, ByteOffsetCodec, CheckpointCollection, FlatIndex, IndexConfig, Timestamp,
};

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Checkpoint indexes for append-only trace files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a config file (default: standard locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from a checkpoint listing
    ///
    /// The listing is a text file with one `<timestamp> <byte-offset>`
    /// pair per line. Lines starting with '#' are skipped.
    Build {
        /// Path to the checkpoint listing
        listing: PathBuf,
        /// Path of the index file to create
        index: PathBuf,
        /// Build a flat index (requires timestamp-ordered input)
        #[arg(long)]
        flat: bool,
        /// B-tree degree (overrides config)
        #[arg(long)]
        degree: Option<usize>,
    },

    /// Find the checkpoint at or before a timestamp
    Query {
        /// Path of the index file
        index: PathBuf,
        /// Timestamp to search for
        timestamp: Timestamp,
        /// Query a flat index instead of a B-tree
        #[arg(long)]
        flat: bool,
    },

    /// Show index metadata
    Info {
        /// Path of the index file
        index: PathBuf,
        /// Read the header as a flat index
        #[arg(long)]
        flat: bool,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("waypoint={}", config.logging.level)),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Build {
            listing,
            index,
            flat,
            degree,
        } => {
            let mut index_config = config.index.index_config();
            if let Some(d) = degree {
                index_config.degree = d;
            }
            cmd_build(&listing, &index, flat, index_config)
        }
        Commands::Query {
            index,
            timestamp,
            flat,
        } => cmd_query(&index, timestamp, flat, config.index.index_config()),
        Commands::Info { index, flat, json } => {
            cmd_info(&index, flat, json, config.index.index_config())
        }
    }
}

fn cmd_build(
    listing: &PathBuf,
    index_path: &PathBuf,
    flat: bool,
    index_config: IndexConfig,
) -> anyhow::Result<()> {
    let file = std::fs::File::open(listing)
        .with_context(|| format!("cannot open listing {:?}", listing))?;
    let reader = BufReader::new(file);

    let mut checkpoints = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(ts), Some(offset)) = (parts.next(), parts.next()) else {
            bail!("listing line {}: expected `<timestamp> <offset>`", line_no + 1);
        };
        let ts: Timestamp = ts
            .parse()
            .with_context(|| format!("listing line {}: bad timestamp", line_no + 1))?;
        let offset: u64 = offset
            .parse()
            .with_context(|| format!("listing line {}: bad offset", line_no + 1))?;
        checkpoints.push((ts, offset));
    }

    // Ranks follow insertion order, so index in timestamp order
    checkpoints.sort_by_key(|(ts, _)| *ts);

    let start = std::time::Instant::now();
    let count = if flat {
        let mut index = FlatIndex::open(index_path, ByteOffsetCodec)?;
        if !index.is_created_from_scratch() {
            bail!("index {:?} already exists", index_path);
        }
        for (ts, offset) in &checkpoints {
            index.insert(*ts, *offset)?;
        }
        index.set_index_complete()?;
        index.size()
    } else {
        let mut index = BTreeIndex::open(index_path, ByteOffsetCodec, index_config)?;
        if !index.is_created_from_scratch() {
            bail!("index {:?} already exists", index_path);
        }
        for (ts, offset) in &checkpoints {
            index.insert(*ts, *offset)?;
        }
        index.set_index_complete()?;
        index.size()
    };

    tracing::info!(
        "Indexed {} checkpoints into {:?} in {:?}",
        count,
        index_path,
        start.elapsed()
    );
    println!("{} checkpoints indexed", count);
    Ok(())
}

fn cmd_query(
    index_path: &PathBuf,
    timestamp: Timestamp,
    flat: bool,
    index_config: IndexConfig,
) -> anyhow::Result<()> {
    if !index_path.exists() {
        bail!("no index at {:?}", index_path);
    }
    let floor = if flat {
        let mut index = FlatIndex::open(index_path, ByteOffsetCodec)?;
        ensure_existing(index.is_created_from_scratch(), index_path)?;
        index.find_floor(timestamp)?
    } else {
        let mut index = BTreeIndex::open(index_path, ByteOffsetCodec, index_config)?;
        ensure_existing(index.is_created_from_scratch(), index_path)?;
        index.find_floor(timestamp)?
    };

    match floor {
        Some(checkpoint) => {
            println!(
                "rank {} timestamp {} offset {}",
                checkpoint.rank, checkpoint.timestamp, checkpoint.location
            );
        }
        None => {
            println!("no checkpoint at or before {}", timestamp);
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct IndexInfo {
    path: PathBuf,
    kind: &'static str,
    checkpoints: u32,
    events: u64,
    time_start: Option<Timestamp>,
    time_end: Option<Timestamp>,
}

fn cmd_info(
    index_path: &PathBuf,
    flat: bool,
    json: bool,
    index_config: IndexConfig,
) -> anyhow::Result<()> {
    if !index_path.exists() {
        bail!("no index at {:?}", index_path);
    }
    let (header, kind) = if flat {
        let index = FlatIndex::open(index_path, ByteOffsetCodec)?;
        ensure_existing(index.is_created_from_scratch(), index_path)?;
        (index.header().clone(), "flat")
    } else {
        let index = BTreeIndex::open(index_path, ByteOffsetCodec, index_config)?;
        ensure_existing(index.is_created_from_scratch(), index_path)?;
        (index.header().clone(), "btree")
    };

    let info = IndexInfo {
        path: index_path.clone(),
        kind,
        checkpoints: header.count,
        events: header.nb_events,
        time_start: header.time_range.map(|r| r.start),
        time_end: header.time_range.map(|r| r.end),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Index:       {:?}", info.path);
        println!("Kind:        {}", info.kind);
        println!("Checkpoints: {}", info.checkpoints);
        println!("Events:      {}", info.events);
        match (info.time_start, info.time_end) {
            (Some(start), Some(end)) => {
                println!("Time range:  {} .. {}", format_ts(start), format_ts(end));
            }
            _ => println!("Time range:  (unset)"),
        }
    }
    Ok(())
}

fn ensure_existing(created_from_scratch: bool, path: &PathBuf) -> anyhow::Result<()> {
    if created_from_scratch {
        bail!("no complete index at {:?}", path);
    }
    Ok(())
}

/// Render a nanosecond timestamp as UTC, falling back to the raw value
fn format_ts(ts: Timestamp) -> String {
    let dt = chrono::DateTime::from_timestamp_nanos(ts);
    format!("{} ({})", dt.format("%Y-%m-%d %H:%M:%S%.9f UTC"), ts)
}
