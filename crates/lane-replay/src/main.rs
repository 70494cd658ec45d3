//! Lane Replay - Main Entry Point
//!
//! Usage: `lane-replay [SEGMENTS.jsonl | -] [CONFIG]`

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use lane_core::LaneFinder;
use lane_replay::{init_logging, run_replay, ReplaySettings};
use tracing::info;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input = args.next();
    if matches!(input.as_deref(), Some("-h" | "--help")) {
        eprintln!("Usage: lane-replay [SEGMENTS.jsonl | -] [CONFIG]");
        return Ok(());
    }
    let config_path = args.next().map(PathBuf::from);

    let settings = ReplaySettings::load(config_path.as_deref())?;
    init_logging(settings.level()?, settings.log_json)?;

    info!("=== Lane Replay v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Lane configuration: {:?}", settings.lanes);

    let mut finder = LaneFinder::new(settings.lanes.clone())?;
    let output = BufWriter::new(io::stdout().lock());

    let summary = match input.as_deref() {
        None | Some("-") => run_replay(&mut finder, io::stdin().lock(), output)?,
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to open {path}"))?;
            run_replay(&mut finder, BufReader::new(file), output)?
        }
    };

    info!(
        frames = summary.frames,
        left_present = summary.left_present,
        right_present = summary.right_present,
        side_faults = summary.side_faults,
        failed_frames = summary.failed_frames,
        "Replay finished"
    );
    Ok(())
}
