//! Lane Finder Replay
//!
//! Feeds recorded per-frame segment lists through a [`LaneFinder`] and
//! writes one JSON result line per frame. Input is JSON lines:
//!
//! ```text
//! {"width": 960, "height": 540, "segments": [[100, 540, 400, 324]]}
//! ```
//!
//! A record with `"reset": true` starts a new stream and clears tracking
//! state before the frame is processed.

use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File};
use lane_core::{FrameGeometry, FrameLanes, LaneConfig, LaneFinder, Segment};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Replay settings, layered from defaults, an optional file and
/// `LANE_`-prefixed environment variables (`__` separates nested keys,
/// e.g. `LANE_LANES__SMOOTHING_WEIGHT=0.4`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,

    /// Emit logs as JSON
    pub log_json: bool,

    /// Lane finder options
    pub lanes: LaneConfig,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            lanes: LaneConfig::default(),
        }
    }
}

impl ReplaySettings {
    /// Load settings, reading `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(
                Environment::with_prefix("LANE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn level(&self) -> Result<Level> {
        Level::from_str(&self.log_level)
            .map_err(|_| anyhow!("Unknown log level: {}", self.log_level))
    }
}

/// Initialize logging on stderr, keeping stdout for results
pub fn init_logging(level: Level, json: bool) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("Failed to set tracing subscriber")
}

/// One recorded frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Frame number; defaults to the running frame count
    #[serde(default)]
    pub frame: Option<u64>,

    pub width: u32,

    pub height: u32,

    #[serde(default)]
    pub segments: Vec<Segment>,

    /// Start of a new, unrelated stream
    #[serde(default)]
    pub reset: bool,
}

/// Result line for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOutput {
    pub frame: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lanes: Option<FrameLanes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Replay totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub frames: u64,
    pub left_present: u64,
    pub right_present: u64,
    pub side_faults: u64,
    pub failed_frames: u64,
}

/// Replay every record from `input`, writing results to `output`.
///
/// Malformed input lines abort the replay; frames the lane finder rejects
/// are reported in their output line and counted as failed.
pub fn run_replay<R: BufRead, W: Write>(
    finder: &mut LaneFinder,
    input: R,
    mut output: W,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read input line {line_no}"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: FrameRecord = serde_json::from_str(line)
            .with_context(|| format!("Malformed frame record on line {line_no}"))?;
        let frame = record.frame.unwrap_or(summary.frames);

        if record.reset {
            info!(frame, "Stream reset");
            finder.reset();
        }

        let geometry = FrameGeometry::new(record.width, record.height);
        let out = match finder.process_frame(&record.segments, geometry) {
            Ok(lanes) => {
                summary.left_present += lanes.left.present as u64;
                summary.right_present += lanes.right.present as u64;
                summary.side_faults += lanes.faults.len() as u64;
                debug!(
                    frame,
                    left = lanes.left.present,
                    right = lanes.right.present,
                    "Frame processed"
                );
                FrameOutput {
                    frame,
                    lanes: Some(lanes),
                    error: None,
                }
            }
            Err(e) => {
                warn!(frame, "Frame rejected: {}", e);
                summary.failed_frames += 1;
                FrameOutput {
                    frame,
                    lanes: None,
                    error: Some(e.to_string()),
                }
            }
        };

        serde_json::to_writer(&mut output, &out)?;
        writeln!(output)?;
        summary.frames += 1;
    }

    output.flush()?;
    Ok(summary)
}
