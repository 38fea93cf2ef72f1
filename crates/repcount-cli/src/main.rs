//! `repcount-replay` binary: runs recorded keypoint frames through a counter.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin repcount-replay -- session.jsonl --exercise "Pull Ups"
//! cat session.jsonl | cargo run --bin repcount-replay -- - --exercise squats --json
//! ```
//!
//! Input is JSON lines, one record per camera frame:
//!
//! ```json
//! {"timestamp": 12.533, "keypoints": [[x, y, confidence], ...]}
//! {"timestamp": 12.566, "keypoints": null}
//! ```
//!
//! `keypoints` is the pose model output in COCO order, or `null` when no
//! person was detected. Timestamps are seconds and drive the counter clock,
//! so cooldowns behave as they did during the recording.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use repcount_core::{CounterConfig, Error, KeypointFrame, ManualClock, Result, SessionId, Timestamp};
use repcount_motion::{ExerciseKind, SessionRegistry, Status};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;

/// Command-line arguments for the replay binary.
#[derive(Parser, Debug)]
#[command(
    name = "repcount-replay",
    version,
    about = "Replay recorded keypoint frames through a repetition counter",
    long_about = None
)]
struct Args {
    /// JSON-lines recording, or `-` for stdin.
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Exercise to count ("Pull Ups", "bicep_curl", "squats", ...).
    #[arg(short, long, default_value = "pull_up")]
    exercise: ExerciseKind,

    /// Counter configuration file (TOML, YAML or JSON).
    ///
    /// `REPCOUNT__*` environment variables override individual values.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Session identifier used in logs.
    #[arg(long, default_value = "default")]
    session: String,

    /// Print one JSON object per frame instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Only print the final summary.
    #[arg(long, default_value_t = false)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// One recorded frame.
#[derive(Debug, Deserialize)]
struct ReplayRecord {
    timestamp: f64,
    #[serde(default)]
    keypoints: Option<KeypointFrame>,
}

/// Per-frame output line.
#[derive(Debug, Serialize)]
struct FrameResult {
    frame: usize,
    timestamp: f64,
    count: u32,
    status: Status,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(level_filter(&args.log_level))
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&args) {
        error!("Replay failed: {e}");
        std::process::exit(1);
    }
}

/// Parse `--log-level`, falling back to info for unknown names
fn level_filter(level: &str) -> LevelFilter {
    level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO)
}

fn load_config(args: &Args) -> Result<CounterConfig> {
    match args.config.as_deref() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            let path = path
                .to_str()
                .ok_or_else(|| Error::InvalidInput(format!("non UTF-8 config path: {}", path.display())))?;
            CounterConfig::from_file(path)
        }
        None => CounterConfig::from_env(),
    }
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path)?;
    Ok(Box::new(BufReader::new(file)))
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let clock = ManualClock::new(Timestamp::from_nanos(0));
    let registry = SessionRegistry::with_clock(config, Arc::new(clock.clone()))?;
    let session = SessionId::new(args.session.as_str());

    info!("Replaying {} as {}", args.input.display(), args.exercise);

    let reader = open_input(&args.input)?;
    let mut frames = 0;
    let mut last_timestamp = f64::NEG_INFINITY;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record: ReplayRecord = serde_json::from_str(&line)
            .map_err(|e| Error::InvalidInput(format!("line {}: {e}", line_no + 1)))?;

        if record.timestamp < last_timestamp {
            warn!(
                "Line {}: timestamp {:.3} goes backwards (previous {:.3})",
                line_no + 1,
                record.timestamp,
                last_timestamp
            );
        }
        last_timestamp = record.timestamp;
        clock.set(Timestamp::from_secs_f64(record.timestamp));

        let (count, status) = registry.analyze(&session, args.exercise, record.keypoints.as_ref())?;
        frames += 1;

        if args.quiet {
            continue;
        }
        let result = FrameResult {
            frame: frames,
            timestamp: record.timestamp,
            count,
            status,
        };
        if args.json {
            println!("{}", serde_json::to_string(&result)?);
        } else {
            println!(
                "frame {:>6}  t={:>9.3}s  reps={:>3}  {}",
                result.frame, result.timestamp, result.count, result.status
            );
        }
    }

    let snapshot = registry
        .snapshot(&session)
        .ok_or_else(|| Error::InvalidInput("recording contains no frames".into()))?;

    if args.json {
        println!("{}", serde_json::to_string(&snapshot)?);
    } else {
        println!("{}: {} reps over {} frames", args.exercise, snapshot.count, snapshot.frames_processed);
    }
    info!("Replay finished: {} frames, {} reps", frames, snapshot.count);

    Ok(())
}
