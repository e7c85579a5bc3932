//! TOD Checking trace replay
//!
//! Feeds a recorded `elapsed,distance` CSV trace through the plugin on a
//! simulated host and reports where it would have paused.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use tod_core::path::PassthroughNormalizer;
use tod_core::{HostSimulator, MockHost, PauseRecord, SamplerConfig, TodPlugin};

/// One recorded reading.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TraceRow {
    /// Seconds since the sim started.
    pub elapsed: f64,
    /// FMS distance to TOD in NM.
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    rows: Vec<TraceRow>,
}

impl Trace {
    pub fn new(rows: Vec<TraceRow>) -> Result<Self> {
        if rows.is_empty() {
            bail!("Trace has no rows");
        }
        // Replays end at the last elapsed time and bisect on it.
        if let Some(index) = rows
            .iter()
            .position(|row| !row.elapsed.is_finite() || !row.distance.is_finite())
        {
            bail!(
                "Trace row {} is not finite (elapsed {}, distance {})",
                index + 1,
                rows[index].elapsed,
                rows[index].distance
            );
        }
        for (index, pair) in rows.windows(2).enumerate() {
            if pair[1].elapsed < pair[0].elapsed {
                bail!(
                    "Trace row {} goes back in time ({} < {})",
                    index + 2,
                    pair[1].elapsed,
                    pair[0].elapsed
                );
            }
        }
        Ok(Self { rows })
    }

    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut rows = Vec::new();
        for (index, record) in csv.deserialize::<TraceRow>().enumerate() {
            let row: TraceRow =
                record.with_context(|| format!("Invalid trace row {}", index + 1))?;
            rows.push(row);
        }
        Self::new(rows)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open trace: {}", path.display()))?;
        Self::from_csv_reader(file)
    }

    /// Reading held from the latest row at or before `time`.
    pub fn reading_at(&self, time: f64) -> f32 {
        let index = self.rows.partition_point(|row| row.elapsed <= time);
        self.rows[index.saturating_sub(1)].distance
    }

    pub fn end(&self) -> f64 {
        self.rows.last().map(|row| row.elapsed).unwrap_or(0.0)
    }

    pub fn rows(&self) -> &[TraceRow] {
        &self.rows
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    /// Simulated seconds per frame.
    pub frame_dt: f32,
    /// Unpause on the next frame after each pause.
    pub auto_resume: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            frame_dt: 0.25,
            auto_resume: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub frames: u64,
    pub calls: u32,
    pub sim_time: f64,
    pub pauses: Vec<PauseRecord>,
    pub final_threshold: Option<i32>,
    pub log_path: Option<PathBuf>,
    pub log_open: bool,
}

/// Replay `trace`, writing the plugin log to `log_path`.
pub fn replay(
    trace: &Trace,
    config: SamplerConfig,
    log_path: &Path,
    options: ReplayOptions,
) -> Result<ReplaySummary> {
    if !options.frame_dt.is_finite() || options.frame_dt <= 0.0 {
        bail!("frame_dt must be positive, got {}", options.frame_dt);
    }
    config.validate()?;

    let (system_path, file_name) = split_log_path(log_path)?;
    let config = SamplerConfig {
        log_file_name: file_name,
        ..config
    };

    let plugin = TodPlugin::with_normalizer(
        MockHost::new(system_path),
        config,
        Box::new(PassthroughNormalizer),
    );
    let mut sim = HostSimulator::new(plugin, options.frame_dt).with_auto_resume(options.auto_resume);

    if !sim.start() {
        bail!("Plugin refused to start (log file {})", log_path.display());
    }
    sim.run_until(trace.end(), |time| trace.reading_at(time));

    let sampler = sim.plugin().sampler();
    let summary = ReplaySummary {
        frames: sim.frames(),
        calls: sim.calls(),
        sim_time: sim.time(),
        pauses: sim.pauses().to_vec(),
        final_threshold: sampler.map(|s| s.threshold()),
        log_path: sim.plugin().log_path().map(Path::to_path_buf),
        log_open: sampler.map(|s| s.sink().is_open()).unwrap_or(false),
    };
    sim.stop();

    log::info!(
        "Replayed {:.1}s of trace: {} call(s), {} pause(s)",
        summary.sim_time,
        summary.calls,
        summary.pauses.len()
    );
    Ok(summary)
}

fn split_log_path(log_path: &Path) -> Result<(String, String)> {
    let file_name = log_path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Log path has no file name: {}", log_path.display()))?
        .to_string();
    let dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let dir = dir
        .to_str()
        .with_context(|| format!("Log directory is not UTF-8: {}", dir.display()))?
        .to_string();
    Ok((format!("{}{}", dir, MAIN_SEPARATOR), file_name))
}
