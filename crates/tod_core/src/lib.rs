//! # tod_core - TOD Checking sampler
//!
//! Samples the FMS distance to top of descent once per second, appends a
//! sample record to a text log every five minutes, and pauses the sim when
//! the aircraft is a configured distance (10 NM by default) before TOD.
//!
//! ## Layout
//! - `sampler`: the per-tick logic (cadence check, threshold trigger)
//! - `sink`: flushed append-only log and its record formats
//! - `plugin`: host lifecycle (start/stop/enable/disable, flight loop)
//! - `host`: capabilities the plugin needs from the simulator, plus `MockHost`
//! - `path`: build-time selected host path normalization
//! - `sim`: frame-stepped scheduler for tests and offline replays

pub mod config;
pub mod error;
pub mod host;
pub mod path;
pub mod plugin;
pub mod sampler;
pub mod sim;
pub mod sink;

pub use config::SamplerConfig;
pub use error::{PathError, Result, SinkError, TodError};
pub use host::{Host, Interval, MockHost, PauseRecord};
pub use path::{normalize_path, PathNormalizer};
pub use plugin::{PluginInfo, TodPlugin, PLUGIN_INFO};
pub use sampler::{truncate_reading, ActionSink, Sampler};
pub use sim::HostSimulator;
pub use sink::LogSink;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
