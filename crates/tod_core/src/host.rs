//! Host capabilities the plugin depends on.
//!
//! An adapter binds `Host` to a concrete simulator SDK. `MockHost` is an
//! in-memory host for tests and offline replays.

use serde::Serialize;

use crate::sampler::ActionSink;

pub trait Host: ActionSink {
    /// Directory the log file is written to, with a trailing separator.
    fn system_path(&self) -> String;

    /// Write a line to the host's debug log.
    fn debug_string(&mut self, message: &str);

    /// Seconds since the sim started.
    fn elapsed_time(&self) -> f32;

    /// Read a float dataset by name.
    fn read_dataref(&self, name: &str) -> f32;

    /// Schedule the flight loop callback. See `Interval` for the meaning of
    /// `interval`.
    fn register_flight_loop(&mut self, interval: f32);

    fn unregister_flight_loop(&mut self);
}

/// Flight loop scheduling as encoded by the callback's return value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interval {
    /// Call again after this many seconds.
    Seconds(f32),
    /// Call again after this many sim frames.
    Frames(u32),
    /// Stay registered but do not call again.
    Unscheduled,
}

impl Interval {
    /// Positive values are seconds, negative values are the negated frame
    /// count, zero (or NaN) leaves the callback unscheduled.
    pub fn from_secs_f32(value: f32) -> Self {
        if value > 0.0 {
            Interval::Seconds(value)
        } else if value < 0.0 {
            Interval::Frames((-value).max(1.0) as u32)
        } else {
            Interval::Unscheduled
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PauseRecord {
    /// Host elapsed time when the pause was commanded.
    pub elapsed: f32,
    /// Dataset reading at that moment.
    pub reading: f32,
}

#[derive(Debug, Clone)]
pub struct MockHost {
    pub system_path: String,
    pub elapsed: f32,
    pub reading: f32,
    pub paused: bool,
    pub pauses: Vec<PauseRecord>,
    pub debug_lines: Vec<String>,
    /// Interval of the current registration, if any.
    pub registration: Option<f32>,
    /// Total number of `register_flight_loop` calls.
    pub registrations: u32,
}

impl MockHost {
    pub fn new(system_path: impl Into<String>) -> Self {
        Self {
            system_path: system_path.into(),
            elapsed: 0.0,
            reading: 0.0,
            paused: false,
            pauses: Vec::new(),
            debug_lines: Vec::new(),
            registration: None,
            registrations: 0,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registration.is_some()
    }
}

impl ActionSink for MockHost {
    fn pause(&mut self) {
        self.paused = true;
        self.pauses.push(PauseRecord {
            elapsed: self.elapsed,
            reading: self.reading,
        });
    }
}

impl Host for MockHost {
    fn system_path(&self) -> String {
        self.system_path.clone()
    }

    fn debug_string(&mut self, message: &str) {
        self.debug_lines.push(message.to_string());
    }

    fn elapsed_time(&self) -> f32 {
        self.elapsed
    }

    fn read_dataref(&self, _name: &str) -> f32 {
        self.reading
    }

    fn register_flight_loop(&mut self, interval: f32) {
        self.registration = Some(interval);
        self.registrations += 1;
    }

    fn unregister_flight_loop(&mut self) {
        self.registration = None;
    }
}
