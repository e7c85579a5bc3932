//! Periodic Threshold Sampler
//!
//! Samples the distance to TOD once per tick, writes a sample record every
//! `log_every_ticks` ticks and pauses the sim when the distance equals the
//! threshold. The threshold is then bumped by one so that unpausing does not
//! immediately pause again on the same reading.
//!
//! The comparison is an exact match on the truncated value. A reading that
//! jumps over the threshold between two ticks (11 -> 9) never fires.

use std::path::Path;

use crate::config::SamplerConfig;
use crate::error::SinkError;
use crate::sink::{sample_record, LogSink};

/// Receiver of the fire-and-forget pause command.
pub trait ActionSink {
    fn pause(&mut self);
}

#[derive(Debug)]
pub struct Sampler {
    elapsed_ticks: i32,
    current_value: i32,
    threshold: i32,
    log_every_ticks: i32,
    callback_interval: f32,
    triggers: u32,
    sink: LogSink,
}

impl Sampler {
    /// Open the log at `path` and start sampling.
    pub fn open(path: &Path, config: &SamplerConfig) -> Result<Self, SinkError> {
        let sink = LogSink::create(path)?;
        Ok(Self::start(sink, config))
    }

    /// Start sampling into an already opened (or disabled) sink.
    /// Writes the opening timestamp record.
    pub fn start(sink: LogSink, config: &SamplerConfig) -> Self {
        let mut sampler = Self {
            elapsed_ticks: 0,
            current_value: 0,
            threshold: config.initial_threshold,
            log_every_ticks: config.log_every_ticks,
            callback_interval: config.callback_interval,
            triggers: 0,
            sink,
        };
        sampler.sink.write_timestamp();
        sampler
    }

    /// One scheduling period. Returns the delay until the next call.
    pub fn on_tick<A>(&mut self, elapsed: i32, value: i32, actions: &mut A) -> f32
    where
        A: ActionSink + ?Sized,
    {
        self.elapsed_ticks = elapsed;
        self.current_value = value;

        if elapsed.checked_rem(self.log_every_ticks) == Some(0) {
            self.sink.write_record(&sample_record(elapsed, value, self.threshold));
        }

        if value == self.threshold {
            actions.pause();
            self.triggers += 1;
            log::info!("Paused at {} NM before TOD (elapsed {}s)", value, elapsed);
            // Saturates at i32::MAX: the threshold never wraps downward.
            self.threshold = self.threshold.saturating_add(1);
        }

        self.callback_interval
    }

    /// Audit marker written when the host disables the plugin.
    pub fn on_disable(&mut self) {
        self.sink.write_timestamp();
    }

    /// Close the log. Consumes the sampler.
    pub fn stop(mut self) {
        self.sink.close();
    }

    pub fn elapsed_ticks(&self) -> i32 {
        self.elapsed_ticks
    }

    pub fn current_value(&self) -> i32 {
        self.current_value
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn triggers(&self) -> u32 {
        self.triggers
    }

    pub fn sink(&self) -> &LogSink {
        &self.sink
    }
}

/// Truncate a host reading toward zero, as a C `(int)` cast would.
/// NaN reads as 0 and out-of-range values saturate.
pub fn truncate_reading(reading: f32) -> i32 {
    reading as i32
}
