//! Frame-stepped host scheduler
//!
//! Drives a `TodPlugin<MockHost>` the way a simulator would: simulated time
//! advances by a fixed step per frame, the flight loop is called when its
//! interval has run out, and the value it returns schedules the next call.
//! A pause command freezes simulated time; with `auto_resume` the next frame
//! unpauses, as if the pilot pressed the pause key straight away.

use crate::host::{Interval, MockHost, PauseRecord};
use crate::plugin::TodPlugin;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Due {
    At(f64),
    Frame(u64),
    Never,
}

pub struct HostSimulator {
    plugin: TodPlugin<MockHost>,
    frame_dt: f64,
    time: f64,
    frames: u64,
    calls: u32,
    last_call_time: f64,
    seen_registrations: u32,
    due: Option<Due>,
    auto_resume: bool,
}

impl HostSimulator {
    pub fn new(plugin: TodPlugin<MockHost>, frame_dt: f32) -> Self {
        Self {
            plugin,
            frame_dt: f64::from(frame_dt.max(f32::EPSILON)),
            time: 0.0,
            frames: 0,
            calls: 0,
            last_call_time: 0.0,
            seen_registrations: 0,
            due: None,
            auto_resume: false,
        }
    }

    pub fn with_auto_resume(mut self, auto_resume: bool) -> Self {
        self.auto_resume = auto_resume;
        self
    }

    pub fn start(&mut self) -> bool {
        let started = self.plugin.start();
        self.sync_registration();
        started
    }

    pub fn stop(&mut self) {
        self.plugin.stop();
        self.sync_registration();
    }

    pub fn resume(&mut self) {
        self.plugin.host_mut().paused = false;
    }

    /// Run one frame with the given dataset reading.
    /// Returns whether the flight loop was called.
    pub fn advance_frame(&mut self, reading: f32) -> bool {
        if self.plugin.host().paused && self.auto_resume {
            self.resume();
        }

        self.frames += 1;
        if !self.plugin.host().paused {
            self.time += self.frame_dt;
        }

        let host = self.plugin.host_mut();
        host.elapsed = self.time as f32;
        host.reading = reading;

        self.sync_registration();
        if !self.is_due() {
            return false;
        }

        self.calls += 1;
        let since_last_call = (self.time - self.last_call_time) as f32;
        self.last_call_time = self.time;
        let next = self
            .plugin
            .flight_loop(since_last_call, self.frame_dt as f32, self.calls as i32);
        self.schedule(next);
        true
    }

    /// Run frames until simulated time reaches `until`, reading the dataset
    /// from `reading(time)`. Stops early if the sim stays paused.
    pub fn run_until<F>(&mut self, until: f64, mut reading: F) -> u32
    where
        F: FnMut(f64) -> f32,
    {
        let mut calls = 0;
        while self.time + self.frame_dt <= until + 1e-9 {
            if self.plugin.host().paused && !self.auto_resume {
                log::debug!("Sim paused at {:.2}s, stopping run", self.time);
                break;
            }
            let value = reading(self.time + self.frame_dt);
            if self.advance_frame(value) {
                calls += 1;
            }
        }
        calls
    }

    fn sync_registration(&mut self) {
        let host = self.plugin.host();
        match host.registration {
            None => self.due = None,
            Some(interval) => {
                if host.registrations != self.seen_registrations {
                    self.seen_registrations = host.registrations;
                    self.schedule(interval);
                }
            }
        }
    }

    fn schedule(&mut self, interval: f32) {
        self.due = Some(match Interval::from_secs_f32(interval) {
            Interval::Seconds(secs) => Due::At(self.time + f64::from(secs)),
            Interval::Frames(frames) => Due::Frame(self.frames + u64::from(frames)),
            Interval::Unscheduled => Due::Never,
        });
    }

    fn is_due(&self) -> bool {
        match self.due {
            Some(Due::At(at)) => self.time + 1e-9 >= at,
            Some(Due::Frame(frame)) => self.frames >= frame,
            Some(Due::Never) | None => false,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Flight loop calls delivered so far.
    pub fn calls(&self) -> u32 {
        self.calls
    }

    pub fn pauses(&self) -> &[PauseRecord] {
        &self.plugin.host().pauses
    }

    pub fn plugin(&self) -> &TodPlugin<MockHost> {
        &self.plugin
    }

    pub fn plugin_mut(&mut self) -> &mut TodPlugin<MockHost> {
        &mut self.plugin
    }
}
