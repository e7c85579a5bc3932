//! Plugin lifecycle
//!
//! `TodPlugin` is what a host adapter calls into: start/stop/enable/disable,
//! message delivery and the flight loop callback. All state lives in the
//! plugin value; the adapter decides where that value is kept.

use std::path::PathBuf;

use crate::config::SamplerConfig;
use crate::error::{PathError, Result, TodError};
use crate::host::Host;
use crate::path::{normalize_path, PathNormalizer};
use crate::sampler::{truncate_reading, Sampler};
use crate::sink::LogSink;

pub const PLUGIN_NAME: &str = "TOD Checking";
pub const PLUGIN_SIGNATURE: &str = "xplanesdk.examples.TimedProcessing.TODchecking";
pub const PLUGIN_DESCRIPTION: &str = "A plugin to pause airplane 10NM before TOD.";

/// Debug line emitted when the host path can't be converted.
pub const PATH_CONVERSION_FAILED: &str = "TimedProccessing - Unable to convert path\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: &'static str,
    pub signature: &'static str,
    pub description: &'static str,
}

pub const PLUGIN_INFO: PluginInfo = PluginInfo {
    name: PLUGIN_NAME,
    signature: PLUGIN_SIGNATURE,
    description: PLUGIN_DESCRIPTION,
};

pub struct TodPlugin<H: Host> {
    host: H,
    config: SamplerConfig,
    /// `None` uses the build target's normalizer.
    normalizer: Option<Box<dyn PathNormalizer>>,
    sampler: Option<Sampler>,
    log_path: Option<PathBuf>,
}

impl<H: Host> TodPlugin<H> {
    pub fn new(host: H, config: SamplerConfig) -> Self {
        Self {
            host,
            config,
            normalizer: None,
            sampler: None,
            log_path: None,
        }
    }

    pub fn with_normalizer(
        host: H,
        config: SamplerConfig,
        normalizer: Box<dyn PathNormalizer>,
    ) -> Self {
        Self {
            normalizer: Some(normalizer),
            ..Self::new(host, config)
        }
    }

    pub fn info(&self) -> PluginInfo {
        PLUGIN_INFO
    }

    /// Open the log, start sampling and register the flight loop.
    ///
    /// Returns `false` only when `fail_on_sink_error` is set and the log
    /// could not be opened. Otherwise sampling runs with a disabled sink.
    pub fn start(&mut self) -> bool {
        match self.try_start() {
            Ok(()) => true,
            Err(err) => {
                log::error!("{} not started: {}", PLUGIN_NAME, err);
                false
            }
        }
    }

    /// `start` with the failure reason.
    pub fn try_start(&mut self) -> Result<()> {
        if self.sampler.is_some() {
            log::debug!("{} already started", PLUGIN_NAME);
            return Ok(());
        }

        let raw = format!("{}{}", self.host.system_path(), self.config.log_file_name);
        let path = match self.normalize(&raw) {
            Ok(converted) => converted,
            Err(err) => {
                let err = TodError::from(err);
                if !err.is_recoverable() {
                    return Err(err);
                }
                log::warn!("Keeping unconverted log path {}: {}", raw, err);
                self.host.debug_string(PATH_CONVERSION_FAILED);
                raw
            }
        };
        let path = PathBuf::from(path);

        let sink = match LogSink::create(&path) {
            Ok(sink) => sink,
            Err(err) => {
                let err = TodError::from(err);
                if self.config.fail_on_sink_error || !err.is_recoverable() {
                    return Err(err);
                }
                log::warn!("Sampling without a log file: {}", err);
                LogSink::disabled()
            }
        };

        self.sampler = Some(Sampler::start(sink, &self.config));
        self.log_path = Some(path);
        self.host.register_flight_loop(self.config.callback_interval);

        log::info!(
            "{} started, pausing at {} NM before TOD",
            PLUGIN_NAME,
            self.config.initial_threshold
        );
        Ok(())
    }

    fn normalize(&self, raw: &str) -> std::result::Result<String, PathError> {
        match &self.normalizer {
            Some(normalizer) => normalizer.normalize(raw),
            None => normalize_path(raw),
        }
    }

    /// Unregister the flight loop and close the log.
    pub fn stop(&mut self) {
        self.host.unregister_flight_loop();
        if let Some(sampler) = self.sampler.take() {
            log::info!(
                "{} stopped after {} pause(s), threshold {}",
                PLUGIN_NAME,
                sampler.triggers(),
                sampler.threshold()
            );
            sampler.stop();
        }
    }

    pub fn enable(&mut self) -> bool {
        true
    }

    pub fn disable(&mut self) {
        if let Some(sampler) = self.sampler.as_mut() {
            sampler.on_disable();
        }
    }

    /// Inter-plugin messages are ignored.
    pub fn receive_message(&mut self, from: i32, message: i32, _param: Option<&[u8]>) {
        log::trace!("Ignoring message {} from plugin {}", message, from);
    }

    /// Flight loop callback. Returns the host scheduling value.
    pub fn flight_loop(
        &mut self,
        since_last_call: f32,
        since_last_loop: f32,
        counter: i32,
    ) -> f32 {
        let Some(sampler) = self.sampler.as_mut() else {
            log::debug!("Flight loop {} delivered to a stopped plugin", counter);
            return 0.0;
        };
        log::trace!(
            "Flight loop {} ({}s since last call, {}s since last loop)",
            counter,
            since_last_call,
            since_last_loop
        );

        let elapsed = truncate_reading(self.host.elapsed_time());
        let value = truncate_reading(self.host.read_dataref(&self.config.dataref));
        sampler.on_tick(elapsed, value, &mut self.host)
    }

    pub fn is_running(&self) -> bool {
        self.sampler.is_some()
    }

    pub fn sampler(&self) -> Option<&Sampler> {
        self.sampler.as_ref()
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Log path chosen by the last `start`.
    pub fn log_path(&self) -> Option<&std::path::Path> {
        self.log_path.as_deref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{HfsNormalizer, PassthroughNormalizer};
    use crate::MockHost;
    use tempfile::TempDir;

    fn system_path(dir: &TempDir) -> String {
        format!("{}/", dir.path().display())
    }

    fn plugin_in(dir: &TempDir, config: SamplerConfig) -> TodPlugin<MockHost> {
        TodPlugin::with_normalizer(
            MockHost::new(system_path(dir)),
            config,
            Box::new(PassthroughNormalizer),
        )
    }

    fn tick(plugin: &mut TodPlugin<MockHost>, elapsed: f32, reading: f32) -> f32 {
        plugin.host_mut().elapsed = elapsed;
        plugin.host_mut().reading = reading;
        plugin.flight_loop(1.0, 1.0, elapsed as i32)
    }

    #[test]
    fn test_info() {
        let dir = TempDir::new().unwrap();
        let plugin = plugin_in(&dir, SamplerConfig::default());
        assert_eq!(plugin.info().name, "TOD Checking");
        assert_eq!(
            plugin.info().signature,
            "xplanesdk.examples.TimedProcessing.TODchecking"
        );
    }

    #[test]
    fn test_start_opens_log_and_registers() {
        let dir = TempDir::new().unwrap();
        let mut plugin = plugin_in(&dir, SamplerConfig::default());

        assert!(plugin.start());
        assert!(plugin.is_running());
        assert_eq!(plugin.host().registration, Some(1.0));

        let path = dir.path().join("TODchecking.txt");
        assert_eq!(plugin.log_path(), Some(path.as_path()));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("\nCurrent time : "));
    }

    #[test]
    fn test_flight_loop_truncates_and_pauses() {
        let dir = TempDir::new().unwrap();
        let mut plugin = plugin_in(&dir, SamplerConfig::default());
        plugin.start();

        assert_eq!(tick(&mut plugin, 1.7, 11.9), 1.0);
        assert!(plugin.host().pauses.is_empty());

        assert_eq!(tick(&mut plugin, 2.7, 10.4), 1.0);
        assert_eq!(plugin.host().pauses.len(), 1);
        assert_eq!(plugin.sampler().unwrap().threshold(), 11);
        assert_eq!(plugin.sampler().unwrap().elapsed_ticks(), 2);
        assert_eq!(plugin.sampler().unwrap().current_value(), 10);
    }

    #[test]
    fn test_flight_loop_writes_sample_records() {
        let dir = TempDir::new().unwrap();
        let mut plugin = plugin_in(&dir, SamplerConfig::default());
        plugin.start();

        tick(&mut plugin, 299.0, 40.0);
        tick(&mut plugin, 300.2, 39.0);
        tick(&mut plugin, 301.0, 38.0);

        let content = std::fs::read_to_string(dir.path().join("TODchecking.txt")).unwrap();
        assert!(content.ends_with("300 | 39 | 10\n"));
        assert_eq!(content.lines().filter(|line| line.contains(" | ")).count(), 1);
    }

    #[test]
    fn test_missing_directory_keeps_sampling() {
        let dir = TempDir::new().unwrap();
        let host = MockHost::new(format!("{}/missing/", dir.path().display()));
        let mut plugin =
            TodPlugin::with_normalizer(host, SamplerConfig::default(), Box::new(PassthroughNormalizer));

        assert!(plugin.start());
        assert!(!plugin.sampler().unwrap().sink().is_open());

        tick(&mut plugin, 5.0, 10.0);
        assert_eq!(plugin.host().pauses.len(), 1);
    }

    #[test]
    fn test_fail_fast_refuses_to_start() {
        let dir = TempDir::new().unwrap();
        let host = MockHost::new(format!("{}/missing/", dir.path().display()));
        let config = SamplerConfig {
            fail_on_sink_error: true,
            ..SamplerConfig::default()
        };
        let mut plugin = TodPlugin::with_normalizer(host, config, Box::new(PassthroughNormalizer));

        assert!(!plugin.start());
        assert!(!plugin.is_running());
        assert!(!plugin.host().is_registered());
    }

    #[test]
    fn test_try_start_reports_sink_error() {
        let dir = TempDir::new().unwrap();
        let host = MockHost::new(format!("{}/missing/", dir.path().display()));
        let config = SamplerConfig {
            fail_on_sink_error: true,
            ..SamplerConfig::default()
        };
        let mut plugin = TodPlugin::with_normalizer(host, config, Box::new(PassthroughNormalizer));

        let err = plugin.try_start().unwrap_err();
        assert!(matches!(err, TodError::Sink(_)));
        assert!(err.is_recoverable());
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_default_normalizer_keeps_native_path() {
        let dir = TempDir::new().unwrap();
        let mut plugin = TodPlugin::new(MockHost::new(system_path(&dir)), SamplerConfig::default());

        assert!(plugin.start());
        assert!(plugin.host().debug_lines.is_empty());
        assert_eq!(
            plugin.log_path(),
            Some(dir.path().join("TODchecking.txt").as_path())
        );
    }

    #[test]
    fn test_path_conversion_failure_falls_back() {
        let dir = TempDir::new().unwrap();
        let mut plugin = TodPlugin::with_normalizer(
            MockHost::new(system_path(&dir)),
            SamplerConfig::default(),
            Box::new(HfsNormalizer::default()),
        );

        assert!(plugin.start());
        assert_eq!(plugin.host().debug_lines, vec![PATH_CONVERSION_FAILED.to_string()]);
        assert!(dir.path().join("TODchecking.txt").exists());
    }

    #[test]
    fn test_stop_unregisters_and_ignores_late_ticks() {
        let dir = TempDir::new().unwrap();
        let mut plugin = plugin_in(&dir, SamplerConfig::default());
        plugin.start();
        plugin.stop();

        assert!(!plugin.host().is_registered());
        assert!(!plugin.is_running());

        let path = dir.path().join("TODchecking.txt");
        let before = std::fs::read_to_string(&path).unwrap();
        assert_eq!(tick(&mut plugin, 600.0, 10.0), 0.0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        assert!(plugin.host().pauses.is_empty());
    }

    #[test]
    fn test_disable_stamps_time_and_enable_succeeds() {
        let dir = TempDir::new().unwrap();
        let mut plugin = plugin_in(&dir, SamplerConfig::default());
        plugin.start();

        plugin.disable();
        assert!(plugin.enable());
        plugin.receive_message(7, 101, None);

        let content = std::fs::read_to_string(dir.path().join("TODchecking.txt")).unwrap();
        assert_eq!(content.matches("Current time : ").count(), 2);
    }

    #[test]
    fn test_restart_after_stop() {
        let dir = TempDir::new().unwrap();
        let mut plugin = plugin_in(&dir, SamplerConfig::default());
        plugin.start();
        tick(&mut plugin, 1.0, 10.0);
        plugin.stop();

        assert!(plugin.start());
        assert_eq!(plugin.host().registrations, 2);
        assert_eq!(plugin.sampler().unwrap().threshold(), 10);
    }
}
