use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use stepgrid_core::StoreConfig;
use stepgrid_services::SchedulerConfig;

#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct AppConfig {
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub history: HistorySection,
    #[serde(default)]
    pub playback: PlaybackSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct SchedulerSection {
    pub lookahead_ms: u64,
    pub schedule_ahead_ms: u64,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            lookahead_ms: 100,
            schedule_ahead_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct HistorySection {
    pub max_history: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            max_history: StoreConfig::default().max_history,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct PlaybackSection {
    /// How long the demo plays before stopping
    pub play_seconds: f64,
}

impl Default for PlaybackSection {
    fn default() -> Self {
        Self { play_seconds: 4.0 }
    }
}

/// Longest demo run accepted from config
const MAX_PLAY_SECONDS: f64 = 3600.0;

impl AppConfig {
    /// Demo run length. Negative or non-finite values mean no playback,
    /// anything past an hour is capped.
    pub fn play_duration(&self) -> Duration {
        let seconds = self.playback.play_seconds;
        if !seconds.is_finite() {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(seconds.min(MAX_PLAY_SECONDS)).unwrap_or_default()
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_history: self.history.max_history,
        }
    }

    pub fn scheduler_config(&self, tempo: f64, steps_per_beat: u32) -> SchedulerConfig {
        SchedulerConfig {
            tempo,
            steps_per_beat,
            lookahead: Duration::from_millis(self.scheduler.lookahead_ms),
            schedule_ahead: Duration::from_millis(self.scheduler.schedule_ahead_ms),
        }
    }
}

pub(crate) fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("STEPGRID_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stepgrid")
        .join("config.toml")
}

pub(crate) fn load_config() -> AppConfig {
    let path = config_path();
    std::fs::read_to_string(&path)
        .ok()
        .and_then(|s| parse_config(&s))
        .unwrap_or_default()
}

fn parse_config(text: &str) -> Option<AppConfig> {
    match toml::from_str(text) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Ignoring malformed config: {}", e);
            None
        }
    }
}
