use std::env;
use std::path::PathBuf;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// Default cap on recurrence periods scanned per occurrence query.
pub const DEFAULT_MAX_SCAN_PERIODS: u32 = 400;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_i32_opt(profile: &str, key: &str) -> Option<i32> {
    profiled_env_opt(profile, key).and_then(|v| v.parse().ok())
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub scheduler: SchedulerConfig,
    pub preview: PreviewConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `CADENCE_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("CADENCE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            scheduler: SchedulerConfig::from_env_profiled(p),
            preview: PreviewConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  scheduler:   max_scan_periods={}, zone={}",
            self.scheduler.max_scan_periods,
            self.scheduler
                .utc_offset()
                .map(|o| o.to_string())
                .unwrap_or_else(|| "local".to_string())
        );
        tracing::info!(
            "  preview:     count={}, tasks_file={}",
            self.preview.count,
            self.preview.tasks_file.display()
        );
    }

    /// JSON view of the effective configuration.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "scheduler": {
                "max_scan_periods": self.scheduler.max_scan_periods,
                "utc_offset_minutes": self.scheduler.utc_offset_minutes,
            },
            "preview": {
                "count": self.preview.count,
                "tasks_file": self.preview.tasks_file,
            },
        })
    }
}

// ── Scheduler ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Upper bound on recurrence periods scanned per occurrence query.
    pub max_scan_periods: u32,
    /// Fixed task timezone as minutes east of UTC. `None` = system local zone.
    pub utc_offset_minutes: Option<i32>,
}

impl SchedulerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            max_scan_periods: profiled_env_u32(
                p,
                "CADENCE_MAX_SCAN_PERIODS",
                DEFAULT_MAX_SCAN_PERIODS,
            )
            .max(1),
            utc_offset_minutes: profiled_env_i32_opt(p, "CADENCE_UTC_OFFSET_MINUTES"),
        }
    }

    /// The configured fixed offset, if one is set and in range.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .and_then(|minutes| minutes.checked_mul(60))
            .and_then(FixedOffset::east_opt)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_scan_periods: DEFAULT_MAX_SCAN_PERIODS,
            utc_offset_minutes: None,
        }
    }
}

// ── Preview / task file ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Number of upcoming occurrences shown per reminder.
    pub count: u32,
    /// YAML file holding the task list.
    pub tasks_file: PathBuf,
}

impl PreviewConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            count: profiled_env_u32(p, "CADENCE_PREVIEW_COUNT", 5),
            tasks_file: PathBuf::from(profiled_env_or(
                p,
                "CADENCE_TASKS_FILE",
                "data/tasks/example.yaml",
            )),
        }
    }
}
