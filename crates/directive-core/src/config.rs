// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flat key/value configuration (§6), loaded from a TOML file with
//! `COMPUTER_`-prefixed environment overrides. Each key is parsed
//! independently: an invalid value logs a warning and falls back to that
//! key's default rather than aborting the whole load.

use std::path::Path;

use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "COMPUTER_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, #[source] source: toml::de::Error },
}

/// Raw TOML shape; every field optional so a partial file is fine.
#[derive(Debug, Default, Deserialize, Serialize)]
struct RawConfig {
    exemplar_threshold_seconds: Option<i64>,
    exemplar_enabled: Option<bool>,
    default_platform: Option<String>,
    default_model: Option<String>,
    retry_attempts: Option<u32>,
    api_timeout: Option<u64>,
    api_retry_delay: Option<f64>,
    max_processing_time_seconds: Option<u64>,
    log_level: Option<String>,
    log_file: Option<String>,
    /// Latency class boundary above `exemplar`; not in spec.md's key list
    /// verbatim but named by name in §4.6 ("slow threshold (default 60s)")
    /// so it is loaded the same data-driven way as the rest.
    slow_threshold_seconds: Option<i64>,
}

/// Resolved configuration. See spec.md §6 for the authoritative key list.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub exemplar_threshold_seconds: i64,
    pub exemplar_enabled: bool,
    pub slow_threshold_seconds: i64,
    pub default_platform: String,
    pub default_model: String,
    pub retry_attempts: u32,
    pub api_timeout: u64,
    pub api_retry_delay: f64,
    pub max_processing_time_seconds: u64,
    pub log_level: String,
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exemplar_threshold_seconds: 30,
            exemplar_enabled: true,
            slow_threshold_seconds: 60,
            default_platform: "claude".to_string(),
            default_model: "claude-3-5-sonnet".to_string(),
            retry_attempts: 3,
            api_timeout: 60,
            api_retry_delay: 1.0,
            max_processing_time_seconds: 300,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

macro_rules! resolve_key {
    ($defaults:expr, $raw:expr, $key:ident, $parse:expr) => {{
        let env_key = format!("{}{}", ENV_PREFIX, stringify!($key).to_ascii_uppercase());
        if let Ok(raw) = std::env::var(&env_key) {
            match $parse(raw.as_str()) {
                Some(v) => v,
                None => {
                    tracing::warn!(key = %env_key, value = %raw, "invalid env override, using file/default");
                    $raw.$key.clone().unwrap_or($defaults.$key.clone())
                }
            }
        } else {
            $raw.$key.clone().unwrap_or($defaults.$key.clone())
        }
    }};
}

impl Config {
    /// Load from `path` (if present) layered with `COMPUTER_*` env
    /// overrides; a missing file is not an error, just an empty layer.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = if path.exists() {
            let text = std::fs::read_to_string(path)
                .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
            toml::from_str::<RawConfig>(&text)
                .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })?
        } else {
            RawConfig::default()
        };
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            exemplar_threshold_seconds: resolve_key!(defaults, raw, exemplar_threshold_seconds, |s: &str| s
                .parse()
                .ok()),
            exemplar_enabled: resolve_key!(defaults, raw, exemplar_enabled, |s: &str| s.parse().ok()),
            slow_threshold_seconds: resolve_key!(defaults, raw, slow_threshold_seconds, |s: &str| s
                .parse()
                .ok()),
            default_platform: resolve_key!(defaults, raw, default_platform, |s: &str| Some(
                s.to_string()
            )),
            default_model: resolve_key!(defaults, raw, default_model, |s: &str| Some(s.to_string())),
            retry_attempts: resolve_key!(defaults, raw, retry_attempts, |s: &str| s.parse().ok()),
            api_timeout: resolve_key!(defaults, raw, api_timeout, |s: &str| s.parse().ok()),
            api_retry_delay: resolve_key!(defaults, raw, api_retry_delay, |s: &str| s.parse().ok()),
            max_processing_time_seconds: resolve_key!(
                defaults,
                raw,
                max_processing_time_seconds,
                |s: &str| s.parse().ok()
            ),
            log_level: resolve_key!(defaults, raw, log_level, |s: &str| Some(s.to_string())),
            log_file: {
                let env_key = format!("{ENV_PREFIX}LOG_FILE");
                std::env::var(&env_key).ok().or_else(|| raw.log_file.clone()).or(defaults.log_file)
            },
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
