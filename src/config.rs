//! Configuration for the memory engine and the server binary
//!
//! Sensible defaults, overridable through `HIPPO_*` environment variables.
//! The engine takes its config at construction time; there is no process-wide
//! mutable singleton, and tests point `storage_path` at a temp dir.

use std::env;
use std::path::PathBuf;

use crate::constants::{CONFLICT_DISTANCE, DUPLICATE_DISTANCE, RECALL_DISTANCE};

/// Engine configuration: store location plus the similarity thresholds.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root directory for the vector store and the key file.
    pub storage_path: PathBuf,

    /// Duplicate-guard identity threshold.
    pub duplicate_distance: f32,

    /// Conflict-detector relaxed ceiling.
    pub conflict_distance: f32,

    /// Default recall threshold.
    pub recall_distance: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            duplicate_distance: DUPLICATE_DISTANCE,
            conflict_distance: CONFLICT_DISTANCE,
            recall_distance: RECALL_DISTANCE,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// - `HIPPO_STORAGE_PATH`: store root (default: `<data dir>/hippo-memory`)
    /// - `HIPPO_DUPLICATE_DISTANCE` / `HIPPO_CONFLICT_DISTANCE` /
    ///   `HIPPO_RECALL_DISTANCE`: threshold overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("HIPPO_STORAGE_PATH") {
            if !path.trim().is_empty() {
                config.storage_path = PathBuf::from(path);
            }
        }

        if let Some(v) = parse_env_f32("HIPPO_DUPLICATE_DISTANCE") {
            config.duplicate_distance = v;
        }
        if let Some(v) = parse_env_f32("HIPPO_CONFLICT_DISTANCE") {
            config.conflict_distance = v;
        }
        if let Some(v) = parse_env_f32("HIPPO_RECALL_DISTANCE") {
            config.recall_distance = v;
        }

        if config.duplicate_distance >= config.conflict_distance {
            tracing::warn!(
                duplicate = config.duplicate_distance,
                conflict = config.conflict_distance,
                "duplicate threshold >= conflict threshold; conflict window is empty"
            );
        }

        config
    }

    /// Same config pointed at an explicit storage path (tests, CLI flag).
    pub fn with_storage_path(path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: path.into(),
            ..Self::default()
        }
    }
}

/// Server configuration for the `serve` subcommand.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7141,
        }
    }
}

impl ServerConfig {
    /// `HIPPO_HOST` / `HIPPO_PORT` overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("HIPPO_HOST") {
            if !host.trim().is_empty() {
                config.host = host;
            }
        }
        if let Ok(port) = env::var("HIPPO_PORT") {
            if let Ok(n) = port.parse() {
                config.port = n;
            }
        }

        config
    }
}

fn parse_env_f32(key: &str) -> Option<f32> {
    let raw = env::var(key).ok()?;
    match raw.parse::<f32>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => {
            tracing::warn!(key, value = %raw, "ignoring unparseable threshold override");
            None
        }
    }
}

/// Per-user store location under the platform data dir, with a home-relative
/// fallback for minimal containers.
fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hippo-memory")
}
