//! Configuration for tabledb
//!
//! - `EngineConfig`: per-table settings (B+Tree order)
//! - `BenchConfig`: benchmark harness settings
//!
//! Both load from JSON with per-field defaults and are validated after
//! parsing. The core never reads configuration on its own; callers pass a
//! config into `Table::with_config`.

mod errors;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use errors::{ConfigError, ConfigResult};

/// Default B+Tree branching factor
pub const DEFAULT_BTREE_ORDER: usize = 16;

fn default_btree_order() -> usize {
    DEFAULT_BTREE_ORDER
}
fn default_iterations() -> u32 {
    1000
}
fn default_data_size() -> u32 {
    1000
}
fn default_seed() -> u64 {
    12345
}
fn default_banner() -> String {
    "B0123456789".to_string()
}
fn default_results_path() -> PathBuf {
    PathBuf::from("benchmarks/results/benchmark_results.sql")
}

/// Per-table engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Branching factor for every index the table builds
    #[serde(default = "default_btree_order")]
    pub btree_order: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            btree_order: DEFAULT_BTREE_ORDER,
        }
    }
}

impl EngineConfig {
    pub fn with_order(btree_order: usize) -> Self {
        Self { btree_order }
    }

    /// Load and validate from a JSON file
    pub fn load_from_path(path: &Path) -> ConfigResult<Self> {
        let config: Self = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.btree_order < 2 {
            return Err(ConfigError::Invalid(format!(
                "btree_order must be at least 2, got {}",
                self.btree_order
            )));
        }
        Ok(())
    }
}

/// Benchmark harness settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Timed repetitions per benchmark
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Tuples generated per table
    #[serde(default = "default_data_size")]
    pub data_size: u32,

    /// Seed for the harness-owned generator
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Identifier written into every result row
    #[serde(default = "default_banner")]
    pub banner: String,

    /// Where SQL result lines are written
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    /// Engine settings for every table the harness builds
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            data_size: default_data_size(),
            seed: default_seed(),
            banner: default_banner(),
            results_path: default_results_path(),
            engine: EngineConfig::default(),
        }
    }
}

impl BenchConfig {
    /// Load and validate from a JSON file
    pub fn load_from_path(path: &Path) -> ConfigResult<Self> {
        let config: Self = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.iterations == 0 {
            return Err(ConfigError::Invalid("iterations must be > 0".to_string()));
        }
        if self.data_size < 2 {
            return Err(ConfigError::Invalid("data_size must be at least 2".to_string()));
        }
        if self.banner.contains('\'') {
            return Err(ConfigError::Invalid("banner must not contain quotes".to_string()));
        }
        self.engine.validate()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = BenchConfig::default();
        assert_eq!(config.iterations, 1000);
        assert_eq!(config.data_size, 1000);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.engine.btree_order, DEFAULT_BTREE_ORDER);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let file = write_config(r#"{"iterations": 5, "engine": {"btree_order": 4}}"#);
        let config = BenchConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.iterations, 5);
        assert_eq!(config.data_size, 1000);
        assert_eq!(config.engine.btree_order, 4);
    }

    #[test]
    fn test_invalid_order_rejected() {
        let file = write_config(r#"{"btree_order": 1}"#);
        let err = EngineConfig::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let file = write_config("{not json");
        let err = BenchConfig::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = EngineConfig::load_from_path(Path::new("/nonexistent/tabledb.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
