//! Shared CLI helpers for workspace tools.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{Error, Result};

/// Installs the global tracing subscriber; `debug` when verbose, `info` otherwise.
pub fn setup_cli_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbose))
        .with(filter)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logger: {e}")))?;

    Ok(())
}

pub fn load_toml_config<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config {}: {e}", path.display())))
}

/// Writes a configuration back out as pretty TOML.
pub fn save_toml_config<T>(value: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    let content = toml::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatasetSource, PartitionConfig};
    use tempfile::TempDir;

    #[test]
    fn test_toml_roundtrip_through_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("partition.toml");

        let config = PartitionConfig {
            datasets: vec![DatasetSource::new("duke", "/data/duke")],
            seed: 11,
            temporal_resampling: false,
            ..PartitionConfig::default()
        };
        save_toml_config(&config, &path).unwrap();

        let loaded: PartitionConfig = load_toml_config(&path).unwrap();
        assert_eq!(loaded.seed, 11);
        assert_eq!(loaded.datasets, config.datasets);
        assert_eq!(loaded.temporal, config.temporal);
        assert!(!loaded.temporal_resampling);
    }

    #[test]
    fn test_load_missing_config() {
        let result: Result<PartitionConfig> = load_toml_config(Path::new("/nonexistent/x.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
