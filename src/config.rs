use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::orbit::{OrbitError, TimeGrid};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid prediction settings: {0}")]
    Invalid(#[from] OrbitError),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// YAML catalog file or a directory of TLE files.
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    #[serde(default = "default_duration", deserialize_with = "deserialize_duration")]
    pub duration: Duration,
    #[serde(default = "default_resolution", deserialize_with = "deserialize_duration")]
    pub resolution: Duration,
    #[serde(default = "default_smooth_factor")]
    pub smooth_factor: u32,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            resolution: default_resolution(),
            smooth_factor: default_smooth_factor(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Trajectories go to stdout when unset.
    pub directory: Option<PathBuf>,
}

fn default_duration() -> Duration {
    Duration::from_secs(24 * 3600)
}

fn default_resolution() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_smooth_factor() -> u32 {
    1
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

impl PredictionConfig {
    pub fn time_grid(&self) -> Result<TimeGrid, ConfigError> {
        Ok(TimeGrid::from_durations(self.duration, self.resolution)?
            .with_smoothing(self.smooth_factor)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config() {
        let config = Config::from_str(
            r#"
catalog: satellites.yaml
prediction:
  duration: 2h
  resolution: 30s
  smooth_factor: 2
output:
  directory: out
"#,
        )
        .unwrap();
        assert_eq!(config.catalog, Some(PathBuf::from("satellites.yaml")));
        assert_eq!(config.prediction.duration, Duration::from_secs(7200));
        assert_eq!(config.prediction.resolution, Duration::from_secs(30));
        assert_eq!(config.output.directory, Some(PathBuf::from("out")));

        let grid = config.prediction.time_grid().unwrap();
        assert_eq!(grid.resolution_s(), 15.0);
        assert_eq!(grid.sample_count(), 481);
    }

    #[test]
    fn defaults() {
        let config = Config::from_str("catalog: sats.yaml").unwrap();
        let grid = config.prediction.time_grid().unwrap();
        assert_eq!(grid.sample_count(), 145);
        assert!(config.output.directory.is_none());
    }

    #[test]
    fn zero_resolution_rejected() {
        let config = Config::from_str("prediction:\n  resolution: 0s\n").unwrap();
        assert!(matches!(
            config.prediction.time_grid(),
            Err(ConfigError::Invalid(OrbitError::Validation(_)))
        ));
    }

    #[test]
    fn bad_duration_is_yaml_error() {
        assert!(matches!(
            Config::from_str("prediction:\n  duration: forever\n"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
