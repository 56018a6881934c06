use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Sizing and retry settings for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Number of mapper workers.
    #[serde(default = "default_mappers")]
    pub num_mappers: usize,

    /// Number of reducer workers.
    #[serde(default = "default_reducers")]
    pub num_reducers: usize,

    /// Lines per input chunk when splitting the source.
    #[serde(default = "default_lines_per_split")]
    pub lines_per_split: usize,

    /// Rebuilds tolerated per wave before the job fails. `None` retries forever.
    #[serde(default = "default_max_rebuilds")]
    pub max_rebuilds: Option<usize>,

    /// Name of the workload to run.
    #[serde(default = "default_workload")]
    pub workload: String,

    /// Seed for choosing which worker an injected fault hits.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_mappers() -> usize {
    4
}

fn default_reducers() -> usize {
    2
}

fn default_lines_per_split() -> usize {
    1000
}

fn default_max_rebuilds() -> Option<usize> {
    Some(3)
}

fn default_workload() -> String {
    "wc".to_string()
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            num_mappers: default_mappers(),
            num_reducers: default_reducers(),
            lines_per_split: default_lines_per_split(),
            max_rebuilds: default_max_rebuilds(),
            workload: default_workload(),
            seed: None,
        }
    }
}

impl JobConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed reading config {}", path.display()))?;
        let config: JobConfig = serde_json::from_str(&contents)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_mappers == 0 {
            return Err(anyhow!("at least one mapper is required"));
        }
        if self.num_reducers == 0 {
            return Err(anyhow!("at least one reducer is required"));
        }
        if self.lines_per_split == 0 {
            return Err(anyhow!("lines per split must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_takes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        fs::write(&path, r#"{ "num_mappers": 8, "max_rebuilds": null }"#).unwrap();

        let config = JobConfig::load(&path).unwrap();
        assert_eq!(config.num_mappers, 8);
        assert_eq!(config.num_reducers, 2);
        assert_eq!(config.max_rebuilds, None);
        assert_eq!(config.workload, "wc");
    }

    #[test]
    fn test_validate_rejects_empty_pools() {
        let config = JobConfig {
            num_reducers: 0,
            ..JobConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(JobConfig::default().validate().is_ok());
    }
}
