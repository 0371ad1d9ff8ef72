use super::{ClientConfig, JobFile};
use crate::errors::ConfigError;
use anyhow::{anyhow, Result};
use glob::glob;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

pub struct ConfigManager {
    current_config: Arc<ClientConfig>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<ClientConfig> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<ClientConfig> {
        let main_config_path = format!("{}/main.toml", config_dir);
        let main_config_content = fs::read_to_string(&main_config_path)
            .await
            .map_err(|e| ConfigError::LoadFailed {
                path: main_config_path.clone(),
                reason: e.to_string(),
            })?;

        let mut config: ClientConfig =
            toml::from_str(&main_config_content).map_err(|e| ConfigError::ParseError {
                reason: format!("{}: {}", main_config_path, e),
            })?;

        // Every other *.toml file holds polling jobs
        let pattern = format!("{}/*.toml", config_dir);
        let mut paths = Vec::new();
        for entry in glob(&pattern).map_err(|e| anyhow!("Glob pattern error: {}", e))? {
            paths.push(entry.map_err(|e| anyhow!("Glob entry error: {}", e))?);
        }
        paths.sort();

        let mut all_jobs = Vec::new();
        for path in paths {
            let filename = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("Invalid filename"))?;

            if filename == "main.toml" {
                continue;
            }

            let group = filename
                .strip_suffix(".toml")
                .ok_or_else(|| anyhow!("Invalid config filename: {}", filename))?;

            debug!("Loading job file: {}", path.display());

            let content = fs::read_to_string(&path)
                .await
                .map_err(|e| ConfigError::LoadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;

            let job_file: JobFile = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                reason: format!("{}: {}", path.display(), e),
            })?;

            for mut job in job_file.jobs {
                // Don't double-prefix names that already carry the group
                if !job.name.starts_with(&format!("{}-", group)) {
                    job.name = format!("{}-{}", group, job.name);
                }
                all_jobs.push(job);
            }
        }

        config.jobs = all_jobs;
        config.validate()?;

        info!(
            "Loaded client config for {} with {} polling jobs",
            config.url,
            config.jobs.len()
        );

        Ok(config)
    }
}
