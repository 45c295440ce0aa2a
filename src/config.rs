use std::{env, fs};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::progression::{ledger::MissionLedger, level::LevelThresholds, mission::Mission};

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub progression: ProgressionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    #[serde(default)]
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Recomputations allowed after a concurrent write wins.
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionConfig {
    pub thresholds: LevelThresholds,
    pub missions: Vec<Mission>,
}

impl ProgressionConfig {
    pub fn ledger(&self) -> Result<MissionLedger> {
        MissionLedger::new(self.missions.clone()).context("Invalid mission catalog")
    }
}

impl Config {
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// The configuration shipped with the binary.
    pub fn embedded() -> Result<Self> {
        Self::parse(DEFAULT_CONFIG).context("Invalid embedded config")
    }

    /// Applies `DATABASE_URL`, `ORBITA_STORE` and `ORBITA_MAX_RETRIES`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.store.database_url = Some(url);
        }
        if let Some(backend) = lookup("ORBITA_STORE") {
            self.store.backend = match backend.trim().to_ascii_lowercase().as_str() {
                "postgres" => StoreBackend::Postgres,
                "memory" => StoreBackend::Memory,
                other => anyhow::bail!("Unknown ORBITA_STORE backend: {}", other),
            };
        }
        if let Some(retries) = lookup("ORBITA_MAX_RETRIES") {
            self.store.max_retries = retries
                .trim()
                .parse()
                .with_context(|| format!("Invalid ORBITA_MAX_RETRIES: {}", retries))?;
        }
        Ok(())
    }
}

/// Reads the file named by `ORBITA_CONFIG`, or the embedded defaults, then
/// applies environment overrides.
pub fn load_config() -> Result<Config> {
    let mut config = match env::var("ORBITA_CONFIG") {
        Ok(path) => {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            Config::parse(&contents).with_context(|| format!("Invalid config file {}", path))?
        }
        Err(_) => Config::embedded()?,
    };
    config.apply_overrides(|key| env::var(key).ok())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::mission::MissionCategory;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::embedded().unwrap();
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert_eq!(
            config.progression.thresholds,
            LevelThresholds::default()
        );

        let ledger = config.progression.ledger().unwrap();
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.list_missions(Some(MissionCategory::Daily)).count(), 2);
        assert_eq!(ledger.mission("m2").unwrap().xp, 70);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::embedded().unwrap();
        config
            .apply_overrides(|key| match key {
                "DATABASE_URL" => Some("postgresql://localhost/orbita".to_string()),
                "ORBITA_STORE" => Some("Memory".to_string()),
                "ORBITA_MAX_RETRIES" => Some("7".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            config.store.database_url.as_deref(),
            Some("postgresql://localhost/orbita")
        );
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.max_retries, 7);

        let bad = config.apply_overrides(|key| (key == "ORBITA_STORE").then(|| "redis".to_string()));
        assert!(bad.is_err());
    }

    #[test]
    fn test_rejects_invalid_progression() {
        let unsorted = DEFAULT_CONFIG.replace("[0, 200, 600, 1200, 2000]", "[0, 600, 200]");
        assert!(Config::parse(&unsorted).is_err());

        let mut config = Config::embedded().unwrap();
        config.progression.missions.push(config.progression.missions[0].clone());
        assert!(config.progression.ledger().is_err());
    }

    #[test]
    fn test_accepts_app_category_keys() {
        let contents = DEFAULT_CONFIG.replace("category = \"daily\"", "category = \"hoje\"");
        let config = Config::parse(&contents).unwrap();
        assert_eq!(
            config.progression.missions[0].category,
            MissionCategory::Daily
        );
    }
}
