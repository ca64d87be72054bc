//! Configuration management for the Diet Planner backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: DP__)
//! 4. `PORT`, when set, overrides `server.port`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use validator::Validate;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub model: ModelConfig,
    #[validate(nested)]
    pub scoring: ScoringConfig,
    #[validate(nested)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Recipe dataset location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub path: PathBuf,
}

/// Ranking model weights location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: PathBuf,
}

/// How recipes of a different food type than requested are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FoodTypePolicy {
    /// Drop non-matching recipes from candidacy
    #[default]
    Filter,
    /// Keep them, multiplied by `food_type_soft_penalty`
    Penalty,
}

/// Heuristic scoring settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoringConfig {
    /// Multiplier for recipes outside the preferred cuisine
    #[validate(range(min = 0.0, max = 1.0))]
    pub cuisine_penalty: f32,
    pub food_type_policy: FoodTypePolicy,
    /// Multiplier used by [`FoodTypePolicy::Penalty`]
    #[validate(range(min = 0.0, max = 1.0))]
    pub food_type_soft_penalty: f32,
    /// Standard deviation of the tie-breaking Gaussian jitter
    #[validate(range(min = 0.0, max = 1.0))]
    pub jitter_std: f32,
    /// Deployment-wide seed; a request seed takes precedence
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            cuisine_penalty: 0.8,
            food_type_policy: FoodTypePolicy::Filter,
            food_type_soft_penalty: 0.5,
            jitter_std: 1e-4,
            seed: None,
        }
    }
}

/// Weekly plan builder settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlannerConfig {
    /// Number of most recent selections that may not be repeated
    #[validate(range(min = 1))]
    pub novelty_window: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { novelty_window: 12 }
    }
}

/// Prometheus exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub listen: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: "127.0.0.1:9100".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 10000,
            },
            dataset: DatasetConfig {
                path: PathBuf::from("data/healthy_recipes.csv"),
            },
            model: ModelConfig {
                path: PathBuf::from("data/model.json"),
            },
            scoring: ScoringConfig::default(),
            planner: PlannerConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with DP__ prefix
    /// 4. The plain `PORT` variable
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let mut builder = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(
                config::File::with_name(&config_file)
                    .required(false)
            )
            // Override with environment variables (DP__ prefix)
            // e.g., DP__SERVER__PORT=9000 sets server.port
            .add_source(
                config::Environment::with_prefix("DP")
                    .separator("__")
                    .try_parsing(true)
            );

        if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse::<i64>().ok()) {
            builder = builder.set_override("server.port", port)?;
        }

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
