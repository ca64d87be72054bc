//! Application state management
//!
//! The [`EngineContext`] bundles everything a plan request reads: the recipe
//! table with its fitted transforms, the optional ranking model and the
//! scoring and planner settings. It is built once at startup and never
//! mutated, so handlers share it through an `Arc` without locking.

use crate::config::{AppConfig, PlannerConfig, ScoringConfig};
use crate::services::dataset::RecipeTable;
use crate::services::model::{MlpRanker, ModelError, RankingModel};
use chrono::{DateTime, Utc};
use diet_planner_shared::{StatusResponse, USER_VECTOR_DIM};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Immutable, load-once engine shared by every request
pub struct EngineContext {
    table: RecipeTable,
    model: Option<Arc<dyn RankingModel>>,
    scoring: ScoringConfig,
    planner: PlannerConfig,
    loaded_at: DateTime<Utc>,
}

impl EngineContext {
    pub fn new(
        table: RecipeTable,
        model: Option<Arc<dyn RankingModel>>,
        scoring: ScoringConfig,
        planner: PlannerConfig,
    ) -> Self {
        Self {
            table,
            model,
            scoring,
            planner,
            loaded_at: Utc::now(),
        }
    }

    /// Load the dataset and model named by `config`
    ///
    /// Never fails: an unreadable dataset yields the placeholder table and an
    /// unusable model leaves scoring on the random fallback.
    pub fn load(config: &AppConfig) -> Self {
        let table = match RecipeTable::from_path(&config.dataset.path) {
            Ok(table) => table,
            Err(err) => {
                error!(
                    path = %config.dataset.path.display(),
                    error = %err,
                    "Failed to load recipe dataset, running in degraded mode"
                );
                RecipeTable::placeholder()
            }
        };

        let model = match load_model(&config.model.path, table.feature_dim()) {
            Ok(model) => {
                info!(path = %config.model.path.display(), "Ranking model loaded");
                Some(model)
            }
            Err(err) => {
                warn!(
                    path = %config.model.path.display(),
                    error = %err,
                    "Ranking model unavailable, plans will use random base scores"
                );
                None
            }
        };

        Self::new(table, model, config.scoring.clone(), config.planner.clone())
    }

    #[inline]
    pub fn table(&self) -> &RecipeTable {
        &self.table
    }

    #[inline]
    pub fn model(&self) -> Option<&dyn RankingModel> {
        self.model.as_deref()
    }

    #[inline]
    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    #[inline]
    pub fn planner(&self) -> &PlannerConfig {
        &self.planner
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn dataset_loaded(&self) -> bool {
        self.table.is_loaded()
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Snapshot for the status endpoint
    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            dataset_loaded: self.dataset_loaded(),
            model_loaded: self.model_loaded(),
            recipe_count: if self.dataset_loaded() { self.table.len() } else { 0 },
            feature_dim: self.table.feature_dim(),
            user_dim: USER_VECTOR_DIM,
            categorical_dim: self.table.encoder().len(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Load a model and check it accepts this engine's vectors
fn load_model(path: &Path, recipe_dim: usize) -> Result<Arc<dyn RankingModel>, ModelError> {
    let model = MlpRanker::from_path(path)?;
    if model.user_dim() != USER_VECTOR_DIM {
        return Err(ModelError::DimensionMismatch {
            expected: USER_VECTOR_DIM,
            actual: model.user_dim(),
        });
    }
    if model.recipe_dim() != recipe_dim {
        return Err(ModelError::DimensionMismatch {
            expected: recipe_dim,
            actual: model.recipe_dim(),
        });
    }
    let model: Arc<dyn RankingModel> = Arc::new(model);
    Ok(model)
}

/// Shared application state
///
/// Cloning is cheap: both fields are `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<EngineContext>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(engine: EngineContext, config: AppConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            config: Arc::new(config),
        }
    }

    #[inline]
    pub fn engine(&self) -> &EngineContext {
        &self.engine
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
