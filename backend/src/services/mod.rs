//! Business logic services
//!
//! Services hold the plan engine: the recipe table and its encoders, the
//! ranking model, scoring and plan assembly. None of them touch HTTP.

pub mod dataset;
pub mod model;
pub mod plan;
pub mod planner;
pub mod scoring;

pub use dataset::{DatasetError, Nutrient, Recipe, RecipeTable};
pub use model::{MlpRanker, ModelError, RankingModel};
pub use plan::PlanService;
pub use planner::PlanBuilder;
pub use scoring::{ScoreSource, ScoredRecipes, ScoringEngine};
