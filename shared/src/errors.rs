//! Error types for the Diet Planner domain

use thiserror::Error;

/// Errors raised when parsing domain categories from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCategoryError {
    #[error("Unknown meal slot: {0}")]
    MealSlot(String),
}
