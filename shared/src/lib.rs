//! Diet Planner Shared Library
//!
//! This crate contains the domain types and pure calculations used by the
//! backend: profile normalization, the user feature vector, workout
//! catalogues and the API request/response types.

pub mod errors;
pub mod profile;
pub mod types;
pub mod vectorize;
pub mod workouts;

// Re-export commonly used items
pub use errors::*;
pub use profile::{Chronic, Deficiency, Goal, UserProfile};
pub use types::*;
pub use vectorize::{vectorize, UserVector, USER_VECTOR_DIM};
