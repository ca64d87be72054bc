//! Common test utilities for integration tests
//!
//! Each [`TestApp`] writes its own recipe dataset (and optionally model
//! weights) into a temporary directory and builds the real router over it.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use diet_planner_backend::services::{RankingModel, RecipeTable};
use diet_planner_backend::{config::AppConfig, routes, state::AppState, state::EngineContext};
use serde_json::{json, Value};
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const CUISINES: [&str; 3] = ["Indian", "Italian", "Mexican"];
pub const FOOD_TYPES: [&str; 3] = ["veg", "non-veg", "vegan"];

/// Width of the user and recipe vectors the engine produces
pub const USER_DIM: usize = 13;
pub const RECIPE_DIM: usize = 16;

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    _dir: TempDir,
}

impl TestApp {
    /// Dataset and model both present
    pub fn new() -> Self {
        Self::build(true, true)
    }

    /// Dataset present, no model file
    pub fn without_model() -> Self {
        Self::build(true, false)
    }

    /// Neither file present
    pub fn degraded() -> Self {
        Self::build(false, false)
    }

    /// Fixture dataset scored by a caller-supplied model
    pub fn with_model(model: Arc<dyn RankingModel>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = test_config(dir.path());
        let table = RecipeTable::from_reader(recipes_csv().as_bytes()).expect("Failed to parse dataset");

        let engine = EngineContext::new(
            table,
            Some(model),
            config.scoring.clone(),
            config.planner.clone(),
        );
        let app = routes::create_router(AppState::new(engine, config));

        Self { app, _dir: dir }
    }

    fn build(with_dataset: bool, with_model: bool) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = test_config(dir.path());

        if with_dataset {
            std::fs::write(&config.dataset.path, recipes_csv()).expect("Failed to write dataset");
        }
        if with_model {
            std::fs::write(&config.model.path, model_json().to_string()).expect("Failed to write model");
        }

        let engine = EngineContext::load(&config);
        let state = AppState::new(engine, config);
        let app = routes::create_router(state);

        Self { app, _dir: dir }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// POST a JSON value and parse the JSON reply
    pub async fn post_json(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let (status, body) = self.post(path, &body.to_string()).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }
}

fn test_config(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.server.port = 0;
    config.dataset.path = dir.join("recipes.csv");
    config.model.path = dir.join("model.json");
    config
}

/// Nine recipes per meal slot across three cuisines and three food types
pub fn recipes_csv() -> String {
    let mut csv = String::from(
        "recipe_name,meal_type,cuisine,food_type,ingredients,instructions,preparation,\
         calories,protein_g,carbs_g,fat_g,iron_mg,suitable_for_diabetes\n",
    );
    for meal in ["Breakfast", "Lunch", "Dinner"] {
        for i in 0..9 {
            writeln!(
                csv,
                "{meal} {i},{meal},{},{},rice; lentils,Simmer,15 min,{},{},{},{},{},{}",
                CUISINES[i % 3],
                FOOD_TYPES[(i / 3) % 3],
                300 + i * 25,
                8 + i * 2,
                50 - i * 3,
                6 + i,
                1.5 + i as f64,
                i % 3 != 0,
            )
            .unwrap();
        }
    }
    csv
}

/// Single linear layer that rewards standardized protein
pub fn model_json() -> Value {
    let mut weights = vec![vec![0.0f32]; USER_DIM + RECIPE_DIM];
    // protein_g is the second recipe feature
    weights[USER_DIM + 1] = vec![1.0];
    json!({
        "user_dim": USER_DIM,
        "recipe_dim": RECIPE_DIM,
        "layers": [{ "weights": weights, "bias": [0.0] }]
    })
}
