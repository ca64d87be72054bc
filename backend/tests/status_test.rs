//! Integration tests for the engine status endpoint

mod common;

use axum::http::StatusCode;
use diet_planner_shared::StatusResponse;

#[tokio::test]
async fn test_status_when_fully_loaded() {
    let app = common::TestApp::new();

    let (status, body) = app.get("/status").await;
    assert_eq!(status, StatusCode::OK);

    let report: StatusResponse = serde_json::from_str(&body).unwrap();
    assert!(report.dataset_loaded);
    assert!(report.model_loaded);
    assert_eq!(report.recipe_count, 27);
    assert_eq!(report.feature_dim, common::RECIPE_DIM);
    assert_eq!(report.user_dim, common::USER_DIM);
    assert_eq!(report.categorical_dim, 6);
    assert!(!report.version.is_empty());
}

#[tokio::test]
async fn test_status_reports_degraded_mode() {
    let app = common::TestApp::degraded();

    let (status, body) = app.get("/status").await;
    assert_eq!(status, StatusCode::OK);

    let report: StatusResponse = serde_json::from_str(&body).unwrap();
    assert!(!report.dataset_loaded);
    assert!(!report.model_loaded);
    assert_eq!(report.recipe_count, 0);
    assert_eq!(report.feature_dim, common::RECIPE_DIM);
}
