//! API routes for porc-server

pub mod dataset;
pub mod health;
pub mod ws;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let dataset = Router::new()
        .route("/api/dataset", get(dataset::get_dataset))
        .route("/api/farms", get(dataset::list_farms))
        .route("/api/farms/{id}", get(dataset::get_farm))
        .route("/api/slaughterhouses", get(dataset::list_slaughterhouses))
        .route("/api/slaughterhouses/{id}", get(dataset::get_slaughterhouse));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ws", get(ws::handle_ws))
        .merge(dataset)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use shared::StaticDataset;
    use shared::models::FarmRecord;
    use tower::ServiceExt;

    fn state() -> AppState {
        let farms = vec![FarmRecord {
            farm_id: "F1".into(),
            name: "Cal Roig".into(),
            lat: 41.7,
            lon: 0.63,
            total_pigs: 500,
            mean_weight_kg: 110.0,
            std_weight_kg: Some(5.0),
        }];
        AppState::new(Config::default(), StaticDataset::new(farms, Vec::new(), Vec::new()))
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = create_router(state())
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "porc-server");
        assert_eq!(body["farms"], 1);
        assert_eq!(body["subscribers"], 0);
    }

    #[tokio::test]
    async fn test_dataset_envelope() {
        let (status, body) = get_json("/api/dataset").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"]["farms"][0]["farm_id"], "F1");
        assert!(body["data"]["slaughterhouses"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_farm_lookup() {
        let (status, body) = get_json("/api/farms/F1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Cal Roig");

        let (status, body) = get_json("/api/farms/F9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 1003);
    }

    #[tokio::test]
    async fn test_unknown_slaughterhouse() {
        let (status, body) = get_json("/api/slaughterhouses/S1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 1004);

        let (status, body) = get_json("/api/slaughterhouses").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].as_array().unwrap().is_empty());
    }
}
