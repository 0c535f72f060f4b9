use axum::{Router, http::Uri, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::health;
use super::state::AppState;
use super::types::ApiError;
use super::v1;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/v1", v1::create_v1_router())
        .fallback(unknown_route)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::AppConfig;

    async fn router() -> Router {
        let state = crate::create_app_state_with_config(&AppConfig::default())
            .await
            .unwrap();
        create_router_with_state(state)
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = router().await;

        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["checks"][0]["message"], "keyword");
    }

    #[tokio::test]
    async fn test_query_direct_answer() {
        let (status, body) = post_json(
            router().await,
            "/v1/query",
            serde_json::json!({"query": "What is a ration card?"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pipeline_tag"], "direct_answer");
        assert_eq!(body["metadata"]["retrieval_retries"], 0);
    }

    #[tokio::test]
    async fn test_query_validation_error() {
        let (status, body) =
            post_json(router().await, "/v1/query", serde_json::json!({"query": ""})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["param"], "query");
    }

    #[tokio::test]
    async fn test_classify_document() {
        let (status, body) = post_json(
            router().await,
            "/v1/classify",
            serde_json::json!({
                "content": "Please update the land survey and property deed records",
                "filename": "request.txt"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "LAND_RECORD");
    }

    #[tokio::test]
    async fn test_screen_document() {
        let (status, body) = post_json(
            router().await,
            "/v1/screen",
            serde_json::json!({"content": "Reach me at jane.doe@example.com about the permit"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_pii"], true);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = router()
            .await
            .oneshot(Request::get("/v2/query").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
