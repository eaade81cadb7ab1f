//! Mathscribe Web Server
//!
//! Axum-based HTTP API in front of the recognition pipeline.

pub mod routes;
pub mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use mathscribe_core::calculator::gemini::ExpressionModel;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Origin of the hosted browser client.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://mathscribe-fe.vercel.app";

/// Largest accepted request body. Data URIs of photos run to several MB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Bind address, request size and browser access policy.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
}

/// Build the CORS layer for the allow-listed origins.
///
/// Credentials are allowed, so methods and headers mirror the preflight
/// request instead of using wildcards.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o.trim()).with_context(|| format!("Invalid CORS origin: {}", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Create the application router.
pub fn create_router(state: AppState, cors: CorsLayer, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(routes::health::root))
        .route("/calculate", post(routes::calculate::calculate))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(model: Arc<dyn ExpressionModel>, config: ServerConfig) -> anyhow::Result<()> {
    let cors = cors_layer(&config.allowed_origins)?;
    let app = create_router(AppState::new(model), cors, config.max_body_bytes);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(origins = ?config.allowed_origins, "Web server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use base64::Engine;
    use image::{GrayImage, ImageFormat, Luma};
    use mathscribe_core::{CalcError, CalcResult};
    use serde_json::{json, Value};
    use std::io::Cursor;
    use tower::ServiceExt;

    /// Model stub that always gives the same answer.
    struct FixedModel(&'static str);

    #[async_trait]
    impl ExpressionModel for FixedModel {
        async fn generate(&self, _prompt: &str, _image: &GrayImage) -> CalcResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct OfflineModel;

    #[async_trait]
    impl ExpressionModel for OfflineModel {
        async fn generate(&self, _prompt: &str, _image: &GrayImage) -> CalcResult<String> {
            Err(CalcError::model_unavailable("Failed to call Gemini API: dns error"))
        }
    }

    fn app(model: impl ExpressionModel + 'static) -> Router {
        let cors = cors_layer(&[DEFAULT_ALLOWED_ORIGIN.to_string()]).unwrap();
        create_router(AppState::new(Arc::new(model)), cors, DEFAULT_MAX_BODY_BYTES)
    }

    fn canvas_data_uri() -> String {
        let img = GrayImage::from_pixel(16, 16, Luma([0]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&bytes)
        )
    }

    async fn post_calculate(app: Router, body: String) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/calculate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root_reports_running() {
        let response = app(FixedModel("[]"))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"message": "Server is running"}));
    }

    #[tokio::test]
    async fn test_calculate_success() {
        let body = json!({"image": canvas_data_uri(), "dict_of_vars": {}}).to_string();
        let (status, value) = post_calculate(app(FixedModel(r#"[{"expr":"2+2","result":"4"}]"#)), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            value,
            json!({
                "message": "Image processed",
                "data": [{"expr": "2+2", "result": "4", "assign": false}],
                "status": "success"
            })
        );
    }

    #[tokio::test]
    async fn test_calculate_accepts_bodies_over_two_megabytes() {
        // Line-wrapped base64 is legal and inflates the body past axum's 2 MB default.
        let uri = canvas_data_uri();
        let (prefix, payload) = uri.split_once(',').unwrap();
        let padded = format!("{},{}{}", prefix, "\n".repeat(3 * 1024 * 1024), payload);
        let body = json!({"image": padded, "dict_of_vars": {}}).to_string();
        assert!(body.len() > 2 * 1024 * 1024);

        let (status, value) = post_calculate(app(FixedModel(r#"[{"expr":"2+2","result":"4"}]"#)), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "success");
    }

    #[tokio::test]
    async fn test_calculate_rejects_bodies_over_configured_limit() {
        let cors = cors_layer(&[DEFAULT_ALLOWED_ORIGIN.to_string()]).unwrap();
        let small = create_router(AppState::new(Arc::new(FixedModel("[]"))), cors, 1024);
        let body = json!({"image": canvas_data_uri(), "dict_of_vars": {"pad": "x".repeat(4096)}}).to_string();

        let (status, value) = post_calculate(small, body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "error");
    }

    #[tokio::test]
    async fn test_calculate_image_without_comma() {
        let body = json!({"image": "data:image/png;base64", "dict_of_vars": {"x": "1"}}).to_string();
        let (status, value) = post_calculate(app(FixedModel("[]")), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "error");
        assert!(value["message"].as_str().unwrap().starts_with("Invalid image payload"));
        assert!(value.get("data").is_none());
    }

    #[tokio::test]
    async fn test_calculate_non_json_model_answer() {
        let body = json!({"image": canvas_data_uri(), "dict_of_vars": {}}).to_string();
        let (status, value) = post_calculate(app(FixedModel("four")), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            value,
            json!({"message": "Failed to parse AI response.", "status": "error"})
        );
    }

    #[tokio::test]
    async fn test_calculate_model_unreachable() {
        let body = json!({"image": canvas_data_uri(), "dict_of_vars": {}}).to_string();
        let (status, value) = post_calculate(app(OfflineModel), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "error");
        assert!(value["message"].as_str().unwrap().contains("dns error"));
    }

    #[tokio::test]
    async fn test_calculate_malformed_body_uses_envelope() {
        let (status, value) = post_calculate(app(FixedModel("[]")), "{not json".to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "error");
        assert!(value["message"].is_string());
    }

    #[tokio::test]
    async fn test_cors_allows_listed_origin_only() {
        let preflight = |origin: &'static str| {
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/calculate")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap()
        };

        let allowed = app(FixedModel("[]"))
            .oneshot(preflight(DEFAULT_ALLOWED_ORIGIN))
            .await
            .unwrap();
        assert_eq!(
            allowed.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            DEFAULT_ALLOWED_ORIGIN
        );

        let denied = app(FixedModel("[]"))
            .oneshot(preflight("https://evil.example"))
            .await
            .unwrap();
        assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        assert!(cors_layer(&["https://bad\norigin".to_string()]).is_err());
    }
}
