mod api;
mod error;
mod proxy;
mod state;
mod types;

use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{any, get};
use log::info;
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use self::state::*;
pub use self::types::{AnalyzeResponse, StatusResponse};
use crate::damage::DamageResult;
use crate::intake::MAX_IMAGE_SIZE;

/// 请求体大小上限：两张图片加上 base64 和 multipart 的额外开销
pub const MAX_REQUEST_SIZE: usize = 32 * 1024 * 1024;

const _: () = assert!(MAX_REQUEST_SIZE as u64 > 2 * MAX_IMAGE_SIZE * 4 / 3);

#[derive(OpenApi)]
#[openapi(
    paths(api::analyze_handler, api::status_handler, api::retry_status_handler),
    components(schemas(types::AnalyzeForm, DamageResult))
)]
pub struct ApiDoc;

/// 构建API服务器
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze", axum::routing::post(api::analyze_handler))
        .route("/status", get(api::status_handler).post(api::retry_status_handler))
        .route("/metrics", get(api::metrics_handler))
        .route("/api/{*path}", any(proxy::proxy_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(log_requests))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_SIZE))
        .with_state(state)
}

async fn log_requests(request: Request, next: Next) -> Response {
    info!("请求: {} {}", request.method(), request.uri());
    let response = next.run(request).await;
    info!("响应: {}", response.status());
    response
}
