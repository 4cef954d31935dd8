//! 将同源的 `/api/*` 请求原样转发到后端

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{OriginalUri, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::Response;
use log::debug;

use super::error::{AppError, Result};
use super::state::AppState;

pub async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    // 使用未解码的路径，`%2F` 等转义原样转发
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or_else(|| uri.path());
    let url = format!("{}{path}", state.client.origin());
    debug!("转发 {method} {url}");

    let mut request = state.http.request(method, &url).body(body);
    if let Some(content_type) = headers.get(CONTENT_TYPE) {
        request = request.header(CONTENT_TYPE, content_type.clone());
    }

    let bad_gateway = |err: reqwest::Error| {
        AppError::new(StatusCode::BAD_GATEWAY, format!("{:#}", anyhow::Error::from(err)))
    };
    let response = request.send().await.map_err(bad_gateway)?;

    let mut builder = Response::builder().status(response.status());
    if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
        builder = builder.header(CONTENT_TYPE, content_type.clone());
    }
    let body = response.bytes().await.map_err(bad_gateway)?;

    Ok(builder.body(Body::from(body))?)
}
