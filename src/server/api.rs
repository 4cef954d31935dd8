use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum_typed_multipart::{FieldData, TypedMultipart};
use log::info;

use super::error::{AppError, Result};
use super::state::AppState;
use super::types::*;
use crate::intake::{self, ImageFile, ImageSlot};
use crate::{metrics, report};

/// 上传前后两张图片并返回损伤报告
#[utoipa::path(
    post,
    path = "/analyze",
    request_body(content = AnalyzeForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = AnalyzeResponse),
        (status = 400, description = "缺少图片"),
        (status = 409, description = "已有分析正在进行"),
        (status = 422, description = "图片类型或大小不符合要求"),
        (status = 502, description = "后端请求失败"),
    )
)]
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    data: TypedMultipart<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>> {
    let before = intake_field("before", &data.before)?;
    let after = intake_field("after", &data.after)?;

    info!("正在分析上传图片");
    let result = state.client.analyze(&before, &after).await?;
    let report = report::render(&result);

    Ok(Json(AnalyzeResponse { result, report }))
}

fn intake_field(name: &str, files: &[FieldData<Bytes>]) -> Result<ImageSlot> {
    let files = files.iter().map(|file| {
        ImageFile::new(
            file.metadata.file_name.clone(),
            file.metadata.content_type.clone().unwrap_or_default(),
            file.contents.clone(),
        )
    });
    match intake::submit_first(files) {
        Some(slot) => Ok(slot?),
        None => Err(AppError::new(StatusCode::BAD_REQUEST, format!("missing image field `{name}`"))),
    }
}

/// 最近一次检查到的后端连通性
#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, body = StatusResponse),
    )
)]
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let backend = *state.connectivity.read().await;
    Json(StatusResponse { backend, origin: state.client.origin().to_string() })
}

/// 重新检查后端连通性
#[utoipa::path(
    post,
    path = "/status",
    responses(
        (status = 200, body = StatusResponse),
    )
)]
pub async fn retry_status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let backend = state.refresh_connectivity().await;
    Json(StatusResponse { backend, origin: state.client.origin().to_string() })
}

/// Prometheus 指标
pub async fn metrics_handler() -> String {
    metrics::gather_text()
}
