use axum::body::Bytes;
use axum_typed_multipart::{FieldData, TryFromMultipart};
use serde::Serialize;
use utoipa::ToSchema;

use crate::damage::DamageResult;
use crate::report::RenderedReport;
use crate::session::Connectivity;

/// 分析请求，每个字段只使用第一个文件
#[derive(TryFromMultipart)]
pub struct AnalyzeRequest {
    pub before: Vec<FieldData<Bytes>>,
    pub after: Vec<FieldData<Bytes>>,
}

/// 分析表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct AnalyzeForm {
    /// 车辆原始状态的图片，最大 10MB
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub before: String,
    /// 车辆当前状态的图片，最大 10MB
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub after: String,
}

/// 分析响应
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    /// 后端返回的原始结果
    pub result: DamageResult,
    /// 渲染后的报告
    #[schema(value_type = Object)]
    pub report: RenderedReport,
}

/// 后端连通性
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// `checking`、`connected` 或 `disconnected`
    #[schema(value_type = String)]
    pub backend: Connectivity,
    /// 后端地址
    pub origin: String,
}
