//! 损伤检测后端的 HTTP 客户端
//!
//! 前后两张图片以 base64 字符串的形式通过 multipart 表单提交到 `/api/detect-damage`，
//! 同一个客户端同时只允许一个分析请求。

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info, warn};
use reqwest::multipart::Form;

use crate::damage::{DamageResult, ValidationError};
use crate::intake::ImageSlot;
use crate::metrics;
use crate::session::Connectivity;

/// 检测接口路径
pub const DETECT_ROUTE: &str = "/api/detect-damage";
/// 健康检查接口路径
pub const HEALTH_ROUTE: &str = "/api/health";

/// 分析失败的原因
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// 至少一个槽位为空，未发出请求
    #[error("Please upload both images before analyzing")]
    MissingInput,
    /// 已有分析请求尚未完成
    #[error("An analysis is already in progress")]
    Busy,
    /// 后端返回了非 2xx 状态码
    #[error("Failed to analyze images: {body}")]
    BackendError { status: u16, body: String },
    /// 网络层错误，例如连接被拒绝
    #[error("{0}")]
    TransportError(String),
    /// 响应体不符合 [`DamageResult`] 的结构
    #[error("Invalid analysis response: {0}")]
    InvalidResponse(#[from] ValidationError),
}

impl AnalysisError {
    /// 指标中使用的标签
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingInput => "missing_input",
            Self::Busy => "busy",
            Self::BackendError { .. } => "backend_error",
            Self::TransportError(_) => "transport_error",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        // 保留完整的错误链，例如 `tcp connect error: Connection refused`
        Self::TransportError(format!("{:#}", anyhow::Error::from(err)))
    }
}

/// 损伤检测后端客户端
pub struct AnalysisClient {
    client: reqwest::Client,
    origin: String,
    in_flight: AtomicBool,
}

/// 请求结束（包括 future 被丢弃）时释放占用标记
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AnalysisClient {
    /// * `origin` - 后端地址，例如 `http://localhost:8000`
    pub fn new(origin: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), origin)
    }

    /// 复用已有的 [`reqwest::Client`]
    pub fn with_client(client: reqwest::Client, origin: impl Into<String>) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        Self { client, origin, in_flight: AtomicBool::new(false) }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// 是否有分析请求正在进行
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<FlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard(&self.in_flight))
    }

    /// 提交两张图片进行损伤检测
    pub async fn analyze(&self, before: &ImageSlot, after: &ImageSlot) -> Result<DamageResult, AnalysisError> {
        let start = Instant::now();
        let result = self.analyze_inner(before, after).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(result) => {
                info!("分析完成，耗时 {elapsed:.2}s，检测到损伤: {}", result.damage_detected);
                metrics::inc_analysis("ok", elapsed);
            }
            Err(err) => {
                warn!("分析失败: {err}");
                metrics::inc_analysis(err.kind(), elapsed);
            }
        }
        result
    }

    async fn analyze_inner(&self, before: &ImageSlot, after: &ImageSlot) -> Result<DamageResult, AnalysisError> {
        let (Some(before), Some(after)) = (before.image(), after.image()) else {
            return Err(AnalysisError::MissingInput);
        };
        let _guard = self.try_begin().ok_or(AnalysisError::Busy)?;

        let form = Form::new()
            .text("before_image", before.payload().to_string())
            .text("after_image", after.payload().to_string());

        let url = format!("{}{DETECT_ROUTE}", self.origin);
        debug!("POST {url}");
        let response = self.client.post(url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AnalysisError::BackendError { status: status.as_u16(), body });
        }

        let body = response.text().await?;
        Ok(DamageResult::from_json(&body)?)
    }

    /// 检查后端是否可达
    pub async fn check_health(&self) -> Connectivity {
        let url = format!("{}{HEALTH_ROUTE}", self.origin);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => Connectivity::Connected,
            Ok(response) => {
                warn!("后端健康检查失败: {url} 返回 {}", response.status());
                Connectivity::Disconnected
            }
            Err(err) => {
                warn!("后端健康检查失败: {err}");
                Connectivity::Disconnected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::intake::DataUrl;

    #[tokio::test]
    async fn test_missing_input_makes_no_request() {
        // 端口 9 上没有服务，如果真的发出请求会得到 TransportError
        let client = AnalysisClient::new("http://127.0.0.1:9");
        let image = ImageSlot::from(DataUrl::encode("image/png", b"png"));

        assert_matches!(client.analyze(&ImageSlot::empty(), &image).await, Err(AnalysisError::MissingInput));
        assert_matches!(client.analyze(&image, &ImageSlot::empty()).await, Err(AnalysisError::MissingInput));
        assert!(!client.is_busy());
    }

    #[test]
    fn test_guard_is_exclusive() {
        let client = AnalysisClient::new("http://localhost:8000/");
        assert_eq!(client.origin(), "http://localhost:8000");

        let guard = client.try_begin().unwrap();
        assert!(client.is_busy());
        assert!(client.try_begin().is_none());
        drop(guard);
        assert!(!client.is_busy());
        assert!(client.try_begin().is_some());
    }

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::BackendError { status: 400, body: "bad image".into() };
        assert_eq!(err.to_string(), "Failed to analyze images: bad image");
        assert_eq!(AnalysisError::TransportError("connection refused".into()).to_string(), "connection refused");
    }
}
