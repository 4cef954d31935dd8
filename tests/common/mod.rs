#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{DefaultBodyLimit, Multipart, OriginalUri, State};
use axum::http::StatusCode;
use axum::routing::{any, get, post};
use axum::{Json, Router};
use base64::prelude::*;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

/// 模拟的损伤检测后端
#[derive(Clone)]
pub struct MockBackend {
    /// 收到的检测请求数量
    pub requests: Arc<AtomicUsize>,
    /// 每个检测请求需要获取一个许可后才会返回
    pub gate: Option<Arc<Semaphore>>,
    pub health_status: StatusCode,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self { requests: Arc::new(AtomicUsize::new(0)), gate: None, health_status: StatusCode::OK }
    }
}

impl MockBackend {
    pub fn router(self) -> Router {
        Router::new()
            .route("/api/health", get(health))
            .route("/api/detect-damage", post(detect))
            .route("/api/echo", post(echo))
            .route("/api/raw/{*rest}", any(raw_path))
            // 两张 10MB 图片编码后约 28MB
            .layer(DefaultBodyLimit::disable())
            .with_state(self)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

async fn health(State(mock): State<MockBackend>) -> (StatusCode, Json<Value>) {
    (mock.health_status, Json(json!({ "status": "healthy" })))
}

async fn echo(query: axum::extract::RawQuery, body: String) -> String {
    format!("{}|{body}", query.0.unwrap_or_default())
}

/// 返回后端收到的未解码路径
async fn raw_path(OriginalUri(uri): OriginalUri) -> String {
    uri.path().to_string()
}

async fn detect(
    State(mock): State<MockBackend>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, String)> {
    mock.requests.fetch_add(1, Ordering::SeqCst);
    if let Some(gate) = &mock.gate {
        gate.acquire().await.unwrap().forget();
    }

    let mut fields = HashMap::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        fields.insert(name, field.text().await.unwrap());
    }

    let decode = |name: &str| -> Result<Vec<u8>, (StatusCode, String)> {
        let value = fields.get(name).ok_or((StatusCode::UNPROCESSABLE_ENTITY, format!("missing {name}")))?;
        BASE64_STANDARD
            .decode(value)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to decode base64 image: {e}")))
    };
    let before = decode("before_image")?;
    let after = decode("after_image")?;

    if before == after {
        Ok(Json(json!({
            "damage_detected": false,
            "similarity_score": 1.0,
            "damage_percentage": 0.0,
            "damage_count": 0,
            "damage_types": [],
            "severity": "minor",
            "message": "No significant damage detected. Images are very similar."
        })))
    } else {
        Ok(Json(json!({
            "damage_detected": true,
            "similarity_score": 0.42,
            "damage_percentage": 7.3,
            "damage_count": 3,
            "damage_types": ["scratch", "dent", "scratch"],
            "severity": "major",
            "message": "Damage detected! Major damage found (7.3% of image). Damage types: scratch, dent."
        })))
    }
}

/// 在随机端口上启动服务，返回其地址
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

/// 一个没有服务监听的地址
pub async fn closed_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
