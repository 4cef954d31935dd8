use std::sync::Arc;

use tokio::sync::RwLock;

use crate::client::AnalysisClient;
use crate::session::Connectivity;

/// 应用状态
pub struct AppState {
    /// 转发 /api/* 请求使用的 HTTP 客户端
    pub http: reqwest::Client,
    /// 损伤检测客户端，同一时间只允许一个分析请求
    pub client: AnalysisClient,
    /// 最近一次检查到的后端连通性
    pub connectivity: RwLock<Connectivity>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(backend: String) -> Arc<Self> {
        let http = reqwest::Client::new();
        Arc::new(AppState {
            client: AnalysisClient::with_client(http.clone(), backend),
            http,
            connectivity: RwLock::new(Connectivity::Checking),
        })
    }

    /// 重新检查后端连通性并更新缓存
    pub async fn refresh_connectivity(&self) -> Connectivity {
        *self.connectivity.write().await = Connectivity::Checking;
        let status = self.client.check_health().await;
        *self.connectivity.write().await = status;
        status
    }
}
