//! 应用状态机
//!
//! 分析状态只由一个 [`Phase`] 值表示，后端连通性 [`Connectivity`] 与其相互独立。

use log::{debug, info};
use serde::Serialize;

use crate::client::{AnalysisClient, AnalysisError};
use crate::damage::DamageResult;
use crate::intake::{ImageFile, ImageSlot, RejectionReason};

/// 后端连通性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    #[default]
    Checking,
    Connected,
    Disconnected,
}

impl Connectivity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Checking => "Checking...",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

/// 分析状态
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Analyzing,
    ResultReady(DamageResult),
    Errored(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Before,
    After,
}

/// 一次分析开始时两张图片的快照
#[derive(Debug)]
pub struct AnalysisTicket {
    before: ImageSlot,
    after: ImageSlot,
    generation: u64,
}

impl AnalysisTicket {
    pub fn before(&self) -> &ImageSlot {
        &self.before
    }

    pub fn after(&self) -> &ImageSlot {
        &self.after
    }
}

#[derive(Debug, Default)]
pub struct Session {
    before: ImageSlot,
    after: ImageSlot,
    phase: Phase,
    connectivity: Connectivity,
    /// 每次 reset 自增，用于丢弃过期的分析结果
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn slot(&self, kind: SlotKind) -> &ImageSlot {
        match kind {
            SlotKind::Before => &self.before,
            SlotKind::After => &self.after,
        }
    }

    pub fn slot_mut(&mut self, kind: SlotKind) -> &mut ImageSlot {
        match kind {
            SlotKind::Before => &mut self.before,
            SlotKind::After => &mut self.after,
        }
    }

    /// 上传一张图片到指定槽位
    pub fn upload(&mut self, kind: SlotKind, file: &ImageFile) -> Result<(), RejectionReason> {
        self.slot_mut(kind).accept(file)
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.phase, Phase::Analyzing)
    }

    pub fn can_analyze(&self) -> bool {
        self.before.is_present() && self.after.is_present() && !self.is_analyzing()
    }

    pub fn result(&self) -> Option<&DamageResult> {
        match &self.phase {
            Phase::ResultReady(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Errored(message) => Some(message),
            _ => None,
        }
    }

    /// 进入 analyzing 状态，条件不满足时返回 `None` 且不改变状态
    pub fn begin_analysis(&mut self) -> Option<AnalysisTicket> {
        if !self.can_analyze() {
            return None;
        }
        self.phase = Phase::Analyzing;
        Some(AnalysisTicket { before: self.before.clone(), after: self.after.clone(), generation: self.generation })
    }

    /// 应用分析结果，返回结果是否被采用
    pub fn complete(&mut self, ticket: AnalysisTicket, outcome: Result<DamageResult, AnalysisError>) -> bool {
        if ticket.generation != self.generation || !self.is_analyzing() {
            debug!("丢弃过期的分析结果");
            return false;
        }
        self.phase = match outcome {
            Ok(result) => Phase::ResultReady(result),
            Err(err) => Phase::Errored(err.to_string()),
        };
        true
    }

    /// 执行一次完整的分析流程
    pub async fn analyze(&mut self, client: &AnalysisClient) {
        if self.is_analyzing() {
            return;
        }
        let Some(ticket) = self.begin_analysis() else {
            self.phase = Phase::Errored(AnalysisError::MissingInput.to_string());
            return;
        };
        let outcome = client.analyze(ticket.before(), ticket.after()).await;
        self.complete(ticket, outcome);
    }

    /// 清空两个槽位、结果和错误
    pub fn reset(&mut self) {
        self.before.remove();
        self.after.remove();
        self.phase = Phase::Idle;
        self.generation += 1;
    }

    /// 重新检查后端连通性
    pub async fn check_connectivity(&mut self, client: &AnalysisClient) -> Connectivity {
        self.connectivity = Connectivity::Checking;
        self.connectivity = client.check_health().await;
        info!("Backend: {}", self.connectivity.label());
        self.connectivity
    }
}
