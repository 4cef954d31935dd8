use std::path::PathBuf;

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use log::warn;

use crate::cli::{SubCommandExtend, print_report};
use crate::client::AnalysisClient;
use crate::config::{Opts, OutputFormat};
use crate::intake;
use crate::report;
use crate::session::{Connectivity, Phase, Session, SlotKind};

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeCommand {
    /// 车辆原始状态的图片
    pub before: PathBuf,
    /// 车辆当前状态的图片，尽量保持相同的角度和光照
    pub after: PathBuf,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for AnalyzeCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let client = AnalysisClient::new(opts.backend.clone());
        let mut session = Session::new();

        if session.check_connectivity(&client).await == Connectivity::Disconnected {
            warn!("后端 {} 不可达，仍然尝试分析", client.origin());
        }

        for (kind, path) in [(SlotKind::Before, &self.before), (SlotKind::After, &self.after)] {
            *session.slot_mut(kind) = intake::submit_path(path)
                .await
                .with_context(|| format!("无法读取图片 {}", path.display()))?;
        }

        session.analyze(&client).await;

        match session.phase() {
            Phase::ResultReady(result) => {
                print_report(&report::render(result), self.output_format)?;
                if let Some(error) = &result.error {
                    bail!("后端分析失败: {error}");
                }
                Ok(())
            }
            Phase::Errored(message) => Err(anyhow!("{message}")),
            phase => Err(anyhow!("分析未完成: {phase:?}")),
        }
    }
}
