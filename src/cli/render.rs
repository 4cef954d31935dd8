use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::cli::{SubCommandExtend, print_report};
use crate::config::{Opts, OutputFormat};
use crate::damage::DamageResult;
use crate::report;

#[derive(Parser, Debug, Clone)]
pub struct RenderCommand {
    /// 后端返回的 JSON 文件
    pub result: PathBuf,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for RenderCommand {
    async fn run(&self, _opts: &Opts) -> anyhow::Result<()> {
        let body = tokio::fs::read_to_string(&self.result)
            .await
            .with_context(|| format!("无法读取 {}", self.result.display()))?;
        let result = DamageResult::from_json(&body).context("分析结果格式错误")?;
        print_report(&report::render(&result), self.output_format)
    }
}
