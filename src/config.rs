use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::*;

/// 默认的后端地址
pub const DEFAULT_BACKEND: &str = "http://localhost:8000";

#[derive(Parser, Debug, Clone)]
#[command(name = "damage-lens", version, about = "Compare before/after vehicle photos with a damage detection backend")]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// 损伤检测后端地址
    #[arg(short, long, global = true, env = "BACKEND_URL", default_value = DEFAULT_BACKEND)]
    pub backend: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 上传前后两张图片并输出损伤报告
    Analyze(AnalyzeCommand),
    /// 检查后端是否可达
    Health(HealthCommand),
    /// 渲染一个保存下来的分析结果
    Render(RenderCommand),
    /// 启动 HTTP 服务，并将 /api/* 转发到后端
    Server(ServerCommand),
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
}
