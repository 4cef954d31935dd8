use anyhow::bail;
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::client::AnalysisClient;
use crate::config::Opts;
use crate::session::{Connectivity, Session};

#[derive(Parser, Debug, Clone)]
pub struct HealthCommand {}

impl SubCommandExtend for HealthCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let client = AnalysisClient::new(opts.backend.clone());
        let mut session = Session::new();

        let status = session.check_connectivity(&client).await;
        println!("Backend: {}", status.label());
        if status != Connectivity::Connected {
            bail!("无法连接到后端 {}", client.origin());
        }
        Ok(())
    }
}
