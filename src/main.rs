use clap::Parser;
use env_logger::Env;

use damage_lens::cli::SubCommandExtend;
use damage_lens::config::{Opts, SubCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();

    match &opts.subcmd {
        SubCommand::Analyze(config) => config.run(&opts).await,
        SubCommand::Health(config) => config.run(&opts).await,
        SubCommand::Render(config) => config.run(&opts).await,
        SubCommand::Server(config) => config.run(&opts).await,
    }
}
