mod analyze;
mod health;
mod render;
pub mod server;

pub use analyze::*;
pub use health::*;
pub use render::*;
pub use server::*;

use crate::config::{OutputFormat, Opts};
use crate::report::RenderedReport;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}

fn print_report(report: &RenderedReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Table => print!("{report}"),
    }
    Ok(())
}
