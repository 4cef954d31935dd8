pub mod cli;
pub mod client;
pub mod config;
pub mod damage;
pub mod intake;
mod metrics;
pub mod report;
pub mod server;
pub mod session;

pub use client::{AnalysisClient, AnalysisError};
pub use config::Opts;
pub use damage::DamageResult;
pub use session::Session;
