use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Vocalis speech synthesis service
#[derive(Debug, Parser)]
#[command(name = "vocalis", about = "Text-to-speech HTTP service with Opus and WAV output")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "vocalis.toml", env = "VOCALIS_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "VOCALIS_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter directive, e.g. `info` or `synthesis=debug`
    #[arg(long, default_value = "info", env = "VOCALIS_LOG")]
    pub log_filter: String,
}
