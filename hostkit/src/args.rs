use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Web application host
#[derive(Debug, Parser)]
#[command(name = "hostkit", about = "Hosts a web API and single-page application")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "hostkit.toml", env = "HOSTKIT_CONFIG")]
    pub config: PathBuf,

    /// Environment whose overlay file is merged over the configuration
    #[arg(short, long, env = "HOSTKIT_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Override the listen address
    #[arg(long, env = "HOSTKIT_LISTEN")]
    pub listen: Option<SocketAddr>,
}
