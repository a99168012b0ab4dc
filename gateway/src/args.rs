use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, Subcommand};
use config::Config;

const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8000";

#[derive(Debug, Parser)]
#[command(name = "gateway", version, about = "Authenticating gateway in front of hosted language models")]
pub struct Args {
    /// Path to the TOML configuration file. Without it, defaults and environment variables are used.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on. Overrides `server.listen_address` from the configuration.
    #[arg(long, env = "GATEWAY_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,

    /// Log filter, e.g. "info" or "server=debug,llm=debug".
    #[arg(long = "log", env = "LOG_LEVEL", default_value = "info")]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the `client_secret_hash` value for each secret, one per line. Reads secrets from
    /// stdin, one per line, when none are given.
    HashSecret { secrets: Vec<String> },
}

impl Args {
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::from_env()?,
        };

        Ok(config)
    }

    pub fn listen_address(&self, config: &Config) -> anyhow::Result<SocketAddr> {
        if let Some(address) = self.listen_address.or(config.server.listen_address) {
            return Ok(address);
        }

        Ok(DEFAULT_LISTEN_ADDRESS.parse()?)
    }
}
