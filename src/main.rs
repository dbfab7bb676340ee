mod config;
mod encoding;
mod profile;
mod protocol;
mod server;
mod store;
mod util;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use config::Config;
use server::Server;

/// Social-graph profile store served over the Redis protocol
#[derive(Debug, Parser)]
#[command(name = "socialdb", version)]
struct Args {
  /// Path to a TOML configuration file
  #[arg(short, long)]
  config: Option<String>,

  /// Listening address, overrides `server_addr`
  #[arg(long)]
  addr: Option<String>,

  /// Database directory, overrides `storage.data_path`
  #[arg(long)]
  data_path: Option<String>,
}

impl Args {
  fn load_config(&self) -> anyhow::Result<Config> {
    let mut config = match &self.config {
      Some(path) => Config::from_file(path)?,
      None => Config::default(),
    };
    if let Some(addr) = &self.addr {
      config.server_addr = addr.clone();
    }
    if let Some(data_path) = &self.data_path {
      config.storage.data_path = data_path.clone();
    }
    config.validate()?;
    Ok(config)
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let args = Args::parse();
  let config = args.load_config().context("invalid configuration")?;

  util::logging::init(&config.log)?;

  info!("Starting SocialDB - profile store over RESP");
  info!("Version: {}", env!("CARGO_PKG_VERSION"));
  info!("Data path: {}", config.storage.data_path);

  let server = Server::start(&config).await?;
  info!("Server listening on: {}", server.local_addr());

  Arc::clone(&server)
    .run(async {
      if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
      }
    })
    .await;

  server.shutdown()?;
  info!("SocialDB stopped");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_args_override_config() {
    let args = Args::parse_from([
      "socialdb",
      "--addr",
      "127.0.0.1:7777",
      "--data-path",
      "/tmp/socialdb-test",
    ]);
    let config = args.load_config().unwrap();
    assert_eq!(config.server_addr, "127.0.0.1:7777");
    assert_eq!(config.storage.data_path, "/tmp/socialdb-test");
  }

  #[test]
  fn test_args_reject_bad_addr() {
    let args = Args::parse_from(["socialdb", "--addr", "nowhere"]);
    assert!(args.load_config().is_err());
  }

  #[test]
  fn test_args_fix_bad_file_addr() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("socialdb.toml");
    std::fs::write(&path, "server_addr = \"nowhere\"").unwrap();

    let args = Args::parse_from([
      "socialdb",
      "--config",
      path.to_str().unwrap(),
      "--addr",
      "127.0.0.1:7000",
    ]);
    let config = args.load_config().unwrap();
    assert_eq!(config.server_addr, "127.0.0.1:7000");
  }
}
