use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::profile::ProfileStore;
use crate::protocol::{CommandFactory, Parser, Value};
use crate::store::Store;

/// TCP server exposing the profile commands over RESP
pub struct Server {
  listener: TcpListener,
  local_addr: SocketAddr,
  cmd_factory: Arc<CommandFactory>,
  profiles: Arc<ProfileStore>,
}

impl Server {
  /// Open the profile database and bind the listener
  pub async fn start(config: &Config) -> anyhow::Result<Arc<Self>> {
    let store = Store::open(&config.storage).context("failed to open profile storage")?;
    let profiles = Arc::new(ProfileStore::new(store));

    let server = Self::bind(&config.server_addr, profiles)
      .await
      .with_context(|| format!("failed to bind {}", config.server_addr))?;
    Ok(Arc::new(server))
  }

  /// Bind TCP server to `addr`, serving `profiles`
  pub async fn bind(addr: &str, profiles: Arc<ProfileStore>) -> std::io::Result<Self> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    info!("TCP server bound to {}", local_addr);

    Ok(Self {
      listener,
      local_addr,
      cmd_factory: Arc::new(CommandFactory::init()),
      profiles,
    })
  }

  /// Get local listening address
  pub fn local_addr(&self) -> SocketAddr {
    self.local_addr
  }

  /// Process a RESP command and return the response
  async fn process_command(&self, value: Value) -> Value {
    self.cmd_factory.execute(value, &self.profiles).await
  }

  /// Handle a single client connection
  async fn handle_connection(
    self: Arc<Self>,
    mut stream: TcpStream,
    peer_addr: SocketAddr,
  ) -> std::io::Result<()> {
    let mut pending = BytesMut::with_capacity(8192);

    loop {
      match stream.read_buf(&mut pending).await {
        Ok(0) => {
          info!("Connection closed by client: {}", peer_addr);
          break;
        }
        Ok(_) => loop {
          match Parser::parse(&pending) {
            Ok(Some((value, consumed))) => {
              pending.advance(consumed);
              debug!("Received command from {}: {:?}", peer_addr, value);

              let response = self.process_command(value).await;
              if let Err(e) = stream.write_all(&response.encode()).await {
                warn!("Failed to write response to {}: {}", peer_addr, e);
                return Ok(());
              }
            }
            Ok(None) => break,
            Err(e) => {
              warn!("Protocol error from {}: {}", peer_addr, e);
              let reply = Value::error(format!("ERR Protocol error: {}", e));
              stream.write_all(&reply.encode()).await?;
              return Ok(());
            }
          }
        },
        Err(e) => {
          error!("Error reading from {}: {}", peer_addr, e);
          break;
        }
      }
    }

    info!("Connection handler ended for {}", peer_addr);
    Ok(())
  }

  /// Accept and process connections until `shutdown` resolves
  pub async fn run(self: Arc<Self>, shutdown: impl Future<Output = ()>) {
    info!("Server started, listening on {}", self.local_addr);
    tokio::pin!(shutdown);

    loop {
      tokio::select! {
        _ = &mut shutdown => {
          info!("Shutdown requested, no longer accepting connections");
          break;
        }
        accepted = self.listener.accept() => match accepted {
          Ok((stream, peer_addr)) => {
            info!("New connection accepted from {}", peer_addr);

            let server = Arc::clone(&self);
            tokio::spawn(async move {
              if let Err(e) = server.handle_connection(stream, peer_addr).await {
                error!("Error handling connection from {}: {}", peer_addr, e);
              }
            });
          }
          Err(e) => {
            error!("Failed to accept connection: {}", e);
          }
        }
      }
    }
  }

  /// Flush the profile database
  pub fn shutdown(&self) -> anyhow::Result<()> {
    self
      .profiles
      .flush()
      .context("failed to flush profile storage")?;
    info!("Profile storage flushed");
    Ok(())
  }
}
