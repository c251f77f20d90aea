//! TCP line server for the stack store.
//!
//! One request line in, one response line out. Each connection runs in its
//! own tokio task; all state lives in the shared [`StackRegistry`], which
//! the server treats as the sole source of truth. A background task sweeps
//! idle-expired stacks on a timer.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, trace, warn};

use crate::config::StackdConfig;
use crate::protocol::{Command, Response};
use crate::store::{StackId, StackInstance, StackRegistry, StoreError};

/// A bound listener plus the registry it serves.
pub struct StackServer {
    listener: TcpListener,
    registry: Arc<StackRegistry>,
    max_value_len: usize,
    sweep_interval: Duration,
}

impl StackServer {
    /// Binds the configured address and builds a fresh registry.
    pub async fn listen(config: &StackdConfig) -> Result<Self> {
        let addr = config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        Ok(Self {
            listener,
            registry: Arc::new(config.build_registry()),
            max_value_len: config.max_value_len,
            sweep_interval: Duration::from_secs(config.sweep_secs),
        })
    }

    /// The address actually bound (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("failed to read local address")
    }

    /// Handle to the registry this server owns.
    pub fn registry(&self) -> Arc<StackRegistry> {
        Arc::clone(&self.registry)
    }

    /// Accepts connections until ctrl-c.
    pub async fn serve(self) -> Result<()> {
        info!(addr = %self.local_addr()?, "stackd listening");

        let sweeper = tokio::spawn(sweep_loop(
            Arc::clone(&self.registry),
            self.sweep_interval,
        ));

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let registry = Arc::clone(&self.registry);
                            let max_value_len = self.max_value_len;
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, peer, registry, max_value_len).await {
                                    debug!(%peer, error = %e, "connection ended with error");
                                }
                            });
                        }
                        Err(e) => warn!(error = %e, "failed to accept connection"),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        sweeper.abort();
        Ok(())
    }
}

impl std::fmt::Debug for StackServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackServer")
            .field("registry", &self.registry)
            .field("max_value_len", &self.max_value_len)
            .finish()
    }
}

async fn sweep_loop(registry: Arc<StackRegistry>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        registry.purge_expired();
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<StackRegistry>,
    max_value_len: usize,
) -> std::io::Result<()> {
    debug!(%peer, "client connected");
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let response = respond(&registry, max_value_len, &line);
        trace!(%peer, request = %line, reply = %response, "handled request");
        writer.write_all(response.to_string().as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    debug!(%peer, "client disconnected");
    Ok(())
}

/// Decodes one request line and executes it against the registry.
///
/// Never fails: malformed input and store errors both come back as a
/// renderable [`Response`], and the connection stays usable.
pub fn respond(registry: &StackRegistry, max_value_len: usize, line: &str) -> Response {
    match Command::parse(line) {
        Ok(command) => execute(registry, max_value_len, command),
        Err(err) => err.into(),
    }
}

/// Executes a decoded command against the registry.
pub fn execute(registry: &StackRegistry, max_value_len: usize, command: Command) -> Response {
    match command {
        Command::Ping => Response::Pong,
        Command::Create => match registry.create() {
            Ok(id) => Response::Id(id),
            Err(err) => err.into(),
        },
        Command::Push { id, value } => {
            if value.len() > max_value_len {
                return value_too_large(max_value_len);
            }
            with_stack(registry, &id, |stack| {
                stack.push(value)?;
                Ok(Response::Ok)
            })
        }
        Command::PushMany { id, values } => {
            if values.iter().any(|v| v.len() > max_value_len) {
                return value_too_large(max_value_len);
            }
            with_stack(registry, &id, |stack| {
                stack.push_many(values)?;
                Ok(Response::Ok)
            })
        }
        Command::Pop { id } => with_stack(registry, &id, |stack| Ok(Response::Value(stack.pop()?))),
        Command::PopMany { id, count } => with_stack(registry, &id, |stack| {
            Ok(Response::Values(stack.pop_many(count)?))
        }),
        Command::Peek { id } => {
            with_stack(registry, &id, |stack| Ok(Response::Value(stack.peek()?)))
        }
        Command::Size { id } => with_stack(registry, &id, |stack| Ok(Response::Size(stack.len()))),
        Command::Delete { id } => match registry.delete(&id) {
            Ok(()) => Response::Ok,
            Err(err) => err.into(),
        },
        Command::List => Response::Stats(registry.stats()),
    }
}

fn with_stack(
    registry: &StackRegistry,
    id: &StackId,
    op: impl FnOnce(&StackInstance) -> Result<Response, StoreError>,
) -> Response {
    match registry.resolve(id) {
        Ok(stack) => op(&stack).unwrap_or_else(Response::from),
        Err(err) => err.into(),
    }
}

fn value_too_large(limit: usize) -> Response {
    Response::Invalid(format!("value too large (limit {limit} bytes)"))
}
