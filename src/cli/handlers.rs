//! Subcommand handlers, each returning a process exit code.

use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error};

use crate::cli::commands::{HealthArgs, ServeArgs};
use crate::cli::output::{HealthStatus, OutputFormatter};
use crate::config::StackdConfig;
use crate::server::StackServer;

/// Runs the server until interrupted.
pub async fn handle_serve(args: &ServeArgs) -> i32 {
    let mut config = StackdConfig::default();
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(n) = args.max_stacks {
        config.max_stacks = n;
    }
    if let Some(n) = args.max_depth {
        config.max_depth = n;
    }
    if let Some(ttl) = args.ttl {
        config.ttl_secs = ttl;
    }

    if let Err(e) = config.validate() {
        error!("{e}");
        return 1;
    }
    debug!("{config}");

    match run_server(&config).await {
        Ok(()) => 0,
        Err(e) => {
            error!(error = %e, "server failed");
            1
        }
    }
}

async fn run_server(config: &StackdConfig) -> Result<()> {
    let server = StackServer::listen(config).await?;
    server.serve().await
}

/// Probes a running server with `PING` and reports the outcome.
pub async fn handle_health(args: &HealthArgs) -> i32 {
    let config = StackdConfig::default();
    let host = args.host.clone().unwrap_or(config.host);
    let port = args.port.unwrap_or(config.port);
    let endpoint = format!("{host}:{port}");

    let status = check_health(&endpoint, Duration::from_secs(args.timeout)).await;

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_health(&status) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            error!(error = %e, "failed to format health output");
            return 1;
        }
    }

    if status.reachable {
        0
    } else {
        1
    }
}

async fn check_health(endpoint: &str, limit: Duration) -> HealthStatus {
    let started = Instant::now();
    match timeout(limit, ping(endpoint)).await {
        Ok(Ok(reply)) if reply == "PONG" => HealthStatus {
            endpoint: endpoint.to_string(),
            reachable: true,
            latency_ms: Some(started.elapsed().as_millis() as u64),
            message: "server answered PING".to_string(),
        },
        Ok(Ok(reply)) => HealthStatus {
            endpoint: endpoint.to_string(),
            reachable: false,
            latency_ms: None,
            message: format!("unexpected reply to PING: {reply:?}"),
        },
        Ok(Err(e)) => HealthStatus {
            endpoint: endpoint.to_string(),
            reachable: false,
            latency_ms: None,
            message: format!("connection failed: {e}"),
        },
        Err(_) => HealthStatus {
            endpoint: endpoint.to_string(),
            reachable: false,
            latency_ms: None,
            message: format!("timed out after {}s", limit.as_secs()),
        },
    }
}

async fn ping(endpoint: &str) -> std::io::Result<String> {
    let stream = TcpStream::connect(endpoint).await?;
    let (reader, mut writer) = stream.into_split();
    writer.write_all(b"PING\n").await?;
    let mut lines = BufReader::new(reader).lines();
    Ok(lines.next_line().await?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_against_nothing_is_unreachable() {
        // Port 1 on localhost is essentially never listening.
        let status = check_health("127.0.0.1:1", Duration::from_secs(1)).await;
        assert!(!status.reachable);
        assert!(status.latency_ms.is_none());
    }
}
