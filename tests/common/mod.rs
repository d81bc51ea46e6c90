//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use locale_router::config::schema::{LocalePrefixMode, RoutingConfig};
use locale_router::{HttpServer, ServiceConfig, Shutdown};

/// Start a mock upstream that answers every request with the request target
/// as body and the received `x-locale` header as `x-seen-locale`.
pub async fn start_echo_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        let target = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("")
                            .to_string();
                        let locale = head
                            .lines()
                            .filter_map(|line| line.split_once(':'))
                            .find(|(name, _)| name.trim().eq_ignore_ascii_case("x-locale"))
                            .map(|(_, value)| value.trim().to_string())
                            .unwrap_or_default();

                        let response = format!(
                            "HTTP/1.1 200 OK\r\nX-Seen-Locale: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            locale,
                            target.len(),
                            target
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read up to the end of the request head.
async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Routing config with the given locales, the first being the default.
pub fn routing(locales: &[&str], mode: LocalePrefixMode) -> RoutingConfig {
    RoutingConfig {
        locales: locales.iter().map(|l| l.to_string()).collect(),
        default_locale: locales[0].to_string(),
        locale_prefix: mode,
        ..RoutingConfig::default()
    }
}

/// A running gateway.
pub struct Gateway {
    pub addr: SocketAddr,
    pub updates: mpsc::UnboundedSender<ServiceConfig>,
    pub shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a gateway in front of `upstream` on an ephemeral port.
pub async fn start_gateway(upstream: SocketAddr, routing: RoutingConfig) -> Gateway {
    let mut config = ServiceConfig::default();
    config.upstream.address = upstream.to_string();
    config.observability.metrics_enabled = false;
    config.routing = routing;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let (updates, config_updates) = mpsc::unbounded_channel();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    Gateway {
        addr,
        updates,
        shutdown,
    }
}

/// Client that does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
