//! Integration test harness for Shopfront.
//!
//! Runs the fixture API server in-process on an ephemeral port so tests can
//! drive the real storefront client over HTTP, and hands out client
//! configurations for both the live server and a closed port.
//!
//! ```rust,ignore
//! let server = TestServer::spawn().await?;
//! let dir = tempfile::tempdir()?;
//! let mut app = Storefront::open(&server.client_config(dir.path()))?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use url::Url;

use shopfront_storefront::config::{ClientConfig, ServerConfig};
use shopfront_storefront::routes;
use shopfront_storefront::state::{AppState, StateError};

/// Address where nothing listens; every request to it fails to connect.
pub const CLOSED_PORT_URL: &str = "http://127.0.0.1:1";

/// Errors starting the test server.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to bind test server: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),
}

/// Server state over the embedded fixtures with no simulated latency.
///
/// # Errors
///
/// Returns `HarnessError::State` if the fixtures fail to load.
pub fn test_state() -> Result<AppState, HarnessError> {
    let config = ServerConfig {
        latency: Duration::ZERO,
        ..ServerConfig::default()
    };
    Ok(AppState::new(&config)?)
}

/// A fixture server running on a background task. Stops when dropped.
pub struct TestServer {
    addr: SocketAddr,
    url: Url,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Serve the full fixture API.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError` if the state cannot be built or no port can
    /// be bound.
    pub async fn spawn() -> Result<Self, HarnessError> {
        Self::serve(routes::router(test_state()?)).await
    }

    /// Serve an arbitrary router on an ephemeral localhost port.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Io` if no port can be bound.
    pub async fn serve(app: Router) -> Result<Self, HarnessError> {
        let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        let url = Url::parse(&format!("http://{addr}"))?;
        let (shutdown, signal) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    signal.await.ok();
                })
                .await;
            if let Err(error) = served {
                tracing::error!(%error, "Test server stopped with error");
            }
        });

        Ok(Self {
            addr,
            url,
            shutdown: Some(shutdown),
            task,
        })
    }

    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Client configuration pointed at this server, persisting into `data_dir`.
    #[must_use]
    pub fn client_config(&self, data_dir: &Path) -> ClientConfig {
        let mut config = ClientConfig::new(self.url.clone());
        config.data_dir = data_dir.to_path_buf();
        config
    }

    /// Stop accepting connections and wait for the server task to finish.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
        (&mut self.task).await.ok();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
    }
}

/// Client configuration for a backend that is never reachable, with no
/// artificial fallback delay.
///
/// # Errors
///
/// Never fails for the built-in closed-port address; the `Result` keeps the
/// signature uniform with [`TestServer::spawn`].
pub fn offline_config(data_dir: &Path) -> Result<ClientConfig, HarnessError> {
    let mut config = ClientConfig::new(Url::parse(CLOSED_PORT_URL)?);
    config.fallback_delay = Duration::ZERO;
    config.data_dir = data_dir.to_path_buf();
    Ok(config)
}
