use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::api::{self, API_PREFIX};
use crate::config::Config;
use crate::store::Store;

/// HTTP server owning the record store
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    store: Arc<Store>,
}

impl Server {
    /// Bind to the configured address, serving `store`
    pub async fn bind(config: &Config, store: Store) -> std::io::Result<Self> {
        Self::bind_addr(&config.server_addr(), store).await
    }

    /// Bind to an explicit address, e.g. `127.0.0.1:0` in tests
    pub async fn bind_addr(addr: &str, store: Store) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("HTTP server bound to {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            store: Arc::new(store),
        })
    }

    /// Get local listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Shared handle on the store served by this instance
    pub fn store(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    /// Serve requests until Ctrl+C or SIGTERM
    pub async fn run(self) -> std::io::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve requests until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let port = self.local_addr.port();
        info!("Server running at http://localhost:{}", port);
        info!("API base URL: http://localhost:{}{}", port, API_PREFIX);
        info!("Health check: http://localhost:{}{}/health", port, API_PREFIX);

        let app = api::router(self.store);
        axum::serve(
            self.listener,
            axum::ServiceExt::<axum::extract::Request>::into_make_service(app),
        )
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
