use axum::Router;
use axum_server::Handle;
use hyper_util::rt::TokioTimer;
use std::{io, net::SocketAddr, time::Duration};
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};

use starter_core::AppConfig;

/// Keep-alive connections are dropped when no new request header arrives in time.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(60);
/// Upper bound for reading a request body.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound for producing a response; exceeded requests get 408.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// In-flight requests get this long to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// HTTP server bound on all interfaces with fixed timeouts.
pub struct Server {
    port: u16,
    idle_timeout: Duration,
    read_timeout: Duration,
    write_timeout: Duration,
    router: Router,
}

impl Server {
    pub fn new(port: u16, router: Router) -> Self {
        Self {
            port,
            idle_timeout: IDLE_TIMEOUT,
            read_timeout: READ_TIMEOUT,
            write_timeout: WRITE_TIMEOUT,
            router,
        }
    }

    pub fn from_config(config: &AppConfig, router: Router) -> Self {
        Self::new(config.port, router)
    }

    /// Listen address in `:<port>` form.
    pub fn addr(&self) -> String {
        format!(":{}", self.port)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// The router with the read and write timeouts applied.
    pub fn into_app(self) -> Router {
        self.router
            .layer(RequestBodyTimeoutLayer::new(self.read_timeout))
            .layer(TimeoutLayer::new(self.write_timeout))
    }

    /// Serve until Ctrl-C or SIGTERM, then drain in-flight requests.
    pub async fn serve(self) -> io::Result<()> {
        let addr = self.socket_addr();
        let idle_timeout = self.idle_timeout;
        let handle = Handle::new();

        tokio::spawn(shutdown_signal(handle.clone()));
        let listening = handle.clone();
        tokio::spawn(async move {
            if let Some(local) = listening.listening().await {
                tracing::info!("HTTP server listening on {}", local);
            }
        });

        let mut server = axum_server::bind(addr).handle(handle);
        server
            .http_builder()
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(idle_timeout);

        server.serve(self.into_app().into_make_service()).await?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
