//! # HeroHQ Server
//!
//! Serves the roster and notification routes over HTTP(S), backed by `SurrealDB`.
//!
//! ```no_run
//! use hq_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder().seed(true).build().await?.run().await
//! }
//! ```

mod router;

use anyhow::{Context, Result, bail};
use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use hq::domain::config::{ApiConfig, DatabaseConfig, SslConfig};
use hq::features::roster::{Repository, seed};
use hq::kernel::server::ApiState;
use hq_database::Database;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

/// In-flight requests get this long to finish once a shutdown signal arrives.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Replaces the roster with the demo data set on start.
    pub fn seed(mut self, enabled: bool) -> Self {
        self.cfg.seed.enabled = enabled;
        self
    }

    /// Opens and migrates the store, builds every slice and, when `seed.enabled` is set,
    /// reloads the demo roster.
    ///
    /// # Errors
    /// Missing TLS files, an unreachable or unmigratable database, a slice that fails to
    /// initialize (e.g. an invalid `mail.sender`) or a failed seed.
    pub async fn build(self) -> Result<Server> {
        if let Some(ssl) = &self.cfg.server.ssl {
            ensure_tls_files(ssl)?;
        }

        let db = open_store(&self.cfg.database).await?;
        let slices = hq::init(&self.cfg, &db).context("Feature slices failed to initialize")?;

        if self.cfg.seed.enabled {
            let report = seed::seed(&Repository::new(db.clone()))
                .await
                .context("Loading the demo roster failed")?;
            info!(
                heroes = report.heroes,
                powers = report.powers,
                hero_powers = report.hero_powers,
                "Demo roster loaded"
            );
        }

        let state = ApiState::builder()
            .config(self.cfg)
            .db(db)
            .register_slices(slices)
            .build()
            .context("Application state is incomplete")?;
        Ok(Server { state })
    }
}

/// A bootstrapped HeroHQ instance.
#[must_use = "call .run().await to start serving"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Serves [`Server::app`] until Ctrl+C or SIGTERM, then drains open connections.
    ///
    /// # Errors
    /// Unreadable TLS material, or a listener that cannot bind or fails while serving.
    pub async fn run(self) -> Result<()> {
        let server = &self.state.config().server;
        let address = SocketAddr::new(server.address, server.port);
        let service = self.app().into_make_service();

        let handle = Handle::<SocketAddr>::new();
        tokio::spawn(drain_on_signal(handle.clone()));

        match &server.ssl {
            Some(ssl) => {
                let tls = RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                    .await
                    .context("Reading the TLS certificate and key")?;
                info!("HeroHQ listening on https://{address}");
                axum_server::bind_rustls(address, tls).handle(handle).serve(service).await
            },
            None => {
                info!("HeroHQ listening on http://{address}");
                axum_server::bind(address).handle(handle).serve(service).await
            },
        }
        .with_context(|| format!("Listener on {address} failed"))?;

        info!("HeroHQ stopped");
        Ok(())
    }

    /// Roster, notification and system routes with request tracing and the `OpenAPI` UI.
    pub fn app(&self) -> Router {
        router::init(self.state.clone())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

async fn open_store(cfg: &DatabaseConfig) -> Result<Database> {
    let mut builder = Database::builder()
        .url(&cfg.url)
        .session(&cfg.namespace, &cfg.database)
        .migrations(hq::migrations());
    if let Some(credentials) = &cfg.credentials {
        builder = builder.auth(&credentials.username, &credentials.password);
    }

    builder.init().await.with_context(|| format!("Opening the roster store at {}", cfg.url))
}

fn ensure_tls_files(ssl: &SslConfig) -> Result<()> {
    for (what, path) in [("certificate", &ssl.cert), ("private key", &ssl.key)] {
        if !path.is_file() {
            bail!("TLS {what} not found at {}", path.display());
        }
    }
    Ok(())
}

/// Starts a graceful shutdown on the first Ctrl+C or SIGTERM.
async fn drain_on_signal(handle: Handle<SocketAddr>) {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable, only Ctrl+C stops the server");
                std::future::pending::<()>().await;
            },
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = ctrl_c => {
            if let Err(err) = result {
                warn!(error = %err, "Ctrl+C handler failed, shutting down");
            }
        },
        () = terminate => {},
    }

    info!(timeout = ?DRAIN_TIMEOUT, "Shutdown requested, draining connections");
    handle.graceful_shutdown(Some(DRAIN_TIMEOUT));
}
