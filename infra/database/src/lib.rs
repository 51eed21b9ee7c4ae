//! # Database
//!
//! Opens the [SurrealDB](https://surrealdb.com) connection used by every HeroHQ slice and
//! brings its schema up to date.
//!
//! * **Engine agnostic**: `mem://`, `rocksdb://`, `ws://` and `http://` through the `any` engine.
//! * **Health retries**: waits for the engine with exponential backoff before giving up.
//! * **Migrations**: feature slices hand their `.surql` scripts to the builder; each one is
//!   applied once, in order, and its checksum is pinned in the `migration` table.
//!
//! ```rust
//! use hq_database::{Database, DatabaseError, Migration};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder()
//!         .url("mem://")
//!         .session("hq", "roster")
//!         .migrations([Migration::new("demo", "0001", "DEFINE TABLE demo SCHEMALESS;")])
//!         .init()
//!         .await?;
//!
//!     let _version = db.version().await?;
//!     Ok(())
//! }
//! ```

mod error;
mod migrations;

pub use crate::error::{DatabaseError, DatabaseErrorExt};
pub use crate::migrations::{Migration, MigrationReport};

use crate::migrations::MigrationRunner;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{debug, info, instrument, warn};

const HEALTH_ATTEMPTS: u32 = 3;
const HEALTH_INITIAL_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct DatabaseInner {
    instance: Surreal<Any>,
    namespace: String,
    database: String,
}

/// Cheaply clonable handle to an authenticated `SurrealDB` session.
///
/// Derefs to [`Surreal<Any>`], so queries are issued directly on the handle.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::default()
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.inner.database
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    namespace: Option<String>,
    database: Option<String>,
    credentials: Option<(String, String)>,
    migrations: Vec<Migration>,
}

impl DatabaseBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self.database = Some(database.into());
        self
    }

    /// Signs in as a root user before selecting the session.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Queues migrations. They are applied in the order given, after the ledger bootstrap.
    pub fn migrations(mut self, migrations: impl IntoIterator<Item = Migration>) -> Self {
        self.migrations.extend(migrations);
        self
    }

    /// Connects, waits for the engine, authenticates, selects the session and migrates.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] if the URL or session is missing.
    /// * [`DatabaseError::Connection`] if the engine cannot start or stays unhealthy.
    /// * [`DatabaseError::Auth`] if the root credentials are rejected.
    /// * [`DatabaseError::Migration`] if an applied migration's checksum changed.
    /// * [`DatabaseError::Surreal`] for any other engine failure.
    #[instrument(skip(self), fields(url = self.url, ns = self.namespace, db = self.database))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = self.url.ok_or_else(|| missing("URL is required"))?;
        let namespace = self.namespace.ok_or_else(|| missing("Namespace is required"))?;
        let database = self.database.ok_or_else(|| missing("Database is required"))?;

        let instance = connect(&url).await.map_err(|e| DatabaseError::Connection {
            message: e.to_string().into(),
            context: Some("Initializing engine".into()),
        })?;

        wait_until_healthy(&instance, &url).await?;

        if let Some((username, password)) = self.credentials {
            instance.signin(Root { username, password }).await.map_err(|e| {
                DatabaseError::Auth { message: e.to_string().into(), context: Some(url.into()) }
            })?;
        }

        instance.use_ns(&namespace).use_db(&database).await.context("Activating session")?;

        let version =
            instance.version().await.map_or_else(|_| "unknown".to_owned(), |v| v.to_string());
        info!(%namespace, %database, %version, "SurrealDB connection established");

        let report = MigrationRunner::new(&instance, &self.migrations).run().await?;
        for skipped in &report.skipped {
            debug!(slice = skipped.slice, version = skipped.version, "Migration already applied");
        }
        for applied in &report.applied {
            info!(slice = applied.slice, version = applied.version, "Applied migration");
        }

        Ok(Database { inner: Arc::new(DatabaseInner { instance, namespace, database }) })
    }
}

async fn wait_until_healthy(instance: &Surreal<Any>, url: &str) -> Result<(), DatabaseError> {
    let mut delay = HEALTH_INITIAL_DELAY;
    for attempt in 1..=HEALTH_ATTEMPTS {
        if instance.health().await.is_ok() {
            return Ok(());
        }
        if attempt < HEALTH_ATTEMPTS {
            warn!(attempt, ?delay, "Database not ready, retrying");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }

    Err(DatabaseError::Connection {
        message: "Unhealthy after retries".into(),
        context: Some(url.to_owned().into()),
    })
}

fn missing(message: &'static str) -> DatabaseError {
    DatabaseError::Validation { message: message.into(), context: None }
}
