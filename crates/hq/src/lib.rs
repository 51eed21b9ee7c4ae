//! Facade crate for HeroHQ features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it composes other crates and implements no business logic.
//!
//! ## Usage
//! - Hand [`migrations`] to the database builder before anything touches the store.
//! - Call [`init`] to build every feature slice, then register them with the API state.

use hq_database::{Database, Migration};
pub use hq_domain as domain;
use hq_domain::config::ApiConfig;
use hq_domain::registry::InitializedSlice;
pub use hq_kernel as kernel;

/// Feature slices, re-exported for the applications.
pub mod features {
    pub use hq_notify as notify;
    pub use hq_roster as roster;
}

#[cfg(feature = "server")]
pub mod server {
    use hq_kernel::server::ApiState;
    use utoipa_axum::router::OpenApiRouter;

    /// System routes plus the REST surface of every feature slice.
    #[must_use]
    pub fn router() -> OpenApiRouter<ApiState> {
        hq_kernel::server::system_router()
            .merge(crate::features::roster::router())
            .merge(crate::features::notify::router())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("roster: {0}")]
    Roster(#[from] hq_roster::RosterError),
    #[error("notify: {0}")]
    Notify(#[from] hq_notify::NotifyError),
}

/// Schema scripts of every slice, in application order.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    hq_roster::MIGRATIONS.to_vec()
}

/// Initialize all features on a migrated database.
///
/// # Errors
/// Returns the first slice that fails to initialize.
pub fn init(config: &ApiConfig, database: &Database) -> Result<Vec<InitializedSlice>, InitError> {
    Ok(vec![hq_roster::init(database)?, hq_notify::init(&config.mail)?])
}
