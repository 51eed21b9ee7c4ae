//! # Roster
//!
//! Heroes, powers and the strength-tagged associations between them.
//!
//! * [`model`]: entities and their JSON shapes.
//! * [`validation`]: the rules every write passes first.
//! * [`Repository`]: the only code that touches the `hero`, `power` and `hero_power` tables.
//! * [`seed`]: the canonical demo data set.
//! * `router()` (feature `server`): the REST surface for heroes, powers and hero powers.

mod error;
#[cfg(feature = "server")]
mod handlers;
pub mod model;
mod repository;
pub mod seed;
pub mod validation;

pub use crate::error::{RosterError, RosterErrorExt};
pub use crate::repository::{NewHeroPower, Repository};
#[cfg(feature = "server")]
pub use crate::handlers::{CreateHeroPowerRequest, UpdatePowerRequest};

use hq_database::{Database, Migration};
use hq_kernel::domain::registry::InitializedSlice;

/// Schema scripts for the roster tables, in application order.
pub const MIGRATIONS: [Migration; 1] =
    [Migration::new("roster", "0001", include_str!("../migrations/0001-schema.surql"))];

/// Roster feature state
#[hq_derive::hq_slice]
pub struct Roster {
    pub repository: Repository,
}

/// Builds the roster slice on an already migrated database.
///
/// # Errors
/// Currently infallible; the signature matches the other slices.
pub fn init(db: &Database) -> Result<InitializedSlice, RosterError> {
    let slice = Roster::new(RosterInner { repository: Repository::new(db.clone()) });
    tracing::info!("Roster slice initialized");
    Ok(InitializedSlice::new(slice))
}

#[cfg(feature = "server")]
pub fn router() -> utoipa_axum::router::OpenApiRouter<hq_kernel::server::ApiState> {
    use utoipa_axum::routes;

    utoipa_axum::router::OpenApiRouter::new()
        .routes(routes!(handlers::list_heroes))
        .routes(routes!(handlers::get_hero))
        .routes(routes!(handlers::list_powers))
        .routes(routes!(handlers::get_power, handlers::update_power))
        .routes(routes!(handlers::create_hero_power))
}
