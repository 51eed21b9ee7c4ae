//! State handed to every route: configuration, the store handle and the feature slices.

use fxhash::FxHashMap;
use hq_database::Database;
use hq_domain::config::ApiConfig;
use hq_domain::registry::{FeatureSlice, InitializedSlice};
use std::any::{TypeId, type_name};
use std::sync::Arc;

#[hq_derive::hq_error]
pub enum ApiStateError {
    #[error("Application state needs a database handle")]
    MissingDatabase {},

    /// A route asked for a slice the server never registered.
    #[error("Feature slice {slice} is not registered")]
    MissingSlice { slice: &'static str },
}

#[derive(Debug)]
struct Shared {
    config: ApiConfig,
    database: Database,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

/// Cheap to clone; every clone sees the same slices.
#[derive(Debug, Clone)]
pub struct ApiState {
    shared: Arc<Shared>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.shared.config
    }

    #[must_use]
    pub fn database(&self) -> &Database {
        &self.shared.database
    }

    /// The registered slice of type `T`, e.g. `state.try_get_slice::<Roster>()?`.
    ///
    /// # Errors
    /// [`ApiStateError::MissingSlice`] when no slice of that type was registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.shared
            .slices
            .get(&TypeId::of::<T>())
            .and_then(InitializedSlice::downcast_ref::<T>)
            .ok_or(ApiStateError::MissingSlice { slice: type_name::<T>() })
    }

    #[must_use]
    pub fn slice_count(&self) -> usize {
        self.shared.slices.len()
    }
}

#[must_use = "call .build() to obtain the state"]
#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: ApiConfig,
    database: Option<Database>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

impl ApiStateBuilder {
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn db(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// A second slice of the same type replaces the first.
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.insert(slice.id, slice);
        self
    }

    pub fn register_slices(self, slices: impl IntoIterator<Item = InitializedSlice>) -> Self {
        slices.into_iter().fold(self, Self::register_slice)
    }

    /// # Errors
    /// [`ApiStateError::MissingDatabase`] when [`ApiStateBuilder::db`] was never called.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let database = self.database.ok_or(ApiStateError::MissingDatabase {})?;
        Ok(ApiState {
            shared: Arc::new(Shared { config: self.config, database, slices: self.slices }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Unregistered;

    impl FeatureSlice for Unregistered {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[tokio::test]
    async fn state_needs_a_database_and_names_missing_slices() {
        let err = ApiState::builder().build().unwrap_err();
        assert!(matches!(err, ApiStateError::MissingDatabase {}));

        let db = Database::builder().url("mem://").session("hq", "state").init().await.expect("db");
        let state = ApiState::builder().db(db).build().expect("state");
        assert_eq!(state.slice_count(), 0);
        assert_eq!(state.config().server.port, ApiConfig::default().server.port);

        let err = state.try_get_slice::<Unregistered>().unwrap_err();
        assert!(err.to_string().ends_with("Unregistered is not registered"));
    }
}
