//! Axum building blocks shared by every feature router.

mod error;
mod health;
mod router;
mod state;

pub use error::{ApiError, ErrorBody};
pub use router::system_router;
pub use state::{ApiState, ApiStateBuilder, ApiStateError};
