//! # Notify
//!
//! Email notifications about heroes and powers. Messages are rendered from
//! [`templates`] and handed to a [`Mailer`] built from the `mail` configuration section:
//! an SMTP relay, the log (for local development) or an in-memory outbox for tests.

mod error;
#[cfg(feature = "server")]
mod handlers;
mod mailer;
pub mod templates;

pub use crate::error::{NotifyError, NotifyErrorExt};
#[cfg(feature = "server")]
pub use crate::handlers::{
    MessageResponse, NotifyPowerUpdateRequest, SendTestEmailRequest, WelcomeHeroRequest,
};
pub use crate::mailer::{Mailer, OutgoingMail};

use hq_kernel::domain::config::MailConfig;
use hq_kernel::domain::registry::InitializedSlice;

/// Notify feature state
#[hq_derive::hq_slice]
pub struct Notify {
    pub mailer: Mailer,
}

/// Builds the notify slice from the `mail` configuration section.
///
/// # Errors
/// Any [`NotifyError`] raised while preparing the transport.
pub fn init(config: &MailConfig) -> Result<InitializedSlice, NotifyError> {
    init_with(Mailer::from_config(config)?)
}

/// Builds the notify slice around an existing mailer, e.g. [`Mailer::capturing`].
///
/// # Errors
/// Currently infallible; the signature matches [`init`].
pub fn init_with(mailer: Mailer) -> Result<InitializedSlice, NotifyError> {
    tracing::info!("Notify slice initialized");
    Ok(InitializedSlice::new(Notify::new(NotifyInner { mailer })))
}

#[cfg(feature = "server")]
pub fn router() -> utoipa_axum::router::OpenApiRouter<hq_kernel::server::ApiState> {
    use utoipa_axum::routes;

    utoipa_axum::router::OpenApiRouter::new()
        .routes(routes!(handlers::send_test_email))
        .routes(routes!(handlers::notify_power_update))
        .routes(routes!(handlers::welcome_hero))
}
