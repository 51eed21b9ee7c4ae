use std::borrow::Cow;

#[hq_derive::hq_error]
pub enum RosterError {
    /// A referenced hero or power does not exist.
    #[error("{message}")]
    NotFound { message: Cow<'static, str> },

    /// A value failed validation. `message` is shown to API clients verbatim.
    #[error("{message}")]
    InvalidValue { message: Cow<'static, str> },

    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// The store rejected a read or write. `context` names the action, e.g. `updating the power`.
    #[error("Persistence error{}: {source}", format_context(.context))]
    Persistence { source: surrealdb::Error, context: Option<Cow<'static, str>> },

    #[error("Internal roster error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl RosterError {
    pub(crate) const HERO_NOT_FOUND: &'static str = "Hero not found";
    pub(crate) const POWER_NOT_FOUND: &'static str = "Power not found";

    pub(crate) const fn hero_not_found() -> Self {
        Self::NotFound { message: Cow::Borrowed(Self::HERO_NOT_FOUND) }
    }

    pub(crate) const fn power_not_found() -> Self {
        Self::NotFound { message: Cow::Borrowed(Self::POWER_NOT_FOUND) }
    }

    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidValue { message: message.into() }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
