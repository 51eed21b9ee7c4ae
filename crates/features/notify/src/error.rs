use std::borrow::Cow;

#[hq_derive::hq_error]
pub enum NotifyError {
    /// Bad caller input, e.g. a missing field or an unparsable recipient.
    #[error("{message}")]
    InvalidValue { message: Cow<'static, str> },

    #[error("Message error{}: {source}", format_context(.context))]
    Message { source: lettre::error::Error, context: Option<Cow<'static, str>> },

    /// A configured address (the sender) is not a valid mailbox.
    #[error("Address error{}: {source}", format_context(.context))]
    Address { source: lettre::address::AddressError, context: Option<Cow<'static, str>> },

    #[error("Delivery error{}: {source}", format_context(.context))]
    Delivery { source: lettre::transport::smtp::Error, context: Option<Cow<'static, str>> },

    #[error("{source}")]
    Roster { source: hq_roster::RosterError, context: Option<Cow<'static, str>> },

    #[error("Internal notify error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl NotifyError {
    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidValue { message: message.into() }
    }

    pub(crate) fn required(field: &str) -> Self {
        Self::invalid(format!("{field} is required"))
    }
}
