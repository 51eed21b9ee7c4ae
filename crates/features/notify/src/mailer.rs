use crate::error::{NotifyError, NotifyErrorExt};
use crate::templates::Email;
use hq_kernel::domain::config::{MailConfig, MailSecurity, MailTransport};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// A message accepted by the capture transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Log,
    Capture(Mutex<Vec<OutgoingMail>>),
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Smtp(_) => f.write_str("Smtp"),
            Self::Log => f.write_str("Log"),
            Self::Capture(outbox) => f.debug_tuple("Capture").field(&outbox.lock().len()).finish(),
        }
    }
}

/// Sends rendered emails through the configured transport.
///
/// Delivery is awaited inline and attempted once.
#[derive(Debug, Clone)]
pub struct Mailer {
    sender: Mailbox,
    transport: Arc<Transport>,
}

impl Mailer {
    /// # Errors
    /// [`NotifyError::Address`] for an invalid `mail.sender`, [`NotifyError::Delivery`] when
    /// the TLS relay cannot be prepared.
    pub fn from_config(config: &MailConfig) -> Result<Self, NotifyError> {
        let sender = config.sender.parse::<Mailbox>().context("parsing mail.sender")?;

        let transport = match config.transport {
            MailTransport::Log => Transport::Log,
            MailTransport::Smtp => Transport::Smtp(smtp_transport(config)?),
        };
        info!(transport = ?transport, host = %config.host, port = config.port, "Mailer configured");

        Ok(Self { sender, transport: Arc::new(transport) })
    }

    /// A mailer that keeps every message in memory; see [`Mailer::captured`].
    ///
    /// # Errors
    /// [`NotifyError::Address`] if the default sender does not parse.
    pub fn capturing() -> Result<Self, NotifyError> {
        let sender = MailConfig::default().sender.parse::<Mailbox>().context("parsing mail.sender")?;
        Ok(Self { sender, transport: Arc::new(Transport::Capture(Mutex::new(Vec::new()))) })
    }

    /// Messages accepted so far by a capturing mailer. Always empty for other transports.
    #[must_use]
    pub fn captured(&self) -> Vec<OutgoingMail> {
        match self.transport.as_ref() {
            Transport::Capture(outbox) => outbox.lock().clone(),
            _ => Vec::new(),
        }
    }

    /// Sends a rendered template.
    ///
    /// # Errors
    /// See [`Mailer::send_templated_email`].
    pub async fn send(&self, recipient: &str, email: &Email) -> Result<(), NotifyError> {
        self.send_templated_email(recipient, &email.subject, &email.text, &email.html).await
    }

    /// Builds a `multipart/alternative` message and hands it to the transport.
    ///
    /// # Errors
    /// [`NotifyError::InvalidValue`] for an unparsable recipient, [`NotifyError::Message`]
    /// when the message cannot be built, [`NotifyError::Delivery`] when the relay refuses it.
    #[instrument(skip(self, text_body, html_body))]
    pub async fn send_templated_email(
        &self,
        recipient: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), NotifyError> {
        let to = recipient
            .parse::<Mailbox>()
            .map_err(|_| NotifyError::invalid(format!("Invalid email address: {recipient}")))?;

        let message = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text_body.to_owned(), html_body.to_owned()))
            .context("building the message")?;

        match self.transport.as_ref() {
            Transport::Smtp(smtp) => {
                smtp.send(message).await.context("delivering the message")?;
                info!(recipient, subject, "Email delivered");
            },
            Transport::Log => {
                info!(recipient, subject, "Email not delivered, log transport is active");
                debug!(message = %String::from_utf8_lossy(&message.formatted()), "Email contents");
            },
            Transport::Capture(outbox) => outbox.lock().push(OutgoingMail {
                to: recipient.to_owned(),
                subject: subject.to_owned(),
                text: text_body.to_owned(),
                html: html_body.to_owned(),
            }),
        }
        Ok(())
    }
}

fn smtp_transport(config: &MailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
    let builder = match config.security {
        MailSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        MailSecurity::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .context("preparing the STARTTLS relay")?,
        MailSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .context("preparing the TLS relay")?,
    };

    let builder =
        builder.port(config.port).timeout(Some(Duration::from_secs(config.timeout_secs)));

    let builder = match (&config.username, &config.password) {
        (Some(username), Some(password)) => {
            builder.credentials(Credentials::new(username.clone(), password.clone()))
        },
        _ => builder,
    };

    Ok(builder.build())
}
