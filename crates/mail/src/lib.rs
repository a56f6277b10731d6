//! Outgoing email for yamdb.
//!
//! The API only ever sends one kind of message, the sign-up confirmation
//! code, but it does so through the [`Mailer`] trait so the transport can be
//! swapped:
//!
//! - [`SmtpMailer`] -- real delivery through `lettre`.
//! - [`LogMailer`] -- writes the message to the log; used when SMTP is not
//!   configured.
//! - [`MemoryMailer`] -- keeps messages in memory for tests.

pub mod message;
pub mod outbox;
pub mod smtp;

pub use message::{confirmation_email, OutgoingEmail};
pub use outbox::{LogMailer, MemoryMailer};
pub use smtp::{SmtpConfig, SmtpMailer};

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

/// Something that can deliver an [`OutgoingEmail`].
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}
