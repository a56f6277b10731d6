//! Message bodies.

/// A plain-text email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Subject line of the confirmation code email.
pub const CONFIRMATION_SUBJECT: &str = "yamdb registration";

/// Build the email carrying a sign-up confirmation code.
pub fn confirmation_email(to: &str, code: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: CONFIRMATION_SUBJECT.to_string(),
        body: format!(
            "Your confirmation code: {code}\n\n\
             Exchange it for an access token at POST /api/v1/auth/token \
             together with this email address."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_email_carries_code() {
        let email = confirmation_email("reader@example.com", "k9x2-abc123");
        assert_eq!(email.to, "reader@example.com");
        assert_eq!(email.subject, CONFIRMATION_SUBJECT);
        assert!(email.body.contains("k9x2-abc123"));
    }
}
