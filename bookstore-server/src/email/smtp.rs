use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use super::{Notifier, NotifyError, OrderConfirmationEmail};
use crate::config::EmailConfig;

const SENDER_NAME: &str = "Book Store";

/// SMTP delivery (STARTTLS relay with username/password auth)
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Returns `None` when credentials are missing so the caller can fall back
    /// to [`super::DisabledNotifier`].
    pub fn from_config(config: &EmailConfig) -> Result<Option<Self>, NotifyError> {
        let Some((user, password)) = config.credentials() else {
            return Ok(None);
        };

        let from_addr = config.from.as_deref().unwrap_or(user);
        let from = Mailbox::new(
            Some(SENDER_NAME.to_string()),
            from_addr
                .parse()
                .map_err(|e| NotifyError::Address(format!("{from_addr}: {e}")))?,
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();

        Ok(Some(Self { transport, from }))
    }

    fn build_message(&self, email: &OrderConfirmationEmail) -> Result<Message, NotifyError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| NotifyError::Address(format!("{}: {e}", email.to)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject())
            .header(ContentType::TEXT_HTML)
            .body(email.html_body())
            .map_err(|e| NotifyError::Message(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_order_confirmation(
        &self,
        email: &OrderConfirmationEmail,
    ) -> Result<(), NotifyError> {
        let message = self.build_message(email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::tests::sample_email;

    fn config(user: Option<&str>, password: Option<&str>) -> EmailConfig {
        EmailConfig {
            host: "smtp.gmail.com".into(),
            port: 587,
            user: user.map(Into::into),
            password: password.map(Into::into),
            from: None,
        }
    }

    #[test]
    fn test_missing_credentials_disables() {
        assert!(SmtpNotifier::from_config(&config(None, None)).unwrap().is_none());
        assert!(
            SmtpNotifier::from_config(&config(Some("shop@example.com"), None))
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_build_message() {
        let notifier = SmtpNotifier::from_config(&config(Some("shop@example.com"), Some("pw")))
            .unwrap()
            .unwrap();
        let message = notifier.build_message(&sample_email()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Order Confirmation - ORD17000000000001234"));
        assert!(raw.contains("To: asha@example.com"));
        assert!(raw.contains("text/html"));
    }

    #[tokio::test]
    async fn test_invalid_recipient() {
        let notifier = SmtpNotifier::from_config(&config(Some("shop@example.com"), Some("pw")))
            .unwrap()
            .unwrap();
        let mut email = sample_email();
        email.to = "not an address".into();
        assert!(matches!(
            notifier.build_message(&email),
            Err(NotifyError::Address(_))
        ));
    }
}
