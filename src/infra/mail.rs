//! SMTP relay adapter for operator notifications.

use async_trait::async_trait;
use lettre::message::{Mailbox, Message, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{info, warn};

use crate::application::sources::{MailError, Mailer, OutboundMail};
use crate::config::MailSettings;

use super::error::InfraError;

/// Sends mail from the configured account to itself, with `Reply-To` set
/// to the submitter.
#[derive(Clone)]
pub struct SmtpMailer {
    relay: Option<Relay>,
}

#[derive(Clone)]
struct Relay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    account: Mailbox,
}

impl SmtpMailer {
    /// Build the mailer. Missing credentials are not an error here; every
    /// send fails with [`MailError::NotConfigured`] instead.
    pub fn new(settings: &MailSettings) -> Result<Self, InfraError> {
        let (Some(address), Some(password)) = (&settings.address, &settings.app_password) else {
            warn!(
                target = "brewcache::mail",
                "mail credentials not configured; relay requests will fail"
            );
            return Ok(Self { relay: None });
        };

        let account = address.parse::<Mailbox>().map_err(|err| {
            InfraError::configuration(format!("invalid mail.address `{address}`: {err}"))
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
            .map_err(|err| InfraError::mail(format!("failed to configure SMTP relay: {err}")))?
            .port(settings.smtp_port)
            .credentials(Credentials::new(address.clone(), password.clone()))
            .build();

        Ok(Self {
            relay: Some(Relay { transport, account }),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.relay.is_some()
    }
}

fn build_message(account: &Mailbox, mail: OutboundMail) -> Result<Message, MailError> {
    let reply_to = mail
        .reply_to
        .parse::<Mailbox>()
        .map_err(|err| MailError::InvalidAddress {
            address: mail.reply_to.clone(),
            reason: err.to_string(),
        })?;

    Message::builder()
        .from(account.clone())
        .to(account.clone())
        .reply_to(reply_to)
        .subject(mail.subject)
        .header(header::ContentType::TEXT_HTML)
        .body(mail.html_body)
        .map_err(|err| MailError::Build(err.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutboundMail) -> Result<(), MailError> {
        let relay = self.relay.as_ref().ok_or(MailError::NotConfigured)?;
        let message = build_message(&relay.account, mail)?;

        relay
            .transport
            .send(message)
            .await
            .map_err(|err| MailError::Transport(err.to_string()))?;
        info!(target = "brewcache::mail", "mail accepted by relay");
        Ok(())
    }
}
