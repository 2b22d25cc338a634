//! Contact and newsletter relays: validate a submission, then mail the operator.

use std::sync::Arc;

use askama::Template;
use brewcache_api_types::{ContactRequest, SubscribeRequest};
use metrics::counter;
use thiserror::Error;
use tracing::info;

use crate::application::sources::{MailError, Mailer, OutboundMail};
use crate::domain::error::DomainError;
use crate::domain::submissions::{ContactSubmission, Subscription};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Mail(#[from] MailError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    Contact,
    Subscribe,
}

impl RelayKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelayKind::Contact => "contact",
            RelayKind::Subscribe => "subscribe",
        }
    }
}

#[derive(Template)]
#[template(
    ext = "html",
    source = r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f9f7f5; border-radius: 10px;">
  <h2 style="color: #6B4226; text-align: center;">🍺 New Contact Message from {{ brand }}</h2>
  <p><strong>Name:</strong> {{ name }}</p>
  <p><strong>Email:</strong> {{ email }}</p>
  <p><strong>Subject:</strong> {{ subject }}</p>
  <p><strong>Message:</strong></p>
  <p style="background-color: #fff; padding: 10px; border-radius: 5px;">{% for line in lines %}{{ line }}{% if !loop.last %}<br>{% endif %}{% endfor %}</p>
  <p style="text-align: center; color: #A27C50;">Cheers! 🥂</p>
</div>"#
)]
struct ContactMailTemplate<'a> {
    brand: &'a str,
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    lines: Vec<&'a str>,
}

#[derive(Template)]
#[template(
    ext = "html",
    source = r#"<h2>New Subscription Request</h2>
<p>A user has requested to subscribe to {{ brand }}.</p>
<p><strong>Email:</strong> {{ email }}</p>
<p>Please review and confirm their subscription.</p>
<br>
<p>Cheers,<br>{{ brand }} Bot</p>"#
)]
struct SubscribeMailTemplate<'a> {
    brand: &'a str,
    email: &'a str,
}

pub struct RelayService {
    mailer: Arc<dyn Mailer>,
    brand: String,
}

impl RelayService {
    pub fn new(mailer: Arc<dyn Mailer>, brand: impl Into<String>) -> Self {
        Self {
            mailer,
            brand: brand.into(),
        }
    }

    pub async fn contact(&self, request: ContactRequest) -> Result<(), RelayError> {
        let submission = ContactSubmission::try_from(request)?;
        let html_body = ContactMailTemplate {
            brand: &self.brand,
            name: &submission.name,
            email: &submission.email,
            subject: &submission.subject,
            lines: submission.message_lines(),
        }
        .render()
        .map_err(|err| MailError::Render(err.to_string()))?;

        let mail = OutboundMail {
            reply_to: submission.email.clone(),
            subject: format!("{} Contact: {}", self.brand, submission.subject),
            html_body,
        };
        self.deliver(RelayKind::Contact, mail).await
    }

    pub async fn subscribe(&self, request: SubscribeRequest) -> Result<(), RelayError> {
        let subscription = Subscription::try_from(request)?;
        let html_body = SubscribeMailTemplate {
            brand: &self.brand,
            email: &subscription.email,
        }
        .render()
        .map_err(|err| MailError::Render(err.to_string()))?;

        let mail = OutboundMail {
            reply_to: subscription.email,
            subject: format!("New Subscription Request - {}", self.brand),
            html_body,
        };
        self.deliver(RelayKind::Subscribe, mail).await
    }

    async fn deliver(&self, kind: RelayKind, mail: OutboundMail) -> Result<(), RelayError> {
        match self.mailer.send(mail).await {
            Ok(()) => {
                counter!("brewcache_mail_sent_total", "kind" => kind.as_str()).increment(1);
                info!(target = "brewcache::relay", kind = kind.as_str(), "relay mail sent");
                Ok(())
            }
            Err(err) => {
                counter!("brewcache_mail_failure_total", "kind" => kind.as_str()).increment(1);
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutboundMail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: OutboundMail) -> Result<(), MailError> {
            self.sent.lock().expect("mailer lock").push(mail);
            Ok(())
        }
    }

    fn contact(message: &str) -> ContactRequest {
        ContactRequest {
            name: Some("Ada <script>".to_string()),
            email: Some("ada@example.com".to_string()),
            subject: Some("Tap list".to_string()),
            message: Some(message.to_string()),
        }
    }

    #[tokio::test]
    async fn contact_mail_is_formatted_and_escaped() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = RelayService::new(mailer.clone(), "Brew Cache");

        service
            .contact(contact("First line\nSecond line"))
            .await
            .expect("contact relayed");

        let sent = mailer.sent.lock().expect("mailer lock");
        assert_eq!(sent.len(), 1);
        let mail = &sent[0];
        assert_eq!(mail.subject, "Brew Cache Contact: Tap list");
        assert_eq!(mail.reply_to, "ada@example.com");
        assert!(mail.html_body.contains("First line<br>Second line"));
        assert!(mail.html_body.contains("Ada &lt;script&gt;"));
        assert!(!mail.html_body.contains("<script>"));
    }

    #[tokio::test]
    async fn invalid_contact_never_reaches_mailer() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = RelayService::new(mailer.clone(), "Brew Cache");

        let mut request = contact("hi");
        request.subject = None;
        let err = service.contact(request).await.expect_err("missing subject");

        assert!(matches!(err, RelayError::Validation(_)));
        assert!(mailer.sent.lock().expect("mailer lock").is_empty());
    }

    #[tokio::test]
    async fn subscription_mail_names_the_subscriber() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = RelayService::new(mailer.clone(), "Brew Cache");

        service
            .subscribe(SubscribeRequest {
                email: Some("hops@example.com".to_string()),
            })
            .await
            .expect("subscription relayed");

        let sent = mailer.sent.lock().expect("mailer lock");
        assert_eq!(sent[0].subject, "New Subscription Request - Brew Cache");
        assert_eq!(sent[0].reply_to, "hops@example.com");
        assert!(sent[0].html_body.contains("hops@example.com"));
    }

    #[tokio::test]
    async fn subscription_without_at_sign_is_rejected() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = RelayService::new(mailer.clone(), "Brew Cache");

        let err = service
            .subscribe(SubscribeRequest {
                email: Some("hops.example.com".to_string()),
            })
            .await
            .expect_err("invalid email");

        assert!(matches!(err, RelayError::Validation(_)));
        assert!(mailer.sent.lock().expect("mailer lock").is_empty());
    }
}
