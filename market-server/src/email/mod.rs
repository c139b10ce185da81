//! Notification emails over AWS SES
//!
//! All sends are fire-and-forget at call sites: a failed notification is
//! logged but never fails the request that triggered it.

use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// SES-backed mailer
#[derive(Clone)]
pub struct Mailer {
    ses: SesClient,
    from: String,
}

impl Mailer {
    pub fn new(ses: SesClient, from: String) -> Self {
        Self { ses, from }
    }

    /// Notify a user that an admin approved their account
    pub async fn send_approval_notification(
        &self,
        to: &str,
        username: &str,
    ) -> Result<(), BoxError> {
        let subject = Content::builder().data("Your account has been approved").build()?;

        let body_text = format!(
            "Hi {username},\n\n\
             Your account has been approved. You can now log in and start shopping.\n\n\
             Coral Market"
        );

        let body = Body::builder()
            .text(Content::builder().data(body_text).build()?)
            .build();

        let message = Message::builder().subject(subject).body(body).build();

        self.ses
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await?;

        tracing::info!(to = to, "Approval notification sent");
        Ok(())
    }
}
