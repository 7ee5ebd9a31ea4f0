use std::fmt::Debug;

use crate::audience::upsert_contact;
use crate::audience::Audience;
use crate::domain::NewSubscriber;
use crate::email_client::EmailClient;
use crate::email_client::EmailClientError;
use crate::templates::welcome_email;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum WelcomeEmailError {
    #[error("Failed to render welcome email")]
    Template(#[from] tera::Error),
    #[error("Failed to send welcome email")]
    Send(#[source] EmailClientError),
}

impl Debug for WelcomeEmailError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Add `subscriber` to the audience, then send them the welcome email.
///
/// One upsert attempt and one send attempt, in that order, no retries. The
/// upsert is best-effort (failures are logged here and dropped); a failed
/// send is returned, and it is up to the caller whether that fails the
/// request.
#[tracing::instrument(
    name = "Sending welcome email",
    skip_all,
    fields(subscriber_email = %subscriber.email)
)]
pub async fn send_welcome_email(
    email_client: &EmailClient,
    audience: &Audience,
    subscriber: &NewSubscriber,
) -> Result<(), WelcomeEmailError> {
    if let Err(e) = upsert_contact(email_client, audience, subscriber).await {
        tracing::warn!(
            error.cause_chain = ?e,
            error.message = %e,
            "Could not add contact to audience, sending welcome email anyway"
        );
    }

    let content = welcome_email(subscriber)?;
    let id = email_client
        .send_email(&subscriber.email, &content.subject, &content.html, &content.text)
        .await
        .map_err(WelcomeEmailError::Send)?;
    tracing::info!(email_id = ?id, "Welcome email sent");
    Ok(())
}
