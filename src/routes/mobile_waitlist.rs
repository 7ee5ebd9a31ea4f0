use actix_web::web;
use actix_web::HttpResponse;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::parse_email_field;
use super::parse_json;
use super::SignupError;
use crate::audience::upsert_contact;
use crate::audience::Audience;
use crate::domain::NewSubscriber;
use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::email_client::EmailClientError;
use crate::templates::waitlist_email;
use crate::utils::error_chain_fmt;

#[derive(Deserialize)]
struct WaitlistRequest {
    #[serde(default)]
    email: Option<Value>,
}

#[derive(Serialize)]
struct WaitlistResponse<'a> {
    message: &'a str,
    email: &'a str,
}

#[derive(thiserror::Error)]
enum WaitlistEmailError {
    #[error("Failed to render waitlist email")]
    Template(#[from] tera::Error),
    #[error("Failed to send waitlist email")]
    Send(#[from] EmailClientError),
}

impl std::fmt::Debug for WaitlistEmailError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[tracing::instrument(name = "Sending waitlist confirmation", skip_all)]
async fn send_waitlist_email(
    email_client: &EmailClient,
    recipient: &SubscriberEmail,
) -> Result<(), WaitlistEmailError> {
    let content = waitlist_email(recipient)?;
    email_client
        .send_email(recipient, &content.subject, &content.html, &content.text)
        .await?;
    Ok(())
}

/// `POST /api/mobile-waitlist`
///
/// Both side effects (audience upsert, confirmation email) are best-effort:
/// once the email is valid the client always gets a 200.
///
/// # Request example
///
/// ```sh
///     curl --json '{"email":"john@foo.com"}' http://127.0.0.1:8000/api/mobile-waitlist
/// ```
#[tracing::instrument(
    name = "Joining mobile waitlist",
    skip_all,
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn join_mobile_waitlist(
    body: web::Bytes,
    email_client: web::Data<EmailClient>,
    audience: web::Data<Audience>,
) -> Result<HttpResponse, SignupError> {
    let request: WaitlistRequest = parse_json(&body, "Failed to join waitlist")?;
    let email = parse_email_field(request.email)?;
    tracing::Span::current().record("subscriber_email", tracing::field::display(&email));

    let subscriber = NewSubscriber::new(email);

    if let Err(e) = upsert_contact(&email_client, &audience, &subscriber).await {
        tracing::warn!(
            error.cause_chain = ?e,
            error.message = %e,
            "Could not add waitlist contact to audience"
        );
    }

    if let Err(e) = send_waitlist_email(&email_client, &subscriber.email).await {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Could not send waitlist confirmation"
        );
    }

    Ok(HttpResponse::Ok().json(WaitlistResponse {
        message: "Successfully added to waitlist!",
        email: subscriber.email.as_ref(),
    }))
}
