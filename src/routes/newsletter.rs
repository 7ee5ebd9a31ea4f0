use actix_web::web;
use actix_web::HttpResponse;
use serde::Serialize;

use super::parse_json;
use super::ContactEcho;
use super::SignupError;
use super::SignupRequest;
use crate::audience::Audience;
use crate::domain::NewSubscriber;
use crate::email_client::EmailClient;
use crate::welcome::send_welcome_email;

#[derive(Serialize)]
struct NewsletterResponse<'a> {
    message: &'a str,
    contact: ContactEcho<'a>,
}

/// `POST /api/newsletter`
///
/// Validates the signup and hands it to `send_welcome_email`. A failed
/// welcome email is logged but still answered with 200, so the user is never
/// shown an error for it.
///
/// # Request example
///
/// ```sh
///     curl --json '{"email":"john@foo.com","firstName":"John"}' http://127.0.0.1:8000/api/newsletter
/// ```
#[tracing::instrument(
    name = "Subscribing to newsletter",
    skip_all,
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn subscribe_to_newsletter(
    body: web::Bytes,
    email_client: web::Data<EmailClient>,
    audience: web::Data<Audience>,
) -> Result<HttpResponse, SignupError> {
    let request: SignupRequest = parse_json(&body, "Failed to subscribe to newsletter")?;
    let subscriber: NewSubscriber = request.try_into()?;
    tracing::Span::current().record(
        "subscriber_email",
        tracing::field::display(&subscriber.email),
    );

    if let Err(e) = send_welcome_email(&email_client, &audience, &subscriber).await {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Subscribed without a welcome email"
        );
    }

    Ok(HttpResponse::Ok().json(NewsletterResponse {
        message: "Successfully subscribed to the newsletter! Check your inbox for your $5 welcome credit.",
        contact: ContactEcho::from(&subscriber),
    }))
}
