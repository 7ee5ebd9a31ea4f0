use std::fmt::Debug;
use std::fmt::Display;
use std::time::Duration;

use reqwest::Client;
use reqwest::Response;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::SubscriberEmail;
use crate::utils::error_chain_fmt;

/// The `From` header of every outgoing email, rendered as `Name <email>`.
#[derive(Clone, Debug)]
pub struct Sender {
    name: String,
    email: SubscriberEmail,
}

impl Sender {
    pub fn new(
        name: String,
        email: SubscriberEmail,
    ) -> Self {
        Self { name, email }
    }
}

impl Display for Sender {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self.name.trim().is_empty() {
            true => write!(f, "{}", self.email),
            false => write!(f, "{} <{}>", self.name, self.email),
        }
    }
}

/// Client for the transactional email / audience provider (Resend-style REST
/// API). All requests are authenticated with a bearer token.
///
/// `reqwest::Client` keeps a connection pool internally, so a single
/// `EmailClient` is built at startup and shared by all workers.
#[derive(Debug)]
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: Sender,
    reply_to: SubscriberEmail,
    api_key: Secret<String>,
}

/// Body of "create contact". The provider owns the contact from here on.
#[derive(Debug, Serialize)]
pub struct NewContact<'a> {
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'a str>,
    pub unsubscribed: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ContactOutcome {
    Created { id: Option<String> },
    /// The provider already knows this contact; not an error.
    AlreadyExists,
}

#[derive(thiserror::Error)]
pub enum EmailClientError {
    #[error("Could not reach the email provider")]
    Transport(#[from] reqwest::Error),
    #[error("Email provider rejected the request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
}

impl Debug for EmailClientError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl EmailClientError {
    /// The provider signals a duplicate contact either with 409 or with an
    /// error message saying so.
    fn is_already_exists(&self) -> bool {
        match self {
            Self::Rejected { status, message } => {
                *status == StatusCode::CONFLICT
                    || message.to_lowercase().contains("already exists")
            }
            Self::Transport(_) => false,
        }
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    reply_to: &'a str,
}

/// Success body of both "send email" and "create contact".
#[derive(Deserialize)]
struct CreatedResponse {
    id: String,
}

/// Error body, e.g. `{"statusCode": 422, "name": "validation_error",
/// "message": "..."}`. Only `message` is relied upon.
#[derive(Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: Sender,
        reply_to: SubscriberEmail,
        api_key: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            sender,
            reply_to,
            api_key,
        })
    }

    /// Returns the provider's message id, when it sends one back.
    #[tracing::instrument(name = "Sending email", skip_all, fields(recipient = %recipient))]
    pub async fn send_email(
        &self,
        recipient: &SubscriberEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<Option<String>, EmailClientError> {
        let url = format!("{}/emails", self.base_url);
        let from = self.sender.to_string();
        let body = SendEmailRequest {
            from: &from,
            to: vec![recipient.as_ref()],
            subject,
            html: html_content,
            text: text_content,
            reply_to: self.reply_to.as_ref(),
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;
        let response = reject_unless_success(response).await?;
        Ok(created_id(response).await)
    }

    /// Add a contact to an audience. A duplicate is reported as
    /// `ContactOutcome::AlreadyExists`, never as an error.
    #[tracing::instrument(
        name = "Creating audience contact",
        skip(self, contact),
        fields(contact_email = %contact.email)
    )]
    pub async fn create_contact(
        &self,
        audience_id: &str,
        contact: &NewContact<'_>,
    ) -> Result<ContactOutcome, EmailClientError> {
        let url = format!("{}/audiences/{audience_id}/contacts", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(contact)
            .send()
            .await?;

        match reject_unless_success(response).await {
            Ok(response) => Ok(ContactOutcome::Created {
                id: created_id(response).await,
            }),
            Err(e) if e.is_already_exists() => Ok(ContactOutcome::AlreadyExists),
            Err(e) => Err(e),
        }
    }

    /// Raw provider listing, passed through by the diagnostic endpoint.
    #[tracing::instrument(name = "Listing audience contacts", skip(self))]
    pub async fn list_contacts(
        &self,
        audience_id: &str,
    ) -> Result<serde_json::Value, EmailClientError> {
        let url = format!("{}/audiences/{audience_id}/contacts", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await?;
        Ok(reject_unless_success(response).await?.json().await?)
    }
}

async fn reject_unless_success(response: Response) -> Result<Response, EmailClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let raw = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ProviderErrorBody>(&raw)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or(raw);
    Err(EmailClientError::Rejected { status, message })
}

// success bodies without an id are still successes
async fn created_id(response: Response) -> Option<String> {
    response
        .json::<CreatedResponse>()
        .await
        .ok()
        .map(|created| created.id)
}

/// Client pointed at a mock provider, with test credentials and a short timeout.
#[cfg(test)]
pub(crate) fn test_email_client(base_url: String) -> EmailClient {
    let parse = |email: &str| SubscriberEmail::parse(email.to_string()).unwrap();
    EmailClient::new(
        base_url,
        Sender::new("Swarms".to_string(), parse("hello@swarms.world")),
        parse("kye@swarms.world"),
        Secret::new("re_test".to_string()),
        Duration::from_millis(200),
    )
    .unwrap()
}
