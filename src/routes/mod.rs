mod health_check;
mod mobile_waitlist;
mod newsletter;

pub use audience_test::*;
pub use health_check::*;
pub use mobile_waitlist::*;
pub use newsletter::*;

use std::fmt::Debug;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

use crate::domain::EmailError;
use crate::domain::NewSubscriber;
use crate::domain::SubscriberEmail;
use crate::utils::error_chain_fmt;

/// JSON body shared by the newsletter and audience test endpoints. Any valid
/// JSON object is accepted at this stage: a missing or mistyped email is a
/// validation failure (400), never a parse failure (500).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    email: Option<Value>,
    #[serde(default, deserialize_with = "string_or_none")]
    first_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    last_name: Option<String>,
}

/// Names only personalise the welcome email; anything but a string is dropped.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// `email` as it arrived in the body: absent or `null` is missing, any other
/// non-string can never have the right shape.
fn parse_email_field(email: Option<Value>) -> Result<SubscriberEmail, EmailError> {
    match email {
        None | Some(Value::Null) => Err(EmailError::Missing),
        Some(Value::String(email)) => SubscriberEmail::parse(email),
        Some(_) => Err(EmailError::InvalidFormat),
    }
}

impl TryFrom<SignupRequest> for NewSubscriber {
    type Error = EmailError;
    fn try_from(value: SignupRequest) -> Result<Self, Self::Error> {
        let email = parse_email_field(value.email)?;
        Ok(NewSubscriber {
            email,
            first_name: value.first_name,
            last_name: value.last_name,
        })
    }
}

/// Echo of an accepted signup, as returned to the client.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactEcho<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
}

impl<'a> From<&'a NewSubscriber> for ContactEcho<'a> {
    fn from(value: &'a NewSubscriber) -> Self {
        Self {
            email: value.email.as_ref(),
            first_name: value.first_name.as_deref(),
            last_name: value.last_name.as_deref(),
        }
    }
}

#[derive(thiserror::Error)]
pub enum SignupError {
    #[error(transparent)]
    Validation(#[from] EmailError),
    /// `context` is the client-facing `error`; the source chain becomes
    /// `details`.
    #[error("{context}")]
    Unexpected {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl SignupError {
    pub fn unexpected(
        context: &'static str,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Unexpected {
            context,
            source: source.into(),
        }
    }
}

impl Debug for SignupError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ResponseError for SignupError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        let body = match self {
            Self::Validation(e) => ErrorBody {
                error: e.to_string(),
                details: None,
            },
            Self::Unexpected { context, source } => {
                let details = format!("{source:#}");
                ErrorBody {
                    error: context.to_string(),
                    details: Some(match details.trim().is_empty() {
                        true => "Unknown error".to_string(),
                        false => details,
                    }),
                }
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Bodies are parsed by hand rather than with `web::Json`, so that malformed
/// JSON is reported with the endpoint's own error message.
fn parse_json<T: DeserializeOwned>(
    body: &[u8],
    context: &'static str,
) -> Result<T, SignupError> {
    serde_json::from_slice(body).map_err(|e| {
        SignupError::unexpected(
            context,
            anyhow::Error::new(e).context("Request body is not valid JSON"),
        )
    })
}
