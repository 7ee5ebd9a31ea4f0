use crate::domain::NewSubscriber;
use crate::email_client::ContactOutcome;
use crate::email_client::EmailClient;
use crate::email_client::EmailClientError;
use crate::email_client::NewContact;

/// The marketing audience new contacts are added to. Without an id, contact
/// upserts are skipped.
#[derive(Clone, Debug, Default)]
pub struct Audience(Option<String>);

impl Audience {
    /// Blank ids count as unset.
    pub fn new(id: Option<String>) -> Self { Self(id.filter(|id| !id.trim().is_empty())) }

    pub fn id(&self) -> Option<&str> { self.0.as_deref() }
}

#[derive(Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    AlreadyExists,
    /// No audience configured
    Skipped,
}

/// Ensure `subscriber` exists in the configured audience, as a subscribed
/// contact.
///
/// Callers treat this step as best-effort: an `Err` is theirs to log and
/// ignore, it must never fail a signup.
#[tracing::instrument(
    name = "Adding contact to audience",
    skip_all,
    fields(subscriber_email = %subscriber.email)
)]
pub async fn upsert_contact(
    email_client: &EmailClient,
    audience: &Audience,
    subscriber: &NewSubscriber,
) -> Result<UpsertOutcome, EmailClientError> {
    let Some(audience_id) = audience.id() else {
        tracing::warn!("No audience id configured, skipping contact upsert");
        return Ok(UpsertOutcome::Skipped);
    };

    let contact = NewContact {
        email: subscriber.email.as_ref(),
        first_name: subscriber.first_name.as_deref(),
        last_name: subscriber.last_name.as_deref(),
        unsubscribed: false,
    };

    match email_client.create_contact(audience_id, &contact).await? {
        ContactOutcome::Created { id } => {
            tracing::info!(contact_id = ?id, "Contact added to audience");
            Ok(UpsertOutcome::Created)
        }
        ContactOutcome::AlreadyExists => {
            tracing::info!("Contact already in audience");
            Ok(UpsertOutcome::AlreadyExists)
        }
    }
}
