use once_cell::sync::Lazy;
use regex::Regex;

/// `local@domain.tld`, with no whitespace and exactly one `@`.
static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Reasons a submitted email is refused. The `Display` text is returned to the
/// client verbatim.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    #[error("Email is required")]
    Missing,
    #[error("Invalid email format")]
    InvalidFormat,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// An email address in the minimal `local@domain.tld` shape. Used for
/// recipients as well as the configured sender and reply-to addresses.
///
/// Must be instantiated with `SubscriberEmail::parse`; the value is stored as
/// submitted (no trimming, no case folding).
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(email: String) -> Result<Self, EmailError> {
        if email.trim().is_empty() {
            return Err(EmailError::Missing);
        }
        match EMAIL_SHAPE.is_match(&email) {
            true => Ok(Self(email)),
            false => Err(EmailError::InvalidFormat),
        }
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str { &self.0 }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
