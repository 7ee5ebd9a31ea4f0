use super::SubscriberEmail;

/// A validated signup. Names are optional and kept as submitted.
#[derive(Debug)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl NewSubscriber {
    pub fn new(email: SubscriberEmail) -> Self {
        Self {
            email,
            first_name: None,
            last_name: None,
        }
    }

    /// Name used in greetings; falls back to "there" ("Hi there").
    pub fn greeting_name(&self) -> &str {
        self.first_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("there")
    }
}
