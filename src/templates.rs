use tera::Context;
use tera::Tera;

use crate::domain::NewSubscriber;
use crate::domain::SubscriberEmail;

const DOCS_URL: &str = "https://docs.swarms.world";
const PLATFORM_URL: &str = "https://swarms.world/platform/account";
const COMMUNITY_URL: &str = "https://discord.gg/swarms";

pub const WELCOME_SUBJECT: &str = "Welcome to Swarms! Your $5 credit is waiting";
pub const WAITLIST_SUBJECT: &str = "You're on the Swarms mobile waitlist";

/// A rendered email, ready for `EmailClient::send_email`.
#[derive(Debug)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// User-supplied values are html-escaped in the html part only.
pub fn welcome_email(subscriber: &NewSubscriber) -> Result<EmailContent, tera::Error> {
    let mut context = Context::new();
    context.insert("name", subscriber.greeting_name());
    context.insert("docs_url", DOCS_URL);
    context.insert("platform_url", PLATFORM_URL);
    context.insert("community_url", COMMUNITY_URL);

    Ok(EmailContent {
        subject: WELCOME_SUBJECT.to_string(),
        html: Tera::one_off(include_str!("../templates/welcome.html"), &context, true)?,
        text: Tera::one_off(include_str!("../templates/welcome.txt"), &context, false)?,
    })
}

pub fn waitlist_email(email: &SubscriberEmail) -> Result<EmailContent, tera::Error> {
    let mut context = Context::new();
    context.insert("email", email.as_ref());
    context.insert("docs_url", DOCS_URL);

    Ok(EmailContent {
        subject: WAITLIST_SUBJECT.to_string(),
        html: Tera::one_off(include_str!("../templates/waitlist.html"), &context, true)?,
        text: Tera::one_off(include_str!("../templates/waitlist.txt"), &context, false)?,
    })
}
