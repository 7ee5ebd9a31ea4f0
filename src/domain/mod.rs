mod new_subscriber;
mod subscriber_email;
// allow external `use` statements to skip `new_subscriber` etc
pub use new_subscriber::NewSubscriber;
pub use subscriber_email::EmailError;
pub use subscriber_email::SubscriberEmail;
