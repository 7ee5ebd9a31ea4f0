use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::audience::Audience;
use crate::domain::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::email_client::Sender;

/// Global configuration, loaded from `configuration/*.yaml` and the
/// environment. See `get_configuration`.
#[derive(Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
}

/// Server configuration
#[derive(Clone, Deserialize)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

/// Email provider configuration. Everything the signup handlers know about
/// the provider comes from here.
#[derive(Clone, Deserialize)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub api_key: Secret<String>,
    pub sender_email: String,
    pub sender_name: String,
    pub reply_to: String,

    /// Contacts are only added to an audience when this is set.
    #[serde(default)]
    pub audience_id: Option<String>,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<Sender, String> {
        let email = SubscriberEmail::parse(self.sender_email.clone()).map_err(|e| e.to_string())?;
        Ok(Sender::new(self.sender_name.clone(), email))
    }

    pub fn reply_to(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(self.reply_to.clone()).map_err(|e| e.to_string())
    }

    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_milliseconds) }

    pub fn audience(&self) -> Audience { Audience::new(self.audience_id.clone()) }

    /// Fails if the sender or reply-to addresses are malformed.
    pub fn client(&self) -> Result<EmailClient, anyhow::Error> {
        let sender = self
            .sender()
            .map_err(|e| anyhow::anyhow!("invalid sender_email: {e}"))?;
        let reply_to = self
            .reply_to()
            .map_err(|e| anyhow::anyhow!("invalid reply_to: {e}"))?;
        Ok(EmailClient::new(
            self.base_url.clone(),
            sender,
            reply_to,
            self.api_key.clone(),
            self.timeout(),
        )?)
    }
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("Invalid environment: {e}")),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`, then
/// apply environment overrides.
///
/// Precedence, lowest first:
///
/// 1. `base.yaml`
/// 2. `{APP_ENVIRONMENT}.yaml` (`local` by default)
/// 3. `APP_`-prefixed env vars, e.g. `APP_EMAIL_CLIENT__AUDIENCE_ID=aud_123`
/// 4. the provider's own env vars, `RESEND_API_KEY` and `RESEND_AUDIENCE_ID`
///
/// Missing required fields fail here, before the server starts.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .map_err(|e| ConfigError::Message(format!("could not get current dir: {e}")))?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(ConfigError::Message)?;

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are always strings; numeric fields rely on `serde-aux`
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("email_client.api_key", env::var("RESEND_API_KEY").ok())?
        .set_override_option(
            "email_client.audience_id",
            env::var("RESEND_AUDIENCE_ID").ok(),
        )?
        .build()?;

    settings.try_deserialize::<Settings>()
}
