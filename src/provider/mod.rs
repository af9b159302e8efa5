//! Newsletter providers the relay can forward subscriptions to.
//!
//! Each provider decides how the inbound body is shaped into its own payload and how the
//! API key is presented. Everything else (validation, the HTTP call, translating the reply)
//! is shared.

mod buttondown;
mod mailerlite;

pub use buttondown::{Buttondown, ButtondownPayload};
pub use mailerlite::{MailerLite, MailerLitePayload};

use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use strum_macros::AsRefStr;

use crate::config::RelayConfig;

// ###################################
// ->   TRAITS
// ###################################
pub trait SubscriptionProvider: std::fmt::Debug + Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn auth_scheme(&self) -> AuthScheme;

    /// Decodes the client's body and returns the JSON bytes to send to the provider.
    fn shape_payload(&self, body: &[u8], ctx: &SubscriptionContext<'_>) -> Result<Vec<u8>>;

    fn authorization(&self, api_key: &SecretString) -> String {
        format!("{} {}", self.auth_scheme().as_ref(), api_key.expose_secret())
    }
}

/// A provider payload that doubles as the inbound request shape.
/// Fields the provider owns must be `#[serde(skip_deserializing)]` so a client can't set them.
pub trait ProviderPayload: DeserializeOwned + Serialize {
    /// Resolves any aliasing and returns the email this payload will carry.
    fn resolve_email(&mut self) -> &str;
}

// ###################################
// ->   STRUCTS
// ###################################
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    #[serde(alias = "mailer_lite", alias = "ml")]
    #[strum(serialize = "mailerlite")]
    MailerLite,
    #[strum(serialize = "buttondown")]
    Buttondown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
pub enum AuthScheme {
    Bearer,
    Token,
}

/// Per-request data that does not come from the body.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionContext<'a> {
    pub client_ip: &'a str,
}

// ###################################
// ->   IMPLs
// ###################################
impl ProviderKind {
    pub fn default_url(&self) -> &'static str {
        match self {
            ProviderKind::MailerLite => mailerlite::MAILERLITE_URL,
            ProviderKind::Buttondown => buttondown::BUTTONDOWN_URL,
        }
    }

    /// MailerLite wants a single numeric group id, Buttondown takes any list of tags.
    pub fn accepts_group(&self, group: &str) -> bool {
        match self {
            ProviderKind::MailerLite => MailerLite::parse_group(group).is_ok(),
            ProviderKind::Buttondown => !Buttondown::parse_tags(group).is_empty(),
        }
    }

    pub fn build(&self, config: &RelayConfig) -> Result<Box<dyn SubscriptionProvider>> {
        let group = config.group.as_deref().ok_or(Error::MissingGroup)?;

        let provider: Box<dyn SubscriptionProvider> = match self {
            ProviderKind::MailerLite => {
                Box::new(MailerLite::new(MailerLite::parse_group(group)?))
            }
            ProviderKind::Buttondown => {
                let host = config.host.as_deref().unwrap_or_default();
                Box::new(Buttondown::new(Buttondown::parse_tags(group), host))
            }
        };

        Ok(provider)
    }
}

/// The decode → check → overwrite → encode steps every provider goes through.
pub fn transform<P, F>(body: &[u8], apply: F) -> Result<Vec<u8>>
where
    P: ProviderPayload,
    F: FnOnce(&mut P),
{
    let mut payload: P = serde_json::from_slice(body).map_err(Error::Parse)?;
    if payload.resolve_email().is_empty() {
        return Err(Error::EmailRequired);
    }

    apply(&mut payload);

    serde_json::to_vec(&payload).map_err(Error::Marshal)
}

/// `null` is as good as a missing value.
fn nullable_string<'de, D>(deserializer: D) -> core::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("could not parse subscription request: {0}")]
    Parse(serde_json::Error),
    #[error("email is required")]
    EmailRequired,
    #[error("could not marshall subscription request: {0}")]
    Marshal(serde_json::Error),

    #[error("no destination group configured")]
    MissingGroup,
    #[error("invalid group id: '{0}'")]
    InvalidGroup(String),
}
