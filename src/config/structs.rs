//! The configuration structs used to build the AppConfig, and their impls.
use std::net::{IpAddr, Ipv4Addr};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use strum_macros::AsRefStr;

use crate::provider::ProviderKind;

// ###################################
// ->   STRUCTS
// ###################################
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub relay_config: RelayConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: IpAddr,
    #[serde(default = "default_port", alias = "port")]
    pub app_port: u16,
}

/// Everything the relay needs to talk to the newsletter provider.
/// Missing fields don't fail the extraction, they make the config invalid instead,
/// see `RelayConfig::missing_fields`.
#[derive(Deserialize, Clone, Debug)]
pub struct RelayConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default, deserialize_with = "deserialize_opt_secret")]
    pub api_key: Option<SecretString>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub group: Option<String>,
    #[serde(default, rename = "referer", deserialize_with = "deserialize_list")]
    pub referers: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub host: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub redirect_url: Option<String>,
    #[serde(default = "default_client_ip_header")]
    pub client_ip_header: String,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub provider_url: Option<String>,
    #[serde(default = "default_timeout_millis")]
    pub timeout_millis: u64,
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

/// A required relay field that is absent (or unusable) in the current configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
pub enum MissingField {
    #[strum(serialize = "apikey")]
    ApiKey,
    #[strum(serialize = "group")]
    Group,
    #[strum(serialize = "referer")]
    Referer,
    #[strum(serialize = "host")]
    Host,
}

// ###################################
// ->   IMPLs
// ###################################
impl Default for NetConfig {
    fn default() -> Self {
        NetConfig {
            bind_addr: default_bind_addr(),
            app_port: default_port(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            provider: ProviderKind::default(),
            api_key: None,
            group: None,
            referers: Vec::new(),
            host: None,
            redirect_url: None,
            client_ip_header: default_client_ip_header(),
            provider_url: None,
            timeout_millis: default_timeout_millis(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

impl RelayConfig {
    /// Every required field is checked on its own, so several can be reported at once.
    pub fn missing_fields(&self) -> Vec<MissingField> {
        let mut missing = Vec::new();

        if !self
            .api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().is_empty())
        {
            missing.push(MissingField::ApiKey);
        }
        if !self
            .group
            .as_deref()
            .is_some_and(|group| self.provider.accepts_group(group))
        {
            missing.push(MissingField::Group);
        }
        if self.referers.is_empty() {
            missing.push(MissingField::Referer);
        }
        if self.host.as_deref().is_none_or(str::is_empty) {
            missing.push(MissingField::Host);
        }

        missing
    }

    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Case-sensitive prefix match against the allow-list.
    /// An empty allow-list lets every referer through.
    pub fn referer_allowed(&self, referer: &str) -> bool {
        self.referers.is_empty()
            || self
                .referers
                .iter()
                .any(|prefix| referer.starts_with(prefix.as_str()))
    }

    /// Where non-POST requests get sent. Falls back to the first allowed referer.
    /// `None` when neither is configured.
    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .or_else(|| self.referers.first().map(String::as_str))
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_millis)
    }

    pub fn concurrency_limit(&self) -> usize {
        self.max_concurrent_requests.max(1)
    }
}

// ###################################
// ->   DEFAULTS
// ###################################
fn default_bind_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_client_ip_header() -> String {
    "fly-client-ip".to_string()
}

fn default_timeout_millis() -> u64 {
    5_000
}

fn default_max_concurrent_requests() -> usize {
    64
}

// ###################################
// ->   DESERIALIZERS
// ###################################
/// Env values that look like numbers or booleans come through typed (e.g. a MailerLite
/// group id), so accept any scalar and keep its text. Whether the text is usable is up to
/// `RelayConfig::missing_fields`, never to the extraction.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    String(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::String(s) => s,
            Scalar::Unsigned(n) => n.to_string(),
            Scalar::Signed(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Scalar>),
    One(Scalar),
}

fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value
        .map(String::from)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn deserialize_opt_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_opt_string(deserializer)?.map(SecretString::from))
}

/// Accepts either a list or a single comma separated string.
fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(values)) => values.into_iter().map(String::from).collect(),
        Some(OneOrMany::One(value)) => String::from(value)
            .split(',')
            .map(str::to_string)
            .collect(),
    };

    Ok(values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect())
}
