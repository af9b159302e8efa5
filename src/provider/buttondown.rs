use serde::{Deserialize, Serialize};

use super::{
    nullable_string, transform, AuthScheme, ProviderKind, ProviderPayload, Result,
    SubscriptionContext, SubscriptionProvider,
};

pub const BUTTONDOWN_URL: &str = "https://api.buttondown.email/v1/subscribers";
const TYPE_UNACTIVATED: &str = "unactivated";

/// Tag based membership: subscribers are tagged instead of put on a list.
#[derive(Debug)]
pub struct Buttondown {
    tags: Vec<String>,
    notes: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct ButtondownPayload {
    #[serde(default, deserialize_with = "nullable_string")]
    pub email_address: String,
    /// Older forms still post `email`. Promoted into `email_address` once, never sent upstream.
    #[serde(default, deserialize_with = "nullable_string", skip_serializing)]
    pub email: String,
    #[serde(skip_deserializing)]
    pub tags: Vec<String>,
    #[serde(skip_deserializing)]
    pub notes: String,
    #[serde(skip_deserializing)]
    pub ip_address: String,
    #[serde(skip_deserializing, rename = "type")]
    pub subscriber_type: String,
}

impl Buttondown {
    pub fn new(tags: Vec<String>, host: &str) -> Self {
        Buttondown {
            tags,
            notes: format!("Subscribed via {host}"),
        }
    }

    pub fn parse_tags(group: &str) -> Vec<String> {
        group
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl ProviderPayload for ButtondownPayload {
    fn resolve_email(&mut self) -> &str {
        if self.email_address.is_empty() && !self.email.is_empty() {
            self.email_address = std::mem::take(&mut self.email);
        }
        &self.email_address
    }
}

impl SubscriptionProvider for Buttondown {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Buttondown
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::Token
    }

    fn shape_payload(&self, body: &[u8], ctx: &SubscriptionContext<'_>) -> Result<Vec<u8>> {
        transform(body, |payload: &mut ButtondownPayload| {
            payload.tags = self.tags.clone();
            payload.notes = self.notes.clone();
            payload.ip_address = ctx.client_ip.to_string();
            payload.subscriber_type = TYPE_UNACTIVATED.to_string();
        })
    }
}
