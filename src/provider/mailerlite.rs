use serde::{Deserialize, Serialize};

use super::{
    nullable_string, transform, AuthScheme, Error, ProviderKind, ProviderPayload, Result,
    SubscriptionContext, SubscriptionProvider,
};

pub const MAILERLITE_URL: &str = "https://connect.mailerlite.com/api/subscribers";
const STATUS_UNCONFIRMED: &str = "unconfirmed";

/// List based membership: every subscriber lands in the one configured group.
#[derive(Debug)]
pub struct MailerLite {
    group: u64,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct MailerLitePayload {
    #[serde(default, deserialize_with = "nullable_string")]
    pub email: String,
    #[serde(skip_deserializing)]
    pub groups: Vec<u64>,
    #[serde(skip_deserializing)]
    pub status: String,
    #[serde(skip_deserializing)]
    pub ip_address: String,
}

impl MailerLite {
    pub fn new(group: u64) -> Self {
        MailerLite { group }
    }

    pub fn parse_group(group: &str) -> Result<u64> {
        match group.trim().parse::<u64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(Error::InvalidGroup(group.to_string())),
        }
    }
}

impl ProviderPayload for MailerLitePayload {
    fn resolve_email(&mut self) -> &str {
        &self.email
    }
}

impl SubscriptionProvider for MailerLite {
    fn kind(&self) -> ProviderKind {
        ProviderKind::MailerLite
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::Bearer
    }

    fn shape_payload(&self, body: &[u8], ctx: &SubscriptionContext<'_>) -> Result<Vec<u8>> {
        transform(body, |payload: &mut MailerLitePayload| {
            payload.groups = vec![self.group];
            payload.status = STATUS_UNCONFIRMED.to_string();
            payload.ip_address = ctx.client_ip.to_string();
        })
    }
}
