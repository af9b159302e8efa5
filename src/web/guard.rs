//! Security checks a subscription POST has to pass before its body is even looked at.

use axum::http::{header::REFERER, HeaderMap};
use tracing::{info, warn};

use crate::{
    config::RelayConfig,
    web::{Error, Result, FORWARDED_SSL_HEADER},
};

pub fn check_request(headers: &HeaderMap, config: &RelayConfig) -> Result<()> {
    // Set by the TLS terminating proxy in front of us.
    if header_str(headers, FORWARDED_SSL_HEADER) != "on" {
        return Err(Error::SslRequired);
    }

    let referer = header_str(headers, REFERER.as_str());
    info!("{:<12} - {referer}", "REFERER");

    if !config.referer_allowed(referer) {
        warn!(
            "{:<12} - {referer} is not from {:?}",
            "REFERER", config.referers
        );
        return Err(Error::InvalidReferer(referer.to_string()));
    }

    Ok(())
}

/// Missing and non-ascii header values both read as empty.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
