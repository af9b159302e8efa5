use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use strum_macros::AsRefStr;

use crate::{provider, provider_client};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("relay configuration is incomplete")]
    ServiceUnavailable,
    #[error("request did not arrive over tls")]
    SslRequired,
    #[error("referer '{0}' is not in the allow-list")]
    InvalidReferer(String),
    #[error("provider rejected the subscription with status: {0}")]
    SubscriptionFailed(StatusCode),
    #[error("could not read the request body: {0}")]
    BodyRejected(#[from] BytesRejection),

    #[error("payload error: {0}")]
    Payload(#[from] provider::Error),
    #[error("provider client error: {0}")]
    ProviderClient(#[from] provider_client::Error),
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::ServiceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, ServiceUnavailable),
            Error::SslRequired => (StatusCode::BAD_REQUEST, SslRequired),
            Error::InvalidReferer(_) => (StatusCode::BAD_REQUEST, InvalidReferer),
            Error::SubscriptionFailed(status) => (*status, SubscriptionFailed),
            Error::BodyRejected(rejection) => (rejection.status(), InvalidRequest),
            Error::Payload(payload_er) => payload_status_and_client_error(payload_er),
            Error::ProviderClient(client_er) => match client_er {
                provider_client::Error::Transport(_) => (StatusCode::BAD_GATEWAY, BadGateway),
                provider_client::Error::RequestBuild(_)
                | provider_client::Error::InvalidApiKey => {
                    (StatusCode::INTERNAL_SERVER_ERROR, PostFailed)
                }
                provider_client::Error::Provider(payload_er) => {
                    payload_status_and_client_error(payload_er)
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, ServiceError),
            },
        }
    }
}

fn payload_status_and_client_error(er: &provider::Error) -> (StatusCode, ClientError) {
    match er {
        provider::Error::Parse(_) => (StatusCode::BAD_REQUEST, ClientError::InvalidRequest),
        provider::Error::EmailRequired => (StatusCode::BAD_REQUEST, ClientError::EmailRequired),
        provider::Error::Marshal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, ClientError::MarshalFailed)
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, ClientError::ServiceError),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// The message that ends up in the `{"error": ...}` body.
/// Never carries provider or internal details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("service unavailable")]
    ServiceUnavailable,
    #[display("ssl required")]
    SslRequired,
    #[display("invalid referer")]
    InvalidReferer,
    #[display("could not parse subscription request")]
    InvalidRequest,
    #[display("email is required")]
    EmailRequired,
    #[display("could not marshall subscription request")]
    MarshalFailed,
    #[display("could not post subscription request")]
    PostFailed,
    #[display("subscription failed")]
    SubscriptionFailed,
    #[display("provider unavailable")]
    BadGateway,
    #[display("internal server error")]
    ServiceError,
}
