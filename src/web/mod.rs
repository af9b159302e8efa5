mod error;
pub mod guard;
mod log;
pub mod midware;
pub mod routes;

pub use error::{ClientError, Error, Result};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const FORWARDED_SSL_HEADER: &str = "x-forwarded-ssl";
