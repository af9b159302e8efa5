use crate::{config, provider_client};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("provider client error: {0}")]
    ProviderClient(#[from] provider_client::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
