pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to extract the configuration: {0}")]
    Extract(#[from] figment::Error),
}
