pub mod serve;

// re-export
pub use serve::serve;

use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{config::AppConfig, config::RelayConfig, ProviderClient, Result};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Binds the listener and builds the provider client.
    /// An incomplete relay config is not fatal: the app still serves `/healthz` and answers 503 on `/`.
    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let AppConfig {
            net_config,
            relay_config,
        } = config;

        let provider_client = if relay_config.is_valid() {
            Some(ProviderClient::from_config(&relay_config)?)
        } else {
            warn!(
                "{:<20} - invalid config - see /healthz for details!",
                "WARNING:"
            );
            None
        };

        let app_state = AppState::new(relay_config, provider_client);

        let addr = SocketAddr::from((net_config.bind_addr, net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

pub struct InternalState {
    pub relay_config: RelayConfig,
    /// Only present when the relay config is valid.
    pub provider_client: Option<ProviderClient>,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(relay_config: RelayConfig, provider_client: Option<ProviderClient>) -> Self {
        AppState(Arc::new(InternalState {
            relay_config,
            provider_client,
        }))
    }
}
