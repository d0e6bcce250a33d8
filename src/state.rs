//! Shared application state handed to every handler.

use crate::config::AppConfig;
use crate::drafting::DraftingService;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub service: DraftingService,
}

impl AppState {
    /// Builds the outbound HTTP client and hands it to the production drafting service.
    pub fn new(config: AppConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .pool_idle_timeout(std::time::Duration::from_secs(900))
            .user_agent("attest-letter-server/0.1")
            .build()?;

        let service = DraftingService::from_config(&config, http_client);
        Ok(Self { config, service })
    }

    /// State with a caller-built service, used to wire fake backends in tests.
    pub fn with_service(config: AppConfig, service: DraftingService) -> Self {
        Self { config, service }
    }
}
