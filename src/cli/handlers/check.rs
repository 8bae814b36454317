//! Check command handler
//!
//! Validates configuration and reports whether a send would be possible.

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::services::gcm::GcmClient;

pub struct CheckCommandHandler {
    config: Settings,
}

impl CheckCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Validate configuration without sending anything
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Missing API key
    /// - HTTP client construction errors
    pub async fn execute(&self) -> AppResult<()> {
        self.config.validate()?;
        println!("✓ Configuration is valid");

        self.config.gcm.require_credentials()?;
        println!("✓ API key is configured");

        GcmClient::from_config(&self.config.gcm)?;
        println!("✓ Provider endpoint: {}", self.config.gcm.endpoint);
        if let Some(proxy) = &self.config.gcm.proxy {
            println!("✓ Proxy: {}", proxy);
        }
        println!(
            "✓ Timeouts: request {}s, batch {}s, retries {}",
            self.config.gcm.request_timeout,
            self.config.gcm.chunk_timeout,
            self.config.gcm.default_retries
        );
        println!("✓ Logger configuration is valid");

        println!("Check completed successfully - ready to send");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
