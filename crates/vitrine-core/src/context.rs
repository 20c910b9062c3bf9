use vitrine_config::config::Config;
use vitrine_rest::{Client, RestConfig};

use crate::error::CoreResult;

/// Everything an operation needs: the effective configuration and a client.
#[derive(Clone, Debug)]
pub struct AppContext {
    config: Config,
    client: Client,
}

/// Maps the configuration onto the client settings.
pub fn rest_config(config: &Config) -> RestConfig {
    RestConfig {
        base_url: config.base_url().map(String::from),
        api_key: config.api_key().map(String::from),
        timeout: Some(config.request_timeout()),
        user_agent: Some(config.user_agent()),
    }
}

impl AppContext {
    /// Builds a context with a network client. A missing URL or key yields an
    /// unconfigured client rather than an error.
    pub fn new(config: Config) -> CoreResult<Self> {
        let client = Client::from_config(rest_config(&config))?;
        Ok(Self {
            config,
            client,
        })
    }

    pub fn with_client(config: Config, client: Client) -> Self {
        Self {
            config,
            client,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}
