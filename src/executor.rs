use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Url};
use tracing::{debug, info, warn};

use crate::config::EndpointConfig;
use crate::error::TransportError;
use crate::protocol::{CommandResponse, ExecuteCommandRequest, ResponseSchema};

/// Something that can carry one command to the execution endpoint and bring
/// back its reply.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// `Ok(None)` means the endpoint answered with a blank body.
    async fn execute(&self, command: &str) -> Result<Option<CommandResponse>, TransportError>;

    /// Where commands go, for display.
    fn target(&self) -> String;
}

/// Executes commands by POSTing them to the remote endpoint.
pub struct HttpExecutor {
    client: Client,
    url: Url,
    schema: ResponseSchema,
}

impl HttpExecutor {
    pub fn new(url: Url, timeout: Duration, connect_timeout: Duration, schema: ResponseSchema) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, url, schema })
    }

    pub fn from_config(config: &EndpointConfig) -> anyhow::Result<Self> {
        Self::new(
            config.endpoint_url()?,
            Duration::from_secs(config.timeout_seconds),
            Duration::from_secs(config.connect_timeout_seconds),
            config.response_schema,
        )
    }
}

#[async_trait]
impl CommandExecutor for HttpExecutor {
    async fn execute(&self, command: &str) -> Result<Option<CommandResponse>, TransportError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&ExecuteCommandRequest { command })
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        // Error statuses still carry a result envelope; only the body decides.
        let status = response.status();
        if status.is_success() {
            debug!(%status, "execution endpoint replied");
        } else {
            warn!(%status, "execution endpoint replied with error status");
        }

        let body = response.bytes().await.map_err(TransportError::from_reqwest)?;
        let decoded = CommandResponse::decode(&body, self.schema)?;
        match &decoded {
            Some(result) => info!(status = result.status.as_deref().unwrap_or("-"), "command result received"),
            None => info!("blank command result received"),
        }
        Ok(decoded)
    }

    fn target(&self) -> String {
        self.url.to_string()
    }
}
