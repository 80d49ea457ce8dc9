//! Fetchers for the college pages the bot reads.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::SourceConfig;
use crate::utils::http::{create_async_client, fetch_bytes, post_form_bytes};

/// Form field the schedule endpoint reads the group name from.
const GROUP_FIELD: &str = "nomer_grup";

/// Raw page access, kept behind a trait so flows can be tested offline.
#[async_trait]
pub trait SourcePage: Send + Sync {
    /// Raw bytes of the substitutions page.
    async fn fetch_substitutions(&self) -> Result<Vec<u8>>;

    /// Raw bytes of the lesson schedule page for one group.
    async fn fetch_schedule(&self, group: &str) -> Result<Vec<u8>>;
}

/// [`SourcePage`] backed by HTTP requests to the college site.
pub struct HttpSource {
    client: Client,
    substitutions_url: String,
    schedule_url: String,
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(&config.user_agent, config.timeout_secs)?,
            substitutions_url: config.substitutions_url.clone(),
            schedule_url: config.schedule_url.clone(),
        })
    }
}

#[async_trait]
impl SourcePage for HttpSource {
    async fn fetch_substitutions(&self) -> Result<Vec<u8>> {
        fetch_bytes(&self.client, &self.substitutions_url).await
    }

    async fn fetch_schedule(&self, group: &str) -> Result<Vec<u8>> {
        post_form_bytes(&self.client, &self.schedule_url, &[(GROUP_FIELD, group)]).await
    }
}
