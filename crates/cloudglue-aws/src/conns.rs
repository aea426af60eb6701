//! Shared AWS client handle passed to every definition

use crate::medialive::api::MediaLiveApi;
use crate::servicecatalog::api::ServiceCatalogApi;
use crate::tags::Tags;
use cloudglue_provider::{ProviderError, RetryConfig};
use std::sync::Arc;
use std::time::Duration;

/// Per-service API clients plus provider-wide settings
///
/// Service clients are optional so the mapping-only data sources work
/// without credentials; definitions that need a missing client fail with
/// [`ProviderError::ClientUnavailable`].
#[derive(Clone)]
pub struct AwsClient {
    region: Option<String>,
    default_tags: Tags,
    retry: RetryConfig,
    poll_interval: Duration,
    servicecatalog: Option<Arc<dyn ServiceCatalogApi>>,
    medialive: Option<Arc<dyn MediaLiveApi>>,
}

impl Default for AwsClient {
    fn default() -> Self {
        Self {
            region: None,
            default_tags: Tags::new(),
            retry: RetryConfig::default(),
            poll_interval: Duration::from_secs(5),
            servicecatalog: None,
            medialive: None,
        }
    }
}

impl AwsClient {
    pub fn new(region: Option<String>) -> Self {
        Self {
            region,
            ..Default::default()
        }
    }

    pub fn with_default_tags(mut self, tags: Tags) -> Self {
        self.default_tags = tags;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_servicecatalog(mut self, api: Arc<dyn ServiceCatalogApi>) -> Self {
        self.servicecatalog = Some(api);
        self
    }

    pub fn with_medialive(mut self, api: Arc<dyn MediaLiveApi>) -> Self {
        self.medialive = Some(api);
        self
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn default_tags(&self) -> &Tags {
        &self.default_tags
    }

    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn servicecatalog(&self) -> Result<Arc<dyn ServiceCatalogApi>, ProviderError> {
        self.servicecatalog.clone().ok_or_else(|| {
            ProviderError::ClientUnavailable(
                "Service Catalog (build with the `sdk` feature or configure a client)".to_string(),
            )
        })
    }

    pub fn medialive(&self) -> Result<Arc<dyn MediaLiveApi>, ProviderError> {
        self.medialive.clone().ok_or_else(|| {
            ProviderError::ClientUnavailable(
                "MediaLive (build with the `sdk` feature or configure a client)".to_string(),
            )
        })
    }

    /// Attach SDK-backed clients built from the default credential chain
    #[cfg(feature = "sdk")]
    pub async fn with_sdk_clients(self, profile: Option<&str>) -> Self {
        let config = crate::sdk::load_config(self.region.clone(), profile).await;
        self.with_servicecatalog(Arc::new(crate::sdk::SdkServiceCatalog::new(&config)))
            .with_medialive(Arc::new(crate::sdk::SdkMediaLive::new(&config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_clients_are_reported() {
        let client = AwsClient::new(Some("us-west-2".to_string()));
        assert_eq!(client.region(), Some("us-west-2"));
        assert!(matches!(
            client.servicecatalog(),
            Err(ProviderError::ClientUnavailable(_))
        ));
        assert!(matches!(
            client.medialive(),
            Err(ProviderError::ClientUnavailable(_))
        ));
    }
}
