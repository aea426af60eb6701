//! `aws_servicecatalog_provisioning_artifacts` data source

use super::api::{ListProvisioningArtifactsInput, ProvisioningArtifactDetail};
use crate::conns::AwsClient;
use crate::names::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cloudglue_core::{AttrMap, AttrValue, Attribute, Schema, Validator, flatten_blocks};
use cloudglue_provider::{DataSource, ResourceData, Result, Timeouts, retry_with_backoff};
use std::sync::LazyLock;
use std::time::Duration;

pub const TYPE_NAME: &str = "aws_servicecatalog_provisioning_artifacts";

const ATTR_ACCEPT_LANGUAGE: &str = "accept_language";
const ATTR_PRODUCT_ID: &str = "product_id";
const ATTR_PROVISIONING_ARTIFACT_DETAILS: &str = "provisioning_artifact_details";

const ACCEPT_LANGUAGE_ENGLISH: &str = "en";
const ACCEPT_LANGUAGE_VALUES: [&str; 3] = ["en", "jp", "zh"];

const READ_TIMEOUT: Duration = Duration::from_secs(3 * 60);

const OP_LIST: &str = "listing Service Catalog Provisioning Artifacts";

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let detail = Schema::new()
        .attr("active", Attribute::bool().computed())
        .attr(ATTR_CREATED_TIME, Attribute::string().computed())
        .attr(ATTR_DESCRIPTION, Attribute::string().computed())
        .attr("guidance", Attribute::string().computed())
        .attr(ATTR_ID, Attribute::string().computed())
        .attr(ATTR_NAME, Attribute::string().computed())
        .attr(ATTR_TYPE, Attribute::string().computed());

    Schema::new()
        .attr(
            ATTR_ACCEPT_LANGUAGE,
            Attribute::string()
                .default(ACCEPT_LANGUAGE_ENGLISH)
                .validate(Validator::OneOf(
                    ACCEPT_LANGUAGE_VALUES.iter().map(|v| v.to_string()).collect(),
                ))
                .describe("Language code for the response"),
        )
        .attr(ATTR_PRODUCT_ID, Attribute::string().required())
        .attr(
            ATTR_PROVISIONING_ARTIFACT_DETAILS,
            Attribute::block(detail)
                .computed()
                .describe("Provisioning artifacts of the product"),
        )
});

/// Lists the provisioning artifacts (versions) of a Service Catalog product
pub struct ProvisioningArtifactsDataSource {
    client: AwsClient,
}

impl ProvisioningArtifactsDataSource {
    pub fn new(client: AwsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for ProvisioningArtifactsDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &SCHEMA
    }

    fn timeouts(&self) -> Timeouts {
        Timeouts::default().with_read(READ_TIMEOUT)
    }

    async fn read(&self, d: &mut ResourceData) -> Result<()> {
        let conn = self.client.servicecatalog()?;
        let product_id = d.get_string(ATTR_PRODUCT_ID);
        let input = ListProvisioningArtifactsInput {
            accept_language: d.get_string(ATTR_ACCEPT_LANGUAGE),
            product_id: product_id.clone(),
        };

        tracing::info!(product_id = %product_id, "{}", OP_LIST);

        let conn = conn.as_ref();
        let input = &input;
        let details = retry_with_backoff(self.client.retry(), OP_LIST, move || async move {
            conn.list_provisioning_artifacts(input)
                .await
                .map_err(|e| e.context(OP_LIST))
        })
        .await?;

        d.set_id(product_id);
        d.set(
            ATTR_PROVISIONING_ARTIFACT_DETAILS,
            flatten_provisioning_artifact_details(&details),
        );

        Ok(())
    }
}

fn flatten_provisioning_artifact_details(details: &[ProvisioningArtifactDetail]) -> Option<AttrValue> {
    flatten_blocks(details, flatten_provisioning_artifact_detail)
}

fn flatten_provisioning_artifact_detail(detail: &ProvisioningArtifactDetail) -> AttrMap {
    let mut detail_map = AttrMap::new();

    detail_map.insert_some("active", detail.active);
    detail_map.insert_some(ATTR_CREATED_TIME, detail.created_time.as_ref().map(format_created_time));
    detail_map.insert_some(ATTR_DESCRIPTION, detail.description.clone());
    detail_map.insert_some("guidance", detail.guidance.clone());
    detail_map.insert_some(ATTR_ID, detail.id.clone());
    detail_map.insert_some(ATTR_NAME, detail.name.clone());
    detail_map.insert_some(ATTR_TYPE, detail.artifact_type.clone());

    detail_map
}

/// `2024-03-01 09:30:00.25 +0000 UTC`; trailing zeros of the fraction are dropped
fn format_created_time(time: &DateTime<Utc>) -> String {
    let nanos = time.timestamp_subsec_nanos();
    let fraction = if nanos == 0 {
        String::new()
    } else {
        format!(".{nanos:09}").trim_end_matches('0').to_string()
    };
    format!(
        "{}{fraction} {}",
        time.format("%Y-%m-%d %H:%M:%S"),
        time.format("%z %Z")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AwsError;
    use crate::servicecatalog::api::ServiceCatalogApi;
    use chrono::TimeZone;
    use cloudglue_provider::{Provider, ProviderError};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeServiceCatalog {
        details: Vec<ProvisioningArtifactDetail>,
        fail: bool,
        requests: Mutex<Vec<ListProvisioningArtifactsInput>>,
    }

    #[async_trait]
    impl ServiceCatalogApi for FakeServiceCatalog {
        async fn list_provisioning_artifacts(
            &self,
            input: &ListProvisioningArtifactsInput,
        ) -> crate::error::Result<Vec<ProvisioningArtifactDetail>> {
            self.requests.lock().unwrap().push(input.clone());
            if self.fail {
                return Err(AwsError::service("ResourceNotFoundException", "product prod-missing"));
            }
            Ok(self.details.clone())
        }
    }

    fn provider(api: Arc<FakeServiceCatalog>) -> Provider {
        let mut provider = Provider::new("aws");
        provider.register_data_source(ProvisioningArtifactsDataSource::new(
            AwsClient::default().with_servicecatalog(api),
        ));
        provider
    }

    fn artifact() -> ProvisioningArtifactDetail {
        ProvisioningArtifactDetail {
            active: Some(true),
            created_time: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()),
            description: Some("initial version".to_string()),
            guidance: Some("DEFAULT".to_string()),
            id: Some("pa-abc123".to_string()),
            name: Some("v1".to_string()),
            artifact_type: Some("CLOUD_FORMATION_TEMPLATE".to_string()),
        }
    }

    #[tokio::test]
    async fn test_read_flattens_artifacts() {
        let api = Arc::new(FakeServiceCatalog {
            details: vec![artifact(), ProvisioningArtifactDetail { id: Some("pa-def456".to_string()), ..Default::default() }],
            ..Default::default()
        });
        let result = provider(Arc::clone(&api))
            .read_data_source(TYPE_NAME, &serde_json::json!({ "product_id": "prod-xyz" }))
            .await
            .unwrap();

        assert_eq!(result.id, "prod-xyz");
        assert_eq!(
            api.requests.lock().unwrap()[0],
            ListProvisioningArtifactsInput {
                accept_language: "en".to_string(),
                product_id: "prod-xyz".to_string(),
            }
        );

        let details = result.state.get_list(ATTR_PROVISIONING_ARTIFACT_DETAILS);
        assert_eq!(details.len(), 2);

        let first = details[0].as_map().unwrap();
        assert_eq!(first.get_bool("active"), Some(true));
        assert_eq!(first.get_str(ATTR_CREATED_TIME), Some("2024-03-01 09:30:00 +0000 UTC"));
        assert_eq!(first.get_str(ATTR_TYPE), Some("CLOUD_FORMATION_TEMPLATE"));

        // only fields present on the API object are emitted
        let second = details[1].as_map().unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second.get_str(ATTR_ID), Some("pa-def456"));
    }

    #[tokio::test]
    async fn test_zero_artifacts_yield_no_attribute() {
        let api = Arc::new(FakeServiceCatalog::default());
        let result = provider(api)
            .read_data_source(TYPE_NAME, &serde_json::json!({ "product_id": "prod-empty", "accept_language": "jp" }))
            .await
            .unwrap();

        assert_eq!(result.id, "prod-empty");
        assert!(!result.state.contains_key(ATTR_PROVISIONING_ARTIFACT_DETAILS));
        assert_eq!(result.state.get_str(ATTR_ACCEPT_LANGUAGE), Some("jp"));
    }

    #[tokio::test]
    async fn test_api_error_is_annotated() {
        let api = Arc::new(FakeServiceCatalog {
            fail: true,
            ..Default::default()
        });
        let err = provider(api)
            .read_data_source(TYPE_NAME, &serde_json::json!({ "product_id": "prod-missing" }))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Api { .. }));
        assert!(err.to_string().starts_with("listing Service Catalog Provisioning Artifacts: "));
    }

    #[tokio::test]
    async fn test_accept_language_is_validated() {
        let api = Arc::new(FakeServiceCatalog::default());
        let err = provider(Arc::clone(&api))
            .read_data_source(TYPE_NAME, &serde_json::json!({ "product_id": "p", "accept_language": "fr" }))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Mapper(_)));
        assert!(api.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_created_time_trims_fraction() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(
            format_created_time(&(base + chrono::Duration::milliseconds(250))),
            "2024-03-01 09:30:00.25 +0000 UTC"
        );
        assert_eq!(
            format_created_time(&(base + chrono::Duration::nanoseconds(1))),
            "2024-03-01 09:30:00.000000001 +0000 UTC"
        );
        assert_eq!(format_created_time(&base), "2024-03-01 09:30:00 +0000 UTC");
    }

    #[test]
    fn test_read_timeout() {
        let ds = ProvisioningArtifactsDataSource::new(AwsClient::default());
        assert_eq!(ds.timeouts().read, Duration::from_secs(180));
    }
}
