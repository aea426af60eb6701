use super::from_sdk;
use crate::error::Result;
use crate::servicecatalog::api::{
    ListProvisioningArtifactsInput, ProvisioningArtifactDetail, ServiceCatalogApi,
};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_servicecatalog::Client;
use aws_sdk_servicecatalog::types;

pub struct SdkServiceCatalog {
    client: Client,
}

impl SdkServiceCatalog {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn detail(artifact: &types::ProvisioningArtifactDetail) -> ProvisioningArtifactDetail {
    ProvisioningArtifactDetail {
        active: artifact.active(),
        created_time: artifact
            .created_time()
            .and_then(|t| chrono::DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
        description: artifact.description().map(str::to_string),
        guidance: artifact.guidance().map(|g| g.as_str().to_string()),
        id: artifact.id().map(str::to_string),
        name: artifact.name().map(str::to_string),
        artifact_type: artifact.r#type().map(|t| t.as_str().to_string()),
    }
}

#[async_trait]
impl ServiceCatalogApi for SdkServiceCatalog {
    async fn list_provisioning_artifacts(
        &self,
        input: &ListProvisioningArtifactsInput,
    ) -> Result<Vec<ProvisioningArtifactDetail>> {
        let output = self
            .client
            .list_provisioning_artifacts()
            .accept_language(&input.accept_language)
            .product_id(&input.product_id)
            .send()
            .await
            .map_err(from_sdk)?;

        Ok(output
            .provisioning_artifact_details()
            .iter()
            .map(detail)
            .collect())
    }
}
