//! Service Catalog API seam

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One provisioning artifact (product version) as returned by the API
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvisioningArtifactDetail {
    pub active: Option<bool>,
    pub created_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub guidance: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub artifact_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListProvisioningArtifactsInput {
    pub accept_language: String,
    pub product_id: String,
}

#[async_trait]
pub trait ServiceCatalogApi: Send + Sync {
    async fn list_provisioning_artifacts(
        &self,
        input: &ListProvisioningArtifactsInput,
    ) -> Result<Vec<ProvisioningArtifactDetail>>;
}
