//! AWS Service Catalog

pub mod api;
pub mod provisioning_artifacts;

pub use provisioning_artifacts::ProvisioningArtifactsDataSource;
