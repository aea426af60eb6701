//! AWS definitions for cloudglue
//!
//! This crate registers the AWS data sources and resources with a
//! [`Provider`]:
//!
//! - `aws_cloudwatch_log_data_protection_policy_document` (data source):
//!   renders a CloudWatch Logs data protection policy as canonical JSON
//! - `aws_servicecatalog_provisioning_artifacts` (data source): lists the
//!   provisioning artifacts of a Service Catalog product
//! - `aws_medialive_multiplex` (resource): full lifecycle of a MediaLive
//!   multiplex including start/stop and tags
//!
//! # Requirements
//!
//! - The policy document data source needs no credentials
//! - Service Catalog and MediaLive need API clients, either from the `sdk`
//!   feature (default credential chain) or injected through [`AwsClient`]
//!
//! # Example
//!
//! ```ignore
//! use cloudglue_aws::{AwsClient, provider};
//!
//! let client = AwsClient::new(Some("us-east-1".into()))
//!     .with_sdk_clients(None)
//!     .await;
//! let provider = provider(client);
//!
//! let result = provider
//!     .read_data_source("aws_servicecatalog_provisioning_artifacts", &config)
//!     .await?;
//! ```

pub mod conns;
pub mod error;
pub mod logs;
pub mod medialive;
pub mod names;
pub mod servicecatalog;
pub mod tags;

#[cfg(feature = "sdk")]
pub mod sdk;

pub use conns::AwsClient;
pub use error::{AwsError, Result};
pub use logs::{DataProtectionPolicyDocument, DataProtectionPolicyDocumentDataSource};
pub use medialive::MultiplexResource;
pub use servicecatalog::ProvisioningArtifactsDataSource;
pub use tags::Tags;

use cloudglue_provider::Provider;

pub const PROVIDER_NAME: &str = "aws";

/// Provider with every AWS definition registered
pub fn provider(client: AwsClient) -> Provider {
    let mut provider = Provider::new(PROVIDER_NAME);
    provider.register_data_source(DataProtectionPolicyDocumentDataSource);
    provider.register_data_source(ProvisioningArtifactsDataSource::new(client.clone()));
    provider.register_resource(MultiplexResource::new(client));
    provider
}
