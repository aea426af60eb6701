//! AWS SDK implementations of the service API seams

mod medialive;
mod servicecatalog;

pub use medialive::SdkMediaLive;
pub use servicecatalog::SdkServiceCatalog;

use crate::error::AwsError;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_medialive::error::{DisplayErrorContext, ProvideErrorMetadata};

const NOT_FOUND_CODES: [&str; 2] = ["NotFoundException", "ResourceNotFoundException"];
const THROTTLING_CODES: [&str; 3] = [
    "ThrottlingException",
    "TooManyRequestsException",
    "LimitExceededException",
];

/// Load shared SDK configuration from the default credential chain
pub async fn load_config(region: Option<String>, profile: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region));
    }
    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }
    let config = loader.load().await;
    tracing::debug!(region = ?config.region(), "loaded AWS SDK configuration");
    config
}

/// Classify an SDK error by its service error code
pub(crate) fn from_sdk<E>(err: E) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    match err.code() {
        Some(code) if NOT_FOUND_CODES.contains(&code) => AwsError::NotFound(message),
        Some(code) if THROTTLING_CODES.contains(&code) => AwsError::Throttled(message),
        Some(code) => AwsError::service(code, message),
        None => AwsError::Sdk(message),
    }
}
