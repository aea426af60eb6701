//! MediaLive API seam

use crate::error::Result;
use crate::tags::Tags;
use async_trait::async_trait;

pub const STATE_CREATING: &str = "CREATING";
pub const STATE_CREATE_FAILED: &str = "CREATE_FAILED";
pub const STATE_IDLE: &str = "IDLE";
pub const STATE_STARTING: &str = "STARTING";
pub const STATE_RUNNING: &str = "RUNNING";
pub const STATE_RECOVERING: &str = "RECOVERING";
pub const STATE_STOPPING: &str = "STOPPING";
pub const STATE_DELETING: &str = "DELETING";
pub const STATE_DELETED: &str = "DELETED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplexSettings {
    pub transport_stream_bitrate: i64,
    pub transport_stream_id: i64,
    pub transport_stream_reserved_bitrate: Option<i64>,
    pub maximum_video_buffer_delay_milliseconds: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multiplex {
    pub id: String,
    pub arn: String,
    pub name: String,
    pub state: String,
    pub availability_zones: Vec<String>,
    pub settings: Option<MultiplexSettings>,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMultiplexInput {
    pub name: String,
    pub availability_zones: Vec<String>,
    pub settings: MultiplexSettings,
    /// Idempotency token
    pub request_id: String,
    pub tags: Tags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateMultiplexInput {
    pub id: String,
    pub name: Option<String>,
    pub settings: Option<MultiplexSettings>,
}

/// Operations on MediaLive multiplexes
///
/// `describe_multiplex` returns [`AwsError::NotFound`](crate::AwsError::NotFound)
/// for unknown ids.
#[async_trait]
pub trait MediaLiveApi: Send + Sync {
    async fn create_multiplex(&self, input: &CreateMultiplexInput) -> Result<Multiplex>;

    async fn describe_multiplex(&self, id: &str) -> Result<Multiplex>;

    async fn update_multiplex(&self, input: &UpdateMultiplexInput) -> Result<Multiplex>;

    async fn delete_multiplex(&self, id: &str) -> Result<()>;

    async fn start_multiplex(&self, id: &str) -> Result<()>;

    async fn stop_multiplex(&self, id: &str) -> Result<()>;

    async fn tag_resource(&self, arn: &str, tags: &Tags) -> Result<()>;

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> Result<()>;
}
