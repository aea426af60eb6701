//! Attribute names shared across AWS definitions

pub const ATTR_ARN: &str = "arn";
pub const ATTR_BUCKET: &str = "bucket";
pub const ATTR_CLOUDWATCH_LOGS: &str = "cloudwatch_logs";
pub const ATTR_CONFIGURATION: &str = "configuration";
pub const ATTR_CREATED_TIME: &str = "created_time";
pub const ATTR_DESCRIPTION: &str = "description";
pub const ATTR_ID: &str = "id";
pub const ATTR_JSON: &str = "json";
pub const ATTR_NAME: &str = "name";
pub const ATTR_TAGS: &str = "tags";
pub const ATTR_TAGS_ALL: &str = "tags_all";
pub const ATTR_TYPE: &str = "type";
pub const ATTR_VERSION: &str = "version";
