//! `aws_cloudwatch_log_data_protection_policy_document` data source
//!
//! Builds a CloudWatch Logs data protection policy from nested configuration
//! blocks and renders it as canonical JSON. No API call is made.

use crate::names::*;
use async_trait::async_trait;
use cloudglue_core::{
    AttrMap, Attribute, MapperError, Schema, ValueType, Validator, content_id, expand_blocks,
    expand_string_set, to_canonical_json, unwrap_block,
};
use cloudglue_provider::{DataSource, ResourceData, Result};
use serde::Serialize;
use std::sync::LazyLock;

pub const TYPE_NAME: &str = "aws_cloudwatch_log_data_protection_policy_document";

const DEFAULT_VERSION: &str = "2021-06-01";
const JSON_INDENT: usize = 2;

const ATTR_CUSTOM_DATA_IDENTIFIER: &str = "custom_data_identifier";
const ATTR_STATEMENT: &str = "statement";

const FIRST_STATEMENT_AUDIT_ONLY: &str =
    "the first policy statement must contain only the audit operation";
const SECOND_STATEMENT_DEIDENTIFY_ONLY: &str =
    "the second policy statement must contain only the deidentify operation";

fn single_block(schema: Schema) -> Attribute {
    Attribute::block(schema).max_items(1)
}

fn not_empty_string() -> Attribute {
    Attribute::string().required().validate(Validator::NotEmpty)
}

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let custom_data_identifier = Schema::new()
        .attr(
            ATTR_NAME,
            not_empty_string().validate(Validator::LenBetween(1, 128)),
        )
        .attr(
            "regex",
            not_empty_string().validate(Validator::LenBetween(1, 200)),
        );

    let findings_destination = Schema::new()
        .attr(
            ATTR_CLOUDWATCH_LOGS,
            single_block(Schema::new().attr("log_group", not_empty_string())).optional(),
        )
        .attr(
            "firehose",
            single_block(Schema::new().attr("delivery_stream", not_empty_string())).optional(),
        )
        .attr(
            "s3",
            single_block(Schema::new().attr(ATTR_BUCKET, not_empty_string())).optional(),
        );

    let operation = Schema::new()
        .attr(
            "audit",
            single_block(
                Schema::new().attr(
                    "findings_destination",
                    single_block(findings_destination).required(),
                ),
            )
            .optional(),
        )
        .attr(
            "deidentify",
            single_block(
                Schema::new().attr("mask_config", single_block(Schema::new()).required()),
            )
            .optional(),
        );

    let statement = Schema::new()
        .attr(
            "data_identifiers",
            Attribute::set_of(ValueType::String).required().min_items(1),
        )
        .attr("operation", single_block(operation).required())
        .attr("sid", Attribute::string().optional());

    Schema::new()
        .attr(
            ATTR_CONFIGURATION,
            single_block(
                Schema::new().attr(
                    ATTR_CUSTOM_DATA_IDENTIFIER,
                    Attribute::block(custom_data_identifier)
                        .optional()
                        .max_items(10),
                ),
            )
            .optional(),
        )
        .attr(ATTR_DESCRIPTION, Attribute::string().optional())
        .attr(
            ATTR_JSON,
            Attribute::string()
                .computed()
                .describe("Policy document rendered as JSON"),
        )
        .attr(ATTR_NAME, not_empty_string())
        .attr(
            ATTR_STATEMENT,
            Attribute::block(statement)
                .required()
                .min_items(2)
                .max_items(2),
        )
        .attr(ATTR_VERSION, Attribute::string().default(DEFAULT_VERSION))
});

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataProtectionPolicyDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<PolicyConfiguration>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "Statement", skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<PolicyStatement>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyConfiguration {
    #[serde(rename = "CustomDataIdentifier", skip_serializing_if = "Vec::is_empty")]
    pub custom_data_identifiers: Vec<CustomDataIdentifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomDataIdentifier {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub regex: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sid: String,
    #[serde(rename = "DataIdentifier", skip_serializing_if = "Vec::is_empty")]
    pub data_identifiers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<StatementOperation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatementOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deidentify: Option<DeidentifyOperation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuditOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findings_destination: Option<FindingsDestination>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FindingsDestination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_watch_logs: Option<CloudWatchLogsDestination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firehose: Option<FirehoseDestination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Destination>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CloudWatchLogsDestination {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub log_group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FirehoseDestination {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub delivery_stream: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3Destination {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bucket: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeidentifyOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_config: Option<MaskConfig>,
}

/// Has no fields; its presence alone selects masking
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaskConfig {}

impl DataProtectionPolicyDocument {
    /// Statement 0 must audit, statement 1 must deidentify, and nothing else
    pub fn validate(&self) -> std::result::Result<(), MapperError> {
        if self.statements.len() != 2 {
            return Err(MapperError::InvariantViolation(format!(
                "a data protection policy must contain exactly two statements, found {}",
                self.statements.len()
            )));
        }

        let audit_only = self.statements[0]
            .operation
            .as_ref()
            .is_some_and(|op| op.audit.is_some() && op.deidentify.is_none());
        if !audit_only {
            return Err(MapperError::InvariantViolation(
                FIRST_STATEMENT_AUDIT_ONLY.to_string(),
            ));
        }

        let deidentify_only = self.statements[1]
            .operation
            .as_ref()
            .is_some_and(|op| op.audit.is_none() && op.deidentify.is_some());
        if !deidentify_only {
            return Err(MapperError::InvariantViolation(
                SECOND_STATEMENT_DEIDENTIFY_ONLY.to_string(),
            ));
        }

        Ok(())
    }

    pub fn to_json(&self) -> std::result::Result<String, MapperError> {
        to_canonical_json(self, JSON_INDENT)
    }
}

/// Build the typed document from its attribute tree
pub fn expand_document(tree: &AttrMap) -> DataProtectionPolicyDocument {
    let configuration = unwrap_block(tree.get(ATTR_CONFIGURATION)).map(|m| PolicyConfiguration {
        custom_data_identifiers: expand_blocks(
            m.get(ATTR_CUSTOM_DATA_IDENTIFIER),
            "configuration.0.custom_data_identifier",
            |m| CustomDataIdentifier {
                name: m.get_string(ATTR_NAME),
                regex: m.get_string("regex"),
            },
        ),
    });

    DataProtectionPolicyDocument {
        configuration,
        description: tree.get_string(ATTR_DESCRIPTION),
        name: tree.get_string(ATTR_NAME),
        statements: expand_blocks(tree.get(ATTR_STATEMENT), ATTR_STATEMENT, expand_statement),
        version: tree.get_string(ATTR_VERSION),
    }
}

fn expand_statement(m: &AttrMap) -> PolicyStatement {
    PolicyStatement {
        sid: m.get_string("sid"),
        data_identifiers: expand_string_set(m.get("data_identifiers")),
        operation: unwrap_block(m.get("operation")).map(expand_operation),
    }
}

fn expand_operation(m: &AttrMap) -> StatementOperation {
    StatementOperation {
        audit: unwrap_block(m.get("audit")).map(|m| AuditOperation {
            findings_destination: unwrap_block(m.get("findings_destination"))
                .map(expand_findings_destination),
        }),
        deidentify: unwrap_block(m.get("deidentify")).map(|m| DeidentifyOperation {
            mask_config: unwrap_block(m.get("mask_config")).map(|_| MaskConfig {}),
        }),
    }
}

fn expand_findings_destination(m: &AttrMap) -> FindingsDestination {
    FindingsDestination {
        cloud_watch_logs: unwrap_block(m.get(ATTR_CLOUDWATCH_LOGS)).map(|m| {
            CloudWatchLogsDestination {
                log_group: m.get_string("log_group"),
            }
        }),
        firehose: unwrap_block(m.get("firehose")).map(|m| FirehoseDestination {
            delivery_stream: m.get_string("delivery_stream"),
        }),
        s3: unwrap_block(m.get("s3")).map(|m| S3Destination {
            bucket: m.get_string(ATTR_BUCKET),
        }),
    }
}

pub struct DataProtectionPolicyDocumentDataSource;

#[async_trait]
impl DataSource for DataProtectionPolicyDocumentDataSource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &SCHEMA
    }

    async fn read(&self, d: &mut ResourceData) -> Result<()> {
        let document = expand_document(&d.state());
        document.validate()?;

        let json = document.to_json()?;
        tracing::debug!(bytes = json.len(), "rendered data protection policy document");

        d.set_id(content_id(&json));
        d.set(ATTR_JSON, json);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudglue_core::AttrValue;
    use cloudglue_provider::{Provider, ProviderError};
    use serde_json::json;

    const EMAIL: &str = "arn:aws:dataprotection::aws:data-identifier/EmailAddress";
    const LICENSE: &str = "arn:aws:dataprotection::aws:data-identifier/DriversLicense-US";

    fn provider() -> Provider {
        let mut provider = Provider::new("aws");
        provider.register_data_source(DataProtectionPolicyDocumentDataSource);
        provider
    }

    fn audit_statement(identifiers: &[&str]) -> serde_json::Value {
        json!({
            "sid": "Audit",
            "data_identifiers": identifiers,
            "operation": {
                "audit": {
                    "findings_destination": {
                        "cloudwatch_logs": { "log_group": "audit-log" }
                    }
                }
            }
        })
    }

    fn deidentify_statement() -> serde_json::Value {
        json!({
            "sid": "Deidentify",
            "data_identifiers": [EMAIL],
            "operation": { "deidentify": { "mask_config": {} } }
        })
    }

    fn config(statements: Vec<serde_json::Value>) -> serde_json::Value {
        json!({ "name": "Test", "statement": statements })
    }

    async fn read(config: serde_json::Value) -> cloudglue_provider::Result<cloudglue_provider::ReadResult> {
        provider().read_data_source(TYPE_NAME, &config).await
    }

    #[tokio::test]
    async fn test_renders_policy_json() {
        let result = read(config(vec![
            audit_statement(&[EMAIL, LICENSE]),
            deidentify_statement(),
        ]))
        .await
        .unwrap();

        let expected = r#"{
  "Name": "Test",
  "Statement": [
    {
      "Sid": "Audit",
      "DataIdentifier": [
        "arn:aws:dataprotection::aws:data-identifier/DriversLicense-US",
        "arn:aws:dataprotection::aws:data-identifier/EmailAddress"
      ],
      "Operation": {
        "Audit": {
          "FindingsDestination": {
            "CloudWatchLogs": {
              "LogGroup": "audit-log"
            }
          }
        }
      }
    },
    {
      "Sid": "Deidentify",
      "DataIdentifier": [
        "arn:aws:dataprotection::aws:data-identifier/EmailAddress"
      ],
      "Operation": {
        "Deidentify": {
          "MaskConfig": {}
        }
      }
    }
  ],
  "Version": "2021-06-01"
}"#;

        assert_eq!(result.state.get_str(ATTR_JSON), Some(expected));
        assert_eq!(result.id, content_id(expected));
    }

    #[tokio::test]
    async fn test_identifier_order_does_not_change_id() {
        let a = read(config(vec![audit_statement(&[EMAIL, LICENSE]), deidentify_statement()]))
            .await
            .unwrap();
        let b = read(config(vec![audit_statement(&[LICENSE, EMAIL]), deidentify_statement()]))
            .await
            .unwrap();

        assert_eq!(a.id, b.id);
        assert_eq!(a.state.get_str(ATTR_JSON), b.state.get_str(ATTR_JSON));
    }

    #[tokio::test]
    async fn test_configuration_block() {
        let mut input = config(vec![audit_statement(&[EMAIL]), deidentify_statement()]);
        input["description"] = json!("custom identifiers");
        input["configuration"] = json!({
            "custom_data_identifier": [
                { "name": "EmployeeId", "regex": "EmployeeId-\\d{9}" }
            ]
        });

        let result = read(input).await.unwrap();
        let rendered: serde_json::Value =
            serde_json::from_str(result.state.get_str(ATTR_JSON).unwrap()).unwrap();

        assert_eq!(
            rendered["Configuration"],
            json!({ "CustomDataIdentifier": [{ "Name": "EmployeeId", "Regex": "EmployeeId-\\d{9}" }] })
        );
        assert_eq!(rendered["Description"], "custom identifiers");
    }

    #[tokio::test]
    async fn test_audit_in_second_statement_is_rejected() {
        let err = read(config(vec![deidentify_statement(), audit_statement(&[EMAIL])]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), FIRST_STATEMENT_AUDIT_ONLY);
    }

    #[tokio::test]
    async fn test_two_audit_statements_are_rejected() {
        let err = read(config(vec![audit_statement(&[EMAIL]), audit_statement(&[LICENSE])]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Mapper(MapperError::InvariantViolation(ref msg)) if msg == SECOND_STATEMENT_DEIDENTIFY_ONLY
        ));
    }

    #[tokio::test]
    async fn test_mixed_operations_in_first_statement() {
        let mut first = audit_statement(&[EMAIL]);
        first["operation"]["deidentify"] = json!({ "mask_config": {} });

        let err = read(config(vec![first, deidentify_statement()])).await.unwrap_err();
        assert_eq!(err.to_string(), FIRST_STATEMENT_AUDIT_ONLY);
    }

    #[tokio::test]
    async fn test_statement_count_enforced_by_schema() {
        let err = read(config(vec![audit_statement(&[EMAIL])])).await.unwrap_err();
        assert!(matches!(err, ProviderError::Mapper(MapperError::Schema { .. })));
    }

    #[tokio::test]
    async fn test_empty_required_blocks_are_rejected() {
        let mut second = deidentify_statement();
        second["operation"]["deidentify"] = json!({ "mask_config": [] });
        let err = read(config(vec![audit_statement(&[EMAIL]), second]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Mapper(MapperError::Schema { ref path, .. })
                if path == "statement.1.operation.0.deidentify.0.mask_config"
        ));

        let mut first = audit_statement(&[EMAIL]);
        first["operation"]["audit"] = json!({ "findings_destination": [] });
        let err = read(config(vec![first, deidentify_statement()]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Mapper(MapperError::Schema { ref path, .. })
                if path == "statement.0.operation.0.audit.0.findings_destination"
        ));
    }

    #[test]
    fn test_empty_configuration_block_is_kept() {
        let tree = AttrMap::new()
            .with(ATTR_NAME, "Test")
            .with(ATTR_CONFIGURATION, AttrValue::List(vec![AttrValue::Null]));
        let document = expand_document(&tree);

        assert_eq!(document.configuration, Some(PolicyConfiguration::default()));
        assert_eq!(
            to_canonical_json(&document, 0).unwrap(),
            r#"{"Configuration":{},"Name":"Test"}"#
        );
    }

    #[test]
    fn test_malformed_statement_is_skipped_then_rejected() {
        let statement = AttrMap::new().with(
            "operation",
            AttrValue::block(AttrMap::new().with("audit", AttrValue::empty_block())),
        );
        let tree = AttrMap::new().with(
            ATTR_STATEMENT,
            AttrValue::List(vec![AttrValue::Map(statement), AttrValue::from("not a block")]),
        );

        let document = expand_document(&tree);
        assert_eq!(document.statements.len(), 1);
        assert!(matches!(
            document.validate(),
            Err(MapperError::InvariantViolation(_))
        ));
    }
}
