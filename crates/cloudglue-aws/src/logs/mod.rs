//! Amazon CloudWatch Logs

pub mod policy_document;

pub use policy_document::{DataProtectionPolicyDocument, DataProtectionPolicyDocumentDataSource};
