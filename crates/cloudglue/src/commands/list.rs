use crate::utils;
use cloudglue_provider::Provider;

pub fn handle(provider: &Provider) -> anyhow::Result<()> {
    utils::print_json(&serde_json::json!({
        "provider": provider.name(),
        "data_sources": provider.data_source_types(),
        "resources": provider.resource_types(),
    }))
}
