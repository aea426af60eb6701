use crate::utils;
use cloudglue_provider::Provider;

pub fn handle(provider: &Provider, type_name: &str) -> anyhow::Result<()> {
    let schema = provider.schema(type_name)?;
    utils::print_json(schema)
}
