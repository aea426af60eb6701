use crate::utils;
use cloudglue_provider::Provider;
use colored::Colorize;
use std::path::Path;

pub async fn handle(provider: &Provider, type_name: &str, config: &Path) -> anyhow::Result<()> {
    let config = utils::read_config_file(config)?;
    let result = provider.read_data_source(type_name, &config).await?;

    eprintln!("{} {} ({})", "✓".green(), type_name.cyan(), result.id);
    utils::print_json(&serde_json::json!({
        "id": result.id,
        "state": result.state,
    }))
}
