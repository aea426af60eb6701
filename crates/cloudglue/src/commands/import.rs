use crate::utils;
use cloudglue_provider::{GlobalState, Provider, StateManager};
use colored::Colorize;
use std::path::Path;

pub async fn handle(
    provider: &Provider,
    project_root: &Path,
    type_name: &str,
    name: &str,
    id: &str,
) -> anyhow::Result<()> {
    let manager = StateManager::new(project_root);
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    provider.import(type_name, name, id, &mut state).await?;
    manager.save(&state).await?;
    lock.release().await?;

    let key = GlobalState::key(type_name, name);
    eprintln!("{} {} をインポートしました", "✓".green(), key.cyan());
    utils::print_json(&state.get_resource(&key))
}
