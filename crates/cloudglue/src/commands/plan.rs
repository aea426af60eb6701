use crate::utils;
use cloudglue_provider::{GlobalState, Plan, Provider, StateManager};
use std::path::Path;

/// 管理中ならリモートの状態を取り込んでから計画を立てる
pub async fn refresh_and_plan(
    provider: &Provider,
    state: &mut GlobalState,
    type_name: &str,
    name: &str,
    config: Option<&serde_json::Value>,
) -> anyhow::Result<Plan> {
    if state
        .get_resource(&GlobalState::key(type_name, name))
        .is_some()
    {
        provider.refresh(type_name, name, state).await?;
    }
    Ok(provider.plan(type_name, name, config, state)?)
}

pub async fn handle(
    provider: &Provider,
    project_root: &Path,
    type_name: &str,
    name: &str,
    config: &Path,
) -> anyhow::Result<()> {
    let config = utils::read_config_file(config)?;
    let manager = StateManager::new(project_root);
    let mut state = manager.load().await?;

    // 計画は状態ファイルを書き換えない
    let plan = refresh_and_plan(provider, &mut state, type_name, name, Some(&config)).await?;

    utils::print_plan(&plan);
    utils::print_json(&plan)
}
