use super::plan::refresh_and_plan;
use crate::utils;
use cloudglue_provider::{Provider, StateManager};
use colored::Colorize;
use std::path::Path;

pub async fn handle(
    provider: &Provider,
    project_root: &Path,
    type_name: &str,
    name: &str,
    config: &Path,
    yes: bool,
) -> anyhow::Result<()> {
    let config = utils::read_config_file(config)?;
    let manager = StateManager::new(project_root);
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    let plan = refresh_and_plan(provider, &mut state, type_name, name, Some(&config)).await?;
    utils::print_plan(&plan);

    if !plan.has_changes {
        lock.release().await?;
        return Ok(());
    }

    // 確認（--yesが指定されていない場合）
    if !yes {
        eprintln!();
        eprintln!("実行するには --yes オプションを指定してください");
        lock.release().await?;
        return Ok(());
    }

    let result = provider.apply(&plan, &mut state).await;
    manager.save(&state).await?;
    lock.release().await?;

    for failure in &result.failed {
        eprintln!(
            "{} {}: {}",
            "✗".red(),
            failure.action_id,
            failure.error.as_deref().unwrap_or_default()
        );
    }
    utils::print_json(&result)?;

    if !result.is_success() {
        anyhow::bail!("{} 件のアクションが失敗しました", result.failed.len());
    }
    eprintln!("{}", "✓ 適用が完了しました".green());
    Ok(())
}
