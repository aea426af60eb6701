use crate::utils;
use cloudglue_provider::{Provider, StateManager};
use colored::Colorize;
use std::path::Path;

pub async fn handle(
    provider: &Provider,
    project_root: &Path,
    type_name: &str,
    name: &str,
    yes: bool,
) -> anyhow::Result<()> {
    let manager = StateManager::new(project_root);
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    let plan = provider.plan(type_name, name, None, &state)?;
    utils::print_plan(&plan);

    if !plan.has_changes {
        lock.release().await?;
        return Ok(());
    }

    if !yes {
        eprintln!();
        eprintln!(
            "{}",
            "警告: リモートのオブジェクトを削除します。".yellow()
        );
        eprintln!("実行するには --yes オプションを指定してください");
        lock.release().await?;
        return Ok(());
    }

    let result = provider.apply(&plan, &mut state).await;
    manager.save(&state).await?;
    lock.release().await?;
    utils::print_json(&result)?;

    if !result.is_success() {
        anyhow::bail!("削除に失敗しました");
    }
    eprintln!("{}", "✓ 削除が完了しました".green());
    Ok(())
}
