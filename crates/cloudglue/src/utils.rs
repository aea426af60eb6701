use anyhow::Context;
use cloudglue_aws::AwsClient;
use cloudglue_config::ProviderConfig;
use cloudglue_provider::{ActionType, Plan, Provider, RetryConfig};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// 設定からプロバイダを組み立てる
pub async fn build_provider(config: &ProviderConfig) -> Provider {
    let client = AwsClient::new(config.region.clone())
        .with_default_tags(config.default_tags.clone())
        .with_retry(RetryConfig::default().with_max_attempts(config.max_retries))
        .with_poll_interval(Duration::from_secs(config.poll_interval_secs));

    #[cfg(feature = "aws-sdk")]
    let client = client.with_sdk_clients(config.profile.as_deref()).await;

    tracing::debug!(region = ?config.region, "AWS プロバイダを初期化しました");
    cloudglue_aws::provider(client)
}

/// 設定ファイル (JSON) を読み込む
pub fn read_config_file(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("設定ファイルを読み込めません: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("設定ファイルの JSON が不正です: {}", path.display()))
}

/// 結果を JSON で stdout に出力
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 計画の概要を stderr に表示
pub fn print_plan(plan: &Plan) {
    if !plan.has_changes {
        eprintln!("{}", "変更はありません".green());
        return;
    }

    eprintln!("{}", "実行計画:".bold());
    for action in &plan.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green(),
            ActionType::Update => "~".yellow(),
            ActionType::Replace => "-/+".red(),
            ActionType::Delete => "-".red(),
            ActionType::NoOp => continue,
        };
        eprintln!("  {} {}", marker, action.description);
        for attribute in &action.changed_attributes {
            eprintln!("      {}", attribute.dimmed());
        }
    }
    eprintln!();
    eprintln!("{}", plan.summary().to_string().bold());
}
