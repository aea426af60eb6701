mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cloudglue")]
#[command(about = "スキーマで宣言し、AWS とつなぐ。", long_about = None)]
struct Cli {
    /// 状態ファイル (.cloudglue/state.json) を置くディレクトリ
    #[arg(long, global = true, env = "CLOUDGLUE_PROJECT_ROOT")]
    project_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 登録済みのデータソースとリソースの一覧を表示
    List,
    /// 型のスキーマを JSON で表示
    Schema {
        /// 型名 (例: aws_medialive_multiplex)
        type_name: String,
    },
    /// データソースを読み取る
    Read {
        /// データソースの型名
        type_name: String,
        /// 設定ファイル (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// 変更計画を表示
    Plan {
        /// リソースの型名
        type_name: String,
        /// リソース名
        name: String,
        /// 設定ファイル (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
    /// 変更計画を適用
    Apply {
        /// リソースの型名
        type_name: String,
        /// リソース名
        name: String,
        /// 設定ファイル (JSON)
        #[arg(short, long)]
        config: PathBuf,
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// 既存のリモートオブジェクトを管理下に置く
    Import {
        /// リソースの型名
        type_name: String,
        /// リソース名
        name: String,
        /// リモートオブジェクトの ID
        id: String,
    },
    /// リソースを削除
    Destroy {
        /// リソースの型名
        type_name: String,
        /// リソース名
        name: String,
        /// 確認なしで実行
        #[arg(short, long)]
        yes: bool,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout は JSON 出力に使うので、ログは stderr へ
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("cloudglue {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = cloudglue_config::load()?;
    let provider = utils::build_provider(&config).await;
    let project_root = match cli.project_root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::List => commands::list::handle(&provider),
        Commands::Schema { type_name } => commands::schema::handle(&provider, &type_name),
        Commands::Read { type_name, config } => {
            commands::read::handle(&provider, &type_name, &config).await
        }
        Commands::Plan {
            type_name,
            name,
            config,
        } => commands::plan::handle(&provider, &project_root, &type_name, &name, &config).await,
        Commands::Apply {
            type_name,
            name,
            config,
            yes,
        } => {
            commands::apply::handle(&provider, &project_root, &type_name, &name, &config, yes)
                .await
        }
        Commands::Import {
            type_name,
            name,
            id,
        } => commands::import::handle(&provider, &project_root, &type_name, &name, &id).await,
        Commands::Destroy {
            type_name,
            name,
            yes,
        } => commands::destroy::handle(&provider, &project_root, &type_name, &name, yes).await,
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    }
}
