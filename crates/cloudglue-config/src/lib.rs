//! cloudglue のプロバイダ設定
//!
//! リージョン、プロファイル、デフォルトタグ、ポーリング間隔、リトライ回数を
//! YAML ファイルから読み込む。

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "CLOUDGLUE_CONFIG_PATH";
const CANDIDATES: [&str; 4] = [
    "cloudglue.local.yaml",
    ".cloudglue.local.yaml",
    "cloudglue.yaml",
    ".cloudglue.yaml",
];

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_MAX_RETRIES: u32 = 3;

/// プロバイダ設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// AWS リージョン (未指定なら SDK のデフォルトチェーン)
    pub region: Option<String>,
    /// 共有クレデンシャルのプロファイル名
    pub profile: Option<String>,
    /// すべてのリソースに付与するタグ
    pub default_tags: BTreeMap<String, String>,
    /// 状態待ちのポーリング間隔 (秒)
    pub poll_interval_secs: u64,
    /// API 呼び出しの最大試行回数
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            default_tags: BTreeMap::new(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ProviderConfig {
    /// YAML ファイルから読み込む
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // 空ファイルはデフォルト扱い
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs は 1 以上を指定してください".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "max_retries は 1 以上を指定してください".to_string(),
            ));
        }
        Ok(())
    }

    /// 環境変数 AWS_REGION / AWS_PROFILE で上書き
    pub fn apply_env(mut self) -> Self {
        if let Some(region) = env_non_empty("AWS_REGION") {
            self.region = Some(region);
        }
        if let Some(profile) = env_non_empty("AWS_PROFILE") {
            self.profile = Some(profile);
        }
        self
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// cloudglue の設定ディレクトリ (~/.config/cloudglue)
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("cloudglue"))
        .ok_or(ConfigError::ConfigDirNotFound)
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 CLOUDGLUE_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: cloudglue.local.yaml, .cloudglue.local.yaml, cloudglue.yaml, .cloudglue.yaml
/// 3. ./.cloudglue/ ディレクトリ内: 同様の順序
/// 4. ~/.config/cloudglue/config.yaml (グローバル設定)
pub fn find_config_file() -> Result<Option<PathBuf>> {
    // 1. 環境変数で直接指定
    if let Some(config_path) = env_non_empty(CONFIG_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!(path = %path.display(), "{} のファイルが存在しません", CONFIG_ENV);
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリで検索
    if let Some(path) = first_existing(&current_dir) {
        return Ok(Some(path));
    }

    // 3. ./.cloudglue/ ディレクトリで検索
    let project_dir = current_dir.join(".cloudglue");
    if project_dir.is_dir() {
        if let Some(path) = first_existing(&project_dir) {
            return Ok(Some(path));
        }
    }

    // 4. グローバル設定ファイル
    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|filename| dir.join(filename))
        .find(|path| path.exists())
}

/// 設定を読み込む。ファイルがなければデフォルト値を使う
pub fn load() -> Result<ProviderConfig> {
    let config = match find_config_file()? {
        Some(path) => {
            tracing::debug!(path = %path.display(), "設定ファイルを読み込みます");
            ProviderConfig::from_file(&path)?
        }
        None => {
            tracing::debug!("設定ファイルが見つからないためデフォルト設定を使用します");
            ProviderConfig::default()
        }
    };
    Ok(config.apply_env())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    struct CwdGuard(PathBuf);

    impl CwdGuard {
        fn enter(dir: &Path) -> Self {
            let original = std::env::current_dir().unwrap();
            std::env::set_current_dir(dir).unwrap();
            Self(original)
        }
    }

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    fn clear_env() {
        unsafe {
            std::env::remove_var(CONFIG_ENV);
            std::env::remove_var("AWS_REGION");
            std::env::remove_var("AWS_PROFILE");
        }
    }

    #[test]
    fn test_parse_config() {
        let config = ProviderConfig::from_yaml(
            r#"
region: ap-northeast-1
profile: media
default_tags:
  team: media
  env: dev
poll_interval_secs: 10
"#,
        )
        .unwrap();

        assert_eq!(config.region.as_deref(), Some("ap-northeast-1"));
        assert_eq!(config.profile.as_deref(), Some("media"));
        assert_eq!(config.default_tags.get("team").map(String::as_str), Some("media"));
        assert_eq!(config.poll_interval_secs, 10);
        // 未指定はデフォルト
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(ProviderConfig::from_yaml("").unwrap(), ProviderConfig::default());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            ProviderConfig::from_yaml("regoin: us-east-1"),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            ProviderConfig::from_yaml("poll_interval_secs: 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cloudglue.yaml");
        fs::write(&path, "max_retries: many").unwrap();

        let err = ProviderConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("cloudglue.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_local_priority() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("cloudglue.yaml"), "region: us-east-1").unwrap();
        fs::write(temp_dir.path().join("cloudglue.local.yaml"), "region: us-west-2").unwrap();
        let _cwd = CwdGuard::enter(temp_dir.path());

        let path = find_config_file().unwrap().unwrap();
        assert!(path.ends_with("cloudglue.local.yaml"));
        assert_eq!(load().unwrap().region.as_deref(), Some("us-west-2"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_project_dir() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        let project_dir = temp_dir.path().join(".cloudglue");
        fs::create_dir(&project_dir).unwrap();
        fs::write(project_dir.join("cloudglue.yaml"), "max_retries: 5").unwrap();
        let _cwd = CwdGuard::enter(temp_dir.path());

        let path = find_config_file().unwrap().unwrap();
        assert!(path.ends_with(".cloudglue/cloudglue.yaml"));
        assert_eq!(load().unwrap().max_retries, 5);
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "profile: custom").unwrap();

        unsafe {
            std::env::set_var(CONFIG_ENV, config_path.to_str().unwrap());
        }

        assert_eq!(find_config_file().unwrap(), Some(config_path));
        assert_eq!(load().unwrap().profile.as_deref(), Some("custom"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("cloudglue.yaml"), "region: us-east-1\nprofile: dev").unwrap();
        let _cwd = CwdGuard::enter(temp_dir.path());

        unsafe {
            std::env::set_var("AWS_REGION", "eu-west-1");
        }

        let config = load().unwrap();
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.profile.as_deref(), Some("dev"));

        clear_env();
    }
}
