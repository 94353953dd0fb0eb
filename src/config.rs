//! 設定ファイル管理モジュール
//!
//! skill-check.toml から探索ルートと権限設定を読み込む。
//! すべての項目に既定値があり、ファイルがなければ既定値で動作する。

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::skills::SkillPermissions;

/// 設定ファイルパスを上書きする環境変数
pub const CONFIG_ENV: &str = "SKILL_CHECK_CONFIG";

/// カレントディレクトリで探す設定ファイル名
pub const LOCAL_CONFIG_FILE: &str = "skill-check.toml";

/// アプリケーション全体の設定
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// 探索設定
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    /// 権限設定
    #[serde(default)]
    pub permission: PermissionConfig,
}

/// 探索設定
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// 遡った各ディレクトリで見るプロジェクトローカルのディレクトリ名
    #[serde(default = "default_project_dirs")]
    pub project_dirs: Vec<String>,
    /// 遡った各ディレクトリで見る互換ディレクトリ名
    #[serde(default = "default_compatibility_dirs")]
    pub compatibility_dirs: Vec<String>,
    /// ユーザーグローバルのルート（未指定なら既定値）
    #[serde(default)]
    pub global_root: Option<PathBuf>,
    /// ユーザー互換ルート（未指定なら既定値）
    #[serde(default)]
    pub compatibility_root: Option<PathBuf>,
    /// 未指定のユーザールートに既定値を使うか
    #[serde(default = "default_true")]
    pub include_default_user_roots: bool,
    /// `.git` を含むディレクトリで遡りを止めるか
    #[serde(default = "default_true")]
    pub stop_at_git_root: bool,
}

/// 権限設定
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionConfig {
    /// スキル名グロブ → allow / deny / ask
    #[serde(default)]
    pub skill: SkillPermissions,
}

// デフォルト値を返す関数群
fn default_project_dirs() -> Vec<String> {
    vec![".opencode".to_string()]
}

fn default_compatibility_dirs() -> Vec<String> {
    vec![".claude".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            project_dirs: default_project_dirs(),
            compatibility_dirs: default_compatibility_dirs(),
            global_root: None,
            compatibility_root: None,
            include_default_user_roots: default_true(),
            stop_at_git_root: default_true(),
        }
    }
}

impl DiscoveryConfig {
    /// ユーザーグローバルのルート（~/.config/opencode）
    pub fn resolved_global_root(&self) -> Option<PathBuf> {
        self.global_root.clone().or_else(|| {
            if self.include_default_user_roots {
                dirs::config_dir().map(|dir| dir.join("opencode"))
            } else {
                None
            }
        })
    }

    /// ユーザー互換ルート（~/.claude）
    pub fn resolved_compatibility_root(&self) -> Option<PathBuf> {
        self.compatibility_root.clone().or_else(|| {
            if self.include_default_user_roots {
                dirs::home_dir().map(|home| home.join(".claude"))
            } else {
                None
            }
        })
    }
}

impl Config {
    /// TOMLファイルから設定を読み込む
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// TOML文字列から設定をパース
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML config")
    }

    /// 設定ファイルの候補パス（存在するもの）
    pub fn default_config_path() -> Option<PathBuf> {
        if let Ok(config_path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(config_path));
        }

        // カレントディレクトリの skill-check.toml
        let cwd_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        // ~/.config/skill-check/config.toml
        dirs::config_dir()
            .map(|dir| dir.join("skill-check").join("config.toml"))
            .filter(|path| path.exists())
    }

    /// 明示パス → 既定の候補 → 既定値 の順で読み込む
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        match Self::default_config_path() {
            Some(path) => {
                tracing::info!("Using config {}", path.display());
                Self::load_from_file(&path)
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}
