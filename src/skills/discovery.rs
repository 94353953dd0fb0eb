//! スキル探索
//!
//! 作業ディレクトリからリポジトリ境界（`.git` を含む祖先）まで遡り、
//! 各スコープの `skill/<name>/SKILL.md` と `skills/<name>/SKILL.md` を収集する。
//! 収集した候補はそれぞれ独立に検証する。

use anyhow::{Context, Result};
use futures::future::join_all;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::descriptor::SkillDescriptor;
use super::error::ValidationError;
use super::validator;
use crate::config::DiscoveryConfig;

/// 記述子ファイル名（大文字小文字を区別）
pub const SKILL_FILENAME: &str = "SKILL.md";

/// スコープ直下で認識するレイアウト
pub const LAYOUT_DIRS: &[&str] = &["skill", "skills"];

/// スキルが見つかったスコープ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// プロジェクトローカル
    Project,
    /// ユーザーグローバル設定
    Global,
    /// 関連ツールとの互換ルート
    Compatibility,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Project => "project",
            Scope::Global => "global",
            Scope::Compatibility => "compatibility",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 探索ルート（この下の skill/ と skills/ を見る）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRoot {
    pub path: PathBuf,
    pub scope: Scope,
}

/// 候補となる SKILL.md の位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillLocation {
    /// SKILL.md へのパス
    pub path: PathBuf,
    /// 含まれているディレクトリの名前
    pub directory: String,
    pub scope: Scope,
}

/// 検証を通過したスキル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredSkill {
    pub location: SkillLocation,
    pub descriptor: SkillDescriptor,
}

/// 読み込めなかった、または検証に失敗した候補
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSkill {
    pub location: SkillLocation,
    pub problem: Problem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// ファイル配置が期待と違う（SKILL.md がない、ファイル名の大文字小文字違いなど）
    Layout(String),
    /// ファイル読み込み失敗
    Unreadable(String),
    /// 検証失敗
    Invalid(ValidationError),
}

impl Problem {
    pub fn kind(&self) -> &'static str {
        match self {
            Problem::Layout(_) => "layout",
            Problem::Unreadable(_) => "unreadable",
            Problem::Invalid(err) => err.kind(),
        }
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Problem::Layout(msg) => write!(f, "{}", msg),
            Problem::Unreadable(msg) => write!(f, "unreadable: {}", msg),
            Problem::Invalid(err) => write!(f, "{}", err),
        }
    }
}

/// 探索結果
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub valid: Vec<DiscoveredSkill>,
    pub invalid: Vec<InvalidSkill>,
}

/// `start` から遡って最初に `.git` を持つディレクトリ
pub fn find_repository_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// 探索ルートを探索順（近いプロジェクト → グローバル → 互換）に列挙
pub fn search_roots(start: &Path, config: &DiscoveryConfig) -> Vec<SearchRoot> {
    let mut roots: Vec<SearchRoot> = Vec::new();
    let mut push = |path: PathBuf, scope: Scope| {
        if !roots.iter().any(|r| r.path == path) {
            roots.push(SearchRoot { path, scope });
        }
    };

    let boundary = if config.stop_at_git_root {
        find_repository_root(start)
    } else {
        None
    };

    for dir in start.ancestors() {
        for name in &config.project_dirs {
            push(dir.join(name), Scope::Project);
        }
        for name in &config.compatibility_dirs {
            push(dir.join(name), Scope::Compatibility);
        }
        if boundary.as_deref() == Some(dir) {
            break;
        }
    }

    if let Some(global) = config.resolved_global_root() {
        push(global, Scope::Global);
    }
    if let Some(compat) = config.resolved_compatibility_root() {
        push(compat, Scope::Compatibility);
    }

    roots
}

/// ディレクトリに名前が完全一致するファイルがあるか
///
/// 大文字小文字を区別しないファイルシステムでも `skill.md` を拾わないよう、
/// `exists()` ではなくエントリ名を比較する。
pub async fn contains_exact_file(dir: &Path, file_name: &str) -> std::io::Result<bool> {
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name().to_str() == Some(file_name) && entry.file_type().await?.is_file() {
            return Ok(true);
        }
    }
    Ok(false)
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

/// 1つのルートから SKILL.md 候補を収集
pub async fn find_candidates(root: &SearchRoot) -> Result<Vec<SkillLocation>> {
    let mut candidates = Vec::new();

    for layout in LAYOUT_DIRS {
        let layout_dir = root.path.join(layout);
        if !is_dir(&layout_dir).await {
            continue;
        }

        let mut entries = fs::read_dir(&layout_dir)
            .await
            .with_context(|| format!("Failed to read {}", layout_dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let skill_dir = entry.path();
            if !is_dir(&skill_dir).await {
                continue;
            }
            match contains_exact_file(&skill_dir, SKILL_FILENAME).await {
                Ok(true) => candidates.push(SkillLocation {
                    path: skill_dir.join(SKILL_FILENAME),
                    directory: entry.file_name().to_string_lossy().to_string(),
                    scope: root.scope,
                }),
                Ok(false) => {
                    tracing::debug!("No {} in {}", SKILL_FILENAME, skill_dir.display());
                }
                Err(e) => {
                    tracing::warn!("Failed to scan {}: {}", skill_dir.display(), e);
                }
            }
        }
    }

    candidates.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(candidates)
}

/// 候補を読み込んで検証
pub async fn load_candidate(location: SkillLocation) -> std::result::Result<DiscoveredSkill, InvalidSkill> {
    let text = match fs::read_to_string(&location.path).await {
        Ok(text) => text,
        Err(e) => {
            return Err(InvalidSkill {
                location,
                problem: Problem::Unreadable(e.to_string()),
            })
        }
    };

    match validator::validate(&location.directory, &text) {
        Ok(descriptor) => Ok(DiscoveredSkill { location, descriptor }),
        Err(err) => Err(InvalidSkill {
            location,
            problem: Problem::Invalid(err),
        }),
    }
}

/// 全ルートを探索し、全候補を並行に検証
///
/// 同名スキルの解決は行わない。探索順に全件返す。
pub async fn discover(roots: &[SearchRoot]) -> Discovery {
    let mut locations = Vec::new();
    for root in roots {
        match find_candidates(root).await {
            Ok(found) => {
                tracing::debug!(
                    "Found {} candidates under {} ({})",
                    found.len(),
                    root.path.display(),
                    root.scope
                );
                locations.extend(found);
            }
            Err(e) => tracing::warn!("Failed to discover skills from {}: {:#}", root.path.display(), e),
        }
    }

    let results = join_all(locations.into_iter().map(load_candidate)).await;

    let mut discovery = Discovery::default();
    for result in results {
        match result {
            Ok(skill) => {
                tracing::debug!(
                    "Loaded skill: {} from {}",
                    skill.descriptor.name,
                    skill.location.path.display()
                );
                discovery.valid.push(skill);
            }
            Err(invalid) => {
                tracing::info!(
                    "Rejected {}: {}",
                    invalid.location.path.display(),
                    invalid.problem
                );
                discovery.invalid.push(invalid);
            }
        }
    }

    discovery
}
