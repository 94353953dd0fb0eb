use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// スキル読み込み権限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// 即時許可
    #[default]
    Allow,
    /// 拒否（一覧からも隠す）
    Deny,
    /// 読み込み前に確認
    Ask,
}

impl PermissionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::Allow => "allow",
            PermissionLevel::Deny => "deny",
            PermissionLevel::Ask => "ask",
        }
    }
}

/// 名前グロブ → 権限のマッピング（設定の `[permission.skill]`）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillPermissions {
    pub patterns: BTreeMap<String, PermissionLevel>,
}

/// ワイルドカード以外の文字数（具体性の指標）
fn literal_len(pattern: &str) -> usize {
    pattern
        .chars()
        .filter(|c| !matches!(c, '*' | '?' | '[' | ']'))
        .count()
}

impl SkillPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pattern: impl Into<String>, level: PermissionLevel) -> Self {
        self.patterns.insert(pattern.into(), level);
        self
    }

    /// スキル名の権限を判定
    ///
    /// 完全一致 → マッチしたグロブのうち最も具体的なもの → 既定の Allow。
    pub fn check(&self, skill_name: &str) -> PermissionLevel {
        if let Some(&level) = self.patterns.get(skill_name) {
            return level;
        }

        let mut best: Option<(usize, usize, PermissionLevel)> = None;
        for (raw, &level) in &self.patterns {
            let pattern = match Pattern::new(raw) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("Ignoring invalid skill permission pattern '{}': {}", raw, e);
                    continue;
                }
            };
            if !pattern.matches(skill_name) {
                continue;
            }
            let rank = (literal_len(raw), raw.len());
            if best.map_or(true, |(lit, len, _)| rank > (lit, len)) {
                best = Some((rank.0, rank.1, level));
            }
        }

        best.map(|(_, _, level)| level).unwrap_or_default()
    }

    /// 一覧に表示してよいか（Deny 以外）
    pub fn is_visible(&self, skill_name: &str) -> bool {
        self.check(skill_name) != PermissionLevel::Deny
    }
}
