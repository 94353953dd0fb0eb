use std::collections::BTreeMap;
use std::path::Path;

use super::discovery::{self, DiscoveredSkill, Discovery, InvalidSkill};
use super::permissions::{PermissionLevel, SkillPermissions};
use crate::config::DiscoveryConfig;

/// スキルカタログ - 探索結果と権限を束ねる
///
/// 複数スコープで同名のスキルが見つかってもどれかを選ぶことはしない。
/// 全件を保持し、重複として報告する。
pub struct SkillCatalog {
    /// 検証済みスキル（探索順）
    skills: Vec<DiscoveredSkill>,
    /// 検証に失敗した候補
    invalid: Vec<InvalidSkill>,
    /// 権限設定
    permissions: SkillPermissions,
}

/// 権限判定つきのエントリ
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry<'a> {
    pub skill: &'a DiscoveredSkill,
    pub permission: PermissionLevel,
}

impl SkillCatalog {
    /// 空のカタログを作成
    pub fn new(permissions: SkillPermissions) -> Self {
        Self {
            skills: Vec::new(),
            invalid: Vec::new(),
            permissions,
        }
    }

    /// 探索結果からカタログを作成
    pub fn from_discovery(discovery: Discovery, permissions: SkillPermissions) -> Self {
        let mut catalog = Self::new(permissions);
        catalog.extend(discovery);
        catalog
    }

    /// `start` を起点に探索して読み込み
    pub async fn load(
        start: &Path,
        config: &DiscoveryConfig,
        permissions: SkillPermissions,
    ) -> Self {
        let roots = discovery::search_roots(start, config);
        tracing::debug!("Searching {} skill roots from {}", roots.len(), start.display());
        let found = discovery::discover(&roots).await;
        let catalog = Self::from_discovery(found, permissions);
        tracing::info!(
            "Loaded {} skills ({} invalid)",
            catalog.len(),
            catalog.invalid().len()
        );
        catalog
    }

    /// 探索結果を追加
    pub fn extend(&mut self, discovery: Discovery) {
        self.skills.extend(discovery.valid);
        self.invalid.extend(discovery.invalid);
    }

    /// 権限設定を取得
    pub fn permissions(&self) -> &SkillPermissions {
        &self.permissions
    }

    /// 名前に一致する全スキル（全スコープ）
    pub fn find(&self, name: &str) -> Vec<&DiscoveredSkill> {
        self.skills
            .iter()
            .filter(|s| s.descriptor.name == name)
            .collect()
    }

    /// 全スキル（Deny も含む）
    pub fn all(&self) -> Vec<CatalogEntry<'_>> {
        self.skills
            .iter()
            .map(|skill| CatalogEntry {
                skill,
                permission: self.permissions.check(&skill.descriptor.name),
            })
            .collect()
    }

    /// 選択可能なスキル（Deny を除く）
    pub fn visible(&self) -> Vec<CatalogEntry<'_>> {
        self.all()
            .into_iter()
            .filter(|entry| self.permissions.is_visible(&entry.skill.descriptor.name))
            .collect()
    }

    /// 検証に失敗した候補
    pub fn invalid(&self) -> &[InvalidSkill] {
        &self.invalid
    }

    /// 複数箇所で定義された名前
    pub fn duplicates(&self) -> BTreeMap<&str, Vec<&DiscoveredSkill>> {
        let mut by_name: BTreeMap<&str, Vec<&DiscoveredSkill>> = BTreeMap::new();
        for skill in &self.skills {
            by_name
                .entry(skill.descriptor.name.as_str())
                .or_default()
                .push(skill);
        }
        by_name.retain(|_, skills| skills.len() > 1);
        by_name
    }

    /// 検証済みスキル数
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl Default for SkillCatalog {
    fn default() -> Self {
        Self::new(SkillPermissions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::discovery::{Problem, Scope, SkillLocation};
    use crate::skills::error::ValidationError;
    use crate::skills::validator;
    use std::path::PathBuf;

    fn skill(name: &str, scope: Scope) -> DiscoveredSkill {
        let text = format!("---\nname: {}\ndescription: {} skill\n---\n", name, name);
        DiscoveredSkill {
            location: SkillLocation {
                path: PathBuf::from(format!("/{}/skill/{}/SKILL.md", scope, name)),
                directory: name.to_string(),
                scope,
            },
            descriptor: validator::validate(name, &text).unwrap(),
        }
    }

    fn catalog(permissions: SkillPermissions) -> SkillCatalog {
        SkillCatalog::from_discovery(
            Discovery {
                valid: vec![
                    skill("git-release", Scope::Project),
                    skill("internal-debug", Scope::Project),
                    skill("git-release", Scope::Global),
                    skill("docs", Scope::Compatibility),
                ],
                invalid: vec![InvalidSkill {
                    location: SkillLocation {
                        path: PathBuf::from("/project/skill/Broken/SKILL.md"),
                        directory: "Broken".to_string(),
                        scope: Scope::Project,
                    },
                    problem: Problem::Invalid(ValidationError::InvalidName("Broken".to_string())),
                }],
            },
            permissions,
        )
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = SkillCatalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.duplicates().is_empty());
    }

    #[test]
    fn test_find_returns_every_scope() {
        let catalog = catalog(SkillPermissions::default());
        let found = catalog.find("git-release");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].location.scope, Scope::Project);
        assert_eq!(found[1].location.scope, Scope::Global);
        assert!(catalog.find("missing").is_empty());
    }

    #[test]
    fn test_duplicates_are_reported() {
        let catalog = catalog(SkillPermissions::default());
        let duplicates = catalog.duplicates();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates["git-release"].len(), 2);
    }

    #[test]
    fn test_deny_hides_from_visible() {
        let catalog = catalog(SkillPermissions::new().with("internal-*", PermissionLevel::Deny));
        assert_eq!(catalog.all().len(), 4);

        let visible: Vec<_> = catalog
            .visible()
            .iter()
            .map(|e| e.skill.descriptor.name.clone())
            .collect();
        assert_eq!(visible, vec!["git-release", "git-release", "docs"]);
    }

    #[test]
    fn test_ask_stays_visible() {
        let catalog = catalog(SkillPermissions::new().with("docs", PermissionLevel::Ask));
        let docs = catalog
            .visible()
            .into_iter()
            .find(|e| e.skill.descriptor.name == "docs")
            .unwrap();
        assert_eq!(docs.permission, PermissionLevel::Ask);
    }

    #[test]
    fn test_len_and_invalid() {
        let catalog = catalog(SkillPermissions::default());
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.invalid().len(), 1);
        assert_eq!(catalog.invalid()[0].problem.kind(), "invalid_name");
    }
}
