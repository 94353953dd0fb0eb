//! skill-check: SKILL.md記述子の検証ツール
//!
//! エージェントスキルのディレクトリを探索し、frontmatterの形式・名前規則・
//! ディレクトリ名との一致を検証する。中心となる [`validate`] は副作用のない純粋関数。

pub mod cli;
pub mod config;
pub mod skills;

// 主要な型の再エクスポート
pub use config::{Config, DiscoveryConfig, PermissionConfig};
pub use skills::{
    validate, DiscoveredSkill, PermissionLevel, Scope, SkillCatalog, SkillDescriptor,
    SkillPermissions, ValidationError,
};

/// バージョン情報
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
