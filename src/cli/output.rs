//! 色付き出力モジュール
//!
//! 検証結果とカタログをテキスト（色付き）またはJSONで出力する

use std::io::{self, Write};
use crossterm::{
    execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use serde_json::{json, Value};

use super::commands::ValidationOutcome;
use crate::skills::{CatalogEntry, DiscoveredSkill, InvalidSkill, PermissionLevel, SkillCatalog};

/// 出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// 人が読む色付きテキスト
    #[default]
    Text,
    /// 機械可読なJSON
    Json,
}

/// Unicodeアイコンとフォールバック文字
pub struct Icons;

impl Icons {
    pub fn success() -> &'static str {
        if Self::supports_unicode() { "✔" } else { "[+]" }
    }

    pub fn error() -> &'static str {
        if Self::supports_unicode() { "✘" } else { "[!]" }
    }

    pub fn warning() -> &'static str {
        if Self::supports_unicode() { "⚠" } else { "[?]" }
    }

    pub fn info() -> &'static str {
        if Self::supports_unicode() { "•" } else { "[i]" }
    }

    /// Unicode対応チェック（環境変数でオーバーライド可能）
    fn supports_unicode() -> bool {
        if std::env::var("SKILL_CHECK_NO_UNICODE").is_ok() {
            return false;
        }
        std::env::var("TERM").map_or(false, |term| {
            !term.contains("dumb") && !term.contains("linux")
        })
    }
}

/// アイコン付きの1行を出力
fn print_marked(color: Color, icon: &str, label: &str, rest: &str) {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        SetForegroundColor(color),
        SetAttribute(Attribute::Bold),
        Print(format!("{} {}", icon, label)),
        SetAttribute(Attribute::Reset),
        ResetColor,
        Print(if rest.is_empty() { "\n".to_string() } else { format!("  {}\n", rest) })
    );
    let _ = stdout.flush();
}

/// 成功メッセージを緑色で出力
pub fn print_success(msg: &str) {
    print_marked(Color::Green, Icons::success(), msg, "");
}

/// エラーメッセージを赤色で出力（stderr）
pub fn print_error(msg: &str) {
    let mut stderr = io::stderr();
    let _ = execute!(
        stderr,
        SetForegroundColor(Color::Red),
        SetAttribute(Attribute::Bold),
        Print(format!("{} ERROR:", Icons::error())),
        SetAttribute(Attribute::Reset),
        ResetColor,
        Print(format!(" {}\n", msg))
    );
}

/// 警告メッセージを黄色で出力
pub fn print_warning(msg: &str) {
    print_marked(Color::Yellow, Icons::warning(), msg, "");
}

/// 情報メッセージをシアンで出力
pub fn print_info(msg: &str) {
    print_marked(Color::Cyan, Icons::info(), msg, "");
}

/// 見出しを太字で出力
fn print_heading(title: &str) {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        SetAttribute(Attribute::Bold),
        Print(format!("{}\n", title)),
        SetAttribute(Attribute::Reset)
    );
}

/// JSONを整形して出力
pub fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 説明を一覧用に切り詰める
pub fn truncate(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    if first_line.chars().count() <= max_chars {
        return first_line.to_string();
    }
    let cut: String = first_line.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

pub fn validation_json(outcomes: &[ValidationOutcome]) -> Value {
    let results: Vec<Value> = outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(descriptor) => json!({
                "path": outcome.path.display().to_string(),
                "directory": outcome.directory,
                "valid": true,
                "name": descriptor.name,
                "description": descriptor.description,
            }),
            Err(problem) => json!({
                "path": outcome.path.display().to_string(),
                "directory": outcome.directory,
                "valid": false,
                "error": { "kind": problem.kind(), "message": problem.to_string() },
            }),
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    json!({
        "passed": outcomes.len() - failed,
        "failed": failed,
        "results": results,
    })
}

fn entry_json(entry: &CatalogEntry<'_>) -> Value {
    json!({
        "name": entry.skill.descriptor.name,
        "description": entry.skill.descriptor.description,
        "scope": entry.skill.location.scope,
        "path": entry.skill.location.path.display().to_string(),
        "permission": entry.permission.as_str(),
    })
}

fn invalid_json(invalid: &InvalidSkill) -> Value {
    json!({
        "directory": invalid.location.directory,
        "scope": invalid.location.scope,
        "path": invalid.location.path.display().to_string(),
        "error": { "kind": invalid.problem.kind(), "message": invalid.problem.to_string() },
    })
}

pub fn catalog_json(catalog: &SkillCatalog, show_all: bool) -> Value {
    let entries = if show_all { catalog.all() } else { catalog.visible() };
    let duplicates: serde_json::Map<String, Value> = catalog
        .duplicates()
        .into_iter()
        .map(|(name, skills)| {
            let paths: Vec<String> = skills
                .iter()
                .map(|s| s.location.path.display().to_string())
                .collect();
            (name.to_string(), json!(paths))
        })
        .collect();

    json!({
        "skills": entries.iter().map(entry_json).collect::<Vec<_>>(),
        "invalid": catalog.invalid().iter().map(invalid_json).collect::<Vec<_>>(),
        "duplicates": duplicates,
    })
}

pub fn skill_json(skill: &DiscoveredSkill, permission: PermissionLevel) -> Value {
    json!({
        "scope": skill.location.scope,
        "path": skill.location.path.display().to_string(),
        "permission": permission.as_str(),
        "descriptor": skill.descriptor,
    })
}

// ---------------------------------------------------------------------------
// テキスト
// ---------------------------------------------------------------------------

pub fn print_validation_report(outcomes: &[ValidationOutcome]) {
    for outcome in outcomes {
        let location = outcome.path.display().to_string();
        match &outcome.result {
            Ok(descriptor) => print_marked(Color::Green, Icons::success(), &descriptor.name, &location),
            Err(problem) => {
                print_marked(Color::Red, Icons::error(), &outcome.directory, &location);
                println!("    {}", problem);
            }
        }
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    println!();
    println!("{} passed, {} failed", outcomes.len() - failed, failed);
}

pub fn print_catalog(catalog: &SkillCatalog, show_all: bool) {
    let entries = if show_all { catalog.all() } else { catalog.visible() };

    print_heading(&format!("Skills ({}):", entries.len()));
    if entries.is_empty() {
        print_info("No skills found");
    }
    let width = entries
        .iter()
        .map(|e| e.skill.descriptor.name.len())
        .max()
        .unwrap_or(0);
    for entry in &entries {
        let permission = match entry.permission {
            PermissionLevel::Allow => String::new(),
            other => format!(" ({})", other.as_str()),
        };
        println!(
            "  {:<width$}  [{}] {}{}",
            entry.skill.descriptor.name,
            entry.skill.location.scope,
            truncate(&entry.skill.descriptor.description, 60),
            permission,
            width = width
        );
    }

    if !catalog.invalid().is_empty() {
        println!();
        print_heading(&format!("Invalid ({}):", catalog.invalid().len()));
        for invalid in catalog.invalid() {
            print_marked(
                Color::Red,
                Icons::error(),
                &invalid.location.directory,
                &invalid.location.path.display().to_string(),
            );
            println!("    {}", invalid.problem);
        }
    }

    let duplicates = catalog.duplicates();
    if !duplicates.is_empty() {
        println!();
        print_heading("Duplicates:");
        for (name, skills) in duplicates {
            print_warning(&format!("{} is defined in {} locations", name, skills.len()));
            for skill in skills {
                println!("    {:<13} {}", skill.location.scope, skill.location.path.display());
            }
        }
    }
}

pub fn print_skill(skill: &DiscoveredSkill) {
    let descriptor = &skill.descriptor;
    print_heading(&descriptor.name);
    println!("{}", descriptor.description);
    println!("scope: {}  path: {}", skill.location.scope, skill.location.path.display());
    if let Some(license) = &descriptor.license {
        println!("license: {}", license);
    }
    if let Some(compatibility) = &descriptor.compatibility {
        println!("compatibility: {}", compatibility);
    }
    for (key, value) in &descriptor.metadata {
        println!("metadata.{}: {}", key, value);
    }
    println!();
    print!("{}", descriptor.body);
    if !descriptor.body.ends_with('\n') {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::{validate, Discovery, Problem, Scope, SkillLocation, SkillPermissions, ValidationError};
    use std::path::PathBuf;

    fn discovered(name: &str, scope: Scope) -> DiscoveredSkill {
        DiscoveredSkill {
            location: SkillLocation {
                path: PathBuf::from(format!("/{}/skill/{}/SKILL.md", scope, name)),
                directory: name.to_string(),
                scope,
            },
            descriptor: validate(
                name,
                &format!("---\nname: {}\ndescription: About {}\n---\nBody\n", name, name),
            )
            .unwrap(),
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("first line\nsecond", 20), "first line");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn test_validation_json() {
        let outcomes = vec![
            ValidationOutcome {
                path: PathBuf::from("/s/git-release/SKILL.md"),
                directory: "git-release".to_string(),
                result: Ok(discovered("git-release", Scope::Project).descriptor),
            },
            ValidationOutcome {
                path: PathBuf::from("/s/git_release/SKILL.md"),
                directory: "git_release".to_string(),
                result: Err(Problem::Invalid(ValidationError::NameMismatch {
                    name: "git-release".to_string(),
                    directory: "git_release".to_string(),
                })),
            },
        ];

        let value = validation_json(&outcomes);
        assert_eq!(value["passed"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["results"][0]["name"], "git-release");
        assert_eq!(value["results"][1]["valid"], false);
        assert_eq!(value["results"][1]["error"]["kind"], "name_mismatch");
    }

    #[test]
    fn test_catalog_json_hides_denied() {
        let catalog = SkillCatalog::from_discovery(
            Discovery {
                valid: vec![
                    discovered("docs", Scope::Project),
                    discovered("internal-tool", Scope::Global),
                    discovered("docs", Scope::Global),
                ],
                invalid: vec![],
            },
            SkillPermissions::new().with("internal-*", PermissionLevel::Deny),
        );

        let value = catalog_json(&catalog, false);
        assert_eq!(value["skills"].as_array().unwrap().len(), 2);
        assert_eq!(value["skills"][0]["scope"], "project");
        assert_eq!(value["duplicates"]["docs"].as_array().unwrap().len(), 2);

        let value = catalog_json(&catalog, true);
        assert_eq!(value["skills"].as_array().unwrap().len(), 3);
        assert_eq!(value["skills"][1]["permission"], "deny");
    }

    #[test]
    fn test_skill_json() {
        let skill = discovered("docs", Scope::Compatibility);
        let value = skill_json(&skill, PermissionLevel::Ask);
        assert_eq!(value["scope"], "compatibility");
        assert_eq!(value["permission"], "ask");
        assert_eq!(value["descriptor"]["name"], "docs");
        assert_eq!(value["descriptor"]["body"], "Body\n");
        assert!(value["descriptor"].get("license").is_none());
    }

    #[test]
    fn test_print_empty_catalog() {
        // 空でも見出しと案内だけを出して終わる
        print_catalog(&SkillCatalog::default(), false);
        print_catalog(&SkillCatalog::default(), true);
    }
}
