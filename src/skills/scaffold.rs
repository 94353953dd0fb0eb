//! スキル雛形の生成
//!
//! ビルド時に templates/ をバイナリへ埋め込み、`new` サブコマンドで展開する。

use anyhow::{bail, Context, Result};
use rust_embed::Embed;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::discovery::SKILL_FILENAME;
use super::validator;

/// 埋め込みテンプレート
#[derive(Embed)]
#[folder = "templates/"]
pub struct Templates;

impl Templates {
    /// SKILL.md テンプレートを取得
    pub fn skill() -> Option<String> {
        Self::get(SKILL_FILENAME).map(|f| String::from_utf8_lossy(&f.data).to_string())
    }
}

/// テンプレートに名前と説明を埋め込む
///
/// 名前と説明はJSON文字列として書き出す（YAMLのダブルクォート文字列としてそのまま読める）。
/// `0x1f` や `null` のような名前も文字列として読み戻される。
pub fn render(name: &str, description: &str) -> Result<String> {
    let template = Templates::skill().context("SKILL.md template is not embedded")?;
    Ok(template
        .replace("{{name}}", &serde_json::to_string(name)?)
        .replace("{{description}}", &serde_json::to_string(description)?))
}

/// `parent/<name>/SKILL.md` を作成し、そのパスを返す
pub async fn create(parent: &Path, name: &str, description: &str) -> Result<PathBuf> {
    validator::validate_name(name).with_context(|| format!("Cannot create skill '{}'", name))?;
    validator::validate_description(description)
        .with_context(|| format!("Cannot create skill '{}'", name))?;

    let skill_dir = parent.join(name);
    if fs::metadata(&skill_dir).await.is_ok() {
        bail!("{} already exists", skill_dir.display());
    }

    let content = render(name, description)?;
    // 生成物そのものが検証を通ることを確認
    validator::validate(name, &content)
        .with_context(|| format!("Rendered template for '{}' does not validate", name))?;

    fs::create_dir_all(&skill_dir)
        .await
        .with_context(|| format!("Failed to create {}", skill_dir.display()))?;
    let path = skill_dir.join(SKILL_FILENAME);
    fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Created skill {} at {}", name, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::error::ValidationError;
    use tempfile::TempDir;

    #[test]
    fn test_template_embedded() {
        let template = Templates::skill().expect("template should be embedded");
        assert!(template.contains("{{name}}"));
        assert!(template.contains("{{description}}"));
    }

    #[test]
    fn test_render_validates() {
        let content = render("git-release", "Create releases: tags, notes & \"changelogs\"").unwrap();
        let skill = validator::validate("git-release", &content).unwrap();
        assert_eq!(skill.description, "Create releases: tags, notes & \"changelogs\"");
        assert!(skill.body.contains("## What I do"));
    }

    #[tokio::test]
    async fn test_create_writes_skill() {
        let tmp = TempDir::new().unwrap();
        let path = create(tmp.path(), "docs-writer", "Write docs").await.unwrap();
        assert_eq!(path, tmp.path().join("docs-writer").join("SKILL.md"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(validator::validate("docs-writer", &text).is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_name() {
        let tmp = TempDir::new().unwrap();
        let err = create(tmp.path(), "Docs_Writer", "Write docs").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::InvalidName("Docs_Writer".to_string()))
        );
        assert!(!tmp.path().join("Docs_Writer").exists());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_description() {
        let tmp = TempDir::new().unwrap();
        let err = create(tmp.path(), "docs", "").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::DescriptionLengthViolation(0))
        );
    }

    #[tokio::test]
    async fn test_create_refuses_existing_directory() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("docs")).unwrap();
        assert!(create(tmp.path(), "docs", "Write docs").await.is_err());
    }

    #[tokio::test]
    async fn test_create_numeric_looking_names() {
        let tmp = TempDir::new().unwrap();
        for name in ["0x1f", "1e3", "null", "true"] {
            let path = create(tmp.path(), name, "1e3").await.unwrap();
            let text = std::fs::read_to_string(&path).unwrap();
            let skill = validator::validate(name, &text).unwrap();
            assert_eq!(skill.name, name);
            assert_eq!(skill.description, "1e3");
        }
    }
}
