use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::confirm::confirm_skill_load;
use super::output::{self, OutputFormat};
use crate::skills::discovery::contains_exact_file;
use crate::skills::{
    scaffold, validate, PermissionLevel, Problem, Scope, SkillCatalog, SkillDescriptor,
    SKILL_FILENAME,
};

/// `validate` の1パス分の結果
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// 検証した SKILL.md（見つからなければ指定パス）
    pub path: PathBuf,
    /// 照合に使ったディレクトリ名
    pub directory: String,
    pub result: std::result::Result<SkillDescriptor, Problem>,
}

impl ValidationOutcome {
    fn failed(path: PathBuf, directory: String, problem: Problem) -> Self {
        Self {
            path,
            directory,
            result: Err(problem),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// スキルディレクトリまたは SKILL.md を1つ検証
pub async fn validate_path(path: &Path) -> ValidationOutcome {
    // `.` や相対パスでもディレクトリ名が取れるよう正規化する
    let resolved = match fs::canonicalize(path).await {
        Ok(p) => p,
        Err(e) => {
            return ValidationOutcome::failed(
                path.to_path_buf(),
                dir_name(path),
                Problem::Unreadable(e.to_string()),
            )
        }
    };

    let is_dir = fs::metadata(&resolved).await.map(|m| m.is_dir()).unwrap_or(false);
    let (skill_dir, file) = if is_dir {
        (resolved.clone(), resolved.join(SKILL_FILENAME))
    } else {
        let parent = resolved.parent().map(Path::to_path_buf).unwrap_or_default();
        (parent, resolved.clone())
    };
    let directory = dir_name(&skill_dir);

    if !is_dir && file.file_name().and_then(|n| n.to_str()) != Some(SKILL_FILENAME) {
        return ValidationOutcome::failed(
            file,
            directory,
            Problem::Layout(format!("descriptor file must be named {}", SKILL_FILENAME)),
        );
    }

    match contains_exact_file(&skill_dir, SKILL_FILENAME).await {
        Ok(true) => {}
        Ok(false) => {
            return ValidationOutcome::failed(
                file,
                directory,
                Problem::Layout(format!("no {} in {}", SKILL_FILENAME, skill_dir.display())),
            )
        }
        Err(e) => {
            return ValidationOutcome::failed(file, directory, Problem::Unreadable(e.to_string()))
        }
    }

    let text = match fs::read_to_string(&file).await {
        Ok(text) => text,
        Err(e) => return ValidationOutcome::failed(file, directory, Problem::Unreadable(e.to_string())),
    };

    let result = validate(&directory, &text).map_err(Problem::Invalid);
    tracing::debug!("Validated {}: {}", file.display(), if result.is_ok() { "ok" } else { "failed" });

    ValidationOutcome {
        path: file,
        directory,
        result,
    }
}

/// `validate` サブコマンド。全パスが通れば true
pub async fn run_validate(paths: &[PathBuf], format: OutputFormat) -> Result<bool> {
    let mut outcomes = Vec::with_capacity(paths.len());
    for path in paths {
        outcomes.push(validate_path(path).await);
    }

    match format {
        OutputFormat::Json => output::print_json(&output::validation_json(&outcomes))?,
        OutputFormat::Text => output::print_validation_report(&outcomes),
    }

    Ok(outcomes.iter().all(ValidationOutcome::is_ok))
}

/// `list` サブコマンド
pub fn run_list(catalog: &SkillCatalog, show_all: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => output::print_json(&output::catalog_json(catalog, show_all))?,
        OutputFormat::Text => output::print_catalog(catalog, show_all),
    }
    Ok(())
}

/// `show` サブコマンド。表示できれば true
pub fn run_show(
    catalog: &SkillCatalog,
    name: &str,
    scope: Option<Scope>,
    assume_yes: bool,
    format: OutputFormat,
) -> Result<bool> {
    let matches: Vec<_> = catalog
        .find(name)
        .into_iter()
        .filter(|s| scope.map_or(true, |scope| s.location.scope == scope))
        .collect();

    let skill = match matches.as_slice() {
        [] => bail!("skill '{}' not found", name),
        [skill] => *skill,
        many => {
            // どちらを使うかはホスト側の判断なので、ここでは選ばない
            output::print_error(&format!(
                "skill '{}' is defined in {} locations; narrow it with --scope",
                name,
                many.len()
            ));
            for skill in many {
                eprintln!("    {:<13} {}", skill.location.scope, skill.location.path.display());
            }
            return Ok(false);
        }
    };

    let permission = catalog.permissions().check(name);
    if permission == PermissionLevel::Deny {
        output::print_error(&format!("skill '{}' is denied by permission config", name));
        return Ok(false);
    }
    if permission == PermissionLevel::Ask && format == OutputFormat::Json && !assume_yes {
        output::print_error(&format!(
            "skill '{}' requires confirmation; pass --yes with --format json",
            name
        ));
        return Ok(false);
    }
    if !confirm_skill_load(skill, permission, assume_yes)? {
        output::print_warning("Skill load declined.");
        return Ok(false);
    }

    match format {
        OutputFormat::Json => output::print_json(&output::skill_json(skill, permission))?,
        OutputFormat::Text => output::print_skill(skill),
    }
    Ok(true)
}

/// `new` サブコマンド
pub async fn run_new(parent: &Path, name: &str, description: &str, format: OutputFormat) -> Result<()> {
    let path = scaffold::create(parent, name, description).await?;
    match format {
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "name": name,
            "path": path.display().to_string(),
        }))?,
        OutputFormat::Text => output::print_success(&format!("Created {}", path.display())),
    }
    Ok(())
}
