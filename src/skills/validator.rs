//! スキル記述子バリデーター
//!
//! ディレクトリ名と SKILL.md の内容だけを受け取る純粋関数。
//! ファイルシステムには触れないため、任意の並列度で呼び出してよい。

use regex::Regex;
use std::sync::OnceLock;

use super::descriptor::{self, SkillDescriptor, SkillHeader};
use super::error::ValidationError;
use super::frontmatter;

/// name の最大長
pub const MAX_NAME_LEN: usize = 64;

/// description の最大長
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// 小文字英数字セグメントを単一ハイフンで連結した形式
const NAME_PATTERN: &str = r"^[a-z0-9]+(-[a-z0-9]+)*$";

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(NAME_PATTERN).expect("NAME_PATTERN is a valid regex"))
}

/// name の形式と長さだけを検査（ディレクトリ名との一致は見ない）
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(ValidationError::NameLengthViolation(len));
    }
    if !name_pattern().is_match(name) {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// description の長さを検査
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    let len = description.chars().count();
    if len == 0 || len > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionLengthViolation(len));
    }
    Ok(())
}

/// ディレクトリ名と記述子テキストを検証し、記述子を返す
pub fn validate(directory_name: &str, raw_text: &str) -> Result<SkillDescriptor, ValidationError> {
    let parts = frontmatter::split(raw_text)?;
    let mapping = descriptor::parse_header(parts.header)?;
    let header = SkillHeader::parse(parts.header)?;

    let name = descriptor::required(header.name, "name")?;
    let description = descriptor::required(header.description, "description")?;

    if name != directory_name {
        return Err(ValidationError::NameMismatch {
            name,
            directory: directory_name.to_string(),
        });
    }
    validate_name(&name)?;
    validate_description(&description)?;

    for field in descriptor::unknown_fields(&mapping) {
        tracing::debug!(skill = %name, field = %field, "ignoring unrecognized header field");
    }

    Ok(SkillDescriptor {
        name,
        description,
        license: header.license,
        compatibility: header.compatibility,
        metadata: header.metadata.unwrap_or_default(),
        body: parts.body.to_string(),
    })
}
