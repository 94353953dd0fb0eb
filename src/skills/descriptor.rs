use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

use super::error::ValidationError;

/// 検証済みスキル記述子（SKILL.md）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillDescriptor {
    /// スキル名（ディレクトリ名と一致）
    pub name: String,
    /// 説明
    pub description: String,
    /// ライセンス識別子
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// 互換性識別子
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<String>,
    /// 任意のキー/値メタデータ（ネスト不可）
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    /// 本文（Markdown）
    pub body: String,
}

/// ヘッダーで認識するキー
pub const KNOWN_FIELDS: &[&str] = &["name", "description", "license", "compatibility", "metadata"];

/// ヘッダーYAMLをマッピングとしてパース（空ヘッダーは空マッピング）
pub(crate) fn parse_header(header: &str) -> Result<Mapping, ValidationError> {
    if header.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let value: Value = serde_yaml::from_str(header)
        .map_err(|e| ValidationError::MalformedHeader(format!("invalid YAML: {}", e)))?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(ValidationError::MalformedHeader(
            "header must be a key/value mapping".to_string(),
        )),
    }
}

/// ヘッダーの型付き表現
///
/// 文字列フィールドは `String` として直接受け取るため、`0x1f` や `1e3` のような
/// 数値に見える値も書かれたままの字面で得られる。
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SkillHeader {
    pub name: Option<String>,
    pub description: Option<String>,
    pub license: Option<String>,
    pub compatibility: Option<String>,
    /// ネストしたマップやリストは型エラーになる
    pub metadata: Option<BTreeMap<String, String>>,
}

impl SkillHeader {
    /// ヘッダーYAMLを型付きでパース（空ヘッダーは全フィールド未指定）
    pub(crate) fn parse(header: &str) -> Result<Self, ValidationError> {
        if header.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str::<Option<Self>>(header)
            .map(Option::unwrap_or_default)
            .map_err(|e| ValidationError::MalformedHeader(format!("invalid header field: {}", e)))
    }
}

/// 必須フィールドを取り出す（null は未指定と同じ）
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    value.ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

/// 認識しないキーの一覧
pub(crate) fn unknown_fields(mapping: &Mapping) -> Vec<String> {
    mapping
        .keys()
        .filter_map(|key| key.as_str())
        .filter(|key| !KNOWN_FIELDS.contains(key))
        .map(|key| key.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_mapping() {
        let header = SkillHeader::parse("name: a\ndescription: b\n").unwrap();
        assert_eq!(required(header.name, "name").unwrap(), "a");
        assert_eq!(required(header.description, "description").unwrap(), "b");
    }

    #[test]
    fn test_parse_header_rejects_non_mapping() {
        assert!(matches!(
            parse_header("- a\n- b\n"),
            Err(ValidationError::MalformedHeader(_))
        ));
        assert!(matches!(
            parse_header("name: [unclosed\n"),
            Err(ValidationError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_empty_header() {
        assert!(parse_header("").unwrap().is_empty());
        assert!(parse_header("~\n").unwrap().is_empty());
        assert!(SkillHeader::parse("").unwrap().name.is_none());
        assert!(SkillHeader::parse("~\n").unwrap().name.is_none());
    }

    #[test]
    fn test_null_counts_as_missing() {
        let header = SkillHeader::parse("name:\ndescription: b\n").unwrap();
        assert_eq!(
            required(header.name, "name"),
            Err(ValidationError::MissingField("name".to_string()))
        );

        let header = SkillHeader::parse("name: null\ndescription: ~\n").unwrap();
        assert!(header.name.is_none());
        assert!(header.description.is_none());
    }

    #[test]
    fn test_scalars_keep_literal_text() {
        let header = SkillHeader::parse(
            "name: 0x1f\ndescription: 1e3\nlicense: 2\ncompatibility: true\n",
        )
        .unwrap();
        assert_eq!(header.name.as_deref(), Some("0x1f"));
        assert_eq!(header.description.as_deref(), Some("1e3"));
        assert_eq!(header.license.as_deref(), Some("2"));
        assert_eq!(header.compatibility.as_deref(), Some("true"));

        let header = SkillHeader::parse("name: 0o17\ndescription: 1.50\n").unwrap();
        assert_eq!(header.name.as_deref(), Some("0o17"));
        assert_eq!(header.description.as_deref(), Some("1.50"));
    }

    #[test]
    fn test_list_value_is_malformed() {
        assert!(matches!(
            SkillHeader::parse("name: [a, b]\n"),
            Err(ValidationError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_metadata_flat_map() {
        let header =
            SkillHeader::parse("metadata:\n  audience: maintainers\n  version: 010\n").unwrap();
        let metadata = header.metadata.unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata["audience"], "maintainers");
        assert_eq!(metadata["version"], "010");
    }

    #[test]
    fn test_metadata_rejects_nesting() {
        assert!(matches!(
            SkillHeader::parse("metadata:\n  outer:\n    inner: x\n"),
            Err(ValidationError::MalformedHeader(_))
        ));
        assert!(matches!(
            SkillHeader::parse("metadata: just-a-string\n"),
            Err(ValidationError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_unknown_fields() {
        let mapping = parse_header("name: a\nallowed-tools: [read]\n").unwrap();
        assert_eq!(unknown_fields(&mapping), vec!["allowed-tools".to_string()]);
        assert!(SkillHeader::parse("name: a\nallowed-tools: [read]\n").is_ok());
    }
}
