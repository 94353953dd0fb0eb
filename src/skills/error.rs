use thiserror::Error;

/// 記述子検証エラー
///
/// いずれも呼び出し側で回復可能な分類結果。壊れた入力は想定内の結果として扱う。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `---` 区切りが期待位置にない、またはヘッダーがキー/値の形をしていない
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// 必須フィールド（name / description）がない
    #[error("missing required field: {0}")]
    MissingField(String),

    /// name が小文字英数字とハイフン区切りの形式に合わない
    #[error("invalid name '{0}': expected lowercase alphanumeric segments joined by single hyphens")]
    InvalidName(String),

    /// name の長さが 1〜64 の範囲外
    #[error("name length {0} is outside 1..=64")]
    NameLengthViolation(usize),

    /// description の長さが 1〜1024 の範囲外
    #[error("description length {0} is outside 1..=1024")]
    DescriptionLengthViolation(usize),

    /// name とディレクトリ名が一致しない
    #[error("name '{name}' does not match directory '{directory}'")]
    NameMismatch { name: String, directory: String },
}

impl ValidationError {
    /// 機械可読な分類名（JSON出力用）
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MalformedHeader(_) => "malformed_header",
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::InvalidName(_) => "invalid_name",
            ValidationError::NameLengthViolation(_) => "name_length_violation",
            ValidationError::DescriptionLengthViolation(_) => "description_length_violation",
            ValidationError::NameMismatch { .. } => "name_mismatch",
        }
    }
}
