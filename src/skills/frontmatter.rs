//! frontmatter分割
//!
//! 先頭行の `---` で開き、次に現れる `---` だけの行で閉じる。
//! 閉じ区切り以降は本文としてそのまま返す（本文中の `---` は水平線として扱う）。

use super::error::ValidationError;

/// 区切り行
pub const DELIMITER: &str = "---";

/// 分割結果（元テキストを借用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frontmatter<'a> {
    /// 区切りの内側（YAML）
    pub header: &'a str,
    /// 閉じ区切り行より後ろ
    pub body: &'a str,
}

/// 改行を除いた行が区切りかどうか（CRLFも許容）
fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches('\n').trim_end_matches('\r') == DELIMITER
}

/// テキストをヘッダーと本文に分割
pub fn split(raw: &str) -> Result<Frontmatter<'_>, ValidationError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let mut lines = text.split_inclusive('\n');
    let first = lines.next().unwrap_or("");
    if !is_delimiter(first) {
        return Err(ValidationError::MalformedHeader(
            "descriptor must start with a '---' line".to_string(),
        ));
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if is_delimiter(line) {
            return Ok(Frontmatter {
                header: &text[header_start..offset],
                body: &text[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    Err(ValidationError::MalformedHeader(
        "missing closing '---' line".to_string(),
    ))
}
