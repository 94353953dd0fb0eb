//! スキル読み込み確認ダイアログモジュール
//!
//! 権限が `ask` のスキルを表示する前にユーザー確認を求める

use std::io::{self, Write};
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

use crate::skills::{DiscoveredSkill, PermissionLevel};

/// 確認ダイアログの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResult {
    /// ユーザーが許可
    Approved,
    /// ユーザーが拒否
    Denied,
}

/// 確認ダイアログ構造体
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    /// 読み込むスキル名
    action: String,
    /// スキルの説明と場所
    details: String,
    /// 自動承認モード（--yes）
    auto_approve: bool,
}

impl ConfirmDialog {
    /// 新しい確認ダイアログを作成
    pub fn new(action: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            details: details.into(),
            auto_approve: false,
        }
    }

    /// スキル用のダイアログを作成
    pub fn for_skill(skill: &DiscoveredSkill) -> Self {
        Self::new(
            format!("Load skill: {}", skill.descriptor.name),
            format!(
                "{} ({})",
                skill.descriptor.description,
                skill.location.path.display()
            ),
        )
    }

    /// 自動承認モードを設定
    pub fn with_auto_approve(mut self, auto_approve: bool) -> Self {
        self.auto_approve = auto_approve;
        self
    }

    /// アクション名を取得
    pub fn action(&self) -> &str {
        &self.action
    }

    /// 詳細説明を取得
    pub fn details(&self) -> &str {
        &self.details
    }

    /// 確認プロンプトを表示して結果を取得
    pub fn show(&self) -> io::Result<ConfirmResult> {
        if self.auto_approve {
            return Ok(ConfirmResult::Approved);
        }

        let mut stdout = io::stdout();

        execute!(
            stdout,
            SetForegroundColor(Color::Yellow),
            Print("\n--- Skill Confirmation Required ---\n"),
            ResetColor
        )?;

        execute!(
            stdout,
            SetForegroundColor(Color::Cyan),
            Print(format!("Action: {}\n", self.action)),
            ResetColor
        )?;

        if !self.details.is_empty() {
            execute!(
                stdout,
                Print(format!("Details: {}\n", self.details))
            )?;
        }

        // デフォルトはNo
        execute!(
            stdout,
            SetForegroundColor(Color::Yellow),
            Print("Load? [y/N]: "),
            ResetColor
        )?;
        stdout.flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        Ok(parse_answer(&input))
    }
}

/// 入力を判定（"y" / "yes" のみ承認）
fn parse_answer(input: &str) -> ConfirmResult {
    let trimmed = input.trim().to_lowercase();
    if trimmed == "y" || trimmed == "yes" {
        ConfirmResult::Approved
    } else {
        ConfirmResult::Denied
    }
}

/// 権限に応じてスキル読み込みを判定
///
/// # Returns
/// * `Ok(true)` - 読み込み許可
/// * `Ok(false)` - 拒否（deny、またはユーザーが拒否）
/// * `Err` - I/Oエラー
pub fn confirm_skill_load(
    skill: &DiscoveredSkill,
    permission: PermissionLevel,
    assume_yes: bool,
) -> io::Result<bool> {
    match permission {
        PermissionLevel::Allow => Ok(true),
        PermissionLevel::Deny => Ok(false),
        PermissionLevel::Ask => {
            let result = ConfirmDialog::for_skill(skill)
                .with_auto_approve(assume_yes)
                .show()?;
            Ok(result == ConfirmResult::Approved)
        }
    }
}
