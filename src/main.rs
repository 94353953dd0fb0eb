use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use skill_check::{
    cli::{self, OutputFormat},
    Config, Scope, SkillCatalog,
};

#[derive(Parser, Debug)]
#[command(name = "skill-check")]
#[command(about = "SKILL.md記述子の検証・探索ツール")]
#[command(version)]
struct Args {
    /// 設定ファイルパス
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 出力形式
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// 詳細ログを表示 (INFO level)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// スキルディレクトリまたは SKILL.md を検証
    Validate {
        /// 検証するパス
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// 探索したスキルを一覧表示
    List {
        /// 探索の起点（デフォルトはカレントディレクトリ）
        #[arg(short, long)]
        project: Option<PathBuf>,
        /// deny のスキルも表示
        #[arg(long)]
        all: bool,
    },
    /// スキル本文を表示
    Show {
        /// スキル名
        name: String,
        /// 探索の起点（デフォルトはカレントディレクトリ）
        #[arg(short, long)]
        project: Option<PathBuf>,
        /// スコープを限定
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
        /// ask の確認をスキップ
        #[arg(short, long)]
        yes: bool,
    },
    /// 新しいスキルの雛形を作成
    New {
        /// スキル名（ディレクトリ名にもなる）
        name: String,
        /// 説明
        #[arg(short, long)]
        description: String,
        /// 作成先の親ディレクトリ
        #[arg(long, default_value = ".opencode/skill")]
        dir: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ScopeArg {
    Project,
    Global,
    Compatibility,
}

impl From<ScopeArg> for Scope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Project => Scope::Project,
            ScopeArg::Global => Scope::Global,
            ScopeArg::Compatibility => Scope::Compatibility,
        }
    }
}

/// 探索起点を絶対パスに解決
fn resolve_start(project: Option<PathBuf>) -> Result<PathBuf> {
    let start = match project {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    std::fs::canonicalize(&start)
        .with_context(|| format!("Failed to resolve {}", start.display()))
}

async fn load_catalog(config: &Config, project: Option<PathBuf>) -> Result<SkillCatalog> {
    let start = resolve_start(project)?;
    Ok(SkillCatalog::load(&start, &config.discovery, config.permission.skill.clone()).await)
}

async fn run(args: Args) -> Result<bool> {
    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Validate { paths } => cli::run_validate(&paths, args.format).await,
        Command::List { project, all } => {
            let catalog = load_catalog(&config, project).await?;
            cli::run_list(&catalog, all, args.format)?;
            Ok(true)
        }
        Command::Show {
            name,
            project,
            scope,
            yes,
        } => {
            let catalog = load_catalog(&config, project).await?;
            cli::run_show(&catalog, &name, scope.map(Scope::from), yes, args.format)
        }
        Command::New {
            name,
            description,
            dir,
        } => {
            cli::run_new(&dir, &name, &description, args.format).await?;
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // トレーシング初期化（デフォルトはWARN、--verboseでINFO）。JSON出力を汚さないようstderrへ
    let args = Args::parse();
    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("skill-check v{} starting...", skill_check::VERSION);

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            cli::print_error(&format!("{:#}", e));
            ExitCode::from(2)
        }
    }
}
