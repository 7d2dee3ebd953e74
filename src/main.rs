//! CLI entry point: argument handling, rule loading, analysis, report
//! generation.
//!
//! Exit codes: `0` success, `1` argument error, `2` config error, `3`
//! analysis error.

use std::{
    path::{Path, PathBuf},
    process,
    sync::Arc
};

use clap::Parser;
use colored::Colorize;
use sql_compat_analyzer::{
    analyzer::Analyzer,
    cli::Cli,
    config::{RuleSet, default_config_path, default_report_path},
    error::AppResult,
    report::{build_report, write_reports}
};
use tracing_subscriber::EnvFilter;

const EXIT_INVALID_ARGS: i32 = 1;

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { EXIT_INVALID_ARGS } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    let Some(target) = cli.target_path().cloned() else {
        eprintln!("错误: 未指定待分析路径（可通过 --path 或位置参数传入）");
        process::exit(EXIT_INVALID_ARGS);
    };
    if !target.exists() {
        eprintln!("错误: 待分析路径 '{}' 不存在", target.display());
        process::exit(EXIT_INVALID_ARGS);
    }
    if let Some(config) = &cli.config {
        if !config.exists() {
            eprintln!("错误: 配置文件 '{}' 不存在", config.display());
            process::exit(EXIT_INVALID_ARGS);
        }
    }

    let config_path = cli.config.clone().or_else(default_config_path);
    let report_path: PathBuf = cli.report_path.clone().unwrap_or_else(default_report_path);

    match &config_path {
        Some(path) => println!("✅ 使用配置文件: {}", path.display()),
        None => println!("✅ 未找到规则配置文件，使用空规则集")
    }
    println!("✅ 待分析路径: {}", target.display());
    println!("✅ 报告输出目录: {}", report_path.display());

    if let Err(err) = run(config_path.as_deref(), &target, &report_path) {
        eprintln!("{}", format!("错误: {err}").red());
        process::exit(err.exit_code());
    }

    println!("{}", "分析完成！报告已生成".green());
}

fn run(config_path: Option<&Path>, target: &Path, report_path: &Path) -> AppResult<()> {
    let rules = match config_path {
        Some(path) => RuleSet::load(path)?,
        None => RuleSet::default()
    };
    let rules = Arc::new(rules);
    let analyzer = Analyzer::from_rules(Arc::clone(&rules))?;
    let result = analyzer.analyze(&target.display().to_string())?;
    let report = build_report(vec![result], &rules, analyzer.checker_names());
    write_reports(report_path, &report)?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
