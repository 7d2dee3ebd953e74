//! Report assembly and multi-format output.
//!
//! [`build_report`] aggregates analysis results into the [`Report`] model;
//! the writers render it as `summary.json`, `summary.md` and
//! `summary.html` under the report directory.

mod html;
mod json;
mod markdown;

use std::{
    fs,
    path::{Component, Path}
};

use chrono::Utc;
use indexmap::{IndexMap, IndexSet};

use crate::{
    config::RuleSet,
    error::{AppResult, file_error},
    model::{AnalysisResult, CheckerStats, Report, RuleStats, UniqueIssue}
};

/// Fixed basename of the report files.
pub const REPORT_BASENAME: &str = "summary";

/// Supported report output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Markdown,
    Html
}

impl ReportFormat {
    /// All formats, in write order.
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Json, ReportFormat::Markdown, ReportFormat::Html];

    /// File extension including the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => ".json",
            Self::Markdown => ".md",
            Self::Html => ".html"
        }
    }

    /// Render a report in this format.
    pub fn render(self, report: &Report) -> String {
        match self {
            Self::Json => json::render(report),
            Self::Markdown => markdown::render(report),
            Self::Html => html::render(report)
        }
    }
}

/// Aggregate analysis results into a report.
///
/// `total_issues` counts unique `(checker, message)` pairs; the unique
/// list keeps first-seen order so reports stay deterministic.
pub fn build_report(
    results: Vec<AnalysisResult>,
    rules: &RuleSet,
    checker_names: &[String]
) -> Report {
    let mut unique: IndexSet<UniqueIssue> = IndexSet::new();
    for result in &results {
        for issue in &result.issues {
            unique.insert(UniqueIssue {
                checker: issue.checker.clone(),
                message: issue.message.clone()
            });
        }
    }
    let unique_issues: Vec<UniqueIssue> = unique.into_iter().collect();
    Report {
        total_analyses: results.len(),
        total_issues: unique_issues.len(),
        unique_issues,
        results,
        generated_at: Utc::now(),
        rule_stats: rule_stats(rules),
        checker_stats: CheckerStats {
            total_checkers: checker_names.len(),
            checkers:       checker_names.to_vec()
        }
    }
}

fn rule_stats(rules: &RuleSet) -> RuleStats {
    let mut by_category: IndexMap<String, usize> = IndexMap::new();
    for rule in rules.rules() {
        *by_category.entry(rule.category.clone()).or_insert(0) += 1;
    }
    RuleStats {
        total_rules: rules.len(),
        by_category
    }
}

/// Write the report in every supported format under `dir`, creating the
/// directory when needed.
pub fn write_reports(dir: &Path, report: &Report) -> AppResult<()> {
    validate_output_path(dir)?;
    fs::create_dir_all(dir)
        .map_err(|err| file_error(dir.display().to_string(), format!("创建报告目录失败: {err}")))?;
    for format in ReportFormat::ALL {
        let path = dir.join(format!("{REPORT_BASENAME}{}", format.extension()));
        let content = format.render(report);
        fs::write(&path, content)
            .map_err(|err| file_error(path.display().to_string(), format!("写入报告失败: {err}")))?;
    }
    Ok(())
}

fn validate_output_path(path: &Path) -> AppResult<()> {
    if path.components().any(|component| matches!(component, Component::ParentDir)) {
        return Err(file_error(path.display().to_string(), "路径包含上级目录访问"));
    }
    Ok(())
}
