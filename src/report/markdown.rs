//! Markdown report writer.
//!
//! Sections: 摘要, 规则统计, 检查器统计, 发现的问题 (unique findings),
//! then per-result details with the original and transformed SQL.

use std::fmt::Write as _;

use crate::model::Report;

pub fn render(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# SQL 分析报告");
    let _ = writeln!(out);

    let _ = writeln!(out, "## 摘要");
    let _ = writeln!(out);
    let _ = writeln!(out, "- **分析项数量**: {}", report.total_analyses);
    let _ = writeln!(out, "- **唯一问题数量**: {}", report.total_issues);
    let _ = writeln!(
        out,
        "- **生成时间**: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "## 规则统计");
    let _ = writeln!(out);
    let _ = writeln!(out, "- **规则总数**: {}", report.rule_stats.total_rules);
    if !report.rule_stats.by_category.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "| 类别 | 规则数量 |");
        let _ = writeln!(out, "|------|----------|");
        for (category, count) in &report.rule_stats.by_category {
            let _ = writeln!(out, "| {category} | {count} |");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## 检查器统计");
    let _ = writeln!(out);
    let _ = writeln!(out, "- **检查器总数**: {}", report.checker_stats.total_checkers);
    for name in &report.checker_stats.checkers {
        let _ = writeln!(out, "- {name}");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## 发现的问题");
    let _ = writeln!(out);
    if report.unique_issues.is_empty() {
        let _ = writeln!(out, "- **状态**: 未发现兼容性问题");
        let _ = writeln!(out);
    } else {
        for (index, issue) in report.unique_issues.iter().enumerate() {
            let _ = writeln!(out, "### 问题 {}: {}", index + 1, issue.checker);
            let _ = writeln!(out);
            let _ = writeln!(out, "- **描述**: {}", issue.message);
            let _ = writeln!(out);
        }
    }

    for result in &report.results {
        let _ = writeln!(out, "---");
        let _ = writeln!(out);
        let _ = writeln!(out, "## 分析详情: {}", result.source);
        let _ = writeln!(out);
        if !result.sql.is_empty() {
            let _ = writeln!(out, "- **SQL 语句**:");
            let _ = writeln!(out);
            let _ = writeln!(out, "```sql");
            let _ = writeln!(out, "{}", result.sql.trim_end());
            let _ = writeln!(out, "```");
            let _ = writeln!(out);
        }
        if !result.transformed_sql.is_empty() {
            let _ = writeln!(out, "- **转换后 SQL**:");
            let _ = writeln!(out);
            let _ = writeln!(out, "```sql");
            let _ = writeln!(out, "{}", result.transformed_sql.trim_end());
            let _ = writeln!(out, "```");
            let _ = writeln!(out);
        }
        if result.issues.is_empty() {
            let _ = writeln!(out, "- **状态**: 未发现兼容性问题");
            let _ = writeln!(out);
            continue;
        }
        let _ = writeln!(out, "- **发现的问题数**: {}", result.issues.len());
        let _ = writeln!(out);
        for (index, issue) in result.issues.iter().enumerate() {
            let _ = writeln!(out, "### 问题 {}: {}", index + 1, issue.checker);
            let _ = writeln!(out);
            let _ = writeln!(out, "- **描述**: {}", issue.message);
            if let Some(file) = &issue.file {
                match issue.line {
                    Some(line) => {
                        let _ = writeln!(out, "- **文件**: {file} (行号: {line})");
                    }
                    None => {
                        let _ = writeln!(out, "- **文件**: {file}");
                    }
                }
            }
            if issue.autofix.available && !issue.autofix.code.is_empty() {
                let _ = writeln!(out, "- **自动修复**: 可用");
                if !issue.autofix.action.is_empty() {
                    let _ = writeln!(out, "  - **操作**: {}", issue.autofix.action);
                }
                let _ = writeln!(out, "  - **修复代码**:");
                let _ = writeln!(out, "    ```sql");
                let _ = writeln!(out, "    {}", issue.autofix.code);
                let _ = writeln!(out, "    ```");
            } else {
                let _ = writeln!(out, "- **自动修复**: 不可用");
            }
            let _ = writeln!(out);
        }
    }

    out
}
