//! HTML report writer: a self-contained, inline-styled page.

use std::fmt::Write as _;

use crate::model::Report;

const STYLE: &str = "\
body { font-family: Arial, sans-serif; line-height: 1.6; margin: 0; padding: 20px; }
.container { max-width: 1200px; margin: 0 auto; }
h1 { color: #333; border-bottom: 1px solid #eee; padding-bottom: 10px; }
.summary { background: #f9f9f9; padding: 15px; border-radius: 5px; margin-bottom: 20px; }
.issue { border: 1px solid #ddd; border-radius: 5px; padding: 15px; margin-bottom: 15px; }
.success { color: #28a745; }
pre { background: #f8f9fa; padding: 15px; border-radius: 5px; overflow-x: auto; }
.meta { color: #6c757d; font-size: 0.9em; }
code { font-family: 'Courier New', Courier, monospace; }";

pub fn render(report: &Report) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>SQL 分析报告</h1>");

    let _ = writeln!(body, "<div class=\"summary\">");
    let _ = writeln!(body, "<h2>摘要</h2>");
    let _ = writeln!(body, "<p><strong>分析项数量:</strong> {}</p>", report.total_analyses);
    let _ = writeln!(body, "<p><strong>唯一问题数量:</strong> {}</p>", report.total_issues);
    let _ = writeln!(
        body,
        "<p class=\"meta\">生成时间: {}</p>",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(body, "</div>");

    let _ = writeln!(body, "<div class=\"summary\">");
    let _ = writeln!(body, "<h2>规则统计</h2>");
    let _ = writeln!(body, "<p><strong>规则总数:</strong> {}</p>", report.rule_stats.total_rules);
    let _ = writeln!(body, "<ul>");
    for (category, count) in &report.rule_stats.by_category {
        let _ = writeln!(body, "<li>{}: {count}</li>", escape(category));
    }
    let _ = writeln!(body, "</ul>");
    let _ = writeln!(body, "<h2>检查器统计</h2>");
    let _ = writeln!(
        body,
        "<p><strong>检查器总数:</strong> {}</p>",
        report.checker_stats.total_checkers
    );
    let _ = writeln!(body, "<ul>");
    for name in &report.checker_stats.checkers {
        let _ = writeln!(body, "<li>{}</li>", escape(name));
    }
    let _ = writeln!(body, "</ul>");
    let _ = writeln!(body, "</div>");

    let _ = writeln!(body, "<h2>发现的问题 ({})</h2>", report.total_issues);
    if report.unique_issues.is_empty() {
        let _ = writeln!(body, "<p class=\"success\">✓ 未发现兼容性问题</p>");
    } else {
        for (index, issue) in report.unique_issues.iter().enumerate() {
            let _ = writeln!(body, "<div class=\"issue\">");
            let _ = writeln!(body, "<h3>问题 #{}: {}</h3>", index + 1, escape(&issue.checker));
            let _ = writeln!(body, "<p>{}</p>", escape(&issue.message));
            let _ = writeln!(body, "</div>");
        }
    }

    for result in &report.results {
        let _ = writeln!(body, "<div class=\"summary\">");
        let _ = writeln!(body, "<h2>分析详情: {}</h2>", escape(&result.source));
        if !result.sql.is_empty() {
            let _ = writeln!(body, "<p><strong>SQL 语句:</strong></p>");
            let _ = writeln!(body, "<pre><code>{}</code></pre>", escape(result.sql.trim_end()));
        }
        if !result.transformed_sql.is_empty() {
            let _ = writeln!(body, "<p><strong>转换后 SQL:</strong></p>");
            let _ = writeln!(
                body,
                "<pre><code>{}</code></pre>",
                escape(result.transformed_sql.trim_end())
            );
        }
        let _ = writeln!(body, "<p><strong>问题数量:</strong> {}</p>", result.issues.len());
        for issue in &result.issues {
            let _ = writeln!(body, "<div class=\"issue\">");
            let _ = writeln!(body, "<h3>{}</h3>", escape(&issue.checker));
            let _ = writeln!(body, "<p>{}</p>", escape(&issue.message));
            if let Some(file) = &issue.file {
                let _ = writeln!(body, "<p class=\"meta\">文件: {}</p>", escape(file));
            }
            if issue.autofix.available && !issue.autofix.code.is_empty() {
                let _ = writeln!(body, "<p><strong>修复代码:</strong></p>");
                let _ = writeln!(body, "<pre><code>{}</code></pre>", escape(&issue.autofix.code));
            }
            let _ = writeln!(body, "</div>");
        }
        let _ = writeln!(body, "</div>");
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>SQL 分析报告</title>\n\
         <style>\n{STYLE}\n</style>\n</head>\n<body>\n<div class=\"container\">\n{body}</div>\n</body>\n</html>\n"
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::RuleSet,
        model::{AnalysisResult, Issue},
        report::build_report
    };

    #[test]
    fn test_empty_report_shows_success() {
        let report = build_report(Vec::new(), &RuleSet::default(), &[]);
        let rendered = render(&report);
        assert!(rendered.contains("未发现兼容性问题"));
        assert!(rendered.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_sql_content_is_escaped() {
        let results = vec![AnalysisResult {
            sql: "SELECT a < b FROM t".into(),
            source: "x.sql".into(),
            issues: vec![Issue::new("SyntaxChecker", "语法 <标记>")],
            transformed_sql: String::new()
        }];
        let report = build_report(results, &RuleSet::default(), &[]);
        let rendered = render(&report);
        assert!(rendered.contains("SELECT a &lt; b FROM t"));
        assert!(rendered.contains("语法 &lt;标记&gt;"));
    }
}
