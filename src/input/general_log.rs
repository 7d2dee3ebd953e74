//! MySQL general-log adapter.
//!
//! Extracts SQL from log lines of the form
//! `2023-12-23T08:00:01.234567Z     1 Query     SELECT * FROM users`.
//! Only `Query` commands contribute; trivial session statements (`SET`,
//! `SHOW`, `USE`, transaction control, system probes) are dropped. Each
//! retained body is terminated with `;\n` so the result parses as a
//! statement list. Lines that do not match the standard format are
//! recorded and skipped.

use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    sync::LazyLock
};

use regex::Regex;

use crate::error::{AppResult, file_error};

static LOG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+Z)\s+(\d+)\s+(\w+)\s+(.*)$")
        .expect("general log line pattern")
});

/// Statement prefixes dropped from log extraction.
const IGNORED_PREFIXES: &[&str] = &[
    "SET ",
    "SHOW ",
    "USE ",
    "BEGIN",
    "COMMIT",
    "ROLLBACK",
    "START TRANSACTION",
    "SET NAMES",
    "SELECT DATABASE()",
    "SELECT USER()",
    "SELECT @@",
];

/// Extracts SQL from a MySQL general log.
#[derive(Debug, Default)]
pub struct GeneralLogParser {
    non_standard_lines: Vec<String>
}

impl GeneralLogParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines that did not match the standard log format, including
    /// non-`Query` commands (prefixed with `[Non-Query]`).
    pub fn non_standard_lines(&self) -> &[String] {
        &self.non_standard_lines
    }

    /// Extract SQL from a `.log` file.
    pub fn parse_file(&mut self, path: &Path) -> AppResult<String> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        if ext.as_deref() != Some("log") {
            return Err(file_error(
                path.display().to_string(),
                "不支持的文件类型，日志文件应为 .log 扩展名"
            ));
        }
        let file = File::open(path)
            .map_err(|err| file_error(path.display().to_string(), format!("打开文件失败: {err}")))?;
        self.parse_reader(file)
    }

    /// Extract SQL from any reader holding general-log content.
    pub fn parse_reader(&mut self, reader: impl Read) -> AppResult<String> {
        let mut sql = String::new();
        for line in BufReader::new(reader).lines() {
            let line =
                line.map_err(|err| file_error("general_log", format!("读取日志内容时出错: {err}")))?;
            if let Some(statement) = self.extract_line(line.trim()) {
                sql.push_str(&statement);
                if !statement.ends_with(';') {
                    sql.push(';');
                }
                sql.push('\n');
            }
        }
        Ok(sql)
    }

    fn extract_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return None;
        }
        let Some(captures) = LOG_LINE.captures(line) else {
            self.non_standard_lines.push(line.to_string());
            return None;
        };
        let command = captures.get(3).map(|m| m.as_str()).unwrap_or_default();
        if command != "Query" {
            self.non_standard_lines.push(format!("[Non-Query] {line}"));
            return None;
        }
        let body = captures.get(4).map(|m| m.as_str().trim()).unwrap_or_default();
        if body.is_empty() || is_trivial_statement(body) {
            return None;
        }
        Some(body.to_string())
    }
}

fn is_trivial_statement(sql: &str) -> bool {
    let upper = sql.trim().to_ascii_uppercase();
    IGNORED_PREFIXES.iter().any(|prefix| upper.starts_with(prefix))
}
