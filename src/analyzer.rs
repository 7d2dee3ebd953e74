//! Analysis orchestrator.
//!
//! Accepts an input (inline SQL, file, directory or reader), dispatches to
//! the matching input adapter, drives the parse → check → restore pipeline
//! and packages the outcome as an [`AnalysisResult`].
//!
//! The rule store is shared behind an `Arc` and read-only after load. A
//! fresh checker set is built per analysis, so directory mode can analyze
//! files on parallel threads while results stay in traversal order.

use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
    sync::Arc
};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::{
    checker,
    config::RuleSet,
    error::{AnalysisError, AppResult, file_error, no_sql_error, parse_error, transform_error},
    input::{general_log::GeneralLogParser, sql_file},
    model::{AnalysisResult, Issue},
    parser,
    restore::{RestoreOptions, restore},
    visitor
};

/// Source label for inline SQL strings.
pub const SOURCE_INLINE: &str = "input_string";
/// Source label for reader input.
pub const SOURCE_READER: &str = "reader";

/// Orchestrates the analysis pipeline over a shared rule store.
#[derive(Debug)]
pub struct Analyzer {
    rules:           Arc<RuleSet>,
    categories:      Vec<String>,
    checker_names:   Vec<String>,
    restore_options: RestoreOptions
}

impl Analyzer {
    /// Create an analyzer for an explicit category list. Names are
    /// case-insensitive; an unknown name is a hard error. An empty list is
    /// valid and turns analysis into a pure restore pass.
    pub fn new(rules: Arc<RuleSet>, categories: Vec<String>) -> AppResult<Self> {
        let checkers = checker::create_checkers(&rules, &categories)?;
        let checker_names = checkers.iter().map(|c| c.name().to_string()).collect();
        Ok(Self {
            rules,
            categories,
            checker_names,
            restore_options: RestoreOptions::default()
        })
    }

    /// Create an analyzer with one checker per known category present in
    /// the catalog. Unknown catalog categories are never consulted.
    pub fn from_rules(rules: Arc<RuleSet>) -> AppResult<Self> {
        let categories = rules
            .known_categories()
            .iter()
            .map(|category| category.as_str().to_string())
            .collect();
        Self::new(rules, categories)
    }

    /// Override the restorer configuration.
    pub fn with_restore_options(mut self, options: RestoreOptions) -> Self {
        self.restore_options = options;
        self
    }

    /// Shared rule store.
    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// Checker names in registration order, for report statistics.
    pub fn checker_names(&self) -> &[String] {
        &self.checker_names
    }

    /// Analyze an input identifier: an existing directory is walked
    /// recursively, an existing file is dispatched by extension, anything
    /// else is treated as inline SQL.
    pub fn analyze(&self, source: &str) -> AppResult<AnalysisResult> {
        let path = Path::new(source);
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => self.analyze_directory(path),
            Ok(_) => self.analyze_file(path),
            Err(_) => self.analyze_sql(source, SOURCE_INLINE)
        }
    }

    /// Analyze SQL text from a reader.
    pub fn analyze_reader(&self, mut reader: impl Read) -> AppResult<AnalysisResult> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|err| file_error(SOURCE_READER, format!("读取输入流失败: {err}")))?;
        self.analyze_sql(&content, SOURCE_READER)
    }

    /// Analyze one file, dispatched by extension (`.sql` or `.log`).
    /// Content that parses to zero statements (empty or comment-only
    /// files) yields an empty result instead of a `NoSql` error.
    pub fn analyze_file(&self, path: &Path) -> AppResult<AnalysisResult> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let content = match ext.as_str() {
            "sql" => sql_file::read(path)?,
            "log" => {
                let mut log_parser = GeneralLogParser::new();
                log_parser.parse_file(path)?
            }
            other => {
                return Err(file_error(
                    path.display().to_string(),
                    format!("不支持的文件类型: .{other}，仅支持 .sql 和 .log 文件")
                ));
            }
        };
        let origin = path.display().to_string();
        match self.analyze_sql(&content, &origin) {
            Err(AnalysisError::NoSql {
                ..
            }) => Ok(AnalysisResult {
                sql: content,
                source: origin,
                ..AnalysisResult::default()
            }),
            outcome => outcome
        }
    }

    /// Recursively analyze every `.sql` / `.log` file under a directory.
    /// Per-file failures become `Error` issues; the walk never aborts on
    /// one bad file. Files are analyzed in parallel, each with its own
    /// checker set, and issues aggregate in traversal order.
    pub fn analyze_directory(&self, dir: &Path) -> AppResult<AnalysisResult> {
        if !dir.is_dir() {
            return Err(file_error(dir.display().to_string(), "不是目录"));
        }
        let files: Vec<PathBuf> = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|path| {
                matches!(
                    path.extension()
                        .and_then(|ext| ext.to_str())
                        .map(str::to_ascii_lowercase)
                        .as_deref(),
                    Some("sql") | Some("log")
                )
            })
            .collect();

        let outcomes: Vec<(PathBuf, AppResult<AnalysisResult>)> = files
            .into_par_iter()
            .map(|path| {
                let outcome = self.analyze_file(&path);
                (path, outcome)
            })
            .collect();

        let mut issues = Vec::new();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(result) => issues.extend(result.issues),
                Err(err) => issues.push(
                    Issue::new("Error", format!("分析文件失败: {err}"))
                        .with_file(path.display().to_string())
                )
            }
        }
        Ok(AnalysisResult {
            source: dir.display().to_string(),
            issues,
            ..AnalysisResult::default()
        })
    }

    /// Analyze a SQL string: parse, run the single-pass visitor with a
    /// fresh checker set, restore, and package the result.
    pub fn analyze_sql(&self, sql: &str, origin: &str) -> AppResult<AnalysisResult> {
        let mut stmts =
            parser::parse_statements(sql).map_err(|err| parse_error(origin, sql, err.to_string()))?;
        if stmts.is_empty() {
            return Err(no_sql_error(origin));
        }
        let checkers = checker::create_checkers(&self.rules, &self.categories)?;
        let issues = visitor::check(&mut stmts, &checkers);
        let transformed_sql = match restore(&mut stmts, &self.restore_options) {
            Ok(text) => text,
            Err(err) => return Err(transform_error(origin, sql, err.to_string(), issues))
        };
        Ok(AnalysisResult {
            sql: sql.to_string(),
            source: origin.to_string(),
            issues,
            transformed_sql
        })
    }
}
