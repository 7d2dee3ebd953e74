//! Data model shared between analysis and report generation.
//!
//! [`Issue`] is one compatibility finding, [`AnalysisResult`] the per-input
//! record, and [`Report`] the aggregate written by the report writers.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Autofix metadata attached to an issue.
///
/// Informational only: the textual hint describes the planned rewrite, the
/// actual AST mutation performed by the transformation library is
/// authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoFix {
    /// Whether a rewrite is available for this finding.
    pub available: bool,
    /// Rule action that produced the rewrite (e.g. `replace_function`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action:    String,
    /// Textual hint of the rewrite (e.g. `TINYINT -> SMALLINT`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code:      String
}

/// A single compatibility finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Name of the checker that emitted the issue.
    pub checker: String,
    /// Human-readable description.
    pub message: String,
    /// Source file, when the issue is tied to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file:    Option<String>,
    /// Source line, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line:    Option<u32>,
    /// Planned rewrite, if any.
    #[serde(default)]
    pub autofix: AutoFix
}

impl Issue {
    /// Create an issue with no location and no autofix.
    pub fn new(checker: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            checker: checker.into(),
            message: message.into(),
            file:    None,
            line:    None,
            autofix: AutoFix::default()
        }
    }

    /// Attach autofix metadata.
    pub fn with_autofix(mut self, action: impl Into<String>, code: impl Into<String>) -> Self {
        self.autofix = AutoFix {
            available: true,
            action:    action.into(),
            code:      code.into()
        };
        self
    }

    /// Attach a source file.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Deduplication key of an issue: checker name plus message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniqueIssue {
    pub checker: String,
    pub message: String
}

/// Result of analyzing one input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Original SQL text (may hold several statements).
    pub sql:             String,
    /// Issues in emission order. Always present, possibly empty.
    #[serde(default)]
    pub issues:          Vec<Issue>,
    /// Origin identifier (file path, `input_string`, `reader`, ...).
    pub source:          String,
    /// Restored SQL after all rewrites.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transformed_sql: String
}

/// Per-category rule counts of the loaded catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleStats {
    pub total_rules: usize,
    /// Rule count per category, in catalog order.
    pub by_category: IndexMap<String, usize>
}

/// Checker set that produced a report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckerStats {
    pub total_checkers: usize,
    /// Checker names in registration order.
    pub checkers:       Vec<String>
}

/// Aggregate report over one or more analyses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub total_analyses: usize,
    /// Count of unique `(checker, message)` findings.
    pub total_issues:   usize,
    /// Unique findings in first-seen order.
    pub unique_issues:  Vec<UniqueIssue>,
    pub results:        Vec<AnalysisResult>,
    pub generated_at:   DateTime<Utc>,
    pub rule_stats:     RuleStats,
    pub checker_stats:  CheckerStats
}
