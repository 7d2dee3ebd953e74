//! Error taxonomy of the analysis pipeline.
//!
//! `Parse`, `NoSql` and `Transform` abort the current analysis only; in
//! directory mode the orchestrator captures them as synthetic `Error`
//! issues and keeps walking. `Config` errors are fatal at construction
//! time, `File` errors cover missing paths and unsupported extensions.

use thiserror::Error;

use crate::model::Issue;

/// Convenience alias used across the crate.
pub type AppResult<T> = Result<T, AnalysisError>;

/// Analysis, configuration and file errors.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The SQL parser rejected the input text.
    #[error("SQL 解析失败 (来源: {origin}): {message}")]
    Parse {
        /// Source label of the analyzed input (path, `input_string`, ...).
        origin:  String,
        /// The original SQL text.
        sql:     String,
        /// Parser diagnostic.
        message: String
    },

    /// The parser returned zero statements from a non-empty input string.
    #[error("未找到有效的 SQL 语句 (来源: {origin})")]
    NoSql {
        /// Source label of the analyzed input.
        origin: String
    },

    /// The restorer refused to serialize the mutated AST.
    #[error("生成转换 SQL 失败 (来源: {origin}): {message}")]
    Transform {
        /// Source label of the analyzed input.
        origin:  String,
        /// The original SQL text.
        sql:     String,
        /// Restorer diagnostic.
        message: String,
        /// Issues collected before the restore failed.
        issues:  Vec<Issue>
    },

    /// The rule catalog could not be loaded or parsed.
    #[error("配置错误: {0}")]
    Config(String),

    /// A path does not exist, has an unsupported extension or cannot be
    /// opened.
    #[error("文件错误 ({path}): {message}")]
    File { path: String, message: String }
}

impl AnalysisError {
    /// Process exit code for this error: `2` for configuration errors,
    /// `3` for everything else. Argument errors exit with `1` before an
    /// `AnalysisError` ever exists.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            _ => 3
        }
    }
}

/// Create a parse error.
pub fn parse_error(
    origin: impl Into<String>,
    sql: impl Into<String>,
    message: impl Into<String>
) -> AnalysisError {
    AnalysisError::Parse {
        origin:  origin.into(),
        sql:     sql.into(),
        message: message.into()
    }
}

/// Create a no-SQL error.
pub fn no_sql_error(origin: impl Into<String>) -> AnalysisError {
    AnalysisError::NoSql {
        origin: origin.into()
    }
}

/// Create a transform error, preserving the issues collected so far.
pub fn transform_error(
    origin: impl Into<String>,
    sql: impl Into<String>,
    message: impl Into<String>,
    issues: Vec<Issue>
) -> AnalysisError {
    AnalysisError::Transform {
        origin: origin.into(),
        sql: sql.into(),
        message: message.into(),
        issues
    }
}

/// Create a config error.
pub fn config_error(message: impl Into<String>) -> AnalysisError {
    AnalysisError::Config(message.into())
}

/// Create a file error.
pub fn file_error(path: impl Into<String>, message: impl Into<String>) -> AnalysisError {
    AnalysisError::File {
        path:    path.into(),
        message: message.into()
    }
}
