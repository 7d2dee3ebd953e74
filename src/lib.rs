//! # SQL Compat Analyzer
//!
//! Analyzes MySQL SQL for compatibility with the PostgreSQL/YugabyteDB
//! family and rewrites offending constructs to their target-dialect
//! equivalents.
//!
//! # Pipeline
//!
//! ```text
//! source ──▶ text ──▶ AST ──▶ (issues, mutated AST) ──▶ restored SQL ──▶ report
//!          input     parser        visitor + checkers        restorer
//! ```
//!
//! - [`config`] loads the declarative rule catalog and indexes it by
//!   `(category, upper(pattern))`.
//! - [`checker`] binds one category each to the visitor protocol:
//!   functions, data types, syntax markers, charsets.
//! - [`visitor`] walks every statement once, offering every node to every
//!   checker in registration order and threading in-place rewrites.
//! - [`transform`] is the rule-driven rewrite library dispatched on the
//!   catalog action.
//! - [`restore`] serializes the mutated AST back to deterministic SQL.
//! - [`analyzer`] orchestrates input dispatch, the pipeline and per-file
//!   error containment for directory runs.
//! - [`report`] aggregates results and writes JSON/Markdown/HTML.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use sql_compat_analyzer::{analyzer::Analyzer, config::RuleSet};
//!
//! let yaml = r#"
//! rules:
//!   - name: ifnull_to_coalesce
//!     description: IFNULL 为 MySQL 特有函数
//!     category: function
//!     when: {pattern: IFNULL}
//!     then: {action: replace_function, target: COALESCE}
//! "#;
//! let rules = Arc::new(RuleSet::from_yaml(yaml).unwrap());
//! let analyzer = Analyzer::from_rules(rules).unwrap();
//!
//! let result = analyzer.analyze("SELECT IFNULL(a, b) FROM t").unwrap();
//! assert_eq!(result.issues.len(), 1);
//! assert!(result.transformed_sql.contains("COALESCE"));
//! ```

pub mod analyzer;
pub mod checker;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod parser;
pub mod report;
pub mod restore;
pub mod transform;
pub mod visitor;
