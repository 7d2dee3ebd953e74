//! AST-to-SQL restorer.
//!
//! Serializes a (possibly mutated) statement list back to SQL text. The
//! renderer always emits uppercase keywords and single-quoted string
//! literals; the remaining knobs live on [`RestoreOptions`]. Statements are
//! joined with `;\n` and a single statement gets no trailing semicolon.
//! Given identical input and options the output is byte-identical.

use std::fmt::Write as _;

use sqlparser::ast::{Expr, ObjectNamePart, Statement};
use thiserror::Error;

use crate::{
    error::AppResult,
    model::Issue,
    visitor::{self, Checker, NodeMut}
};

/// Identifier quoting behavior of the restorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentifierQuoting {
    /// Keep each identifier's parsed quote character.
    #[default]
    AsWritten,
    /// Clear quote characters on table and column names.
    Unquoted
}

/// Restorer configuration.
#[derive(Debug, Clone, Copy)]
pub struct RestoreOptions {
    /// Rewrite `_utf8mb4'...'`-style introduced strings to plain string
    /// literals. Enabled by default; the introducer must not survive.
    pub strip_charset_introducers: bool,
    /// Identifier quoting policy.
    pub identifier_quoting:        IdentifierQuoting
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            strip_charset_introducers: true,
            identifier_quoting:        IdentifierQuoting::AsWritten
        }
    }
}

/// Rendering failure; wrapped into a `Transform` error by the caller.
#[derive(Debug, Error)]
#[error("渲染 SQL 语句失败: {0}")]
pub struct RestoreError(String);

/// Serialize a statement list back to SQL text.
///
/// Normalization (introducer stripping, identifier unquoting) runs as a
/// dedicated visitor pass before rendering, so the mutated AST is what the
/// caller releases afterwards.
pub fn restore(stmts: &mut [Statement], options: &RestoreOptions) -> Result<String, RestoreError> {
    let mut normalizers: Vec<Box<dyn Checker>> = Vec::new();
    if options.strip_charset_introducers {
        normalizers.push(Box::new(IntroducerStripper));
    }
    if options.identifier_quoting == IdentifierQuoting::Unquoted {
        normalizers.push(Box::new(QuoteClearer));
    }
    if !normalizers.is_empty() {
        visitor::check(stmts, &normalizers);
    }

    let mut parts = Vec::with_capacity(stmts.len());
    for stmt in stmts.iter() {
        let mut rendered = String::new();
        write!(rendered, "{stmt}").map_err(|err| RestoreError(err.to_string()))?;
        if !rendered.is_empty() {
            parts.push(rendered);
        }
    }
    Ok(parts.join(";\n"))
}

/// Replaces charset-introduced string literals with plain values.
struct IntroducerStripper;

impl Checker for IntroducerStripper {
    fn name(&self) -> &'static str {
        "IntroducerStripper"
    }

    fn inspect(&self, node: &mut NodeMut<'_>) -> AppResult<bool> {
        if let NodeMut::Expr(expr) = node {
            if let Expr::Prefixed {
                value, ..
            } = &mut **expr
            {
                let plain = (**value).clone();
                **expr = plain;
            }
        }
        Ok(false)
    }

    fn issues(&self) -> Vec<Issue> {
        Vec::new()
    }

    fn reset(&self) {}
}

/// Clears quote characters on table and column names.
struct QuoteClearer;

impl Checker for QuoteClearer {
    fn name(&self) -> &'static str {
        "QuoteClearer"
    }

    fn inspect(&self, node: &mut NodeMut<'_>) -> AppResult<bool> {
        match node {
            NodeMut::TableName(name) => {
                for part in name.0.iter_mut() {
                    if let ObjectNamePart::Identifier(ident) = part {
                        ident.quote_style = None;
                    }
                }
            }
            NodeMut::ColumnName(ident) => ident.quote_style = None,
            _ => {}
        }
        Ok(false)
    }

    fn issues(&self) -> Vec<Issue> {
        Vec::new()
    }

    fn reset(&self) {}
}
