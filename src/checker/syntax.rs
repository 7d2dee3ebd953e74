//! Syntax compatibility checker.
//!
//! Catches MySQL-only syntactic markers: AUTO_INCREMENT column options,
//! ENGINE table options, backtick identifiers, and the LOCK TABLES /
//! UNLOCK TABLES statements. Lock statements are reported but never
//! rewritten.

use std::sync::Arc;

use sqlparser::ast::{ObjectNamePart, Statement};

use super::RuleChecker;
use crate::{
    config::{Category, RuleSet},
    error::AppResult,
    model::Issue,
    transform::{self, TableOptionKind},
    visitor::{Checker, NodeMut}
};

const LOCK_TABLES_MESSAGE: &str = "MySQL LOCK TABLES 语法不兼容: LOCK TABLES 是 MySQL 特有的表锁定语法，目标数据库可能使用不同的锁定机制或不支持此语法";
const UNLOCK_TABLES_MESSAGE: &str = "MySQL UNLOCK TABLES 语法不兼容: UNLOCK TABLES 是 MySQL 特有的表解锁语法，目标数据库可能使用不同的锁定机制或不支持此语法";

pub struct SyntaxChecker {
    base: RuleChecker
}

impl SyntaxChecker {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self {
            base: RuleChecker::new("SyntaxChecker", Category::Syntax, rules)
        }
    }

    /// Report and transform a marker rule (AUTO_INCREMENT, ENGINE) when
    /// the catalog carries it.
    fn apply_marker_rule(&self, node: &mut NodeMut<'_>, marker: &str) {
        let Some(rule) = self.base.rule(marker) else {
            return;
        };
        self.base.add_issue(
            Issue::new(
                self.name(),
                format!("语法 {marker}: {} (建议: {})", rule.description, rule.then.target)
            )
            .with_autofix(&rule.then.action, format!("{marker} -> {}", rule.then.target))
        );
        transform::apply(node, rule);
    }

    /// Report and transform the backtick rule for one identifier text.
    fn apply_quote_rule(&self, node: &mut NodeMut<'_>, text: &str) {
        let Some(rule) = self.base.rule("`") else {
            return;
        };
        self.base.add_issue(
            Issue::new(
                self.name(),
                format!("语法 反引号: {} (建议: {})", rule.description, rule.then.target)
            )
            .with_autofix(&rule.then.action, format!("`{text}` -> \"{text}\""))
        );
        transform::apply(node, rule);
    }
}

impl Checker for SyntaxChecker {
    fn name(&self) -> &'static str {
        self.base.name()
    }

    fn inspect(&self, node: &mut NodeMut<'_>) -> AppResult<bool> {
        match node {
            NodeMut::Statement(stmt) => {
                match &**stmt {
                    Statement::LockTables {
                        ..
                    } => self.base.add_issue(Issue::new(self.name(), LOCK_TABLES_MESSAGE)),
                    Statement::UnlockTables {
                        ..
                    } => self.base.add_issue(Issue::new(self.name(), UNLOCK_TABLES_MESSAGE)),
                    _ => {}
                }
                Ok(false)
            }
            NodeMut::ColumnDef(column) => {
                let has_auto_increment = column
                    .options
                    .iter()
                    .any(|option| transform::is_auto_increment(&option.option));
                if has_auto_increment {
                    self.apply_marker_rule(node, "AUTO_INCREMENT");
                }
                Ok(false)
            }
            NodeMut::FieldType(field) => {
                let has_auto_increment =
                    field.options.iter().any(transform::is_auto_increment);
                if has_auto_increment {
                    self.apply_marker_rule(node, "AUTO_INCREMENT");
                }
                Ok(false)
            }
            NodeMut::TableOption(option) => {
                if transform::table_option_kind(option) == TableOptionKind::Engine {
                    self.apply_marker_rule(node, "ENGINE");
                }
                Ok(false)
            }
            NodeMut::TableName(name) => {
                let has_backtick = name.0.iter().any(|part| {
                    matches!(part, ObjectNamePart::Identifier(ident)
                        if ident.quote_style == Some('`'))
                });
                if has_backtick {
                    let text = transform::object_name_text(name);
                    self.apply_quote_rule(node, &text);
                }
                Ok(false)
            }
            NodeMut::ColumnName(ident) => {
                if ident.quote_style == Some('`') {
                    let text = ident.value.clone();
                    self.apply_quote_rule(node, &text);
                }
                Ok(false)
            }
            _ => Ok(false)
        }
    }

    fn issues(&self) -> Vec<Issue> {
        self.base.issues()
    }

    fn reset(&self) {
        self.base.reset()
    }
}
