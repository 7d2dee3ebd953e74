//! Charset and collation compatibility checker.
//!
//! Reacts to table options of the CHARACTER SET / COLLATE kinds and to
//! charset or collation declarations on column definitions (including the
//! ALTER TABLE MODIFY/CHANGE forms). The rule key is the upper-cased
//! charset or collation name. Only table options are rewritten; column
//! level findings are reported without mutation.

use std::sync::Arc;

use super::RuleChecker;
use crate::{
    config::{Category, RuleSet},
    error::AppResult,
    model::Issue,
    transform::{self, TableOptionKind},
    visitor::{Checker, NodeMut}
};

pub struct CharsetChecker {
    base: RuleChecker
}

impl CharsetChecker {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self {
            base: RuleChecker::new("CharsetChecker", Category::Charset, rules)
        }
    }

    /// Report a charset or collation finding and apply the rule to the
    /// node (a no-op unless the node is a table option of matching kind).
    fn apply_charset_rule(&self, node: &mut NodeMut<'_>, value: &str, kind: TableOptionKind) {
        let key = value.to_ascii_uppercase();
        let Some(rule) = self.base.rule(&key) else {
            return;
        };
        let label = if kind == TableOptionKind::CharacterSet {
            "字符集"
        } else {
            "排序规则"
        };
        self.base.add_issue(
            Issue::new(
                self.name(),
                format!("{label} {value}: {} (建议: {})", rule.description, rule.then.target)
            )
            .with_autofix(&rule.then.action, format!("{value} -> {}", rule.then.target))
        );
        transform::apply(node, rule);
    }
}

impl Checker for CharsetChecker {
    fn name(&self) -> &'static str {
        self.base.name()
    }

    fn inspect(&self, node: &mut NodeMut<'_>) -> AppResult<bool> {
        match node {
            NodeMut::TableOption(option) => {
                let kind = transform::table_option_kind(option);
                if !matches!(kind, TableOptionKind::CharacterSet | TableOptionKind::Collate) {
                    return Ok(false);
                }
                let value = transform::table_option_value(option).unwrap_or_default();
                if !value.is_empty() {
                    self.apply_charset_rule(node, &value, kind);
                }
                Ok(false)
            }
            NodeMut::ColumnDef(column) => {
                let charset = transform::column_def_charset(&column.options);
                let collation = transform::column_def_collation(&column.options);
                if let Some(value) = charset {
                    self.apply_charset_rule(node, &value, TableOptionKind::CharacterSet);
                }
                if let Some(value) = collation {
                    self.apply_charset_rule(node, &value, TableOptionKind::Collate);
                }
                Ok(false)
            }
            NodeMut::FieldType(field) => {
                let charset = transform::column_charset(field.options);
                let collation = transform::column_collation(field.options);
                if let Some(value) = charset {
                    self.apply_charset_rule(node, &value, TableOptionKind::CharacterSet);
                }
                if let Some(value) = collation {
                    self.apply_charset_rule(node, &value, TableOptionKind::Collate);
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
