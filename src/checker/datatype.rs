//! Data type compatibility checker.
//!
//! Reacts to column definitions, both directly and through the
//! MODIFY/CHANGE column forms of ALTER TABLE. The rule key is the
//! canonical type name derived from the column's field type.

use std::sync::Arc;

use super::RuleChecker;
use crate::{
    config::{Category, RuleSet},
    error::AppResult,
    model::Issue,
    transform,
    visitor::{Checker, NodeMut}
};

pub struct DataTypeChecker {
    base: RuleChecker
}

impl DataTypeChecker {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self {
            base: RuleChecker::new("DataTypeChecker", Category::Datatype, rules)
        }
    }
}

impl Checker for DataTypeChecker {
    fn name(&self) -> &'static str {
        self.base.name()
    }

    fn inspect(&self, node: &mut NodeMut<'_>) -> AppResult<bool> {
        let type_name = match node {
            NodeMut::ColumnDef(column) => transform::canonical_type_name(&column.data_type),
            NodeMut::FieldType(field) => transform::canonical_type_name(field.data_type),
            _ => return Ok(false)
        };
        if type_name.is_empty() {
            return Ok(false);
        }
        let Some(rule) = self.base.rule(&type_name) else {
            return Ok(false);
        };
        self.base.add_issue(
            Issue::new(
                self.name(),
                format!("数据类型 {type_name}: {} (建议: {})", rule.description, rule.then.target)
            )
            .with_autofix(&rule.then.action, format!("{type_name} -> {}", rule.then.target))
        );
        transform::apply(node, rule);
        Ok(false)
    }

    fn issues(&self) -> Vec<Issue> {
        self.base.issues()
    }

    fn reset(&self) {
        self.base.reset()
    }
}
