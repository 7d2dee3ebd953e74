//! Function compatibility checker.
//!
//! Reacts to function calls (generic, aggregate and window); the rule key
//! is the upper-cased function name. A matching rule emits an issue and
//! renames the call in place, preserving arguments, distinct treatment and
//! window specification.

use std::sync::Arc;

use sqlparser::ast::{Expr, Function, ObjectNamePart};

use super::RuleChecker;
use crate::{
    config::{Category, RuleSet},
    error::AppResult,
    model::Issue,
    transform,
    visitor::{Checker, NodeMut}
};

/// MySQL aggregate function names, used only to label findings.
const AGGREGATE_FUNCTIONS: &[&str] = &[
    "AVG",
    "BIT_AND",
    "BIT_OR",
    "BIT_XOR",
    "COUNT",
    "GROUP_CONCAT",
    "JSON_ARRAYAGG",
    "JSON_OBJECTAGG",
    "MAX",
    "MIN",
    "STD",
    "STDDEV",
    "STDDEV_POP",
    "STDDEV_SAMP",
    "SUM",
    "VAR_POP",
    "VAR_SAMP",
    "VARIANCE",
];

pub struct FunctionChecker {
    base: RuleChecker
}

impl FunctionChecker {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self {
            base: RuleChecker::new("FunctionChecker", Category::Function, rules)
        }
    }
}

impl Checker for FunctionChecker {
    fn name(&self) -> &'static str {
        self.base.name()
    }

    fn inspect(&self, node: &mut NodeMut<'_>) -> AppResult<bool> {
        let NodeMut::Expr(expr) = node else {
            return Ok(false);
        };
        let Expr::Function(func) = &mut **expr else {
            return Ok(false);
        };
        let Some(name) = function_name(func) else {
            return Ok(false);
        };
        let key = name.to_ascii_uppercase();
        let Some(rule) = self.base.rule(&key) else {
            return Ok(false);
        };
        let label = function_label(func, &key);
        self.base.add_issue(
            Issue::new(
                self.name(),
                format!("{label} {key}: {} (建议: {})", rule.description, rule.then.target)
            )
            .with_autofix(&rule.then.action, format!("{key} -> {}", rule.then.target))
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

fn function_name(func: &Function) -> Option<String> {
    func.name.0.last().and_then(|part| match part {
        ObjectNamePart::Identifier(ident) => Some(ident.value.clone()),
        _ => None
    })
}

fn function_label(func: &Function, upper_name: &str) -> &'static str {
    if func.over.is_some() {
        "窗口函数"
    } else if AGGREGATE_FUNCTIONS.contains(&upper_name) {
        "聚合函数"
    } else {
        "函数"
    }
}
