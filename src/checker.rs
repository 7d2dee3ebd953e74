//! Category-bound checkers over the rule catalog.
//!
//! Every checker binds one category slice of the shared [`RuleSet`] to the
//! visitor protocol and accumulates issues in its own buffer. The buffer
//! sits behind a reader/writer lock so embedders may read `issues()` from
//! other threads while a walk is idle; the walk itself is single-threaded
//! per checker set.

mod charset;
mod datatype;
mod function;
mod syntax;

use std::sync::{Arc, RwLock};

pub use charset::CharsetChecker;
pub use datatype::DataTypeChecker;
pub use function::FunctionChecker;
pub use syntax::SyntaxChecker;

use crate::{
    config::{Category, Rule, RuleSet},
    error::{AppResult, config_error},
    model::Issue,
    visitor::Checker
};

/// Shared implementation of the checker contract: rule lookup for one
/// category plus a guarded issue buffer.
pub struct RuleChecker {
    name:     &'static str,
    category: Category,
    rules:    Arc<RuleSet>,
    issues:   RwLock<Vec<Issue>>
}

impl RuleChecker {
    fn new(name: &'static str, category: Category, rules: Arc<RuleSet>) -> Self {
        Self {
            name,
            category,
            rules,
            issues: RwLock::new(Vec::new())
        }
    }

    /// Checker name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Point lookup by `upper(pattern)` within this checker's category.
    pub fn rule(&self, pattern_key: &str) -> Option<&Rule> {
        self.rules.rules_for(self.category.as_str())?.get(pattern_key)
    }

    /// Append one issue.
    pub fn add_issue(&self, issue: Issue) {
        self.issues.write().expect("issue buffer lock poisoned").push(issue);
    }

    /// Snapshot of the collected issues.
    pub fn issues(&self) -> Vec<Issue> {
        self.issues.read().expect("issue buffer lock poisoned").clone()
    }

    /// Clear the issue buffer, keeping its allocation.
    pub fn reset(&self) {
        self.issues.write().expect("issue buffer lock poisoned").clear();
    }
}

/// Instantiate one checker per category name, in the given order. Names
/// are case-insensitive; an unknown name is a hard error; an empty list is
/// a valid pure-restore configuration.
pub fn create_checkers(
    rules: &Arc<RuleSet>,
    categories: &[String]
) -> AppResult<Vec<Box<dyn Checker>>> {
    let mut checkers: Vec<Box<dyn Checker>> = Vec::with_capacity(categories.len());
    for name in categories {
        match name.to_ascii_lowercase().as_str() {
            "datatype" => checkers.push(Box::new(DataTypeChecker::new(Arc::clone(rules)))),
            "function" => checkers.push(Box::new(FunctionChecker::new(Arc::clone(rules)))),
            "syntax" => checkers.push(Box::new(SyntaxChecker::new(Arc::clone(rules)))),
            "charset" => checkers.push(Box::new(CharsetChecker::new(Arc::clone(rules)))),
            other => return Err(config_error(format!("不支持的检查器类别: {other}")))
        }
    }
    Ok(checkers)
}
