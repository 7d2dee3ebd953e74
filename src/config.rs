//! Rule catalog loading and indexing.
//!
//! The catalog is a declarative YAML document: a list of rules, each a
//! `(category, when.pattern, then.action/target)` tuple. Rules are indexed
//! by `(lower(category), upper(pattern))` at load time so checker lookups
//! never allocate. A missing catalog file yields an empty store; a
//! malformed one is a [`Config`](crate::error::AnalysisError::Config)
//! error.
//!
//! ```yaml
//! rules:
//!   - name: tinyint_to_smallint
//!     description: TINYINT 在目标数据库中不受支持
//!     category: datatype
//!     when:
//!       pattern: TINYINT
//!     then:
//!       action: replace_type
//!       target: SMALLINT
//! ```

use std::{
    env, fs,
    path::{Path, PathBuf},
    str::FromStr
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AppResult, config_error};

/// File name of the default catalog, looked up under `configs/`.
pub const DEFAULT_CONFIG_FILE: &str = "default.yaml";

/// Known checker categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Datatype,
    Function,
    Syntax,
    Charset
}

impl Category {
    /// All known categories, in canonical registration order.
    pub const ALL: [Category; 4] = [
        Category::Datatype,
        Category::Function,
        Category::Syntax,
        Category::Charset,
    ];

    /// Lowercase name used as the catalog category string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Datatype => "datatype",
            Self::Function => "function",
            Self::Syntax => "syntax",
            Self::Charset => "charset"
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "datatype" => Ok(Self::Datatype),
            "function" => Ok(Self::Function),
            "syntax" => Ok(Self::Syntax),
            "charset" => Ok(Self::Charset),
            _ => Err(())
        }
    }
}

/// Transformation action, decoded once at rule load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReplaceFunction,
    ReplaceType,
    ReplaceConstraint,
    ReplaceQuotes,
    ReplaceClause,
    ReplaceCharset,
    ReplaceCollation
}

impl Action {
    /// Decode a catalog action string. Unknown strings yield `None`; the
    /// rule still emits issues but transforms as a no-op.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "replace_function" => Some(Self::ReplaceFunction),
            "replace_type" => Some(Self::ReplaceType),
            "replace_constraint" => Some(Self::ReplaceConstraint),
            "replace_quotes" => Some(Self::ReplaceQuotes),
            "replace_clause" => Some(Self::ReplaceClause),
            "replace_charset" => Some(Self::ReplaceCharset),
            "replace_collation" => Some(Self::ReplaceCollation),
            _ => None
        }
    }
}

/// Match condition of a rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    /// Case-insensitive match key (type name, function name, syntactic
    /// marker or charset name, depending on the category).
    #[serde(default)]
    pub pattern: String
}

/// Action of a rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    /// Raw action string from the catalog.
    #[serde(default)]
    pub action:  String,
    /// Target value substituted in by the transformation.
    #[serde(default)]
    pub target:  String,
    /// Optional `from -> to` pairs for multi-value rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mapping: Vec<IndexMap<String, String>>,
    /// Decoded action, populated at load time.
    #[serde(skip)]
    pub kind:    Option<Action>
}

/// One declarative rule of the catalog. Immutable after load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub name:        String,
    #[serde(default)]
    pub description: String,
    /// Category, lowercased on load. Unknown categories are retained but
    /// never consulted.
    #[serde(default)]
    pub category:    String,
    #[serde(default)]
    pub when:        RuleCondition,
    #[serde(default)]
    pub then:        RuleAction
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    rules:        Vec<Rule>,
    #[serde(default)]
    last_updated: Option<String>
}

/// Loaded and indexed rule catalog.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules:        Vec<Rule>,
    by_category:  IndexMap<String, IndexMap<String, Rule>>,
    last_updated: Option<String>
}

impl RuleSet {
    /// Load a catalog from a file. A missing file is not an error and
    /// yields an empty store.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|err| config_error(format!("读取配置文件失败: {err}")))?;
        Self::from_yaml(&content)
    }

    /// Parse a catalog from YAML text.
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: CatalogFile =
            serde_yaml::from_str(content).map_err(|err| config_error(format!("解析YAML失败: {err}")))?;
        Ok(Self::build(file.rules, file.last_updated))
    }

    fn build(mut rules: Vec<Rule>, last_updated: Option<String>) -> Self {
        let mut by_category: IndexMap<String, IndexMap<String, Rule>> = IndexMap::new();
        for rule in &mut rules {
            rule.category = rule.category.to_lowercase();
            rule.then.kind = Action::parse(&rule.then.action);
            if rule.then.kind.is_none() && !rule.then.action.is_empty() {
                warn!(rule = rule.name.as_str(), action = rule.then.action.as_str(), "未知的转换动作，该规则仅报告问题");
            }
            let pattern_key = rule.when.pattern.to_uppercase();
            let slot = by_category.entry(rule.category.clone()).or_default();
            if let Some(existing) = slot.get(&pattern_key) {
                warn!(
                    rule = rule.name.as_str(),
                    pattern = pattern_key.as_str(),
                    existing = existing.name.as_str(),
                    "规则 pattern 重复，后者将覆盖前者"
                );
            }
            slot.insert(pattern_key, rule.clone());
        }
        Self {
            rules,
            by_category,
            last_updated
        }
    }

    /// All rules in catalog order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Zero-copy view of one category's rules, keyed by `upper(pattern)`.
    /// `category` must already be lowercase.
    pub fn rules_for(&self, category: &str) -> Option<&IndexMap<String, Rule>> {
        self.by_category.get(category)
    }

    /// All category strings present in the catalog, in first-seen order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.by_category.keys().map(String::as_str)
    }

    /// Known categories present in the catalog, in first-seen order.
    /// Unknown category strings are skipped, never consulted.
    pub fn known_categories(&self) -> Vec<Category> {
        self.categories()
            .filter_map(|name| Category::from_str(name).ok())
            .collect()
    }

    /// `last_updated` string of the catalog, if present.
    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Locate the default catalog: working directory, then ancestors carrying a
/// `Cargo.toml` project marker, then the executable directory, each checked
/// for `configs/default.yaml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        let candidate = cwd.join("configs").join(DEFAULT_CONFIG_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
        for dir in cwd.ancestors() {
            if dir.join("Cargo.toml").exists() {
                let candidate = dir.join("configs").join(DEFAULT_CONFIG_FILE);
                if candidate.exists() {
                    return Some(candidate);
                }
                break;
            }
        }
    }
    if let Ok(exe) = env::current_exe() {
        let candidate = exe.parent()?.join("configs").join(DEFAULT_CONFIG_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Default report output directory: `./output-report` under the working
/// directory, falling back to the executable directory. Never fails.
pub fn default_report_path() -> PathBuf {
    if let Ok(cwd) = env::current_dir() {
        return cwd.join("output-report");
    }
    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            return dir.join("output-report");
        }
    }
    PathBuf::from("output-report")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
rules:
  - name: tinyint_to_smallint
    description: TINYINT 不受支持
    category: DataType
    when:
      pattern: tinyint
    then:
      action: replace_type
      target: SMALLINT
  - name: group_concat
    description: GROUP_CONCAT 不受支持
    category: function
    when:
      pattern: GROUP_CONCAT
    then:
      action: replace_function
      target: STRING_AGG
last_updated: "2026-01-01"
"#;

    #[test]
    fn test_load_and_index() {
        let rules = RuleSet::from_yaml(SAMPLE).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.last_updated(), Some("2026-01-01"));

        // Category lowercased, pattern uppercased.
        let datatype = rules.rules_for("datatype").unwrap();
        let rule = datatype.get("TINYINT").unwrap();
        assert_eq!(rule.then.target, "SMALLINT");
        assert_eq!(rule.then.kind, Some(Action::ReplaceType));
    }

    #[test]
    fn test_empty_and_missing_inputs() {
        assert!(RuleSet::from_yaml("").unwrap().is_empty());
        assert!(RuleSet::from_yaml("rules: []").unwrap().is_empty());
        assert!(RuleSet::load(Path::new("/nonexistent/rules.yaml")).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let err = RuleSet::from_yaml("rules: [unclosed").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let text = r#"
rules:
  - name: r1
    category: syntax
    shiny_new_field: true
    when: {pattern: ENGINE}
    then: {action: replace_clause, target: x, extra: 1}
unknown_top_level: {}
"#;
        let rules = RuleSet::from_yaml(text).unwrap();
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_duplicate_pattern_last_wins() {
        let text = r#"
rules:
  - name: first
    category: function
    when: {pattern: ifnull}
    then: {action: replace_function, target: NVL}
  - name: second
    category: function
    when: {pattern: IFNULL}
    then: {action: replace_function, target: COALESCE}
"#;
        let rules = RuleSet::from_yaml(text).unwrap();
        let rule = rules.rules_for("function").unwrap().get("IFNULL").unwrap();
        assert_eq!(rule.name, "second");
        assert_eq!(rule.then.target, "COALESCE");
    }

    #[test]
    fn test_unknown_category_retained_not_consulted() {
        let text = r#"
rules:
  - name: odd
    category: Weird
    when: {pattern: X}
    then: {action: replace_clause, target: Y}
"#;
        let rules = RuleSet::from_yaml(text).unwrap();
        assert_eq!(rules.len(), 1);
        assert!(rules.rules_for("weird").is_some());
        assert!(rules.known_categories().is_empty());
    }

    #[test]
    fn test_unknown_action_tolerated() {
        let text = r#"
rules:
  - name: odd_action
    category: syntax
    when: {pattern: ENGINE}
    then: {action: replace_everything, target: X}
"#;
        let rules = RuleSet::from_yaml(text).unwrap();
        let rule = rules.rules_for("syntax").unwrap().get("ENGINE").unwrap();
        assert_eq!(rule.then.kind, None);
        assert_eq!(rule.then.action, "replace_everything");
    }

    #[test]
    fn test_known_categories_in_catalog_order() {
        let rules = RuleSet::from_yaml(SAMPLE).unwrap();
        assert_eq!(rules.known_categories(), vec![Category::Datatype, Category::Function]);
    }

    #[test]
    fn test_default_report_path_is_output_report() {
        let path = default_report_path();
        assert!(path.ends_with("output-report"));
    }
}
