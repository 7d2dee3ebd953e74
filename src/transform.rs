//! Transformation library: rule-driven AST rewrites.
//!
//! Each transformation takes a node and a matched rule and either rewrites
//! the node in place or declines. Dispatch is on the [`Action`] decoded at
//! rule load; an undecodable action is a no-op. Applying a transformation
//! to an already-target node never fires again because the rule index is
//! keyed by the source pattern, which the rewritten node no longer
//! matches.

use sqlparser::{
    ast::{
        ColumnOption, ColumnOptionDef, DataType, ExactNumberInfo, Expr, Ident, ObjectName,
        ObjectNamePart, SqlOption, TimezoneInfo, Value
    },
    tokenizer::Token
};
use tracing::debug;

use crate::{
    config::{Action, Rule},
    visitor::NodeMut
};

/// Kind tag of a table option, derived from its key text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOptionKind {
    CharacterSet,
    Collate,
    Engine,
    Other
}

/// Apply a rule's transformation to a node. Returns whether the node was
/// mutated; a declining transformation leaves the node untouched.
pub fn apply(node: &mut NodeMut<'_>, rule: &Rule) -> bool {
    let Some(action) = rule.then.kind else {
        debug!(
            rule = rule.name.as_str(),
            action = rule.then.action.as_str(),
            "未知的转换动作，跳过转换"
        );
        return false;
    };
    match action {
        Action::ReplaceFunction => replace_function(node, rule),
        Action::ReplaceType => replace_type(node, rule),
        Action::ReplaceConstraint => replace_constraint(node, rule),
        Action::ReplaceQuotes => replace_quotes(node, rule),
        Action::ReplaceClause => {
            // Declared but not populated with a concrete rewrite yet.
            debug!(rule = rule.name.as_str(), "replace_clause 暂无具体转换，仅报告问题");
            false
        }
        Action::ReplaceCharset => replace_table_option(node, rule, TableOptionKind::CharacterSet),
        Action::ReplaceCollation => replace_table_option(node, rule, TableOptionKind::Collate)
    }
}

fn replace_function(node: &mut NodeMut<'_>, rule: &Rule) -> bool {
    let NodeMut::Expr(expr) = node else {
        return false;
    };
    let Expr::Function(func) = &mut **expr else {
        return false;
    };
    // Arguments, distinct treatment, OVER clause and within-group ordering
    // all stay on the node; only the name changes.
    func.name = vec![Ident::new(rule.then.target.as_str())].into();
    true
}

fn replace_type(node: &mut NodeMut<'_>, rule: &Rule) -> bool {
    let Some(new_type) = target_data_type(&rule.then.target) else {
        debug!(target = rule.then.target.as_str(), "未识别的目标数据类型，保留原类型");
        return false;
    };
    match node {
        NodeMut::ColumnDef(column) => {
            column.data_type = new_type;
            strip_charset_option_defs(&mut column.options);
            true
        }
        NodeMut::FieldType(field) => {
            *field.data_type = new_type;
            strip_charset_options(field.options);
            true
        }
        _ => false
    }
}

fn replace_constraint(node: &mut NodeMut<'_>, rule: &Rule) -> bool {
    // Presently defined only for AUTO_INCREMENT -> SERIAL.
    if rule.then.target != "SERIAL" {
        return false;
    }
    match node {
        NodeMut::ColumnDef(column) => {
            let before = column.options.len();
            column.options.retain(|option| !is_auto_increment(&option.option));
            if column.options.len() == before {
                return false;
            }
            column.data_type = DataType::Int(None);
            true
        }
        NodeMut::FieldType(field) => {
            let before = field.options.len();
            field.options.retain(|option| !is_auto_increment(option));
            if field.options.len() == before {
                return false;
            }
            *field.data_type = DataType::Int(None);
            true
        }
        _ => false
    }
}

fn replace_quotes(node: &mut NodeMut<'_>, rule: &Rule) -> bool {
    let quote = rule.then.target.chars().next().unwrap_or('"');
    match node {
        NodeMut::TableName(name) => {
            let mut changed = false;
            for part in name.0.iter_mut() {
                if let ObjectNamePart::Identifier(ident) = part {
                    if ident.quote_style == Some('`') {
                        ident.quote_style = Some(quote);
                        changed = true;
                    }
                }
            }
            changed
        }
        NodeMut::ColumnName(ident) => {
            if ident.quote_style == Some('`') {
                ident.quote_style = Some(quote);
                true
            } else {
                false
            }
        }
        _ => false
    }
}

fn replace_table_option(node: &mut NodeMut<'_>, rule: &Rule, kind: TableOptionKind) -> bool {
    let NodeMut::TableOption(option) = node else {
        return false;
    };
    if table_option_kind(option) != kind {
        return false;
    }
    match table_option_value(option) {
        Some(value) if !value.is_empty() => set_table_option_value(option, &rule.then.target),
        _ => false
    }
}

/// Kind of a table option, derived from its key.
pub fn table_option_kind(option: &SqlOption) -> TableOptionKind {
    let Some(key) = option_key(option) else {
        return TableOptionKind::Other;
    };
    match key.to_ascii_uppercase().as_str() {
        "CHARSET" | "DEFAULT CHARSET" | "CHARACTER SET" | "DEFAULT CHARACTER SET" => {
            TableOptionKind::CharacterSet
        }
        "COLLATE" | "DEFAULT COLLATE" => TableOptionKind::Collate,
        "ENGINE" => TableOptionKind::Engine,
        _ => TableOptionKind::Other
    }
}

fn option_key(option: &SqlOption) -> Option<&str> {
    match option {
        SqlOption::KeyValue {
            key, ..
        } => Some(key.value.as_str()),
        SqlOption::NamedParenthesizedList(list) => Some(list.key.value.as_str()),
        SqlOption::Ident(ident) => Some(ident.value.as_str()),
        _ => None
    }
}

/// String value carried by a table option, when it has one.
pub fn table_option_value(option: &SqlOption) -> Option<String> {
    match option {
        SqlOption::KeyValue {
            value, ..
        } => match value {
            Expr::Identifier(ident) => Some(ident.value.clone()),
            Expr::Value(value) => match &value.value {
                Value::SingleQuotedString(text) | Value::DoubleQuotedString(text) => {
                    Some(text.clone())
                }
                Value::Number(text, _) => Some(text.clone()),
                _ => None
            },
            _ => None
        },
        SqlOption::NamedParenthesizedList(list) => list.name.as_ref().map(|name| name.value.clone()),
        _ => None
    }
}

/// Replace the string value of a table option, preserving its shape.
pub fn set_table_option_value(option: &mut SqlOption, target: &str) -> bool {
    match option {
        SqlOption::KeyValue {
            value, ..
        } => match value {
            Expr::Identifier(ident) => {
                *ident = Ident::new(target);
                true
            }
            Expr::Value(value) => match &mut value.value {
                Value::SingleQuotedString(text) | Value::DoubleQuotedString(text) => {
                    *text = target.to_string();
                    true
                }
                _ => false
            },
            _ => false
        },
        SqlOption::NamedParenthesizedList(list) => {
            list.name = Some(Ident::new(target));
            true
        }
        _ => false
    }
}

/// Whether a column option is MySQL's AUTO_INCREMENT marker.
pub fn is_auto_increment(option: &ColumnOption) -> bool {
    matches!(option, ColumnOption::DialectSpecific(tokens)
        if tokens.iter().any(|token| matches!(token, Token::Word(word)
            if word.value.eq_ignore_ascii_case("AUTO_INCREMENT"))))
}

/// Charset declared on a column definition's options, if any.
pub fn column_def_charset(options: &[ColumnOptionDef]) -> Option<String> {
    options.iter().find_map(|option| match &option.option {
        ColumnOption::CharacterSet(name) => Some(object_name_text(name)),
        _ => None
    })
}

/// Collation declared on a column definition's options, if any.
pub fn column_def_collation(options: &[ColumnOptionDef]) -> Option<String> {
    options.iter().find_map(|option| match &option.option {
        ColumnOption::Collation(name) => Some(object_name_text(name)),
        _ => None
    })
}

/// Charset declared on a bare column option list (ALTER MODIFY/CHANGE).
pub fn column_charset(options: &[ColumnOption]) -> Option<String> {
    options.iter().find_map(|option| match option {
        ColumnOption::CharacterSet(name) => Some(object_name_text(name)),
        _ => None
    })
}

/// Collation declared on a bare column option list (ALTER MODIFY/CHANGE).
pub fn column_collation(options: &[ColumnOption]) -> Option<String> {
    options.iter().find_map(|option| match option {
        ColumnOption::Collation(name) => Some(object_name_text(name)),
        _ => None
    })
}

/// Dotted, unquoted text of an object name.
pub fn object_name_text(name: &ObjectName) -> String {
    name.0
        .iter()
        .filter_map(|part| match part {
            ObjectNamePart::Identifier(ident) => Some(ident.value.as_str()),
            _ => None
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Canonical uppercase type name of a field type, used both as the rule
/// lookup key and to validate `replace_type` targets. Unknown types yield
/// an empty string and are skipped.
pub fn canonical_type_name(data_type: &DataType) -> String {
    let rendered = data_type.to_string().to_ascii_uppercase();
    let base = rendered.split(['(', ' ']).next().unwrap_or_default();
    let base = match base {
        "INTEGER" => "INT",
        "NUMERIC" | "DEC" => "DECIMAL",
        "CHARACTER" => "CHAR",
        "BOOL" | "BOOLEAN" => "TINYINT",
        other => other
    };
    if KNOWN_TYPE_NAMES.contains(&base) {
        base.to_string()
    } else {
        String::new()
    }
}

const KNOWN_TYPE_NAMES: &[&str] = &[
    "TINYINT",
    "SMALLINT",
    "MEDIUMINT",
    "INT",
    "BIGINT",
    "FLOAT",
    "DOUBLE",
    "DECIMAL",
    "DATE",
    "DATETIME",
    "TIMESTAMP",
    "TIME",
    "YEAR",
    "VARCHAR",
    "CHAR",
    "TEXT",
    "TINYTEXT",
    "MEDIUMTEXT",
    "LONGTEXT",
    "BLOB",
    "TINYBLOB",
    "MEDIUMBLOB",
    "LONGBLOB",
    "BINARY",
    "VARBINARY",
    "JSON",
    "ENUM",
    "SET",
    "BIT",
    "GEOMETRY",
];

/// Build the field type for a recognized `replace_type` target. Length,
/// scale, charset and collation are cleared by construction.
fn target_data_type(target: &str) -> Option<DataType> {
    match target.to_ascii_uppercase().as_str() {
        "TINYINT" => Some(DataType::TinyInt(None)),
        "SMALLINT" => Some(DataType::SmallInt(None)),
        "INT" => Some(DataType::Int(None)),
        "BIGINT" => Some(DataType::BigInt(None)),
        "FLOAT" => Some(DataType::Float(ExactNumberInfo::None)),
        "DOUBLE" => Some(DataType::Double(ExactNumberInfo::None)),
        "DECIMAL" => Some(DataType::Decimal(ExactNumberInfo::None)),
        "DATE" => Some(DataType::Date),
        "DATETIME" => Some(DataType::Datetime(None)),
        "TIMESTAMP" => Some(DataType::Timestamp(None, TimezoneInfo::None)),
        _ => None
    }
}

fn strip_charset_option_defs(options: &mut Vec<ColumnOptionDef>) {
    options.retain(|option| {
        !matches!(
            option.option,
            ColumnOption::CharacterSet(_) | ColumnOption::Collation(_)
        )
    });
}

fn strip_charset_options(options: &mut Vec<ColumnOption>) {
    options.retain(|option| {
        !matches!(option, ColumnOption::CharacterSet(_) | ColumnOption::Collation(_))
    });
}
