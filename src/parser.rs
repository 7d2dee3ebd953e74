//! Thin wrapper around the embedded MySQL-compatible SQL parser.

use sqlparser::{
    ast::Statement,
    dialect::MySqlDialect,
    parser::{Parser, ParserError}
};

/// Parse MySQL text into a statement list. Parsing only; analysis and
/// rewriting happen on the returned AST.
pub fn parse_statements(sql: &str) -> Result<Vec<Statement>, ParserError> {
    Parser::parse_sql(&MySqlDialect {}, sql)
}
