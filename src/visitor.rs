//! Single-pass multi-visitor over the SQL AST.
//!
//! One depth-first walk offers every node to every registered checker in
//! registration order. Checkers mutate nodes in place through [`NodeMut`]
//! and may request that a node's subtree be skipped; a failing checker is
//! logged and treated as no-change/no-skip for that node.
//!
//! The walk is single-threaded per checker set. Different analyses may run
//! concurrently, each with its own checker set.

use sqlparser::ast::{
    AlterTableOperation, AssignmentTarget, ColumnDef, ColumnOption, CreateTableOptions, Expr,
    FromTable, Function, FunctionArg, FunctionArgExpr, FunctionArguments, GroupByExpr, Ident,
    JoinConstraint, JoinOperator, ObjectName, ObjectNamePart, OrderByKind, Query, Select,
    SelectItem, SetExpr, SqlOption, Statement, TableFactor, TableObject, TableWithJoins,
    WindowType
};
use tracing::warn;

use crate::{error::AppResult, model::Issue};

/// Mutable view of one AST node, as offered to checkers.
///
/// The variants are the node kinds the rule engine observes; everything
/// else in the AST is traversed but never offered.
pub enum NodeMut<'a> {
    /// A whole statement, offered before its children.
    Statement(&'a mut Statement),
    /// An expression, offered before its children. Function calls
    /// (generic, aggregate, window) are `Expr::Function`.
    Expr(&'a mut Expr),
    /// A column definition in `CREATE TABLE` or `ALTER TABLE ADD COLUMN`.
    ColumnDef(&'a mut ColumnDef),
    /// The type/options pair of `ALTER TABLE MODIFY/CHANGE COLUMN`, which
    /// carries a field type without a full column definition.
    FieldType(FieldTypeMut<'a>),
    /// One table option of a `CREATE TABLE` options clause.
    TableOption(&'a mut SqlOption),
    /// A table name.
    TableName(&'a mut ObjectName),
    /// A column name or identifier reference.
    ColumnName(&'a mut Ident)
}

/// Field-type carrier of `ALTER TABLE MODIFY/CHANGE COLUMN`.
pub struct FieldTypeMut<'a> {
    pub data_type: &'a mut sqlparser::ast::DataType,
    pub options:   &'a mut Vec<ColumnOption>
}

impl NodeMut<'_> {
    /// Node kind label used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Statement(_) => "Statement",
            Self::Expr(_) => "Expr",
            Self::ColumnDef(_) => "ColumnDef",
            Self::FieldType(_) => "FieldType",
            Self::TableOption(_) => "TableOption",
            Self::TableName(_) => "TableName",
            Self::ColumnName(_) => "ColumnName"
        }
    }
}

/// A category-bound inspector driven by the visitor.
///
/// `inspect` is called on every offered node on entry, never on leave. The
/// returned bool requests skipping the node's subtree. Implementations
/// mutate the node in place instead of returning a replacement; an `Err`
/// is logged by the visitor and treated as no-change/no-skip.
pub trait Checker: Send + Sync {
    /// Stable human-readable identifier (e.g. `FunctionChecker`).
    fn name(&self) -> &'static str;

    /// Inspect one node, optionally mutating it in place.
    fn inspect(&self, node: &mut NodeMut<'_>) -> AppResult<bool>;

    /// Snapshot of the issues collected so far.
    fn issues(&self) -> Vec<Issue>;

    /// Clear the issue buffer.
    fn reset(&self);
}

/// Check and transform a statement list in one traversal.
///
/// Resets every checker, walks each statement once, then collects issues
/// from each checker in registration order. An empty checker or statement
/// list short-circuits to no issues.
pub fn check(stmts: &mut [Statement], checkers: &[Box<dyn Checker>]) -> Vec<Issue> {
    if stmts.is_empty() || checkers.is_empty() {
        return Vec::new();
    }
    for checker in checkers {
        checker.reset();
    }
    let visitor = Visitor { checkers };
    for stmt in stmts.iter_mut() {
        visitor.walk_statement(stmt);
    }
    checkers.iter().flat_map(|checker| checker.issues()).collect()
}

struct Visitor<'a> {
    checkers: &'a [Box<dyn Checker>]
}

impl Visitor<'_> {
    /// Offer one node to every checker in registration order. Returns true
    /// when any checker requests skipping the subtree.
    fn offer(&self, node: &mut NodeMut<'_>) -> bool {
        let mut skip = false;
        for checker in self.checkers {
            match checker.inspect(node) {
                Ok(requested) => skip |= requested,
                Err(err) => {
                    warn!(
                        checker = checker.name(),
                        node = node.kind_name(),
                        "检查器执行失败，跳过该检查器: {err}"
                    );
                }
            }
        }
        skip
    }

    fn walk_statement(&self, stmt: &mut Statement) {
        if self.offer(&mut NodeMut::Statement(&mut *stmt)) {
            return;
        }
        match stmt {
            Statement::Query(query) => self.walk_query(query),
            Statement::Insert(insert) => {
                if let TableObject::TableName(name) = &mut insert.table {
                    self.offer(&mut NodeMut::TableName(name));
                }
                if let Some(source) = insert.source.as_mut() {
                    self.walk_query(source);
                }
            }
            Statement::Update {
                table,
                assignments,
                selection,
                ..
            } => {
                self.walk_table_with_joins(table);
                for assignment in assignments {
                    if let AssignmentTarget::ColumnName(name) = &mut assignment.target {
                        self.offer_object_name_parts(name);
                    }
                    self.walk_expr(&mut assignment.value);
                }
                if let Some(selection) = selection {
                    self.walk_expr(selection);
                }
            }
            Statement::Delete(delete) => {
                match &mut delete.from {
                    FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => {
                        for table in tables {
                            self.walk_table_with_joins(table);
                        }
                    }
                }
                for name in &mut delete.tables {
                    self.offer(&mut NodeMut::TableName(name));
                }
                if let Some(selection) = delete.selection.as_mut() {
                    self.walk_expr(selection);
                }
            }
            Statement::CreateTable(create) => {
                self.offer(&mut NodeMut::TableName(&mut create.name));
                for column in &mut create.columns {
                    self.walk_column_def(column);
                }
                if let Some(options) = create_table_options_mut(&mut create.table_options) {
                    for option in options {
                        self.offer(&mut NodeMut::TableOption(option));
                    }
                }
                if let Some(query) = create.query.as_mut() {
                    self.walk_query(query);
                }
            }
            Statement::AlterTable {
                name,
                operations,
                ..
            } => {
                self.offer(&mut NodeMut::TableName(name));
                for operation in operations {
                    match operation {
                        AlterTableOperation::AddColumn {
                            column_def, ..
                        } => self.walk_column_def(column_def),
                        AlterTableOperation::ModifyColumn {
                            data_type,
                            options,
                            ..
                        } => {
                            self.offer(&mut NodeMut::FieldType(FieldTypeMut {
                                data_type,
                                options
                            }));
                        }
                        AlterTableOperation::ChangeColumn {
                            new_name,
                            data_type,
                            options,
                            ..
                        } => {
                            self.offer(&mut NodeMut::ColumnName(new_name));
                            self.offer(&mut NodeMut::FieldType(FieldTypeMut {
                                data_type,
                                options
                            }));
                        }
                        _ => {}
                    }
                }
            }
            Statement::CreateView {
                query, ..
            } => self.walk_query(query),
            Statement::Drop {
                names, ..
            } => {
                for name in names {
                    self.offer(&mut NodeMut::TableName(name));
                }
            }
            Statement::Truncate {
                table_names, ..
            } => {
                for target in table_names {
                    self.offer(&mut NodeMut::TableName(&mut target.name));
                }
            }
            // LOCK TABLES / UNLOCK TABLES carry nothing the engine
            // descends into; they were offered as statements above.
            _ => {}
        }
    }

    fn walk_column_def(&self, column: &mut ColumnDef) {
        if self.offer(&mut NodeMut::ColumnDef(&mut *column)) {
            return;
        }
        self.offer(&mut NodeMut::ColumnName(&mut column.name));
        for option in &mut column.options {
            if let ColumnOption::Default(expr) = &mut option.option {
                self.walk_expr(expr);
            }
        }
    }

    fn walk_query(&self, query: &mut Query) {
        if let Some(with) = query.with.as_mut() {
            for cte in &mut with.cte_tables {
                self.walk_query(&mut cte.query);
            }
        }
        self.walk_set_expr(&mut query.body);
        if let Some(order_by) = query.order_by.as_mut() {
            if let OrderByKind::Expressions(exprs) = &mut order_by.kind {
                for order_expr in exprs {
                    self.walk_expr(&mut order_expr.expr);
                }
            }
        }
        if let Some(limit_clause) = query.limit_clause.as_mut() {
            self.walk_limit_clause(limit_clause);
        }
    }

    fn walk_limit_clause(&self, limit_clause: &mut sqlparser::ast::LimitClause) {
        use sqlparser::ast::LimitClause;
        match limit_clause {
            LimitClause::LimitOffset {
                limit,
                offset,
                limit_by
            } => {
                if let Some(limit) = limit {
                    self.walk_expr(limit);
                }
                if let Some(offset) = offset {
                    self.walk_expr(&mut offset.value);
                }
                for expr in limit_by {
                    self.walk_expr(expr);
                }
            }
            LimitClause::OffsetCommaLimit {
                offset,
                limit
            } => {
                self.walk_expr(offset);
                self.walk_expr(limit);
            }
        }
    }

    fn walk_set_expr(&self, body: &mut SetExpr) {
        match body {
            SetExpr::Select(select) => self.walk_select(select),
            SetExpr::Query(query) => self.walk_query(query),
            SetExpr::SetOperation {
                left,
                right,
                ..
            } => {
                self.walk_set_expr(left);
                self.walk_set_expr(right);
            }
            SetExpr::Values(values) => {
                for row in &mut values.rows {
                    for expr in row {
                        self.walk_expr(expr);
                    }
                }
            }
            SetExpr::Insert(stmt) | SetExpr::Update(stmt) | SetExpr::Delete(stmt) => {
                self.walk_statement(stmt)
            }
            _ => {}
        }
    }

    fn walk_select(&self, select: &mut Select) {
        for item in &mut select.projection {
            match item {
                SelectItem::UnnamedExpr(expr)
                | SelectItem::ExprWithAlias {
                    expr, ..
                } => self.walk_expr(expr),
                _ => {}
            }
        }
        for table in &mut select.from {
            self.walk_table_with_joins(table);
        }
        if let Some(selection) = select.selection.as_mut() {
            self.walk_expr(selection);
        }
        if let GroupByExpr::Expressions(exprs, _) = &mut select.group_by {
            for expr in exprs {
                self.walk_expr(expr);
            }
        }
        if let Some(having) = select.having.as_mut() {
            self.walk_expr(having);
        }
    }

    fn walk_table_with_joins(&self, table: &mut TableWithJoins) {
        self.walk_table_factor(&mut table.relation);
        for join in &mut table.joins {
            self.walk_table_factor(&mut join.relation);
            self.walk_join_operator(&mut join.join_operator);
        }
    }

    fn walk_table_factor(&self, relation: &mut TableFactor) {
        match relation {
            TableFactor::Table {
                name, ..
            } => {
                self.offer(&mut NodeMut::TableName(name));
            }
            TableFactor::Derived {
                subquery, ..
            } => self.walk_query(subquery),
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => self.walk_table_with_joins(table_with_joins),
            _ => {}
        }
    }

    fn walk_join_operator(&self, operator: &mut JoinOperator) {
        match operator {
            JoinOperator::Join(constraint)
            | JoinOperator::Inner(constraint)
            | JoinOperator::Left(constraint)
            | JoinOperator::LeftOuter(constraint)
            | JoinOperator::Right(constraint)
            | JoinOperator::RightOuter(constraint)
            | JoinOperator::FullOuter(constraint)
            | JoinOperator::CrossJoin(constraint)
            | JoinOperator::StraightJoin(constraint) => {
                if let JoinConstraint::On(expr) = constraint {
                    self.walk_expr(expr);
                }
            }
            _ => {}
        }
    }

    fn walk_expr(&self, expr: &mut Expr) {
        if self.offer(&mut NodeMut::Expr(&mut *expr)) {
            return;
        }
        match expr {
            Expr::Identifier(ident) => {
                self.offer(&mut NodeMut::ColumnName(ident));
            }
            Expr::CompoundIdentifier(parts) => {
                for part in parts {
                    self.offer(&mut NodeMut::ColumnName(part));
                }
            }
            Expr::BinaryOp {
                left,
                right,
                ..
            } => {
                self.walk_expr(left);
                self.walk_expr(right);
            }
            Expr::UnaryOp {
                expr: inner, ..
            }
            | Expr::Nested(inner)
            | Expr::IsNull(inner)
            | Expr::IsNotNull(inner)
            | Expr::IsTrue(inner)
            | Expr::IsNotTrue(inner)
            | Expr::IsFalse(inner)
            | Expr::IsNotFalse(inner) => self.walk_expr(inner),
            Expr::Cast {
                expr: inner, ..
            } => self.walk_expr(inner),
            Expr::Case {
                operand,
                conditions,
                else_result,
                ..
            } => {
                if let Some(operand) = operand.as_mut() {
                    self.walk_expr(operand);
                }
                for case_when in conditions {
                    self.walk_expr(&mut case_when.condition);
                    self.walk_expr(&mut case_when.result);
                }
                if let Some(else_result) = else_result.as_mut() {
                    self.walk_expr(else_result);
                }
            }
            Expr::Function(func) => self.walk_function(func),
            Expr::Between {
                expr: target,
                low,
                high,
                ..
            } => {
                self.walk_expr(target);
                self.walk_expr(low);
                self.walk_expr(high);
            }
            Expr::InList {
                expr: target,
                list,
                ..
            } => {
                self.walk_expr(target);
                for item in list {
                    self.walk_expr(item);
                }
            }
            Expr::InSubquery {
                expr: target,
                subquery,
                ..
            } => {
                self.walk_expr(target);
                self.walk_query(subquery);
            }
            Expr::Subquery(query)
            | Expr::Exists {
                subquery: query, ..
            } => self.walk_query(query),
            Expr::Like {
                expr: target,
                pattern,
                ..
            }
            | Expr::ILike {
                expr: target,
                pattern,
                ..
            } => {
                self.walk_expr(target);
                self.walk_expr(pattern);
            }
            Expr::Tuple(items) => {
                for item in items {
                    self.walk_expr(item);
                }
            }
            _ => {}
        }
    }

    fn walk_function(&self, func: &mut Function) {
        if let FunctionArguments::List(arg_list) = &mut func.args {
            for arg in &mut arg_list.args {
                match arg {
                    FunctionArg::Named {
                        arg, ..
                    }
                    | FunctionArg::ExprNamed {
                        arg, ..
                    }
                    | FunctionArg::Unnamed(arg) => {
                        if let FunctionArgExpr::Expr(expr) = arg {
                            self.walk_expr(expr);
                        }
                    }
                }
            }
        }
        if let Some(filter) = func.filter.as_mut() {
            self.walk_expr(filter);
        }
        for order_expr in &mut func.within_group {
            self.walk_expr(&mut order_expr.expr);
        }
        if let Some(WindowType::WindowSpec(spec)) = func.over.as_mut() {
            for expr in &mut spec.partition_by {
                self.walk_expr(expr);
            }
            for order_expr in &mut spec.order_by {
                self.walk_expr(&mut order_expr.expr);
            }
        }
    }

    fn offer_object_name_parts(&self, name: &mut ObjectName) {
        for part in name.0.iter_mut() {
            if let ObjectNamePart::Identifier(ident) = part {
                self.offer(&mut NodeMut::ColumnName(ident));
            }
        }
    }
}

fn create_table_options_mut(options: &mut CreateTableOptions) -> Option<&mut Vec<SqlOption>> {
    match options {
        CreateTableOptions::None => None,
        CreateTableOptions::With(opts)
        | CreateTableOptions::Options(opts)
        | CreateTableOptions::Plain(opts)
        | CreateTableOptions::TableProperties(opts) => Some(opts)
    }
}
