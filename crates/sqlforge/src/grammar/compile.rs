//! The clause walk shared by every grammar.

use super::Grammar;
use crate::builder::{Predicate, QueryBuilder};
use crate::column::{Column, Expression};
use crate::error::{OrmError, OrmResult};
use crate::ident::wrap;
use crate::operator::{Operator, QueryKind};
use crate::value::{Binding, Value};
use crate::variants::GroupConcat;

pub(crate) fn compile_query<G: Grammar + ?Sized>(grammar: &G, qb: &QueryBuilder) -> OrmResult<String> {
    let renderer = Renderer {
        grammar,
        bindings: qb.bindings(),
    };
    renderer.statement(qb)
}

pub(crate) fn compile_concat<G: Grammar + ?Sized>(
    grammar: &G,
    concat: &GroupConcat,
) -> OrmResult<String> {
    let renderer = Renderer {
        grammar,
        bindings: concat.bindings(),
    };
    renderer.concat(concat)
}

/// Renders one statement tree. Nested builders (sub-queries, groups, unions) are
/// rendered with the root's bind list, since their bindings were merged into it.
struct Renderer<'a, G: Grammar + ?Sized> {
    grammar: &'a G,
    bindings: &'a [Binding],
}

fn non_negative(what: &str, value: Option<i64>) -> OrmResult<Option<u64>> {
    match value {
        None => Ok(None),
        Some(n) => u64::try_from(n)
            .map(Some)
            .map_err(|_| OrmError::compile(format!("{what} cannot be negative (got {n})"))),
    }
}

impl<G: Grammar + ?Sized> Renderer<'_, G> {
    fn statement(&self, qb: &QueryBuilder) -> OrmResult<String> {
        match qb.kind() {
            QueryKind::Select | QueryKind::Random => self.select(qb),
            QueryKind::Insert => self.insert(qb),
            QueryKind::Update => self.update(qb),
            QueryKind::Delete => self.delete(qb),
            QueryKind::Raw => qb
                .raw_text()
                .map(str::to_string)
                .ok_or_else(|| OrmError::compile("raw statement has no text")),
            QueryKind::None => Err(OrmError::compile(
                "builder has no statement kind; call select, insert, update, delete or raw first",
            )),
        }
    }

    // ==================== Fragments ====================

    fn expression(&self, expr: &Expression) -> String {
        match expr {
            Expression::Text(text) => wrap(text, self.grammar.quote()),
            Expression::Raw(text) => text.clone(),
            Expression::Deferred(f) => f.eval(),
        }
    }

    fn expressions(&self, exprs: &[Expression]) -> String {
        exprs
            .iter()
            .map(|e| self.expression(e))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn column(&self, column: &Column) -> String {
        match column {
            Column::Name(name) => wrap(name, self.grammar.quote()),
            Column::Handle(handle) => wrap(handle.name(), self.grammar.quote()),
            Column::Deferred(f) => f.eval(),
        }
    }

    fn value(&self, value: &Value) -> OrmResult<String> {
        Ok(match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.grammar.bool_literal(*b).to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => {
                if !f.is_finite() {
                    return Err(OrmError::compile(format!("cannot render float {f}")));
                }
                f.to_string()
            }
            Value::Text(s) => format!("'{}'", self.grammar.escape_string(s)),
            Value::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Param(p) => {
                let position = self
                    .bindings
                    .iter()
                    .position(|b| b.name.as_deref() == Some(p.name()))
                    .map(|i| i + 1);
                self.grammar.placeholder(p.name(), position)
            }
            Value::Column(c) => self.column(c),
            Value::List(items) => format!("({})", self.values(items)?),
            Value::Query(sub) => format!("({})", self.statement(sub.builder())?),
            Value::Group(sub) => format!("({})", self.conditions_of(sub.builder())?),
        })
    }

    fn values(&self, items: &[Value]) -> OrmResult<String> {
        let rendered = items
            .iter()
            .map(|v| self.value(v))
            .collect::<OrmResult<Vec<_>>>()?;
        Ok(rendered.join(", "))
    }

    fn predicate(&self, p: &Predicate) -> OrmResult<String> {
        let Some(op) = p.operator else {
            return match &p.value {
                Value::Group(_) => self.value(&p.value),
                _ => Ok(self.column(&p.column)),
            };
        };
        let column = self.column(&p.column);
        match (op, &p.value) {
            (Operator::Eq, Value::Null) => Ok(format!("{column} IS NULL")),
            (op, Value::Null) if op.is_negated_equality() => Ok(format!("{column} IS NOT NULL")),
            (Operator::In, Value::List(items)) if items.is_empty() => Ok("1 = 0".to_string()),
            (Operator::In, Value::List(items)) => Ok(format!("{column} IN ({})", self.values(items)?)),
            (Operator::In, Value::Param(_)) => Ok(format!("{column} IN ({})", self.value(&p.value)?)),
            (Operator::Between, Value::List(bounds)) if bounds.len() == 2 => Ok(format!(
                "{column} BETWEEN {} AND {}",
                self.value(&bounds[0])?,
                self.value(&bounds[1])?
            )),
            (Operator::Between, _) => Err(OrmError::compile(
                "BETWEEN needs exactly two bounds",
            )),
            (op, value) => Ok(format!(
                "{column} {} {}",
                self.grammar.operator(op),
                self.value(value)?
            )),
        }
    }

    /// Predicates joined by their connectives; the first connective is dropped.
    fn conditions<'p>(&self, predicates: impl Iterator<Item = &'p Predicate>) -> OrmResult<String> {
        let mut out = String::new();
        for (i, p) in predicates.enumerate() {
            if i > 0 {
                out.push(' ');
                out.push_str(p.boolean.as_sql());
                out.push(' ');
            }
            out.push_str(&self.predicate(p)?);
        }
        Ok(out)
    }

    fn conditions_of(&self, qb: &QueryBuilder) -> OrmResult<String> {
        self.conditions(qb.where_map().values().flatten())
    }

    fn where_clause(&self, qb: &QueryBuilder, out: &mut String) -> OrmResult<()> {
        if !qb.where_map().is_empty() {
            out.push_str(" WHERE ");
            out.push_str(&self.conditions_of(qb)?);
        }
        Ok(())
    }

    fn order_clause(&self, qb: &QueryBuilder, random: bool, out: &mut String) -> bool {
        let mut items: Vec<String> = qb
            .order_map()
            .iter()
            .flat_map(|(dir, columns)| {
                columns
                    .iter()
                    .map(move |c| format!("{} {}", self.column(c), dir.as_sql()))
            })
            .collect();
        if random {
            items.push(self.grammar.random_order().to_string());
        }
        if items.is_empty() {
            return false;
        }
        out.push_str(" ORDER BY ");
        out.push_str(&items.join(", "));
        true
    }

    // ==================== SELECT ====================

    /// FROM through GROUP BY, shared by plain selects and group concat.
    fn select_body(&self, qb: &QueryBuilder, out: &mut String) -> OrmResult<()> {
        if !qb.from_list().is_empty() {
            let hint = if qb.is_locked() {
                self.grammar.table_lock_hint()
            } else {
                None
            };
            let tables: Vec<String> = qb
                .from_list()
                .iter()
                .map(|t| match hint {
                    Some(hint) => format!("{} {hint}", self.expression(t)),
                    None => self.expression(t),
                })
                .collect();
            out.push_str(" FROM ");
            out.push_str(&tables.join(", "));
        }
        for join in qb.joins() {
            out.push(' ');
            out.push_str(join.kind.as_sql());
            out.push(' ');
            out.push_str(&self.expression(&join.table));
            if !join.predicates.is_empty() {
                out.push_str(" ON ");
                out.push_str(&self.conditions(join.predicates.iter())?);
            }
        }
        self.where_clause(qb, out)?;
        if !qb.group_by_list().is_empty() {
            out.push_str(" GROUP BY ");
            out.push_str(&self.expressions(qb.group_by_list()));
        }
        Ok(())
    }

    fn select(&self, qb: &QueryBuilder) -> OrmResult<String> {
        let random = qb.kind() == QueryKind::Random;
        let limit = if random {
            Some(1)
        } else {
            non_negative("limit", qb.get_limit())?
        };
        let offset = non_negative("offset", qb.get_offset())?;

        let mut out = String::from("SELECT ");
        if qb.is_distinct() {
            out.push_str("DISTINCT ");
        }
        let top = self.grammar.select_top(limit, offset);
        if let Some(top) = &top {
            out.push_str(top);
            out.push(' ');
        }
        if qb.select_list().is_empty() {
            out.push('*');
        } else {
            out.push_str(&self.expressions(qb.select_list()));
        }
        self.select_body(qb, &mut out)?;

        for union in qb.union_list() {
            out.push_str(if union.all { " UNION ALL " } else { " UNION " });
            out.push_str(&self.union_member(union.query.builder())?);
        }

        let ordered = self.order_clause(qb, random, &mut out);
        let (limit, offset) = if top.is_some() { (None, offset) } else { (limit, offset) };
        if let Some(page) = self.grammar.compile_pagination(limit, offset, ordered) {
            out.push(' ');
            out.push_str(&page);
        }
        if qb.is_locked() {
            if let Some(suffix) = self.grammar.lock_suffix() {
                out.push(' ');
                out.push_str(suffix);
            }
        }
        Ok(out)
    }

    /// A member with its own ordering or pagination is parenthesized so the
    /// clauses stay attached to it rather than to the whole union.
    fn union_member(&self, member: &QueryBuilder) -> OrmResult<String> {
        if member.is_locked() {
            return Err(OrmError::compile("a UNION member cannot lock rows"));
        }
        let sql = self.statement(member)?;
        let scoped = member.kind() == QueryKind::Random
            || !member.order_map().is_empty()
            || member.get_limit().is_some()
            || member.get_offset().is_some();
        if !scoped {
            return Ok(sql);
        }
        if !self.grammar.parenthesized_union_members() {
            return Err(OrmError::compile(format!(
                "{} cannot apply ORDER BY or LIMIT to a single UNION member",
                self.grammar.name()
            )));
        }
        Ok(format!("({sql})"))
    }

    fn concat(&self, concat: &GroupConcat) -> OrmResult<String> {
        if concat.concat_columns().is_empty() {
            return Err(OrmError::compile("group concat needs at least one column"));
        }
        let columns: Vec<String> = concat
            .concat_columns()
            .iter()
            .map(|c| self.expression(c))
            .collect();
        let separator = format!("'{}'", self.grammar.escape_string(concat.get_separator()));
        let mut out = format!(
            "SELECT {} AS {}",
            self.grammar.concat_aggregate(&columns, &separator),
            wrap(concat.get_alias(), self.grammar.quote())
        );
        self.select_body(concat, &mut out)?;
        Ok(out)
    }

    // ==================== Writes ====================

    fn insert(&self, qb: &QueryBuilder) -> OrmResult<String> {
        let target = qb
            .target()
            .ok_or_else(|| OrmError::compile("INSERT needs a target table; call into()"))?;
        if qb.get_values().is_empty() {
            return Err(OrmError::compile("INSERT needs at least one row of values"));
        }
        let width = qb.insert_columns().len();
        let mut rows = Vec::with_capacity(qb.get_values().len());
        for (i, row) in qb.get_values().iter().enumerate() {
            if width > 0 && row.len() != width {
                return Err(OrmError::compile(format!(
                    "INSERT row {i} has {} values for {width} columns",
                    row.len()
                )));
            }
            rows.push(format!("({})", self.values(row)?));
        }
        let mut out = format!("INSERT INTO {}", self.expression(target));
        if width > 0 {
            out.push_str(&format!(" ({})", self.expressions(qb.insert_columns())));
        }
        out.push_str(" VALUES ");
        out.push_str(&rows.join(", "));
        Ok(out)
    }

    /// Trailing ORDER BY / LIMIT of UPDATE and DELETE.
    fn write_tail(&self, qb: &QueryBuilder, statement: &str, out: &mut String) -> OrmResult<()> {
        let limit = non_negative("limit", qb.get_limit())?;
        let has_tail = !qb.order_map().is_empty() || limit.is_some() || qb.get_offset().is_some();
        if !has_tail {
            return Ok(());
        }
        if !self.grammar.supports_update_limit() {
            return Err(OrmError::compile(format!(
                "{} does not support ORDER BY or LIMIT on {statement}",
                self.grammar.name()
            )));
        }
        if qb.get_offset().is_some() {
            return Err(OrmError::compile(format!("{statement} cannot have an OFFSET")));
        }
        self.order_clause(qb, false, out);
        if let Some(n) = limit {
            out.push_str(&format!(" LIMIT {n}"));
        }
        Ok(())
    }

    fn reject_joins(qb: &QueryBuilder, statement: &str) -> OrmResult<()> {
        if qb.joins().is_empty() {
            Ok(())
        } else {
            Err(OrmError::compile(format!("{statement} cannot render joins")))
        }
    }

    fn update(&self, qb: &QueryBuilder) -> OrmResult<String> {
        Self::reject_joins(qb, "UPDATE")?;
        let tables = if qb.update_targets().is_empty() {
            let target = qb
                .target()
                .ok_or_else(|| OrmError::compile("UPDATE needs a table"))?;
            self.expression(target)
        } else {
            self.expressions(qb.update_targets())
        };
        if qb.assignments().is_empty() {
            return Err(OrmError::compile("UPDATE needs at least one assignment; call set()"));
        }
        let assignments = qb
            .assignments()
            .values()
            .map(|(column, value)| Ok(format!("{} = {}", self.column(column), self.value(value)?)))
            .collect::<OrmResult<Vec<_>>>()?;

        let mut out = format!("UPDATE {tables} SET {}", assignments.join(", "));
        self.where_clause(qb, &mut out)?;
        self.write_tail(qb, "UPDATE", &mut out)?;
        Ok(out)
    }

    fn delete(&self, qb: &QueryBuilder) -> OrmResult<String> {
        Self::reject_joins(qb, "DELETE")?;
        let table = qb
            .target()
            .or_else(|| qb.from_list().first())
            .ok_or_else(|| OrmError::compile("DELETE needs a table; call into() or from()"))?;
        let mut out = format!("DELETE FROM {}", self.expression(table));
        self.where_clause(qb, &mut out)?;
        self.write_tail(qb, "DELETE", &mut out)?;
        Ok(out)
    }
}
