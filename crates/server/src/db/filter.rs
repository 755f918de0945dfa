//! Translate a parsed `ListQuery` into SQL fragments with positional parameters

use chrono::{DateTime, Utc};
use hospital_core::{CompareOp, Condition, FieldKind, Scalar, SortKey};
use tokio_postgres::types::ToSql;

/// Positional parameters collected while a statement is assembled
#[derive(Default)]
pub struct Params(Vec<Box<dyn ToSql + Sync + Send>>);

impl Params {
    /// Append a value and return its placeholder (`$n`)
    pub fn push<T>(&mut self, value: T) -> String
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.0.push(Box::new(value));
        format!("${}", self.0.len())
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.0
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }
}

/// ` WHERE a AND b` or an empty string
pub fn where_clause(conditions: &[Condition], params: &mut Params) -> String {
    if conditions.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = conditions
        .iter()
        .map(|condition| predicate(condition, params))
        .collect();
    format!(" WHERE {}", parts.join(" AND "))
}

/// ` ORDER BY ...`, always ending on `id` so pages are stable
pub fn order_clause(sort: &[SortKey]) -> String {
    let mut keys: Vec<String> = sort
        .iter()
        .map(|key| {
            let direction = if key.descending { "DESC" } else { "ASC" };
            format!("{} {}", key.field.column, direction)
        })
        .collect();
    keys.push("id ASC".to_string());
    format!(" ORDER BY {}", keys.join(", "))
}

fn predicate(condition: &Condition, params: &mut Params) -> String {
    let column = condition.field.column;
    let op = match condition.op {
        CompareOp::Eq => "=",
        CompareOp::Gt => ">",
        CompareOp::Gte => ">=",
        CompareOp::Lt => "<",
        CompareOp::Lte => "<=",
        CompareOp::In => {
            let placeholder = push_array(condition.field.kind, &condition.values, params);
            return format!("{} = ANY({})", column, placeholder);
        }
    };
    // Parsing guarantees at least one value
    let placeholder = match condition.values.first() {
        Some(value) => push_scalar(value, params),
        None => return "FALSE".to_string(),
    };
    format!("{} {} {}", column, op, placeholder)
}

fn push_scalar(value: &Scalar, params: &mut Params) -> String {
    match value {
        Scalar::Text(v) => params.push(v.clone()),
        Scalar::Integer(v) => params.push(*v),
        Scalar::Timestamp(v) => params.push(*v),
    }
}

fn push_array(kind: FieldKind, values: &[Scalar], params: &mut Params) -> String {
    match kind {
        FieldKind::Text => params.push(
            values
                .iter()
                .filter_map(|v| match v {
                    Scalar::Text(s) => Some(s.clone()),
                    _ => None,
                })
                .collect::<Vec<String>>(),
        ),
        FieldKind::Integer => params.push(
            values
                .iter()
                .filter_map(|v| match v {
                    Scalar::Integer(n) => Some(*n),
                    _ => None,
                })
                .collect::<Vec<i32>>(),
        ),
        FieldKind::Timestamp => params.push(
            values
                .iter()
                .filter_map(|v| match v {
                    Scalar::Timestamp(ts) => Some(*ts),
                    _ => None,
                })
                .collect::<Vec<DateTime<Utc>>>(),
        ),
    }
}
