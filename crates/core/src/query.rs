//! List query language: `select`, `sort`, `page`, `limit` and
//! `field[op]=value` filters over a whitelist of fields.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use crate::pagination::PageRequest;
use crate::validation::ValidationError;

/// Parameters that are never treated as filters
const RESERVED: &[&str] = &["select", "sort", "page", "limit"];

/// Storage type of a queryable field, used to parse filter values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Timestamp,
}

/// A field exposed to clients and the column backing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self { name, column, kind }
    }
}

/// Comparison operator of a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl CompareOp {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "eq" => Some(Self::Eq),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }
}

/// Filter value parsed according to the field kind
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Integer(i32),
    Timestamp(DateTime<Utc>),
}

impl Scalar {
    fn parse(kind: FieldKind, raw: &str) -> Option<Self> {
        match kind {
            FieldKind::Text => Some(Self::Text(raw.to_string())),
            FieldKind::Integer => raw.trim().parse().ok().map(Self::Integer),
            FieldKind::Timestamp => DateTime::parse_from_rfc3339(raw.trim())
                .ok()
                .map(|ts| Self::Timestamp(ts.with_timezone(&Utc))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: FieldSpec,
    pub op: CompareOp,
    /// One value, or several for `in`
    pub values: Vec<Scalar>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: FieldSpec,
    pub descending: bool,
}

/// Parsed and whitelisted list request
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    /// Field names to keep in each item; `None` keeps everything
    pub select: Option<Vec<String>>,
    pub sort: Vec<SortKey>,
    pub page: PageRequest,
    pub conditions: Vec<Condition>,
}

impl ListQuery {
    /// Parse raw query pairs against `fields`.
    ///
    /// `default_sort` uses the same syntax as the `sort` parameter and applies
    /// when the client sends none.
    pub fn parse<I, K, V>(
        pairs: I,
        fields: &[FieldSpec],
        default_sort: &str,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut errors = ValidationError::new();
        let mut select = None;
        let mut sort = None;
        let mut page = None;
        let mut limit = None;
        let mut conditions = Vec::new();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "select" => select = Some(parse_select(value, fields, &mut errors)),
                "sort" => sort = Some(parse_sort(value, fields, &mut errors)),
                "page" => page = parse_number(key, value, &mut errors),
                "limit" => limit = parse_number(key, value, &mut errors),
                _ => {
                    if let Some(condition) = parse_condition(key, value, fields, &mut errors) {
                        conditions.push(condition);
                    }
                }
            }
        }

        let sort = match sort {
            Some(keys) => keys,
            None => parse_sort(default_sort, fields, &mut errors),
        };
        let page = PageRequest::new(page, limit).unwrap_or_else(|err| {
            errors.issues.extend(err.issues);
            PageRequest::default()
        });

        errors.into_result()?;
        Ok(Self {
            select,
            sort,
            page,
            conditions,
        })
    }

    /// Keep only the selected keys (plus `id`) of a serialized item
    pub fn project(&self, item: JsonValue) -> JsonValue {
        let (Some(select), JsonValue::Object(map)) = (&self.select, &item) else {
            return item;
        };
        let kept = map
            .iter()
            .filter(|(key, _)| key.as_str() == "id" || select.iter().any(|s| s == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        JsonValue::Object(kept)
    }
}

fn lookup(fields: &[FieldSpec], name: &str) -> Option<FieldSpec> {
    fields.iter().find(|f| f.name == name).copied()
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_select(value: &str, fields: &[FieldSpec], errors: &mut ValidationError) -> Vec<String> {
    split_list(value)
        .filter(|name| {
            let known = *name == "id" || lookup(fields, name).is_some();
            if !known {
                errors.push("select", format!("Unknown field '{}'", name));
            }
            known
        })
        .map(str::to_string)
        .collect()
}

fn parse_sort(value: &str, fields: &[FieldSpec], errors: &mut ValidationError) -> Vec<SortKey> {
    split_list(value)
        .filter_map(|entry| {
            let (name, descending) = match entry.strip_prefix('-') {
                Some(name) => (name, true),
                None => (entry.strip_prefix('+').unwrap_or(entry), false),
            };
            match lookup(fields, name) {
                Some(field) => Some(SortKey { field, descending }),
                None => {
                    errors.push("sort", format!("Unknown field '{}'", name));
                    None
                }
            }
        })
        .collect()
}

fn parse_number(key: &str, value: &str, errors: &mut ValidationError) -> Option<u32> {
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.push(key, format!("'{}' must be a positive integer", key));
            None
        }
    }
}

/// `field=value` or `field[op]=value`
fn parse_condition(
    key: &str,
    value: &str,
    fields: &[FieldSpec],
    errors: &mut ValidationError,
) -> Option<Condition> {
    let (name, op) = match key.split_once('[') {
        Some((name, rest)) => {
            let Some(op) = rest.strip_suffix(']').and_then(CompareOp::parse) else {
                errors.push(key, format!("Unsupported operator in '{}'", key));
                return None;
            };
            (name, op)
        }
        None => (key, CompareOp::Eq),
    };

    if RESERVED.contains(&name) {
        errors.push(key, format!("'{}' does not take an operator", name));
        return None;
    }
    let Some(field) = lookup(fields, name) else {
        errors.push(name, format!("Unknown field '{}'", name));
        return None;
    };

    let raw: Vec<&str> = match op {
        CompareOp::In => split_list(value).collect(),
        _ => vec![value],
    };
    if raw.is_empty() {
        errors.push(name, format!("'{}' needs at least one value", key));
        return None;
    }

    let mut values = Vec::with_capacity(raw.len());
    for item in raw {
        match Scalar::parse(field.kind, item) {
            Some(v) => values.push(v),
            None => {
                errors.push(name, format!("Invalid value '{}' for '{}'", item, name));
                return None;
            }
        }
    }

    Some(Condition { field, op, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hospital::HOSPITAL_FIELDS;

    fn parse(pairs: &[(&str, &str)]) -> Result<ListQuery, ValidationError> {
        ListQuery::parse(pairs.iter().copied(), HOSPITAL_FIELDS, "-createdAt")
    }

    #[test]
    fn empty_query_uses_defaults() {
        let query = parse(&[]).unwrap();
        assert_eq!(query.page, PageRequest::default());
        assert!(query.conditions.is_empty());
        assert_eq!(query.sort.len(), 1);
        assert_eq!(query.sort[0].field.column, "created_at");
        assert!(query.sort[0].descending);
    }

    #[test]
    fn operators_and_lists() {
        let query = parse(&[
            ("province", "Bangkok"),
            ("ordinal[gte]", "10"),
            ("region[in]", "North, South"),
            ("sort", "name,-ordinal"),
            ("page", "2"),
            ("limit", "10"),
        ])
        .unwrap();

        assert_eq!(query.conditions.len(), 3);
        assert_eq!(query.conditions[0].op, CompareOp::Eq);
        assert_eq!(query.conditions[1].op, CompareOp::Gte);
        assert_eq!(query.conditions[1].values, vec![Scalar::Integer(10)]);
        assert_eq!(
            query.conditions[2].values,
            vec![Scalar::Text("North".into()), Scalar::Text("South".into())]
        );
        assert_eq!(query.sort[0].field.name, "name");
        assert!(!query.sort[0].descending);
        assert!(query.sort[1].descending);
        assert_eq!(query.page.page, 2);
        assert_eq!(query.page.limit, 10);
    }

    #[test]
    fn unknown_fields_and_bad_values_are_rejected() {
        let err = parse(&[
            ("password", "x"),
            ("ordinal[gt]", "ten"),
            ("name[regex]", "a"),
            ("sort", "secret"),
        ])
        .unwrap_err();
        assert_eq!(err.issues.len(), 4);
    }

    #[test]
    fn projection_keeps_id() {
        let query = parse(&[("select", "name")]).unwrap();
        let item = serde_json::json!({"id": "1", "name": "A", "tel": "02"});
        assert_eq!(query.project(item), serde_json::json!({"id": "1", "name": "A"}));
    }
}
