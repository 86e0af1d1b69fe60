//! JSON records: schemaless rows with configurable id/parent/children fields.

use std::fmt;

use serde_json::{Map, Number, Value};

use crate::domain::codec::{assemble, disassemble};
use crate::domain::entities::{Entity, TreeNode};
use crate::domain::error::{DomainError, TreeResult};

/// Identifier value found in a record's id or parent field.
///
/// Numbers and strings are distinct keys: `1` never matches `"1"`. Integral
/// floats are keyed as integers, so `1.0` matches `1`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Number(Number),
    Text(String),
}

impl RecordKey {
    /// Interpret a JSON value as a key; only numbers and strings qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(RecordKey::Number(integral(n))),
            Value::String(s) => Some(RecordKey::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RecordKey::Number(n) => Value::Number(n.clone()),
            RecordKey::Text(s) => Value::String(s.clone()),
        }
    }
}

/// `1.0` -> `1`; any other number is kept as written.
fn integral(n: &Number) -> Number {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Number::from(f as i64)
        }
        _ => n.clone(),
    }
}

impl From<i64> for RecordKey {
    fn from(n: i64) -> Self {
        RecordKey::Number(n.into())
    }
}

impl From<&str> for RecordKey {
    fn from(s: &str) -> Self {
        RecordKey::Text(s.to_string())
    }
}

impl fmt::Debug for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Number(n) => write!(f, "{n}"),
            RecordKey::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Number(n) => write!(f, "{n}"),
            RecordKey::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Names of the fields the codec interprets. Everything else is payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    pub id_field: String,
    pub parent_field: String,
    pub children_field: String,
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self {
            id_field: "id".into(),
            parent_field: "parentId".into(),
            children_field: "children".into(),
        }
    }
}

/// A JSON object participating in a hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    key: RecordKey,
    parent: Option<RecordKey>,
    fields: Map<String, Value>,
}

impl Record {
    /// Parse one JSON object; `index` only feeds error messages.
    ///
    /// A `null` or missing parent field means "no parent". Any children
    /// field is removed since it is never payload.
    pub fn from_value(value: Value, schema: &RecordSchema, index: usize) -> TreeResult<Self> {
        let Value::Object(mut fields) = value else {
            return Err(DomainError::invalid_record(index, "expected a JSON object"));
        };
        fields.shift_remove(&schema.children_field);
        Self::from_fields(fields, schema, index)
    }

    fn from_fields(fields: Map<String, Value>, schema: &RecordSchema, index: usize) -> TreeResult<Self> {
        let key = match fields.get(&schema.id_field) {
            Some(v) => RecordKey::from_value(v).ok_or_else(|| {
                DomainError::invalid_record(
                    index,
                    format!("field '{}' must be a number or string", schema.id_field),
                )
            })?,
            None => {
                return Err(DomainError::invalid_record(
                    index,
                    format!("missing field '{}'", schema.id_field),
                ))
            }
        };
        let parent = match fields.get(&schema.parent_field) {
            None | Some(Value::Null) => None,
            Some(v) => Some(RecordKey::from_value(v).ok_or_else(|| {
                DomainError::invalid_record(
                    index,
                    format!("field '{}' must be a number, string or null", schema.parent_field),
                )
            })?),
        };
        Ok(Self { key, parent, fields })
    }

    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    pub fn parent(&self) -> Option<&RecordKey> {
        self.parent.as_ref()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Display label: the given field as text, falling back to the id.
    pub fn label(&self, field: &str) -> String {
        match self.fields.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => self.key.to_string(),
            Some(other) => other.to_string(),
        }
    }
}

impl Entity for Record {
    type Id = RecordKey;

    fn id(&self) -> RecordKey {
        self.key.clone()
    }

    fn parent_id(&self) -> Option<RecordKey> {
        self.parent.clone()
    }
}

/// Parse a flat document: a JSON array of objects.
pub fn records_from_value(value: Value, schema: &RecordSchema) -> TreeResult<Vec<Record>> {
    let Value::Array(rows) = value else {
        return Err(DomainError::invalid_record(0, "expected a JSON array of records"));
    };
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| Record::from_value(row, schema, i))
        .collect()
}

/// Serialize records back into a flat JSON array.
pub fn records_to_value(records: Vec<Record>) -> Value {
    Value::Array(
        records
            .into_iter()
            .map(|r| Value::Object(r.into_fields()))
            .collect(),
    )
}

/// Parse a nested document: a JSON array of objects carrying children arrays.
///
/// A missing or `null` children field means a leaf. Records are numbered in
/// pre-order for error messages.
pub fn forest_from_value(value: Value, schema: &RecordSchema) -> TreeResult<Vec<TreeNode<Record>>> {
    let Value::Array(roots) = value else {
        return Err(DomainError::invalid_record(0, "expected a JSON array of tree nodes"));
    };

    let mut preorder = Vec::new();
    let mut stack = vec![roots.into_iter()];

    while let Some(siblings) = stack.last_mut() {
        let Some(node) = siblings.next() else {
            stack.pop();
            continue;
        };
        let index = preorder.len();
        let Value::Object(mut fields) = node else {
            return Err(DomainError::invalid_record(index, "expected a JSON object"));
        };
        let children = match fields.shift_remove(&schema.children_field) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(children)) => children,
            Some(_) => {
                return Err(DomainError::invalid_record(
                    index,
                    format!("field '{}' must be an array", schema.children_field),
                ))
            }
        };
        preorder.push((Record::from_fields(fields, schema, index)?, children.len()));
        if !children.is_empty() {
            stack.push(children.into_iter());
        }
    }

    Ok(assemble(preorder))
}

/// Serialize a forest of records with the synthetic children field appended.
pub fn forest_to_value(forest: Vec<TreeNode<Record>>, schema: &RecordSchema) -> Value {
    let preorder = disassemble(forest);
    let mut built: Vec<Value> = Vec::with_capacity(preorder.len());

    for (record, child_count) in preorder.into_iter().rev() {
        let mut fields = record.into_fields();
        let mut children = Vec::with_capacity(child_count);
        for _ in 0..child_count {
            if let Some(child) = built.pop() {
                children.push(child);
            }
        }
        fields.insert(schema.children_field.clone(), Value::Array(children));
        built.push(Value::Object(fields));
    }

    built.reverse();
    Value::Array(built)
}
