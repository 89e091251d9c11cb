//! Field schema discovered while decoding.

use std::collections::HashMap;

use serde::Serialize;

/// Type of a decoded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Real,
    String,
}

impl FieldType {
    /// Type given to a newly discovered field called `name`.
    pub fn for_name(name: &str) -> Self {
        match name {
            "place_rank" => FieldType::Integer,
            "lat" | "lon" => FieldType::Real,
            _ => FieldType::String,
        }
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Real(f64),
    String(String),
}

impl FieldValue {
    /// Parse `raw` as a value of type `field_type`.
    ///
    /// Returns `None` for empty or whitespace-only text and for numbers that
    /// do not parse (or are not finite).
    pub fn parse(field_type: FieldType, raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match field_type {
            FieldType::Integer => trimmed.parse().ok().map(FieldValue::Integer),
            FieldType::Real => trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(FieldValue::Real),
            FieldType::String => Some(FieldValue::String(raw.to_string())),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Integer(_) => FieldType::Integer,
            FieldValue::Real(_) => FieldType::Real,
            FieldValue::String(_) => FieldType::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Real(v) => Some(*v),
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::String(_) => None,
        }
    }
}

/// Name and type of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefn {
    name: String,
    #[serde(rename = "type")]
    field_type: FieldType,
}

impl FieldDefn {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }
}

/// Ordered list of fields with a name lookup.
///
/// Fields are only ever appended, so an index stays valid as the schema
/// grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDefn>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, or return the index of the existing field with the
    /// same name (whose type is kept).
    pub fn add(&mut self, defn: FieldDefn) -> usize {
        if let Some(&index) = self.by_name.get(defn.name()) {
            return index;
        }
        let index = self.fields.len();
        self.by_name.insert(defn.name.clone(), index);
        self.fields.push(defn);
        index
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn field(&self, index: usize) -> Option<&FieldDefn> {
        self.fields.get(index)
    }

    pub fn fields(&self) -> &[FieldDefn] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
