//! Decoded records and the record set returned to callers.

use geo_types::Geometry;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use wkt::ToWkt;

use super::schema::{FieldDefn, FieldValue, Schema};

/// Key under which a place's geometry appears in serialized output.
const GEOMETRY_KEY: &str = "geometry";

/// One decoded place: values by schema index, plus an optional geometry.
///
/// A record may hold fewer values than its schema has fields, when fields
/// were discovered after it was decoded; missing values read as unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: Vec<Option<FieldValue>>,
    geometry: Option<Geometry<f64>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, index: usize, value: FieldValue) {
        if self.values.len() <= index {
            self.values.resize(index + 1, None);
        }
        self.values[index] = Some(value);
    }

    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn geometry(&self) -> Option<&Geometry<f64>> {
        self.geometry.as_ref()
    }

    pub fn set_geometry(&mut self, geometry: Geometry<f64>) {
        self.geometry = Some(geometry);
    }
}

/// Result of a geocode call: places in document order over one shared
/// schema.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    name: String,
    schema: Schema,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(name: impl Into<String>, schema: Schema, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            schema,
            records,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// View of the record at `index`.
    pub fn get(&self, index: usize) -> Option<Place<'_>> {
        self.records.get(index).map(|record| Place {
            schema: &self.schema,
            record,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Place<'_>> {
        self.records.iter().map(|record| Place {
            schema: &self.schema,
            record,
        })
    }

    /// JSON rendering: an array of objects mapping set field names to
    /// values, plus the geometry as WKT (or null).
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl Serialize for RecordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for place in self.iter() {
            seq.serialize_element(&place)?;
        }
        seq.end()
    }
}

/// A record read through its schema.
#[derive(Debug, Clone, Copy)]
pub struct Place<'a> {
    schema: &'a Schema,
    record: &'a Record,
}

impl<'a> Place<'a> {
    /// Value of the field called `name`, if the field exists and is set.
    pub fn get(&self, name: &str) -> Option<&'a FieldValue> {
        self.schema
            .index_of(name)
            .and_then(|index| self.record.get(index))
    }

    pub fn get_str(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_f64)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_i64)
    }

    pub fn geometry(&self) -> Option<&'a Geometry<f64>> {
        self.record.geometry()
    }

    /// Set fields in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&'a FieldDefn, &'a FieldValue)> + 'a {
        let record = self.record;
        self.schema
            .fields()
            .iter()
            .enumerate()
            .filter_map(move |(index, defn)| record.get(index).map(|value| (defn, value)))
    }
}

impl Serialize for Place<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (defn, value) in self.fields() {
            map.serialize_entry(defn.name(), value)?;
        }
        map.serialize_entry(GEOMETRY_KEY, &self.geometry().map(|g| g.wkt_string()))?;
        map.end()
    }
}
