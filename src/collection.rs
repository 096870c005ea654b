//! In-memory feature collection: an attribute table plus one geometry
//! per row. Geometry is opaque to the core pipeline, it is only ever
//! produced and consumed by the [crate::GeoEngine].
use std::collections::HashMap;

use geo::{LineString, Point, Polygon};

use crate::Error;

/// Per-row geometry payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Point(Point<f64>),
    Line(LineString<f64>),
    Polygon(Polygon<f64>),
}

/// One feature: named attribute values + geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub attrs: HashMap<String, String>,
    pub geometry: FeatureGeometry,
}

impl FeatureRow {
    pub fn new(geometry: FeatureGeometry) -> Self {
        Self {
            attrs: HashMap::new(),
            geometry,
        }
    }
    pub fn with_attr(mut self, field: &str, value: &str) -> Self {
        self.attrs.insert(field.to_string(), value.to_string());
        self
    }
}

/// An attribute table with a declared field set, one geometry per row.
/// The declared field order is preserved on write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    fields: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl FeatureCollection {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            rows: Vec::new(),
        }
    }
    pub fn from_parts(fields: Vec<String>, rows: Vec<FeatureRow>) -> Self {
        Self { fields, rows }
    }
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }
    pub fn rows_mut(&mut self) -> &mut [FeatureRow] {
        &mut self.rows
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
    /// Pushes a new row. Attributes for undeclared fields are preserved
    /// in memory but never serialized.
    pub fn push(&mut self, row: FeatureRow) {
        self.rows.push(row);
    }
    /// Declares a new (empty valued) attribute field.
    /// Re-declaring an existing field is a no-op.
    pub fn add_field(&mut self, field: &str) {
        if !self.has_field(field) {
            self.fields.push(field.to_string());
        }
    }
    /// Removes a field from the declaration and from every row.
    pub fn delete_field(&mut self, field: &str) -> Result<(), Error> {
        if !self.has_field(field) {
            return Err(Error::MissingField(field.to_string()));
        }
        self.fields.retain(|f| f != field);
        for row in self.rows.iter_mut() {
            row.attrs.remove(field);
        }
        Ok(())
    }
    /// Returns a row attribute, `""` when unset.
    pub fn value(&self, row: usize, field: &str) -> &str {
        self.rows[row]
            .attrs
            .get(field)
            .map(|v| v.as_str())
            .unwrap_or("")
    }
    /// Required row attribute accessor, for fields the pipeline
    /// cannot proceed without.
    pub fn required_value(&self, row: usize, field: &str) -> Result<&str, Error> {
        if !self.has_field(field) {
            return Err(Error::MissingField(field.to_string()));
        }
        Ok(self.value(row, field))
    }
    pub fn set_value(&mut self, row: usize, field: &str, value: &str) {
        self.rows[row]
            .attrs
            .insert(field.to_string(), value.to_string());
    }
    /// Extracts the subset of rows whose `field` equals `value`,
    /// with the same field declaration.
    pub fn select_by(&self, field: &str, value: &str) -> FeatureCollection {
        let rows = self
            .rows
            .iter()
            .filter(|row| row.attrs.get(field).map(|v| v.as_str()) == Some(value))
            .cloned()
            .collect();
        FeatureCollection {
            fields: self.fields.clone(),
            rows,
        }
    }
    /// Iterator over point geometries, skipping any other geometry kind.
    pub fn points(&self) -> impl Iterator<Item = Point<f64>> + '_ {
        self.rows.iter().filter_map(|row| match &row.geometry {
            FeatureGeometry::Point(p) => Some(*p),
            _ => None,
        })
    }
}
