//! Associative rows produced by cursor fetches.

use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::Value;

/// One fetched row: column names aligned with their values, in native
/// column order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut row = Self::new();
        for (name, value) in pairs {
            row.push(name, value);
        }
        row
    }

    /// Appends a column. Lookups return the first column with a given name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.columns.push(name.into());
        self.values.push(value.into());
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|col| col.eq_ignore_ascii_case(name))
            })
    }

    /// Returns a value by column name. Exact matches win over
    /// case-insensitive ones.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(self.position(name)?)
    }

    /// Returns an integer value by column name.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns a float value by column name.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns a text value by column name.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns a binary value by column name.
    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        match self.get(name)? {
            Value::Binary(value) => Some(value.as_slice()),
            _ => None,
        }
    }

    /// `true` when the column exists and holds `NULL`.
    pub fn is_null(&self, name: &str) -> bool {
        self.get(name).is_some_and(Value::is_null)
    }

    /// Drops every column whose name matches one of `fields`
    /// (case-insensitive). Returns how many columns were removed.
    pub fn remove_fields(&mut self, fields: &[&str]) -> usize {
        let before = self.columns.len();
        let mut index = 0;
        while index < self.columns.len() {
            let name = &self.columns[index];
            if fields.iter().any(|field| field.eq_ignore_ascii_case(name)) {
                self.columns.remove(index);
                self.values.remove(index);
            } else {
                index += 1;
            }
        }
        before - self.columns.len()
    }

    pub fn into_pairs(self) -> Vec<(String, Value)> {
        self.columns.into_iter().zip(self.values).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }
}

/// Removes `fields` from every row in place.
pub fn remove_fields(rows: &mut [Row], fields: &[&str]) {
    for row in rows {
        row.remove_fields(fields);
    }
}

/// Serializes as an object in column order. When a name repeats, only the
/// first column is written, matching [`Row::get`].
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries: Vec<(&str, &Value)> = self
            .iter()
            .enumerate()
            .filter(|(index, (name, _))| !self.columns[..*index].iter().any(|col| col == name))
            .map(|(_, entry)| entry)
            .collect();

        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (name, value) in entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
