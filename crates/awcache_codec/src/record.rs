//! Decoded rows.

use crate::value::FieldValue;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One decoded row: named fields in schema order.
///
/// Field names always come from the schema table, so the key set of a
/// record is the (possibly shortened) field list of its row schema. Fields
/// in a row's optional tail that were absent on disk are simply not
/// present; they are never filled with placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(&'static str, FieldValue)>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record from `(name, value)` pairs, in order.
    #[must_use]
    pub fn from_fields(fields: Vec<(&'static str, FieldValue)>) -> Self {
        Self { fields }
    }

    /// Appends a field, or replaces the value of an existing one.
    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Returns true if the field is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the single value of a one-field row.
    ///
    /// Rows such as `general.TotalVisits` or every `os` entry carry one
    /// counter; this gives direct access to it. Returns `None` for
    /// multi-field records.
    #[must_use]
    pub fn scalar(&self) -> Option<&FieldValue> {
        match self.fields.as_slice() {
            [(_, value)] => Some(value),
            _ => None,
        }
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(n, _)| *n)
    }

    /// Values in order.
    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().map(|(_, v)| v)
    }

    /// `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (*n, v))
    }

    /// Number of fields present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_order_and_replaces() {
        let mut record = Record::new();
        record.insert("pages", FieldValue::Int(1));
        record.insert("hits", FieldValue::Int(2));
        record.insert("pages", FieldValue::Int(3));

        assert_eq!(record.names().collect::<Vec<_>>(), vec!["pages", "hits"]);
        assert_eq!(record.get("pages"), Some(&FieldValue::Int(3)));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn scalar_only_for_single_field() {
        let single = Record::from_fields(vec![("value", FieldValue::Int(1475))]);
        assert_eq!(single.scalar(), Some(&FieldValue::Int(1475)));

        let pair = Record::from_fields(vec![
            ("pages", FieldValue::Int(1)),
            ("hits", FieldValue::Int(2)),
        ]);
        assert_eq!(pair.scalar(), None);
        assert_eq!(Record::new().scalar(), None);
    }

    #[test]
    fn serializes_as_ordered_map() {
        let record = Record::from_fields(vec![
            ("pages", FieldValue::Int(4)),
            ("hits", FieldValue::Int(15)),
        ]);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"pages":4,"hits":15}"#
        );
    }
}
