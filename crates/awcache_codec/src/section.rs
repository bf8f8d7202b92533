//! Raw and decoded sections.

use crate::decoder::decode_row;
use crate::error::{CodecError, CodecResult};
use crate::record::Record;
use crate::schema::{section_schema, SectionSchema, SortMeta};
use crate::value::FieldValue;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// The undecoded rows of one section, in file order.
///
/// A repeated row key replaces the earlier row's tokens in place, so the
/// key keeps its first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSection {
    name: String,
    rows: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl RawSection {
    /// Creates an empty raw section. The name is stored lowercase.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Section name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a row.
    pub fn push(&mut self, key: String, tokens: Vec<String>) {
        match self.index.get(&key) {
            Some(&i) => self.rows[i].1 = tokens,
            None => {
                self.index.insert(key.clone(), self.rows.len());
                self.rows.push((key, tokens));
            }
        }
    }

    /// Splits a row line on whitespace into key and tokens, then adds it.
    /// Blank lines are ignored.
    pub fn push_line(&mut self, line: &str) {
        let mut parts = line.split_whitespace();
        if let Some(key) = parts.next() {
            self.push(key.to_string(), parts.map(str::to_string).collect());
        }
    }

    /// Tokens of one row.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.index.get(key).map(|&i| self.rows[i].1.as_slice())
    }

    /// Rows in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.rows.iter().map(|(k, t)| (k.as_str(), t.as_slice()))
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the section has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A decoded section: typed records keyed by row, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    schema: &'static SectionSchema,
    rows: Vec<(String, Record)>,
    index: HashMap<String, usize>,
    raw_len: usize,
}

impl Section {
    /// Decodes every row of a raw section.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownSection`] if the section has no schema,
    /// or the first row decoding error.
    pub fn decode(raw: &RawSection) -> CodecResult<Self> {
        let schema =
            section_schema(raw.name()).ok_or_else(|| CodecError::unknown_section(raw.name()))?;
        let rows = raw
            .iter()
            .map(|(key, tokens)| -> CodecResult<(String, Record)> {
                Ok((key.to_string(), decode_row(schema, key, tokens)?))
            })
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Self::build(schema, rows, raw.len()))
    }

    /// Builds a section from already-decoded rows.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownSection`] if the section has no schema.
    pub fn from_records(name: &str, rows: Vec<(String, Record)>) -> CodecResult<Self> {
        let schema = section_schema(name).ok_or_else(|| CodecError::unknown_section(name))?;
        let len = rows.len();
        Ok(Self::build(schema, rows, len))
    }

    fn build(schema: &'static SectionSchema, rows: Vec<(String, Record)>, raw_len: usize) -> Self {
        let mut section = Self {
            schema,
            rows: Vec::with_capacity(rows.len()),
            index: HashMap::with_capacity(rows.len()),
            raw_len,
        };
        for (key, record) in rows {
            match section.index.get(&key) {
                Some(&i) => section.rows[i].1 = record,
                None => {
                    section.index.insert(key.clone(), section.rows.len());
                    section.rows.push((key, record));
                }
            }
        }
        section
    }

    /// Section name (lowercase).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.schema.name
    }

    /// Schema this section was decoded with.
    #[must_use]
    pub fn schema(&self) -> &'static SectionSchema {
        self.schema
    }

    /// Sort order for merged output, if any.
    #[must_use]
    pub fn sort_meta(&self) -> Option<SortMeta> {
        self.schema.sort
    }

    /// Looks up a row.
    #[must_use]
    pub fn get(&self, row: &str) -> Option<&Record> {
        self.index.get(row).map(|&i| &self.rows[i].1)
    }

    /// Looks up a row, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::RowNotFound`] if the row does not exist.
    pub fn row(&self, row: &str) -> CodecResult<&Record> {
        self.get(row).ok_or_else(|| CodecError::RowNotFound {
            section: self.name().to_string(),
            row: row.to_string(),
        })
    }

    /// Looks up a row, returning `default` if it is absent.
    #[must_use]
    pub fn get_or<'a>(&'a self, row: &str, default: &'a Record) -> &'a Record {
        self.get(row).unwrap_or(default)
    }

    /// Returns true if the row exists.
    #[must_use]
    pub fn contains(&self, row: &str) -> bool {
        self.index.contains_key(row)
    }

    /// Row keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(k, _)| k.as_str())
    }

    /// Rows in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.rows.iter().map(|(k, r)| (k.as_str(), r))
    }

    /// Consumes the section, returning its rows in order.
    #[must_use]
    pub fn into_rows(self) -> Vec<(String, Record)> {
        self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the section has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows read from disk, counting repeated keys.
    #[must_use]
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    /// Merges a single field of `row` from this section and `other` with
    /// the schema's rule for that field.
    ///
    /// If only one side has the field its value is returned unchanged.
    /// `None` means the rule leaves the field out of the merged row.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::RowNotFound`] if either side lacks the row,
    /// [`CodecError::MissingField`] if neither record has the field,
    /// [`CodecError::UnmappedField`] if the row shape has no such field, or
    /// the rule's own error.
    pub fn merge_field(
        &self,
        other: &Section,
        row: &str,
        field: &str,
    ) -> CodecResult<Option<FieldValue>> {
        let left = self.row(row)?;
        let right = other.row(row)?;
        match (left.get(field), right.get(field)) {
            (Some(l), Some(r)) => {
                let spec = self.schema.field(row, field).ok_or_else(|| {
                    CodecError::UnmappedField {
                        section: self.name().to_string(),
                        row: row.to_string(),
                        field: field.to_string(),
                    }
                })?;
                spec.merge.apply(spec, l, r)
            }
            (Some(v), None) | (None, Some(v)) => Ok(Some(v.clone())),
            (None, None) => Err(CodecError::MissingField {
                section: self.name().to_string(),
                row: row.to_string(),
                field: field.to_string(),
            }),
        }
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (key, record) in &self.rows {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} rows)", self.name(), self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, lines: &[&str]) -> RawSection {
        let mut section = RawSection::new(name);
        for line in lines {
            section.push_line(line);
        }
        section
    }

    #[test]
    fn raw_rows_keep_order() {
        let section = raw("OS", &["linux 7", "windows 3", "", "macosx 2"]);
        assert_eq!(section.name(), "os");
        assert_eq!(section.len(), 3);
        assert_eq!(
            section.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            ["linux", "windows", "macosx"]
        );
    }

    #[test]
    fn repeated_key_replaces_in_place() {
        let mut section = raw("os", &["linux 7", "windows 3"]);
        section.push_line("linux 9");
        assert_eq!(section.len(), 2);
        assert_eq!(section.get("linux").unwrap(), ["9"]);
        assert_eq!(section.iter().next().unwrap().0, "linux");
    }

    #[test]
    fn decode_general() {
        let section = Section::decode(&raw(
            "general",
            &[
                "LastLine 20091130235959 1046 17360 13842367221",
                "FirstTime 20091101000237",
                "TotalVisits 1475",
                "LastUpdate 20091130235959 662637 0 662637 0 0",
            ],
        ))
        .unwrap();

        assert_eq!(section.len(), 4);
        assert_eq!(section.raw_len(), 4);
        assert_eq!(
            section.get("TotalVisits").and_then(Record::scalar),
            Some(&FieldValue::Int(1475))
        );
        assert_eq!(
            section.row("LastUpdate").unwrap().get("parsed"),
            Some(&FieldValue::Int(662_637))
        );
        assert!(section.sort_meta().is_none());
    }

    #[test]
    fn unknown_section() {
        assert!(matches!(
            Section::decode(&raw("bogus", &["a 1"])),
            Err(CodecError::UnknownSection { .. })
        ));
    }

    #[test]
    fn missing_rows() {
        let section = Section::decode(&raw("os", &["linux 7"])).unwrap();
        assert!(section.get("hurd").is_none());
        assert!(matches!(section.row("hurd"), Err(CodecError::RowNotFound { .. })));

        let fallback = Record::from_fields(vec![("value", FieldValue::Int(0))]);
        assert_eq!(section.get_or("hurd", &fallback), &fallback);
        assert_ne!(section.get_or("linux", &fallback), &fallback);
    }

    #[test]
    fn merge_single_field() {
        let left = Section::decode(&raw("general", &["LastUpdate 20091115000000 600000 0 0 0 0"]))
            .unwrap();
        let right = Section::decode(&raw("general", &["LastUpdate 20091130000000 662637 0 0 0 0"]))
            .unwrap();

        assert_eq!(
            left.merge_field(&right, "LastUpdate", "parsed").unwrap(),
            Some(FieldValue::Int(1_262_637))
        );
        assert_eq!(
            left.merge_field(&right, "LastUpdate", "date")
                .unwrap()
                .map(|v| v.to_token()),
            Some("20091130000000".to_string())
        );
        assert!(left.merge_field(&right, "TotalVisits", "value").is_err());
    }

    #[test]
    fn merge_field_drops_blanked_signature() {
        let left = Section::decode(&raw("general", &["LastLine 20091115000000 10 2048 123"]))
            .unwrap();
        let right = Section::decode(&raw("general", &["LastLine 20091130000000 12 4096 456"]))
            .unwrap();
        assert_eq!(left.merge_field(&right, "LastLine", "signature").unwrap(), None);
        assert_eq!(
            left.merge_field(&right, "LastLine", "offset").unwrap(),
            Some(FieldValue::Int(4096))
        );
    }

    #[test]
    fn serialize_and_display() {
        let section = Section::decode(&raw("os", &["linux 7", "macosx 2"])).unwrap();
        assert_eq!(
            serde_json::to_string(&section).unwrap(),
            r#"{"linux":{"value":7},"macosx":{"value":2}}"#
        );
        assert_eq!(section.to_string(), "os (2 rows)");
    }
}
