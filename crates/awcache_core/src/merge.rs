//! Combining two months of cache data.
//!
//! Merging is argument-order dependent: the right-hand month is taken to
//! be the more recent one, so `latest` fields take its value.
//!
//! For each section name in either input (left order, then right-only
//! names):
//!
//! 1. a section on one side only passes through unchanged
//! 2. rows are unioned, left order first, then right-only rows
//! 3. a row on one side only passes through unchanged
//! 4. a row on both sides is merged field by field with the field's rule
//! 5. the merged rows are re-sorted if the section declares a sort order

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::month::MonthFile;
use crate::types::FormatVersion;
use awcache_codec::{
    section_schema, validate_table, CodecError, FieldValue, MergeRule, Record, Section,
    SectionSchema, SortDirection, SortKey, SortMeta,
};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// The result of merging two months, ready to be emitted.
#[derive(Debug, Clone)]
pub struct MergedMonth {
    /// Format version, taken from the left input.
    pub version: FormatVersion,
    /// Sections in output order.
    pub sections: Vec<Section>,
}

impl MergedMonth {
    /// Looks up a section by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Section names in output order.
    #[must_use]
    pub fn section_names(&self) -> Vec<&'static str> {
        self.sections.iter().map(Section::name).collect()
    }
}

/// Merges sections and months according to the schema table and a
/// [`Config`].
#[derive(Debug, Clone)]
pub struct MergeEngine {
    config: Config,
}

impl MergeEngine {
    /// Creates an engine, checking the schema table and the configuration
    /// before any data is touched.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid override or schema.
    pub fn new(config: Config) -> CoreResult<Self> {
        validate_table()?;
        config.validate()?;
        Ok(Self { config })
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Merges every section of two months.
    ///
    /// # Errors
    ///
    /// Fails if either month cannot be read, if a section has no schema
    /// (a configuration error), or if any row fails to merge.
    pub fn merge_months(&self, left: &MonthFile, right: &MonthFile) -> CoreResult<MergedMonth> {
        let version = left.version()?;
        let left_names = left.section_names()?;
        let right_names = right.section_names()?;

        let names = left_names
            .iter()
            .chain(right_names.iter().filter(|n| !left_names.contains(*n)));

        let mut sections = Vec::with_capacity(left_names.len().max(right_names.len()));
        for name in names {
            if section_schema(name).is_none() {
                return Err(CoreError::configuration(format!(
                    "no schema for section '{name}'"
                )));
            }
            let merged = match (left.get(name)?, right.get(name)?) {
                (Some(l), Some(r)) => self.merge_sections(&l, &r)?,
                (Some(only), None) | (None, Some(only)) => into_owned(only),
                (None, None) => continue,
            };
            sections.push(merged);
        }

        debug!(
            month = %left.year_month(),
            sections = sections.len(),
            "merged month"
        );
        Ok(MergedMonth { version, sections })
    }

    /// Merges two versions of the same section.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the sections differ in name, or
    /// the first row merge or sort error.
    pub fn merge_sections(&self, left: &Section, right: &Section) -> CoreResult<Section> {
        if left.name() != right.name() {
            return Err(CoreError::configuration(format!(
                "cannot merge section '{}' with section '{}'",
                left.name(),
                right.name()
            )));
        }
        let schema = left.schema();

        let mut rows = Vec::with_capacity(left.len() + right.len());
        for (key, l) in left.iter() {
            let record = match right.get(key) {
                Some(r) => self.merge_records(schema, key, l, r)?,
                None => l.clone(),
            };
            rows.push((key.to_string(), record));
        }
        for (key, r) in right.iter() {
            if !left.contains(key) {
                rows.push((key.to_string(), r.clone()));
            }
        }

        if self.config.sort_merged {
            if let Some(meta) = schema.sort.filter(|m| m.priority > 0) {
                sort_rows(schema.name, meta, &mut rows)?;
            }
        }

        Ok(Section::from_records(schema.name, rows)?)
    }

    /// Merges two records of the same row.
    ///
    /// The output has the field list of the longer record. A field present
    /// on one side only keeps that side's value; a field the rule blanks is
    /// left out.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnmappedField`] for a field with no rule, or
    /// the rule's own error.
    pub fn merge_records(
        &self,
        schema: &SectionSchema,
        row: &str,
        left: &Record,
        right: &Record,
    ) -> CoreResult<Record> {
        let fields: Vec<&'static str> = if right.len() > left.len() {
            right.names().collect()
        } else {
            left.names().collect()
        };

        let mut merged = Record::new();
        for field in fields {
            let value = match (left.get(field), right.get(field)) {
                (Some(l), Some(r)) => {
                    let spec = schema.field(row, field).ok_or_else(|| CodecError::UnmappedField {
                        section: schema.name.to_string(),
                        row: row.to_string(),
                        field: field.to_string(),
                    })?;
                    self.rule_for(schema, row, field)?.apply(spec, l, r)?
                }
                (Some(v), None) | (None, Some(v)) => Some(v.clone()),
                (None, None) => None,
            };
            if let Some(value) = value {
                merged.insert(field, value);
            }
        }
        Ok(merged)
    }

    /// Resolves the rule for one field: a configured override, else the
    /// schema's row rule, else the section default.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnmappedField`] if nothing maps the field.
    pub fn rule_for<'a>(
        &'a self,
        schema: &'a SectionSchema,
        row: &str,
        field: &str,
    ) -> CoreResult<&'a MergeRule> {
        if let Some(rule) = self.config.override_for(schema.name, field) {
            return Ok(rule);
        }
        Ok(schema.rule_for(row, field)?)
    }
}

/// An engine with the default configuration.
///
/// Unlike [`MergeEngine::new`] this checks nothing: the default
/// configuration has no overrides, and the built-in schema table is
/// covered by [`validate_table`] in the codec's tests.
impl Default for MergeEngine {
    fn default() -> Self {
        Self {
            config: Config::default(),
        }
    }
}

fn into_owned(section: Arc<Section>) -> Section {
    Arc::try_unwrap(section).unwrap_or_else(|shared| (*shared).clone())
}

/// Stably reorders rows by a section's sort metadata.
///
/// Rows missing a sort field sort as the minimum. Values of different
/// kinds compare equal.
///
/// # Errors
///
/// Returns [`CodecError::InvalidRowKey`] if a `key_int` sort meets a row
/// key that is not an integer.
pub fn sort_rows(
    section: &str,
    meta: SortMeta,
    rows: &mut Vec<(String, Record)>,
) -> CoreResult<()> {
    let directed = |ord: Ordering| match meta.direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    };

    match meta.key {
        SortKey::Key => rows.sort_by(|a, b| directed(a.0.cmp(&b.0))),
        SortKey::KeyInt => {
            let mut keyed = std::mem::take(rows)
                .into_iter()
                .map(|row| -> Result<(i64, (String, Record)), CodecError> {
                    let n = row.0.parse::<i64>().map_err(|_| CodecError::InvalidRowKey {
                        section: section.to_string(),
                        key: row.0.clone(),
                    })?;
                    Ok((n, row))
                })
                .collect::<Result<Vec<_>, CodecError>>()?;
            keyed.sort_by(|a, b| directed(a.0.cmp(&b.0)));
            *rows = keyed.into_iter().map(|(_, row)| row).collect();
        }
        SortKey::Field(field) => {
            rows.sort_by(|a, b| directed(compare_fields(a.1.get(field), b.1.get(field))));
        }
    }
    Ok(())
}

fn compare_fields(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use awcache_codec::RawSection;

    fn section(name: &str, lines: &[&str]) -> Section {
        let mut raw = RawSection::new(name);
        for line in lines {
            raw.push_line(line);
        }
        Section::decode(&raw).unwrap()
    }

    fn keys(section: &Section) -> Vec<&str> {
        section.keys().collect()
    }

    #[test]
    fn last_update_parsed_is_summed() {
        let engine = MergeEngine::default();
        let left = section("general", &["LastUpdate 20091115000000 600000 10 20 0 1"]);
        let right = section("general", &["LastUpdate 20091130000000 662637 5 7 0 2"]);

        let merged = engine.merge_sections(&left, &right).unwrap();
        let row = merged.row("LastUpdate").unwrap();
        assert_eq!(row.get("parsed"), Some(&FieldValue::Int(1_262_637)));
        assert_eq!(row.get("dropped"), Some(&FieldValue::Int(3)));
        assert_eq!(row.get("date").unwrap().to_token(), "20091130000000");
    }

    #[test]
    fn general_special_rows() {
        let engine = MergeEngine::default();
        let left = section(
            "general",
            &[
                "LastLine 20091115000000 100 2000 123456",
                "FirstTime 20091101000237",
                "LastTime 20091115000000",
            ],
        );
        let right = section(
            "general",
            &[
                "LastLine 20091130000000 50 4000 654321",
                "FirstTime 20091116000000",
                "LastTime 20091130000000",
            ],
        );

        let merged = engine.merge_sections(&left, &right).unwrap();
        let last_line = merged.row("LastLine").unwrap();
        assert_eq!(last_line.get("line"), Some(&FieldValue::Int(100)));
        assert_eq!(last_line.get("offset"), Some(&FieldValue::Int(4000)));
        assert!(!last_line.contains("signature"));
        assert_eq!(
            merged.row("FirstTime").unwrap().scalar().unwrap().to_token(),
            "20091101000237"
        );
        assert_eq!(
            merged.row("LastTime").unwrap().scalar().unwrap().to_token(),
            "20091130000000"
        );
    }

    #[test]
    fn row_union_keeps_left_order_then_right_only() {
        let engine = MergeEngine::default();
        let left = section("os", &["linux 7", "windows 3"]);
        let right = section("os", &["macosx 2", "linux 1"]);

        let merged = engine.merge_sections(&left, &right).unwrap();
        assert_eq!(keys(&merged), ["linux", "windows", "macosx"]);
        assert_eq!(merged.get("linux").unwrap().scalar(), Some(&FieldValue::Int(8)));
        assert_eq!(merged.get("windows"), left.get("windows"));
        assert_eq!(merged.get("macosx"), right.get("macosx"));
    }

    #[test]
    fn longer_record_field_list_wins() {
        let engine = MergeEngine::default();
        let left = section("visitor", &["1.2.3.4 3 9 12000"]);
        let right = section("visitor", &["1.2.3.4 1 2 300 20091130165230 20091130160000 /x.html"]);

        let merged = engine.merge_sections(&left, &right).unwrap();
        let row = merged.row("1.2.3.4").unwrap();
        assert_eq!(row.len(), 6);
        assert_eq!(row.get("pages"), Some(&FieldValue::Int(4)));
        assert_eq!(row.get("last_visit_page"), Some(&FieldValue::from("/x.html")));
    }

    #[test]
    fn sider_404_referer_takes_latest() {
        let engine = MergeEngine::default();
        let left = section("sider_404", &["/missing 3 http://a.example/"]);
        let right = section("sider_404", &["/missing 2 http://b.example/"]);

        let merged = engine.merge_sections(&left, &right).unwrap();
        let row = merged.row("/missing").unwrap();
        assert_eq!(row.get("hits"), Some(&FieldValue::Int(5)));
        assert_eq!(
            row.get("last_url_referer"),
            Some(&FieldValue::from("http://b.example/"))
        );
    }

    #[test]
    fn key_int_sort_is_numeric() {
        let engine = MergeEngine::default();
        let left = section("time", &["10 1 1 1 0 0 0", "2 1 1 1 0 0 0"]);
        let right = section("time", &["1 1 1 1 0 0 0", "10 1 1 1 0 0 0"]);

        let merged = engine.merge_sections(&left, &right).unwrap();
        assert_eq!(keys(&merged), ["1", "2", "10"]);
    }

    #[test]
    fn field_sort_is_descending_and_stable() {
        let engine = MergeEngine::default();
        let left = section("domain", &["fr 1 1 1", "de 5 5 5", "uk 1 2 2"]);
        let right = section("domain", &["us 3 3 3"]);

        let merged = engine.merge_sections(&left, &right).unwrap();
        assert_eq!(keys(&merged), ["de", "us", "fr", "uk"]);
    }

    #[test]
    fn sorting_can_be_disabled() {
        let engine = MergeEngine::new(Config::new().sort_merged(false)).unwrap();
        let left = section("time", &["10 1 1 1 0 0 0"]);
        let right = section("time", &["2 1 1 1 0 0 0"]);

        let merged = engine.merge_sections(&left, &right).unwrap();
        assert_eq!(keys(&merged), ["10", "2"]);
    }

    #[test]
    fn non_integer_key_fails_key_int_sort() {
        let engine = MergeEngine::default();
        let left = section("errors", &["404 1 10"]);
        let right = section("errors", &["Other 1 10"]);

        let err = engine.merge_sections(&left, &right).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Codec(CodecError::InvalidRowKey { .. })
        ));
    }

    #[test]
    fn override_replaces_schema_rule() {
        let config = Config::new().rule_override("os.value=max".parse().unwrap());
        let engine = MergeEngine::new(config).unwrap();
        let left = section("os", &["linux 7"]);
        let right = section("os", &["linux 9"]);

        let merged = engine.merge_sections(&left, &right).unwrap();
        assert_eq!(merged.get("linux").unwrap().scalar(), Some(&FieldValue::Int(9)));
    }

    #[test]
    fn invalid_override_rejected_up_front() {
        let config = Config::new().rule_override("os.pages=sum".parse().unwrap());
        assert!(matches!(
            MergeEngine::new(config),
            Err(CoreError::Configuration { .. })
        ));
    }

    #[test]
    fn sections_must_match() {
        let engine = MergeEngine::default();
        let err = engine
            .merge_sections(&section("os", &[]), &section("browser", &[]))
            .unwrap_err();
        assert_eq!(err.category(), awcache_codec::ErrorCategory::Configuration);
    }

    #[test]
    fn missing_sort_field_sorts_as_minimum() {
        let mut rows = vec![
            ("a".to_string(), Record::new()),
            (
                "b".to_string(),
                Record::from_fields(vec![("pages", FieldValue::Int(1))]),
            ),
        ];
        let meta = SortMeta {
            priority: 1,
            key: SortKey::Field("pages"),
            direction: SortDirection::Ascending,
        };
        sort_rows("domain", meta, &mut rows).unwrap();
        assert_eq!(rows[0].0, "a");
    }

    #[test]
    fn default_engine_passes_validation() {
        let validated = MergeEngine::new(Config::default()).unwrap();
        assert_eq!(
            MergeEngine::default().config().sort_merged,
            validated.config().sort_merged
        );
        MergeEngine::default().config().validate().unwrap();
    }

    #[test]
    fn counter_sum_past_int_range_fails() {
        let engine = MergeEngine::default();
        let left = section("os", &["linux 2000000000"]);
        let right = section("os", &["linux 2000000000"]);
        let err = engine.merge_sections(&left, &right).unwrap_err();
        assert!(matches!(err, CoreError::Codec(CodecError::Overflow { .. })));
        assert_eq!(err.category(), awcache_codec::ErrorCategory::Format);

        let left = section("domain", &["fr 1 1 3000000000"]);
        let right = section("domain", &["fr 1 1 3000000000"]);
        let merged = engine.merge_sections(&left, &right).unwrap();
        assert_eq!(
            merged.row("fr").unwrap().get("bandwidth"),
            Some(&FieldValue::Int(6_000_000_000))
        );
    }
}
