//! The section schema table.
//!
//! Every section of a cache file has a fixed row shape. This module holds
//! that shape as a static table: for each section, the field list of its
//! rows (with per-row overrides where a section mixes shapes, as
//! `general` does), the decoder and merge rule of every field, and the
//! optional sort order applied to merged output.
//!
//! Lookup is two-level: a row key with an explicit entry uses it, any other
//! key uses the section's default row.

use crate::error::{CodecError, CodecResult};
use crate::timestamp::Timestamp;
use crate::value::FieldValue;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Name used for the default row of a section in messages and overrides.
pub const DEFAULT_ROW: &str = "__default__";

/// How a field token is turned into a [`FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decoder {
    /// Signed integer in 32-bit range.
    Int,
    /// Signed 64-bit integer (bandwidth counters).
    WideInt,
    /// Text, kept verbatim.
    Text,
    /// Date, date/time or `0`.
    Timestamp,
}

impl Decoder {
    /// Decodes one token.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidInteger`] for a non-numeric or
    /// out-of-range integer and [`CodecError::InvalidTimestamp`] for a bad
    /// date token.
    pub fn decode(self, token: &str) -> CodecResult<FieldValue> {
        match self {
            Self::Int => token
                .parse::<i32>()
                .map(|n| FieldValue::Int(i64::from(n)))
                .map_err(|_| CodecError::invalid_integer(token)),
            Self::WideInt => token
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| CodecError::invalid_integer(token)),
            Self::Text => Ok(FieldValue::Text(token.to_string())),
            Self::Timestamp => Timestamp::parse(token).map(FieldValue::Time),
        }
    }

    /// Returns true if an integer value can be written and decoded back by
    /// this decoder.
    #[must_use]
    pub fn admits(self, n: i64) -> bool {
        match self {
            Self::Int => i32::try_from(n).is_ok(),
            Self::WideInt => true,
            Self::Text | Self::Timestamp => false,
        }
    }
}

/// How two values of the same field are combined when merging.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MergeRule {
    /// Add the two counters.
    Sum,
    /// Keep the smaller value.
    Min,
    /// Keep the larger value.
    Max,
    /// Keep the right (more recent) value.
    Latest,
    /// Ignore both values and emit this literal text.
    Replace(Cow<'static, str>),
}

impl MergeRule {
    /// Combines `left` and `right` according to this rule.
    ///
    /// `spec` is the field being merged; the result must decode under its
    /// decoder. On a `min`/`max` tie the left operand is kept. An empty
    /// `replace:` literal on an optional field yields `None`: the field is
    /// left out of the merged record, as it is left out of the emitted row.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Overflow`] if a sum leaves the range of the
    /// field's decoder, [`CodecError::IncompatibleValues`] if the operands
    /// cannot be combined (different kinds, or a sum of non-integers),
    /// [`CodecError::EmptyLiteral`] for an empty literal on a required
    /// field, or the decoder's error for a literal it rejects.
    pub fn apply(
        &self,
        spec: &FieldSpec,
        left: &FieldValue,
        right: &FieldValue,
    ) -> CodecResult<Option<FieldValue>> {
        let field = spec.name;
        let value = match self {
            Self::Sum => match (left, right) {
                (FieldValue::Int(a), FieldValue::Int(b)) => a
                    .checked_add(*b)
                    .filter(|n| spec.decoder.admits(*n))
                    .map(FieldValue::Int)
                    .ok_or_else(|| CodecError::Overflow {
                        field: field.to_string(),
                    })?,
                _ => return Err(incompatible(field, left, right)),
            },
            Self::Min => match left.compare(right) {
                Some(Ordering::Greater) => right.clone(),
                Some(_) => left.clone(),
                None => return Err(incompatible(field, left, right)),
            },
            Self::Max => match left.compare(right) {
                Some(Ordering::Less) => right.clone(),
                Some(_) => left.clone(),
                None => return Err(incompatible(field, left, right)),
            },
            Self::Latest => right.clone(),
            Self::Replace(literal) if literal.is_empty() => {
                if spec.optional {
                    return Ok(None);
                }
                return Err(CodecError::EmptyLiteral {
                    field: field.to_string(),
                });
            }
            Self::Replace(literal) => spec.decoder.decode(literal)?,
        };
        Ok(Some(value))
    }
}

fn incompatible(field: &str, left: &FieldValue, right: &FieldValue) -> CodecError {
    CodecError::IncompatibleValues {
        field: field.to_string(),
        left: left.kind(),
        right: right.kind(),
    }
}

impl FromStr for MergeRule {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(Self::Sum),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "latest" => Ok(Self::Latest),
            _ => s
                .strip_prefix("replace:")
                .or_else(|| s.strip_prefix("repl:"))
                .map(|literal| Self::Replace(Cow::Owned(literal.to_string())))
                .ok_or_else(|| CodecError::UnknownMergeRule {
                    rule: s.to_string(),
                }),
        }
    }
}

impl fmt::Display for MergeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sum => f.write_str("sum"),
            Self::Min => f.write_str("min"),
            Self::Max => f.write_str("max"),
            Self::Latest => f.write_str("latest"),
            Self::Replace(literal) => write!(f, "replace:{literal}"),
        }
    }
}

/// One field of a row shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name.
    pub name: &'static str,
    /// Token decoder.
    pub decoder: Decoder,
    /// Merge rule.
    pub merge: MergeRule,
    /// Whether the field belongs to the optional tail of the row.
    pub optional: bool,
}

impl FieldSpec {
    /// Creates a required field.
    #[must_use]
    pub const fn new(name: &'static str, decoder: Decoder, merge: MergeRule) -> Self {
        Self {
            name,
            decoder,
            merge,
            optional: false,
        }
    }

    /// Marks the field as part of the optional tail.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// An explicit row shape for one row key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    /// Row key this shape applies to.
    pub key: &'static str,
    /// Fields in on-disk order.
    pub fields: &'static [FieldSpec],
}

/// What merged rows are ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Row key, lexicographic.
    Key,
    /// Row key read as an integer.
    KeyInt,
    /// A named field of the row.
    Field(&'static str),
}

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Sort order applied to a section's merged rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortMeta {
    /// Sort priority; zero disables sorting.
    pub priority: u8,
    /// What to sort by.
    pub key: SortKey,
    /// Which way.
    pub direction: SortDirection,
}

/// The schema of one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSchema {
    /// Lowercase section name.
    pub name: &'static str,
    /// Row shapes for specific row keys.
    pub rows: &'static [RowSchema],
    /// Row shape for every other key.
    pub default_row: &'static [FieldSpec],
    /// Sort order for merged output.
    pub sort: Option<SortMeta>,
}

impl SectionSchema {
    /// Returns the field list that applies to `row`.
    #[must_use]
    pub fn row_schema(&self, row: &str) -> &'static [FieldSpec] {
        self.rows
            .iter()
            .find(|r| r.key == row)
            .map_or(self.default_row, |r| r.fields)
    }

    /// Looks up one field of the shape that applies to `row`.
    #[must_use]
    pub fn field(&self, row: &str, field: &str) -> Option<&'static FieldSpec> {
        self.row_schema(row).iter().find(|f| f.name == field)
    }

    /// Returns the merge rule for a field of `row`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnmappedField`] if the row shape has no such
    /// field.
    pub fn rule_for(&self, row: &str, field: &str) -> CodecResult<&'static MergeRule> {
        self.field(row, field)
            .map(|f| &f.merge)
            .ok_or_else(|| CodecError::UnmappedField {
                section: self.name.to_string(),
                row: row.to_string(),
                field: field.to_string(),
            })
    }

    /// Returns true if any row shape of this section has a field `name`.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.default_row.iter().any(|f| f.name == name)
            || self
                .rows
                .iter()
                .any(|r| r.fields.iter().any(|f| f.name == name))
    }
}

const fn int(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, Decoder::Int, MergeRule::Sum)
}

const fn wide(name: &'static str) -> FieldSpec {
    FieldSpec::new(name, Decoder::WideInt, MergeRule::Sum)
}

const fn time(name: &'static str, merge: MergeRule) -> FieldSpec {
    FieldSpec::new(name, Decoder::Timestamp, merge)
}

const fn sort(priority: u8, key: SortKey, direction: SortDirection) -> Option<SortMeta> {
    Some(SortMeta {
        priority,
        key,
        direction,
    })
}

const COUNTER: &[FieldSpec] = &[int("value")];

const PAGES_HITS: &[FieldSpec] = &[int("pages"), int("hits")];

const PAGES_HITS_BANDWIDTH: &[FieldSpec] = &[int("pages"), int("hits"), wide("bandwidth")];

const HITS_BANDWIDTH_LAST: &[FieldSpec] = &[
    int("hits"),
    wide("bandwidth"),
    time("last_visit", MergeRule::Max),
];

const GENERAL_ROWS: &[RowSchema] = &[
    RowSchema {
        key: "LastLine",
        fields: &[
            time("date", MergeRule::Max),
            FieldSpec::new("line", Decoder::Int, MergeRule::Max),
            FieldSpec::new("offset", Decoder::WideInt, MergeRule::Max),
            FieldSpec::new(
                "signature",
                Decoder::WideInt,
                MergeRule::Replace(Cow::Borrowed("")),
            )
            .optional(),
        ],
    },
    RowSchema {
        key: "FirstTime",
        fields: &[time("first_time", MergeRule::Min)],
    },
    RowSchema {
        key: "LastTime",
        fields: &[time("last_time", MergeRule::Max)],
    },
    RowSchema {
        key: "LastUpdate",
        fields: &[
            time("date", MergeRule::Max),
            int("parsed"),
            int("old"),
            int("new"),
            int("corrupted"),
            int("dropped"),
        ],
    },
];

static SECTIONS: &[SectionSchema] = &[
    SectionSchema {
        name: "general",
        rows: GENERAL_ROWS,
        default_row: COUNTER,
        sort: None,
    },
    SectionSchema {
        name: "time",
        rows: &[],
        default_row: &[
            int("pages"),
            int("hits"),
            wide("bandwidth"),
            int("not_viewed_pages"),
            int("not_viewed_hits"),
            wide("not_viewed_bandwidth"),
        ],
        sort: sort(24, SortKey::KeyInt, SortDirection::Ascending),
    },
    SectionSchema {
        name: "visitor",
        rows: &[],
        default_row: &[
            int("pages"),
            int("hits"),
            wide("bandwidth"),
            time("last_visit", MergeRule::Max).optional(),
            time("last_visit_start", MergeRule::Max).optional(),
            FieldSpec::new("last_visit_page", Decoder::Text, MergeRule::Max).optional(),
        ],
        sort: sort(25, SortKey::Field("pages"), SortDirection::Descending),
    },
    SectionSchema {
        name: "day",
        rows: &[],
        default_row: &[int("pages"), int("hits"), wide("bandwidth"), int("visits")],
        sort: sort(31, SortKey::Key, SortDirection::Ascending),
    },
    SectionSchema {
        name: "domain",
        rows: &[],
        default_row: PAGES_HITS_BANDWIDTH,
        sort: sort(25, SortKey::Field("pages"), SortDirection::Descending),
    },
    SectionSchema {
        name: "login",
        rows: &[],
        default_row: &[
            int("pages"),
            int("hits"),
            wide("bandwidth"),
            time("last_visit", MergeRule::Max),
        ],
        sort: sort(10, SortKey::Field("pages"), SortDirection::Descending),
    },
    SectionSchema {
        name: "robot",
        rows: &[],
        default_row: &[
            int("hits"),
            wide("bandwidth"),
            time("last_visit", MergeRule::Max),
            int("hits_on_robots"),
        ],
        sort: sort(25, SortKey::Field("hits"), SortDirection::Descending),
    },
    SectionSchema {
        name: "worms",
        rows: &[],
        default_row: HITS_BANDWIDTH_LAST,
        sort: sort(5, SortKey::Field("hits"), SortDirection::Descending),
    },
    SectionSchema {
        name: "emailsender",
        rows: &[],
        default_row: HITS_BANDWIDTH_LAST,
        sort: sort(20, SortKey::Field("hits"), SortDirection::Descending),
    },
    SectionSchema {
        name: "emailreceiver",
        rows: &[],
        default_row: HITS_BANDWIDTH_LAST,
        sort: sort(20, SortKey::Field("hits"), SortDirection::Descending),
    },
    SectionSchema {
        name: "session",
        rows: &[],
        default_row: COUNTER,
        sort: None,
    },
    SectionSchema {
        name: "sider",
        rows: &[],
        default_row: &[int("pages"), wide("bandwidth"), int("entry"), int("exit")],
        sort: sort(25, SortKey::Field("pages"), SortDirection::Descending),
    },
    SectionSchema {
        name: "filetypes",
        rows: &[],
        default_row: &[
            int("hits"),
            wide("bandwidth"),
            wide("bandwidth_without_compression"),
            wide("bandwidth_after_compression"),
        ],
        sort: None,
    },
    SectionSchema {
        name: "os",
        rows: &[],
        default_row: COUNTER,
        sort: None,
    },
    SectionSchema {
        name: "browser",
        rows: &[],
        default_row: COUNTER,
        sort: None,
    },
    // Row layout never pinned down; treated as a plain counter.
    SectionSchema {
        name: "screensize",
        rows: &[],
        default_row: COUNTER,
        sort: None,
    },
    SectionSchema {
        name: "unknownreferer",
        rows: &[],
        default_row: &[time("value", MergeRule::Max)],
        sort: None,
    },
    SectionSchema {
        name: "unknownrefererbrowser",
        rows: &[],
        default_row: &[time("value", MergeRule::Max)],
        sort: None,
    },
    SectionSchema {
        name: "origin",
        rows: &[],
        default_row: PAGES_HITS,
        sort: sort(5, SortKey::Key, SortDirection::Ascending),
    },
    SectionSchema {
        name: "sereferrals",
        rows: &[],
        default_row: PAGES_HITS,
        sort: None,
    },
    SectionSchema {
        name: "pagerefs",
        rows: &[],
        default_row: PAGES_HITS,
        sort: sort(25, SortKey::Field("pages"), SortDirection::Descending),
    },
    SectionSchema {
        name: "searchwords",
        rows: &[],
        default_row: COUNTER,
        sort: sort(10, SortKey::Field("value"), SortDirection::Descending),
    },
    SectionSchema {
        name: "keywords",
        rows: &[],
        default_row: COUNTER,
        sort: sort(25, SortKey::Field("value"), SortDirection::Descending),
    },
    SectionSchema {
        name: "misc",
        rows: &[],
        default_row: PAGES_HITS_BANDWIDTH,
        sort: None,
    },
    SectionSchema {
        name: "errors",
        rows: &[],
        default_row: &[int("hits"), wide("bandwidth")],
        sort: sort(5, SortKey::KeyInt, SortDirection::Ascending),
    },
    SectionSchema {
        name: "cluster",
        rows: &[],
        default_row: PAGES_HITS_BANDWIDTH,
        sort: None,
    },
    SectionSchema {
        name: "sider_404",
        rows: &[],
        default_row: &[
            int("hits"),
            FieldSpec::new("last_url_referer", Decoder::Text, MergeRule::Latest),
        ],
        sort: None,
    },
    SectionSchema {
        name: "plugin_geoip_city_maxmind",
        rows: &[],
        default_row: &[
            int("pages"),
            int("hits"),
            wide("bandwidth"),
            time("last_access", MergeRule::Max),
        ],
        sort: None,
    },
];

/// Looks up a section schema by (case-insensitive) name.
#[must_use]
pub fn section_schema(name: &str) -> Option<&'static SectionSchema> {
    SECTIONS.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

/// Returns every section schema, in table order.
#[must_use]
pub fn all_sections() -> &'static [SectionSchema] {
    SECTIONS
}

/// Checks the structural rules of the schema table.
///
/// - section names are lowercase and unique
/// - field names are unique within a row shape
/// - optional fields form a tail of every row shape
/// - a field-named sort key names a field of the default row
/// - an empty `replace:` literal only targets an optional last field
///
/// # Errors
///
/// Returns [`CodecError::InvalidSchema`] describing the first violation.
pub fn validate_table() -> CodecResult<()> {
    validate_sections(SECTIONS)
}

fn validate_sections(sections: &[SectionSchema]) -> CodecResult<()> {
    let mut names = HashSet::new();
    for section in sections {
        if section.name != section.name.to_ascii_lowercase() {
            return Err(CodecError::invalid_schema(format!(
                "section name '{}' is not lowercase",
                section.name
            )));
        }
        if !names.insert(section.name) {
            return Err(CodecError::invalid_schema(format!(
                "section '{}' is defined twice",
                section.name
            )));
        }

        let shapes = std::iter::once((DEFAULT_ROW, section.default_row))
            .chain(section.rows.iter().map(|r| (r.key, r.fields)));
        for (row, fields) in shapes {
            validate_row(section.name, row, fields)?;
        }

        if let Some(SortMeta {
            key: SortKey::Field(field),
            ..
        }) = section.sort
        {
            if !section.default_row.iter().any(|f| f.name == field) {
                return Err(CodecError::invalid_schema(format!(
                    "section '{}' sorts by unknown field '{field}'",
                    section.name
                )));
            }
        }
    }
    Ok(())
}

fn validate_row(section: &str, row: &str, fields: &[FieldSpec]) -> CodecResult<()> {
    if fields.is_empty() {
        return Err(CodecError::invalid_schema(format!(
            "section '{section}', row '{row}' has no fields"
        )));
    }

    let mut seen = HashSet::new();
    let mut in_tail = false;
    for (pos, field) in fields.iter().enumerate() {
        if !seen.insert(field.name) {
            return Err(CodecError::invalid_schema(format!(
                "section '{section}', row '{row}': field '{}' is declared twice",
                field.name
            )));
        }
        if in_tail && !field.optional {
            return Err(CodecError::invalid_schema(format!(
                "section '{section}', row '{row}': required field '{}' follows an optional one",
                field.name
            )));
        }
        let last = pos + 1 == fields.len();
        if matches!(&field.merge, MergeRule::Replace(l) if l.is_empty()) && !(field.optional && last)
        {
            return Err(CodecError::invalid_schema(format!(
                "section '{section}', row '{row}': field '{}' has an empty literal but is not the optional last field",
                field.name
            )));
        }
        in_tail |= field.optional;
    }
    Ok(())
}
