//! Positional row decoding.

use crate::error::{CodecError, CodecResult};
use crate::record::Record;
use crate::schema::SectionSchema;

/// Decodes one row's tokens into a record.
///
/// Tokens are matched to the row's field list by position. When the input
/// runs out inside the optional tail the record simply ends there; running
/// out before a required field is an error. Surplus tokens are ignored.
///
/// # Errors
///
/// Returns [`CodecError::MissingField`] if a required field has no token,
/// or the field decoder's error for a malformed token.
pub fn decode_row<S: AsRef<str>>(
    schema: &SectionSchema,
    key: &str,
    tokens: &[S],
) -> CodecResult<Record> {
    let fields = schema.row_schema(key);
    let mut record = Record::new();

    for (i, spec) in fields.iter().enumerate() {
        match tokens.get(i) {
            Some(token) => record.insert(spec.name, spec.decoder.decode(token.as_ref())?),
            None if spec.optional => break,
            None => {
                return Err(CodecError::MissingField {
                    section: schema.name.to_string(),
                    row: key.to_string(),
                    field: spec.name.to_string(),
                })
            }
        }
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::section_schema;
    use crate::value::FieldValue;

    #[test]
    fn single_field_row() {
        let general = section_schema("general").unwrap();
        let record = decode_row(general, "TotalVisits", &["1475"]).unwrap();
        assert_eq!(record.get("value"), Some(&FieldValue::Int(1475)));
        assert_eq!(record.scalar(), Some(&FieldValue::Int(1475)));
    }

    #[test]
    fn short_visitor_row_stops_at_optional_tail() {
        let visitor = section_schema("visitor").unwrap();
        let record = decode_row(visitor, "1.2.3.4", &["3", "9", "12000"]).unwrap();
        assert_eq!(record.names().collect::<Vec<_>>(), ["pages", "hits", "bandwidth"]);
    }

    #[test]
    fn full_visitor_row() {
        let visitor = section_schema("visitor").unwrap();
        let record = decode_row(
            visitor,
            "1.2.3.4",
            &["3", "9", "12000", "20091130165230", "20091130160000", "/index.html"],
        )
        .unwrap();
        assert_eq!(record.len(), 6);
        assert_eq!(
            record.get("last_visit_page").and_then(FieldValue::as_text),
            Some("/index.html")
        );
    }

    #[test]
    fn missing_required_field() {
        let visitor = section_schema("visitor").unwrap();
        let err = decode_row(visitor, "1.2.3.4", &["3", "9"]).unwrap_err();
        assert_eq!(
            err,
            CodecError::MissingField {
                section: "visitor".into(),
                row: "1.2.3.4".into(),
                field: "bandwidth".into(),
            }
        );
    }

    #[test]
    fn surplus_tokens_ignored() {
        let os = section_schema("os").unwrap();
        let record = decode_row(os, "linux", &["7", "extra"]).unwrap();
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn bad_integer_token() {
        let os = section_schema("os").unwrap();
        assert!(matches!(
            decode_row(os, "linux", &["seven"]),
            Err(CodecError::InvalidInteger { .. })
        ));
    }
}
