//! Token encoding for rows and section markers.

use crate::record::Record;
use crate::section::Section;
use std::fmt::Write;

/// Returns the `BEGIN_<NAME>` marker for a section.
#[must_use]
pub fn begin_marker(section: &str) -> String {
    format!("BEGIN_{}", section.to_ascii_uppercase())
}

/// Returns the `END_<NAME>` marker for a section.
#[must_use]
pub fn end_marker(section: &str) -> String {
    format!("END_{}", section.to_ascii_uppercase())
}

/// Returns the `POS_<NAME>` marker for a section.
#[must_use]
pub fn pos_marker(section: &str) -> String {
    format!("POS_{}", section.to_ascii_uppercase())
}

/// Encodes one row as `key tok tok...`.
///
/// Empty trailing tokens (a `replace:` literal of `""` in the last field)
/// are dropped so the line carries no trailing whitespace.
#[must_use]
pub fn encode_row(key: &str, record: &Record) -> String {
    let mut line = String::from(key);
    for value in record.values() {
        line.push(' ');
        line.push_str(&value.to_token());
    }
    line.truncate(line.trim_end().len());
    line
}

/// Appends a whole section (`BEGIN_` line, rows, `END_` line and a blank
/// line) to `out`.
pub fn encode_section(section: &Section, out: &mut String) {
    // Writing to a String never fails.
    let _ = writeln!(out, "{} {}", begin_marker(section.name()), section.len());
    for (key, record) in section.iter() {
        out.push_str(&encode_row(key, record));
        out.push('\n');
    }
    let _ = writeln!(out, "{}", end_marker(section.name()));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    #[test]
    fn markers_are_uppercase() {
        assert_eq!(begin_marker("general"), "BEGIN_GENERAL");
        assert_eq!(end_marker("sider_404"), "END_SIDER_404");
        assert_eq!(pos_marker("time"), "POS_TIME");
    }

    #[test]
    fn row_tokens() {
        let record = Record::from_fields(vec![
            ("pages", FieldValue::Int(4)),
            ("hits", FieldValue::Int(15)),
            ("bandwidth", FieldValue::Int(53_018)),
        ]);
        assert_eq!(encode_row("00", &record), "00 4 15 53018");
    }

    #[test]
    fn trailing_empty_token_trimmed() {
        let record = Record::from_fields(vec![
            ("line", FieldValue::Int(10)),
            ("signature", FieldValue::from("")),
        ]);
        assert_eq!(encode_row("LastLine", &record), "LastLine 10");
    }

    #[test]
    fn section_block() {
        let section = Section::from_records(
            "os",
            vec![
                ("linux".to_string(), Record::from_fields(vec![("value", FieldValue::Int(7))])),
                ("macosx".to_string(), Record::from_fields(vec![("value", FieldValue::Int(2))])),
            ],
        )
        .unwrap();

        let mut out = String::new();
        encode_section(&section, &mut out);
        assert_eq!(out, "BEGIN_OS 2\nlinux 7\nmacosx 2\nEND_OS\n\n");
    }
}
