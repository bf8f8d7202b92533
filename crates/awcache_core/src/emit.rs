//! Writing cache files.
//!
//! Output follows the on-disk grammar exactly, so an emitted file can be
//! read back by [`MonthFile`](crate::MonthFile):
//!
//! ```text
//! AWSTATS DATA FILE 6.9 (build 1.925)
//!
//! BEGIN_MAP 2
//! POS_GENERAL 93                  <- padded to the configured width
//! POS_OS 150
//! END_MAP
//!
//! BEGIN_GENERAL 1
//! TotalVisits 1475
//! END_GENERAL
//!
//! ...
//! ```

use crate::config::Config;
use crate::error::CoreResult;
use crate::merge::MergedMonth;
use crate::paths::cache_file_name;
use crate::types::{FormatVersion, YearMonth};
use awcache_codec::{encode_section, pos_marker, Section};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Renders a whole cache file.
///
/// `POS_` offsets are left-aligned and space-padded to
/// `config.offset_width`, widened if an offset needs more digits.
#[must_use]
pub fn render_month(version: &FormatVersion, sections: &[Section], config: &Config) -> String {
    let bodies: Vec<String> = sections
        .iter()
        .map(|section| {
            let mut body = String::new();
            encode_section(section, &mut body);
            body
        })
        .collect();
    let body_len: usize = bodies.iter().map(String::len).sum();
    let header = version.header(&config.tool_name);

    // The map's own length depends on the padding width.
    let mut width = config.offset_width.max(1);
    let map_end = loop {
        let len = map_len(&header, sections, width);
        let digits = (len + body_len).to_string().len();
        if digits <= width {
            break len;
        }
        width = digits;
    };

    let mut out = String::with_capacity(map_end + body_len);
    out.push_str(&header);
    out.push_str("\n\n");
    let _ = writeln!(out, "BEGIN_MAP {}", sections.len());
    let mut offset = map_end;
    for (section, body) in sections.iter().zip(&bodies) {
        let _ = writeln!(out, "{} {offset:<width$}", pos_marker(section.name()));
        offset += body.len();
    }
    out.push_str("END_MAP\n\n");

    for body in &bodies {
        out.push_str(body);
    }
    out
}

fn map_len(header: &str, sections: &[Section], width: usize) -> usize {
    let pos_lines: usize = sections
        .iter()
        .map(|s| pos_marker(s.name()).len() + 1 + width + 1)
        .sum();
    header.len() + 2 + format!("BEGIN_MAP {}\n", sections.len()).len() + pos_lines + "END_MAP\n\n".len()
}

/// Writes a merged month as `<dir>/awstats<MM><YYYY>.<domain>.txt`.
///
/// The file is written to `<name>.tmp` first and then renamed into place.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written or renamed.
pub fn write_month(
    dir: &Path,
    domain: &str,
    ym: YearMonth,
    month: &MergedMonth,
    config: &Config,
) -> CoreResult<PathBuf> {
    let text = render_month(&month.version, &month.sections, config);
    let name = cache_file_name(domain, ym);
    let path = dir.join(&name);
    write_atomic(&path, &dir.join(format!("{name}.tmp")), text.as_bytes())?;
    debug!(path = %path.display(), bytes = text.len(), "wrote cache file");
    Ok(path)
}

/// Copies an existing cache file to `<dir>/awstats<MM><YYYY>.<domain>.txt`
/// byte for byte, through the same temporary-file rename.
///
/// # Errors
///
/// Returns an I/O error if the source cannot be read or the copy written.
pub fn copy_month(source: &Path, dir: &Path, domain: &str, ym: YearMonth) -> CoreResult<PathBuf> {
    let data = fs::read(source)?;
    let name = cache_file_name(domain, ym);
    let path = dir.join(&name);
    write_atomic(&path, &dir.join(format!("{name}.tmp")), &data)?;
    Ok(path)
}

fn write_atomic(path: &Path, temp_path: &Path, data: &[u8]) -> CoreResult<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::month::MonthFile;
    use awcache_codec::{FieldValue, RawSection};
    use awcache_storage::InMemoryBackend;

    fn section(name: &str, lines: &[&str]) -> Section {
        let mut raw = RawSection::new(name);
        for line in lines {
            raw.push_line(line);
        }
        Section::decode(&raw).unwrap()
    }

    fn sample() -> (FormatVersion, Vec<Section>) {
        (
            FormatVersion::new("6.9", "1.925"),
            vec![
                section("general", &["TotalVisits 1475", "LastTime 20091130235959"]),
                section("os", &["linux 7", "macosx 2"]),
            ],
        )
    }

    #[test]
    fn offsets_point_at_begin_lines() {
        let (version, sections) = sample();
        let text = render_month(&version, &sections, &Config::default());

        for line in text.lines().filter(|l| l.starts_with("POS_")) {
            let mut parts = line.split_whitespace();
            let name = &parts.next().unwrap()["POS_".len()..];
            let offset: usize = parts.next().unwrap().parse().unwrap();
            assert!(text[offset..].starts_with(&format!("BEGIN_{name} ")), "{line}");
        }
    }

    #[test]
    fn layout() {
        let (version, sections) = sample();
        let text = render_month(&version, &sections, &Config::new().offset_width(4));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "AWSTATS DATA FILE 6.9 (build 1.925)");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "BEGIN_MAP 2");
        assert!(lines[3].starts_with("POS_GENERAL "));
        assert_eq!(lines[3].len(), "POS_GENERAL ".len() + 4);
        assert_eq!(lines[5], "END_MAP");
        assert!(text.ends_with("END_OS\n\n"));
    }

    #[test]
    fn narrow_width_is_widened() {
        let (version, sections) = sample();
        let text = render_month(&version, &sections, &Config::new().offset_width(1));
        let pos = text.lines().find(|l| l.starts_with("POS_OS")).unwrap();
        let offset: usize = pos.split_whitespace().nth(1).unwrap().parse().unwrap();
        assert!(text[offset..].starts_with("BEGIN_OS 2"));
    }

    #[test]
    fn rendered_text_reads_back() {
        let (version, sections) = sample();
        let text = render_month(&version, &sections, &Config::default());
        let month = MonthFile::from_backend(
            YearMonth::new(2009, 11).unwrap(),
            Box::new(InMemoryBackend::from_text(&text)),
        );

        assert_eq!(month.version().unwrap(), version);
        assert_eq!(month.section_names().unwrap(), ["general", "os"]);
        let general = month.section("general").unwrap();
        assert_eq!(
            general.get("TotalVisits").unwrap().scalar(),
            Some(&FieldValue::Int(1475))
        );
        assert_eq!(*month.section("os").unwrap(), sections[1]);
    }

    #[test]
    fn write_is_atomic_and_named() {
        let dir = tempfile::tempdir().unwrap();
        let (version, sections) = sample();
        let merged = MergedMonth { version, sections };
        let ym = YearMonth::new(2009, 11).unwrap();

        let path = write_month(dir.path(), "example.com", ym, &merged, &Config::default()).unwrap();
        assert_eq!(path, dir.path().join("awstats112009.example.com.txt"));
        assert!(path.exists());
        assert!(!dir.path().join("awstats112009.example.com.txt.tmp").exists());
    }

    #[test]
    fn copy_is_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.txt");
        fs::write(&source, "anything\n  at all \n").unwrap();
        let ym = YearMonth::new(2008, 12).unwrap();

        let path = copy_month(&source, dir.path(), "out.com", ym).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "anything\n  at all \n");
    }
}
