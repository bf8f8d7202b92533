//! Cache file fixtures.
//!
//! [`CacheFileBuilder`] writes cache-file text with a correct offset map,
//! plus the quirks real files (and broken files) show: trailing spaces
//! after `POS_` offsets, `BEGIN_` counts larger than the rows that follow,
//! a missing `END_MAP`, a non-integer offset, a header without a build tag.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug, Clone)]
struct FixtureSection {
    name: String,
    rows: Vec<String>,
    extra_count: usize,
}

/// Builds the text of one cache file.
///
/// # Example
///
/// ```rust
/// use awcache_testkit::CacheFileBuilder;
///
/// let text = CacheFileBuilder::new()
///     .section("general", &["TotalVisits 1475"])
///     .build();
/// assert!(text.starts_with("AWSTATS DATA FILE 6.9 (build 1.925)\n"));
/// ```
#[derive(Debug, Clone)]
pub struct CacheFileBuilder {
    version: String,
    build: Option<String>,
    sections: Vec<FixtureSection>,
    trailing_space: bool,
    end_map: bool,
    bad_offset: Option<String>,
}

impl Default for CacheFileBuilder {
    fn default() -> Self {
        Self {
            version: "6.9".to_string(),
            build: Some("1.925".to_string()),
            sections: Vec::new(),
            trailing_space: true,
            end_map: true,
            bad_offset: None,
        }
    }
}

impl CacheFileBuilder {
    /// Creates a builder for a well-formed 6.9 file with no sections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the header version and build.
    pub fn version(mut self, version: &str, build: &str) -> Self {
        self.version = version.to_string();
        self.build = Some(build.to_string());
        self
    }

    /// Drops the `(build ...)` tag from the header.
    pub fn without_build(mut self) -> Self {
        self.build = None;
        self
    }

    /// Appends a section with the given row lines (`key tok tok...`).
    pub fn section(mut self, name: &str, rows: &[&str]) -> Self {
        self.sections.push(FixtureSection {
            name: name.to_string(),
            rows: rows.iter().map(|r| r.to_string()).collect(),
            extra_count: 0,
        });
        self
    }

    /// Makes a section's `BEGIN_` line claim `extra` more rows than it has.
    pub fn overstate_count(mut self, name: &str, extra: usize) -> Self {
        if let Some(section) = self.sections.iter_mut().find(|s| s.name == name) {
            section.extra_count = extra;
        }
        self
    }

    /// Drops every section not named in `names`.
    pub fn retain_sections(mut self, names: &[&str]) -> Self {
        self.sections.retain(|s| names.contains(&s.name.as_str()));
        self
    }

    /// Writes `POS_` lines without the trailing space real files carry.
    pub fn trailing_space(mut self, value: bool) -> Self {
        self.trailing_space = value;
        self
    }

    /// Leaves out the `END_MAP` line.
    pub fn without_end_map(mut self) -> Self {
        self.end_map = false;
        self
    }

    /// Replaces a section's offset with a non-integer token.
    pub fn bad_offset(mut self, name: &str) -> Self {
        self.bad_offset = Some(name.to_string());
        self
    }

    fn header(&self) -> String {
        match &self.build {
            Some(build) => format!("AWSTATS DATA FILE {} (build {build})", self.version),
            None => format!("AWSTATS DATA FILE {}", self.version),
        }
    }

    fn body(section: &FixtureSection) -> String {
        let upper = section.name.to_ascii_uppercase();
        let mut out = format!(
            "BEGIN_{upper} {}\n",
            section.rows.len() + section.extra_count
        );
        for row in &section.rows {
            out.push_str(row);
            out.push('\n');
        }
        out.push_str(&format!("END_{upper}\n\n"));
        out
    }

    fn map(&self, offsets: &[usize]) -> String {
        let mut out = format!("{}\n\nBEGIN_MAP {}\n", self.header(), self.sections.len());
        for (section, offset) in self.sections.iter().zip(offsets) {
            let upper = section.name.to_ascii_uppercase();
            let value = if self.bad_offset.as_deref() == Some(section.name.as_str()) {
                "x".repeat(offset.to_string().len())
            } else {
                offset.to_string()
            };
            let pad = if self.trailing_space { " " } else { "" };
            out.push_str(&format!("POS_{upper} {value}{pad}\n"));
        }
        if self.end_map {
            out.push_str("END_MAP\n");
        }
        out.push('\n');
        out
    }

    /// Renders the file text.
    pub fn build(&self) -> String {
        let bodies: Vec<String> = self.sections.iter().map(Self::body).collect();

        // Offset digits change the map's length; iterate until it settles.
        let mut offsets = vec![0; bodies.len()];
        loop {
            let mut next = Vec::with_capacity(bodies.len());
            let mut at = self.map(&offsets).len();
            for body in &bodies {
                next.push(at);
                at += body.len();
            }
            if next == offsets {
                break;
            }
            offsets = next;
        }

        let mut text = self.map(&offsets);
        for body in &bodies {
            text.push_str(body);
        }
        text
    }

    /// Writes the file as `awstats<MM><YYYY>.<domain>.txt` under `dir`.
    pub fn write_to(&self, dir: &Path, domain: &str, year: i32, month: u32) -> PathBuf {
        let path = dir.join(format!("awstats{month:02}{year:04}.{domain}.txt"));
        fs::write(&path, self.build()).expect("Failed to write cache fixture");
        path
    }
}

/// A temporary directory of cache files with automatic cleanup.
pub struct CacheDir {
    dir: TempDir,
}

impl CacheDir {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// The directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes one month's cache file.
    pub fn add_month(
        &self,
        domain: &str,
        year: i32,
        month: u32,
        file: &CacheFileBuilder,
    ) -> PathBuf {
        file.write_to(self.path(), domain, year, month)
    }

    /// Creates a subdirectory (for a second input or an output).
    pub fn subdir(&self, name: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::create_dir_all(&path).expect("Failed to create subdirectory");
        path
    }
}

impl Default for CacheDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset_of(text: &str, name: &str) -> usize {
        let prefix = format!("POS_{name} ");
        text.lines()
            .find_map(|l| l.strip_prefix(&prefix))
            .and_then(|v| v.trim().parse().ok())
            .unwrap()
    }

    #[test]
    fn offsets_point_at_begin_lines() {
        let text = CacheFileBuilder::new()
            .section("general", &["TotalVisits 1475"])
            .section("os", &["linux 7", "macosx 2"])
            .build();

        for name in ["GENERAL", "OS"] {
            let offset = offset_of(&text, name);
            assert!(text[offset..].starts_with(&format!("BEGIN_{name} ")));
        }
    }

    #[test]
    fn trailing_spaces_by_default() {
        let text = CacheFileBuilder::new().section("os", &["linux 7"]).build();
        let pos = text.lines().find(|l| l.starts_with("POS_OS")).unwrap();
        assert!(pos.ends_with(' '));

        let text = CacheFileBuilder::new()
            .section("os", &["linux 7"])
            .trailing_space(false)
            .build();
        let pos = text.lines().find(|l| l.starts_with("POS_OS")).unwrap();
        assert!(!pos.ends_with(' '));
    }

    #[test]
    fn quirks() {
        let text = CacheFileBuilder::new()
            .section("os", &["linux 7"])
            .overstate_count("os", 2)
            .build();
        assert!(text.contains("BEGIN_OS 3\n"));

        let text = CacheFileBuilder::new().without_build().build();
        assert!(text.starts_with("AWSTATS DATA FILE 6.9\n"));

        let text = CacheFileBuilder::new().without_end_map().build();
        assert!(!text.contains("END_MAP"));

        let text = CacheFileBuilder::new()
            .section("os", &["linux 7"])
            .bad_offset("os")
            .build();
        assert!(text.lines().any(|l| l.starts_with("POS_OS x")));
    }

    #[test]
    fn cache_dir_names_files() {
        let dir = CacheDir::new();
        let path = dir.add_month("example.com", 2009, 3, &CacheFileBuilder::new());
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "awstats032009.example.com.txt"
        );
        assert!(path.exists());
    }
}
