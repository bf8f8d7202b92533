//! Benchmark utilities.
//!
//! Deterministic synthetic sections, sized by row count.

use awcache_codec::{RawSection, Section};
use awcache_testkit::CacheFileBuilder;

/// Row lines for a `visitor` section with `count` hosts.
///
/// `offset` shifts the host numbering so two calls overlap partially.
pub fn visitor_rows(count: usize, offset: usize) -> Vec<String> {
    (offset..offset + count)
        .map(|i| {
            let (a, b) = (i / 250 % 250, i % 250);
            format!(
                "10.{a}.{b}.1 {} {} {} 200911{:02}120000 200911{:02}115500 /page{}.html",
                i % 97,
                i % 389,
                i * 1024,
                i % 28 + 1,
                i % 28 + 1,
                i % 50
            )
        })
        .collect()
}

/// Row lines for an `os`-style counter section.
pub fn counter_rows(count: usize, offset: usize) -> Vec<String> {
    (offset..offset + count)
        .map(|i| format!("os{i} {}", i % 1000))
        .collect()
}

/// Decodes row lines into a section.
///
/// # Panics
///
/// Panics if a line does not decode.
pub fn section(name: &str, lines: &[String]) -> Section {
    let mut raw = RawSection::new(name);
    for line in lines {
        raw.push_line(line);
    }
    Section::decode(&raw).expect("benchmark rows decode")
}

/// A cache file with `rows` visitor rows plus a small general section.
pub fn month_text(rows: usize) -> String {
    let visitors = visitor_rows(rows, 0);
    let visitors: Vec<&str> = visitors.iter().map(String::as_str).collect();
    CacheFileBuilder::new()
        .section("general", &["TotalVisits 1475", "LastTime 20091130235959"])
        .section("visitor", &visitors)
        .build()
}
