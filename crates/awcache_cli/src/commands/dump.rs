//! Dump command implementation.

use awcache_core::{Catalog, Section, YearMonth};
use std::path::Path;

/// Runs the dump command.
pub fn run(
    dir: &Path,
    domain: &str,
    year: i32,
    month: u32,
    section: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let ym = YearMonth::new(year, month).ok_or_else(|| format!("Invalid month: {month}"))?;
    let catalog = Catalog::open(dir, domain)?;
    let section = catalog.month(ym)?.section(section)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&*section)?);
        }
        _ => {
            print_text_output(&section);
        }
    }

    Ok(())
}

fn print_text_output(section: &Section) {
    println!("{section}");
    for (key, record) in section.iter() {
        let fields: Vec<String> = record
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        println!("  {key}: {}", fields.join(" "));
    }
}
