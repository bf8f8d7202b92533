//! Inspect command implementation.

use awcache_core::{Catalog, MonthFile};
use serde::Serialize;
use std::path::Path;

/// Catalog inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Directory path.
    pub dir: String,
    /// Domain.
    pub domain: String,
    /// Years, ascending.
    pub years: Vec<YearInfo>,
}

/// One year of cache files.
#[derive(Debug, Serialize)]
pub struct YearInfo {
    /// Year.
    pub year: i32,
    /// Months present, ascending.
    pub months: Vec<MonthInfo>,
}

/// One month's cache file.
#[derive(Debug, Serialize)]
pub struct MonthInfo {
    /// Month (1-12).
    pub month: u32,
    /// File path.
    pub path: String,
    /// Format version from the header (if readable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Section names in file order (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<String>>,
    /// Why the file could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the inspect command.
pub fn run(
    dir: &Path,
    domain: &str,
    show_sections: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::open(dir, domain)?;
    if catalog.is_empty() {
        return Err(format!("No cache files for {domain} in {}", dir.display()).into());
    }

    let result = InspectResult {
        dir: dir.display().to_string(),
        domain: domain.to_string(),
        years: catalog
            .iter()
            .map(|year| YearInfo {
                year: year.year(),
                months: year.iter().map(|m| month_info(m, show_sections)).collect(),
            })
            .collect(),
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn month_info(month: &MonthFile, show_sections: bool) -> MonthInfo {
    let mut info = MonthInfo {
        month: month.year_month().month,
        path: month
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        version: None,
        sections: None,
        error: None,
    };

    // A broken file is reported, not fatal.
    match month.version() {
        Ok(version) => info.version = Some(version.to_string()),
        Err(e) => {
            info.error = Some(e.to_string());
            return info;
        }
    }
    if show_sections {
        match month.section_names() {
            Ok(names) => info.sections = Some(names),
            Err(e) => info.error = Some(e.to_string()),
        }
    }
    info
}

fn print_text_output(result: &InspectResult) {
    println!("AWStats Cache Inspection");
    println!("========================");
    println!();
    println!("Directory: {}", result.dir);
    println!("Domain:    {}", result.domain);

    for year in &result.years {
        println!();
        println!("{}:", year.year);
        for month in &year.months {
            match (&month.version, &month.error) {
                (_, Some(error)) => println!("  {:02}  ERROR {error}", month.month),
                (Some(version), None) => println!("  {:02}  {version}", month.month),
                (None, None) => println!("  {:02}", month.month),
            }
            if let Some(sections) = &month.sections {
                println!("      {}", sections.join(" "));
            }
        }
    }
}
