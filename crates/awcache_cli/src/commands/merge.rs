//! Merge command implementation.

use awcache_core::{Catalog, Config, JobOptions, MergeEngine, MergeJob, MergeReport, RuleOverride};
use tracing::info;

/// Runs the merge command.
pub fn run(
    options: JobOptions,
    rules: &[String],
    sort_merged: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = options.resolve()?;

    let mut config = Config::new().sort_merged(sort_merged);
    for rule in rules {
        config = config.rule_override(rule.parse::<RuleOverride>()?);
    }
    let engine = MergeEngine::new(config)?;

    let left = Catalog::open(&plan.left.dir, &plan.left.domain)?;
    let right = Catalog::open(&plan.right.dir, &plan.right.domain)?;
    info!(left = %left, right = %right, "merging");

    let report = MergeJob::new(engine, plan.output).run(&left, &right)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            print_text_output(&report);
        }
    }

    Ok(())
}

fn print_text_output(report: &MergeReport) {
    println!("Merged:             {}", list(&report.merged));
    println!("Copied from first:  {}", list(&report.copied_from_left));
    println!("Copied from second: {}", list(&report.copied_from_right));
    println!();
    println!("Wrote {} file(s):", report.total());
    for path in &report.written {
        println!("  {}", path.display());
    }
}

fn list<T: std::fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "-".to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
