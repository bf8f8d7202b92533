//! awcache CLI
//!
//! Command-line tools for AWStats cache files.
//!
//! # Commands
//!
//! - `merge` - Merge two directories of cache files into a third
//! - `inspect` - List the years, months and sections of a domain
//! - `dump` - Print one section of one month
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// AWStats cache file tools.
#[derive(Parser)]
#[command(name = "awcache")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge two directories of cache files
    Merge {
        /// Directory of the first (older) input
        #[arg(long)]
        dir1: Option<PathBuf>,

        /// Domain of the first input
        #[arg(long)]
        domain1: Option<String>,

        /// Directory of the second input (defaults to dir1)
        #[arg(long)]
        dir2: Option<PathBuf>,

        /// Domain of the second input (defaults to domain1)
        #[arg(long)]
        domain2: Option<String>,

        /// Output directory
        #[arg(long)]
        outdir: Option<PathBuf>,

        /// Output domain (defaults to domain1)
        #[arg(long)]
        outdomain: Option<String>,

        /// Override a merge rule, as section.field=rule (repeatable)
        #[arg(long = "rule", value_name = "SECTION.FIELD=RULE")]
        rules: Vec<String>,

        /// Keep merged rows in union order instead of re-sorting
        #[arg(long)]
        no_sort: bool,

        /// Output format for the run summary (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the years, months and sections of a domain
    Inspect {
        /// Directory holding the cache files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Domain in the cache file names
        #[arg(long)]
        domain: String,

        /// List section names per month
        #[arg(short, long)]
        sections: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print one section of one month
    Dump {
        /// Directory holding the cache files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Domain in the cache file names
        #[arg(long)]
        domain: String,

        /// Year
        #[arg(short, long)]
        year: i32,

        /// Month (1-12)
        #[arg(short, long)]
        month: u32,

        /// Section name
        section: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Merge {
            dir1,
            domain1,
            dir2,
            domain2,
            outdir,
            outdomain,
            rules,
            no_sort,
            format,
        } => {
            let options = awcache_core::JobOptions {
                dir1,
                domain1,
                dir2,
                domain2,
                outdir,
                outdomain,
            };
            commands::merge::run(options, &rules, !no_sort, &format)?;
        }
        Commands::Inspect {
            dir,
            domain,
            sections,
            format,
        } => {
            commands::inspect::run(&dir, &domain, sections, &format)?;
        }
        Commands::Dump {
            dir,
            domain,
            year,
            month,
            section,
            format,
        } => {
            commands::dump::run(&dir, &domain, year, month, &section, &format)?;
        }
        Commands::Version => {
            println!("awcache CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("awcache Core v{}", awcache_core::VERSION);
        }
    }

    Ok(())
}
