// src/main.rs

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use salt_surrogate::config::Config;
use salt_surrogate::error::Result;
use salt_surrogate::model::Catalog;
use salt_surrogate::{inventory, matching, report, utils};

#[derive(Parser, Debug)]
#[command(name = "salt-surrogate", version, about = "Map elements onto reference surrogates")]
struct Cli {
    /// Settings file (defaults to the OS config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Match every element, write the report and the updated table
    Map {
        /// Element table (csv, tsv, xlsx, xls, ods)
        table: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also write surrogate groups as JSON
        #[arg(long)]
        groups: Option<PathBuf>,
        /// Worksheet name for spreadsheet input
        #[arg(long)]
        sheet: Option<String>,
    },
    /// Print one element record, by symbol, name or atomic number
    Show {
        query: String,
        /// Element table to search
        #[arg(long, short)]
        table: PathBuf,
        #[arg(long)]
        sheet: Option<String>,
    },
    /// Sum a per-timestep inventory onto surrogate groups
    Condense {
        groups: PathBuf,
        inventory: PathBuf,
        #[arg(long, default_value = "surrogate_vector.json")]
        output: PathBuf,
    },
    /// Print the effective settings
    Config {
        /// Write them to the settings file
        #[arg(long)]
        write: bool,
    },
}

fn log_level(cli: &Cli, config: &Config) -> LevelFilter {
    if cli.quiet {
        return LevelFilter::Error;
    }
    match cli.verbose {
        0 => config.log_filter(),
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn default_report_path(table: &Path) -> PathBuf {
    let stem = table.file_stem().unwrap_or_default().to_string_lossy();
    table.with_file_name(format!("{}_report.txt", stem))
}

fn run_map(
    config: &Config,
    table: &Path,
    report_path: Option<PathBuf>,
    output: Option<PathBuf>,
    groups: Option<PathBuf>,
    sheet: Option<&str>,
) -> Result<()> {
    let (catalog, raw) = Catalog::load(table, sheet, &config.schema)?;

    #[cfg(feature = "parallel")]
    let mapping = matching::map_catalog_parallel(&catalog, &config.policy);
    #[cfg(not(feature = "parallel"))]
    let mapping = matching::map_catalog(&catalog, &config.policy);

    for (tier, count) in mapping.tier_counts() {
        log::info!("{:<10} {}", tier.as_str(), count);
    }

    let text = report::render(&mapping, &catalog, &config.policy);
    let report_path = report_path.unwrap_or_else(|| default_report_path(table));
    report::write_report(&report_path, &text)?;

    let updated = report::augment(&raw, &mapping)?;
    let output = output.unwrap_or_else(|| report::default_output_path(table));
    report::write_table(&output, &updated)?;

    if let Some(path) = groups {
        let g = report::surrogate_groups(&updated)?;
        report::write_groups(&path, &g)?;
    }
    Ok(())
}

fn run_show(config: &Config, table: &Path, sheet: Option<&str>, query: &str) -> Result<()> {
    let (catalog, _) = Catalog::load(table, sheet, &config.schema)?;
    let element = catalog.lookup(query)?;
    print!("{}", element.describe());
    Ok(())
}

fn run_condense(groups: &Path, inventory_path: &Path, output: &Path) -> Result<()> {
    let groups = report::load_groups(groups)?;
    let inv = inventory::load_inventory(inventory_path)?;
    let condensed = inventory::condense(&groups, &inv)?;
    inventory::write_condensed(output, &condensed)
}

fn run_config(config: &Config, explicit: Option<&Path>, write: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    if write {
        let path = config.save(explicit)?;
        log::info!("Settings written to {}", path.display());
    }
    Ok(())
}

/// An explicit `--config` that cannot be read fails the run; a broken file at
/// the default location is reported and the defaults are used.
fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match Config::load(explicit) {
        Ok((config, origin)) => {
            log::debug!("{}", origin);
            Ok(config)
        }
        Err(e) if explicit.is_none() => {
            log::warn!("{}; using defaults", e);
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if utils::logger::init(LevelFilter::Info).is_err() {
        eprintln!("logger already initialised");
    }
    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    log::set_max_level(log_level(&cli, &config));

    let result = match &cli.command {
        Command::Map { table, report, output, groups, sheet } => run_map(
            &config,
            table,
            report.clone(),
            output.clone(),
            groups.clone(),
            sheet.as_deref(),
        ),
        Command::Show { query, table, sheet } => run_show(&config, table, sheet.as_deref(), query),
        Command::Condense { groups, inventory, output } => run_condense(groups, inventory, output),
        Command::Config { write } => run_config(&config, cli.config.as_deref(), *write),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
