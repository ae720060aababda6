mod config;
mod error;
mod logging;
mod models;
mod ordered_set;
mod seed;
mod store;
mod tui;
mod view;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use models::{Candidate, CandidateField, SortConfig};
use serde_json::{Map, Value};
use std::path::PathBuf;
use store::CandidateStore;

#[derive(Parser)]
#[command(name = "talent")]
#[command(about = "Talent pool - browse, search, sort and curate job candidates")]
struct Cli {
    /// Config file (default: the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON seed file replacing the built-in candidates
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive talent pool (default)
    Browse,

    /// Print the filtered, sorted pool
    List {
        /// Case-insensitive substring matched against every field
        #[arg(short, long)]
        search: Option<String>,

        /// Column to sort by (name, email, stage, rating, appliedJob, resume)
        #[arg(long)]
        sort: Option<CandidateField>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Comma-separated columns to show, in order
        #[arg(short, long, value_delimiter = ',')]
        columns: Option<Vec<CandidateField>>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the available columns
    Columns,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let command = cli.command.unwrap_or(Commands::Browse);

    let directive = logging::filter_directive(&config.log_level, cli.verbose);
    let tui = matches!(command, Commands::Browse);
    logging::init(&directive, config.log_file.as_deref(), tui)?;

    match command {
        Commands::Browse => {
            let store = build_store(cli.seed.as_ref(), &config)?;
            tui::run_browse(store)?;
        }

        Commands::List {
            search,
            sort,
            desc,
            columns,
            json,
        } => {
            let mut store = build_store(cli.seed.as_ref(), &config)?;
            if let Some(term) = search {
                store.set_search_term(&term);
            }
            if let Some(field) = sort {
                let sort_config = if desc {
                    SortConfig::desc(field)
                } else {
                    SortConfig::asc(field)
                };
                store.set_sort_config(Some(sort_config));
            }
            if let Some(columns) = columns {
                store.set_visible_columns(columns);
            }

            let state = store.state();
            let rows = view::derive_view(&state.candidates, &state.search_term, state.sort_config);
            let columns = state.visible_columns.as_slice();
            if json {
                let projected: Vec<Value> = rows.iter().map(|c| row_json(c, columns)).collect();
                println!("{}", serde_json::to_string_pretty(&projected)?);
            } else if rows.is_empty() {
                println!("No candidates found.");
            } else if columns.is_empty() {
                println!("{} candidate(s), no columns visible", rows.len());
            } else {
                print_table(&rows, columns);
            }
        }

        Commands::Columns => {
            println!("{:<12} {:<12}", "KEY", "LABEL");
            println!("{}", "-".repeat(25));
            for field in CandidateField::ALL {
                println!("{:<12} {:<12}", field.key(), field.label());
            }
        }
    }

    Ok(())
}

fn build_store(seed_override: Option<&PathBuf>, config: &Config) -> Result<CandidateStore> {
    let entries = match seed_override.or(config.seed_file.as_ref()) {
        Some(path) => seed::load_seed(path)?,
        None => seed::builtin(),
    };
    let mut store = seed::populate(entries)?;
    store.set_view_mode(config.view_mode);
    if let Some(columns) = &config.visible_columns {
        store.set_visible_columns(columns.clone());
    }
    Ok(store)
}

/// JSON object holding only `columns`, keyed by their wire names.
fn row_json(candidate: &Candidate, columns: &[CandidateField]) -> Value {
    let mut row = Map::new();
    for &field in columns {
        let value = match field {
            CandidateField::Rating => Value::from(candidate.rating),
            other => Value::from(candidate.field_text(other)),
        };
        row.insert(field.key().to_string(), value);
    }
    Value::Object(row)
}

const MAX_CELL: usize = 32;

fn print_table(rows: &[Candidate], columns: &[CandidateField]) {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|c| {
            view::project_row(c, columns)
                .iter()
                .map(|s| truncate(s, MAX_CELL))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, field)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(field.label().len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(field, w)| pad(&field.label().to_uppercase(), *w))
        .collect();
    println!("{}", header.join("  ").trim_end());
    let rule = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    println!("{}", "-".repeat(rule));

    for row in cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{}{}", s, " ".repeat(width.saturating_sub(len)))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
