//! CLI tool for dyngrid - loads rows and columns from JSON and outputs the
//! print table as HTML
//!
//! Usage:
//!   dyngrid_cli <rows.json> <columns.json>                  # HTML to stdout
//!   dyngrid_cli <rows.json> <columns.json> --sort 2         # Sort by column 2
//!   dyngrid_cli <rows.json> <columns.json> --search 1=abc   # Search filter on column 1
//!   dyngrid_cli <rows.json> <columns.json> -o out.html      # HTML to file
//!
//! Set `RUST_LOG=dyngrid=debug` to trace the grid's work.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use dyngrid::{Column, FilterInput, Grid, GridOptions, NullBackend, Row, SettingsMode};
use tracing_subscriber::EnvFilter;

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error parsing {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn parse_index(text: &str) -> usize {
    text.parse().unwrap_or_else(|_| {
        eprintln!("Expected a column index, got {}", text);
        std::process::exit(1);
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!(
            "Usage: dyngrid_cli <rows.json> <columns.json> [--sort COL] [--search COL=TEXT] [-o output.html]"
        );
        std::process::exit(1);
    }

    let rows: Vec<Row> = read_json(&args[1]);
    let columns: Vec<Column> = read_json(&args[2]);

    let options = GridOptions {
        settings: SettingsMode::None,
        ..GridOptions::default()
    };
    let mut grid = match Grid::new(NullBackend, options) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error creating grid: {}", e);
            std::process::exit(1);
        }
    };
    grid.set_data(rows, Some(columns), false);

    let mut output_path = None;
    let mut rest = args[3..].iter();
    while let Some(flag) = rest.next() {
        let value = rest.next().unwrap_or_else(|| {
            eprintln!("Missing value for {}", flag);
            std::process::exit(1);
        });
        match flag.as_str() {
            "--sort" => grid.sort_by(parse_index(value)),
            "--search" => {
                let (col, text) = value.split_once('=').unwrap_or_else(|| {
                    eprintln!("Expected COL=TEXT, got {}", value);
                    std::process::exit(1);
                });
                grid.filter_by(
                    parse_index(col),
                    FilterInput::Search {
                        text: text.to_string(),
                    },
                );
            }
            "-o" => output_path = Some(value.clone()),
            other => {
                eprintln!("Unknown option {}", other);
                std::process::exit(1);
            }
        }
    }

    let counts = grid.counts();
    eprintln!("Rows: {} of {}", counts.filtered, counts.total);
    let html = grid.print();

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &html) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            io::stdout().write_all(html.as_bytes()).unwrap();
            println!();
        }
    }
}
