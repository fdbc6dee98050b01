// Copyright (C) 2025 The gloss authors. This program is free software: you can
// redistribute it and/or modify it under the terms of the GNU General Public
// License as published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use clap_derive::Parser;
use colored::Colorize;
use gloss_engine::{Item, Rendered, SeedBinding, SymbolTable, Tag, items, run};
use gloss_syntax::parse_program;
use tracing::debug;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Debug)] // requires `derive` feature
pub struct Args {
    #[clap(help = "Source file to render. Reads standard input when omitted.")]
    file: Option<PathBuf>,

    #[clap(
        long,
        help = "Print the flat item table (declarations, assignments, control headers) instead of the annotated rendering."
    )]
    items: bool,

    #[clap(
        long = "arg",
        value_name = "NAME=VALUE",
        help = "Seed a variable with a known initial value; repeatable. Array values use the form [a,b,c]. Seeded names keep their symbolic text but let conditions over them fold and color."
    )]
    args: Vec<String>,

    #[clap(long, help = "Enable debug logging")]
    debug: bool,
}

fn parse_seed(spec: &str) -> Result<(String, SeedBinding), eyre::Report> {
    let Some((name, value)) = spec.split_once('=') else {
        return Err(eyre::eyre!(
            "seed argument `{spec}` is not of the form name=value"
        ));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(eyre::eyre!("seed argument `{spec}` has an empty name"));
    }
    let value = value.trim();
    let value = match value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        Some(inner) => Rendered::Array(inner.split(',').map(|e| e.trim().to_string()).collect()),
        None => Rendered::Scalar(value.to_string()),
    };
    Ok((
        name.to_string(),
        SeedBinding {
            line: 0,
            conditions: vec![],
            value,
        },
    ))
}

fn print_item_table(rows: &[Item]) {
    let headers = ["line", "type", "name", "condition", "value"];
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|item| {
            [
                item.line.to_string(),
                item.kind.to_string(),
                item.name.clone(),
                item.condition.clone(),
                item.value.clone(),
            ]
        })
        .collect();
    let mut widths = headers.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }
    let print_row = |row: &[String; 5]| {
        let text = row
            .iter()
            .zip(widths.iter())
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", text.trim_end());
    };
    print_row(&headers.map(str::to_string));
    println!("{}", widths.map(|w| "-".repeat(w)).join("  "));
    for row in &cells {
        print_row(row);
    }
}

fn main() -> Result<(), eyre::Report> {
    color_eyre::install().unwrap();
    let args: Args = Args::parse();

    let main_subscriber = tracing_subscriber::fmt()
        .compact()
        .with_ansi(true)
        .with_span_events(FmtSpan::NONE)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_names(false)
        .with_max_level(if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(main_subscriber).unwrap_or_else(|e| {
        eprintln!("Unable to configure logging: {e}");
        std::process::exit(1);
    });

    let source = match &args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if args.items {
        let program = parse_program(&source)?;
        print_item_table(&items(&program));
        return Ok(());
    }

    let mut seeds = SymbolTable::new();
    for spec in &args.args {
        let (name, seed) = parse_seed(spec)?;
        seeds.entry(name).or_default().push(seed);
    }
    debug!(seeded = seeds.len(), "seeded initial bindings");

    for line in run(&source, &seeds)? {
        match line.tag {
            Tag::True => println!("{}", line.text.green()),
            Tag::False => println!("{}", line.text.red()),
            Tag::None => println!("{}", line.text),
        }
    }
    Ok(())
}
