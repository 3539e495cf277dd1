use std::fs::File;

use anyhow::{Context, Result, anyhow};
use env_logger::Env;
use log::{error, info};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use relplan::api::QueryPlanner;
use relplan::catalog::csv::load_csv;
use relplan::catalog::{Catalog, Table};
use relplan::common::types::DataType;
use relplan::common::value::Value;
use relplan::config::{OptimizerConfig, PlannerConfig};

struct Options {
    csv: Vec<(String, String)>,
    planner: PlannerConfig,
    json: bool,
    log_level: String,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        csv: Vec::new(),
        planner: PlannerConfig::default(),
        json: false,
        log_level: "warn".to_string(),
    };

    for arg in args {
        if let Some(spec) = arg.strip_prefix("--csv=") {
            let (table, path) = spec
                .split_once('=')
                .ok_or_else(|| anyhow!("expected --csv=<table>=<path>, got {arg}"))?;
            options.csv.push((table.to_string(), path.to_string()));
        } else if let Some(list) = arg.strip_prefix("--rules=") {
            let rules: Vec<&str> = list.split(',').collect();
            options.planner.optimizer = OptimizerConfig::only(&rules)
                .map_err(|rule| anyhow!("unknown rule '{rule}'"))?;
        } else if arg == "--no-optimize" {
            options.planner.optimizer = OptimizerConfig::disabled();
        } else if arg == "--json" {
            options.json = true;
        } else if let Some(level) = arg.strip_prefix("--log=") {
            options.log_level = level.to_string();
        } else {
            return Err(anyhow!("unknown argument {arg}"));
        }
    }

    Ok(options)
}

fn demo_catalog() -> Result<Catalog> {
    let mut catalog = Catalog::new();
    catalog.insert_table(Table::from_columns(
        "users",
        &[
            ("id", DataType::Int64),
            ("name", DataType::String),
            ("age", DataType::Int64),
        ],
        vec![
            vec![Value::Int64(1), Value::from("Alice"), Value::Int64(30)],
            vec![Value::Int64(2), Value::from("Bob"), Value::Int64(20)],
            vec![Value::Int64(3), Value::from("Carol"), Value::Int64(41)],
        ],
    )?)?;
    catalog.insert_table(Table::from_columns(
        "orders",
        &[
            ("id", DataType::Int64),
            ("user_id", DataType::Int64),
            ("amount", DataType::Float64),
        ],
        vec![
            vec![Value::Int64(1), Value::Int64(1), Value::Float64(100.0)],
            vec![Value::Int64(2), Value::Int64(2), Value::Float64(50.5)],
            vec![Value::Int64(3), Value::Int64(3), Value::Float64(12.0)],
            vec![Value::Int64(4), Value::Int64(1), Value::Float64(7.25)],
        ],
    )?)?;
    Ok(catalog)
}

fn load_catalog(sources: &[(String, String)]) -> Result<Catalog> {
    if sources.is_empty() {
        info!("no --csv given, using the demo catalog");
        return demo_catalog();
    }

    let mut catalog = Catalog::new();
    for (table, path) in sources {
        let file = File::open(path).with_context(|| format!("opening {path}"))?;
        let loaded = load_csv(table, file).with_context(|| format!("loading {path}"))?;
        info!("loaded {} row(s) into {}", loaded.row_count(), loaded.name);
        catalog.insert_table(loaded)?;
    }
    Ok(catalog)
}

fn print_tables(catalog: &Catalog) {
    for name in catalog.table_names() {
        if let Some(table) = catalog.get_table(name) {
            let cols: Vec<String> = table
                .schema
                .iter()
                .map(|c| format!("{} {}", c.name, c.ty))
                .collect();
            println!("{name} ({}) {} row(s)", cols.join(", "), table.row_count());
        }
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args)?;

    env_logger::Builder::from_env(Env::default().default_filter_or(options.log_level.as_str()))
        .init();

    let catalog = load_catalog(&options.csv)?;
    let planner = QueryPlanner::new(options.planner);

    println!("relplan query planner");
    println!("Type a SELECT statement, \\tables to list tables, \\q to quit");

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("relplan> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                rl.add_history_entry(input)?;

                match input {
                    "\\q" | "quit" | "exit" => break,
                    "\\tables" => {
                        print_tables(&catalog);
                        continue;
                    }
                    _ => {}
                }

                match planner.plan_and_run(input, &catalog) {
                    Ok(result) if options.json => {
                        println!("{}", serde_json::to_string_pretty(&result)?)
                    }
                    Ok(result) => print!("{}", result.report()),
                    Err(err) => println!("{err}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                info!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                info!("CTRL-D");
                break;
            }
            Err(err) => {
                error!("readline error: {err:?}");
                break;
            }
        }
    }

    Ok(())
}
