mod catalog;
mod common;
mod error;
mod executors;
mod indexing;
mod parser;
mod planner;
mod storage;
mod tuple;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use catalog::schema::{IndexDef, IndexKind};
use catalog::Catalog;
use clap::Parser;
use error::DbError;
use parser::ast::Statement;
use parser::parse_sql;
use planner::Planner;
use storage::engine::Engine;

#[derive(Parser)]
struct Config {
    #[arg(
        long,
        default_value = "data",
        help = "Directory where table files and the catalog document are stored"
    )]
    data: PathBuf,
}

struct Repl {
    catalog: Arc<Catalog>,
    engine: Arc<Engine>,
    planner: Planner,
    catalog_path: PathBuf,
}

impl Repl {
    fn new(data_dir: &Path) -> Result<Self> {
        let catalog = Arc::new(Catalog::new());
        let catalog_path = data_dir.join("catalog.json");
        if catalog_path.exists() {
            let bytes = fs::read(&catalog_path)
                .with_context(|| format!("could not read {}", catalog_path.display()))?;
            catalog
                .load_json(&bytes)
                .with_context(|| format!("could not load {}", catalog_path.display()))?;
        }

        let engine = Arc::new(Engine::new(data_dir));
        let planner = Planner::new(Arc::clone(&catalog), Arc::clone(&engine));
        planner
            .rebuild_indices()
            .with_context(|| "failed to rebuild indices")?;

        Ok(Self {
            catalog,
            engine,
            planner,
            catalog_path,
        })
    }

    fn save_catalog(&self) -> std::result::Result<(), DbError> {
        let bytes = self.catalog.to_json()?;
        fs::write(&self.catalog_path, bytes)?;
        Ok(())
    }

    fn execute(&self, sql: &str) -> std::result::Result<(), DbError> {
        match parse_sql(sql)? {
            Statement::CreateTable { name, columns } => {
                self.catalog.create_table(&name, columns)?;
                self.engine.get_heap_file(&name)?;
                self.save_catalog()?;
                println!("Table {} created", name);
            }
            Statement::CreateIndex {
                name,
                table,
                column,
            } => {
                self.catalog.add_index(
                    &table,
                    IndexDef {
                        name: name.clone(),
                        column,
                        kind: IndexKind::Hash,
                        is_unique: false,
                    },
                )?;
                self.planner.rebuild_indices()?;
                self.save_catalog()?;
                println!("Index {} created", name);
            }
            statement => {
                let mut executor = self.planner.create_plan(statement)?;
                executor.open()?;
                let mut rows = 0;
                while let Some(tuple) = executor.next().transpose()? {
                    let row = tuple
                        .values()
                        .iter()
                        .map(|value| value.to_string())
                        .collect::<Vec<_>>()
                        .join(" | ");
                    println!("{}", row);
                    rows += 1;
                }
                executor.close()?;
                println!("({} rows)", rows);
            }
        }
        Ok(())
    }

    fn run(&self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("minisql> ");
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();

            if line.is_empty() {
                continue;
            }
            if line == "exit" {
                break;
            }

            if let Err(e) = self.execute(line) {
                println!("Error: {}", e);
                if let Some(hint) = e.hint() {
                    println!("Hint: {}", hint);
                }
            }
        }

        self.engine.close()?;
        Ok(())
    }
}

fn main() -> Result<()> {
    let config = Config::parse();
    fs::create_dir_all(&config.data)
        .with_context(|| format!("could not create data directory {}", config.data.display()))?;

    println!("minisql. Type 'exit' to quit.");
    let repl = Repl::new(&config.data)?;
    repl.run()
}
