use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scenic_qa::{QaService, ScenicQaConfig, SqliteStore, VERSION, logging};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "scenic-qa")]
#[command(version = VERSION)]
#[command(about = "Answer natural-language questions about tourist attractions")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite attraction database, overrides the configured path
    #[arg(long, global = true, env = "SCENICQA_DB")]
    db: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Answer one question
    Ask { question: String },
    /// Print the parsed question as JSON
    Parse { question: String },
    /// Answer questions read from stdin until "exit"
    Repl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ScenicQaConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    if let Some(db) = &cli.db {
        config.database.path = db.to_string_lossy().into_owned();
    }
    logging::init(&config.logging, cli.verbose)?;

    let store = SqliteStore::from_config(&config.database);
    info!("Using attraction database {}", store.path().display());
    let service = QaService::new(Arc::new(store), &config);
    if service.dictionary().is_degraded() {
        eprintln!("warning: attraction database unavailable, answers will be limited");
    }

    match cli.command.unwrap_or(Command::Repl) {
        Command::Ask { question } => println!("{}", service.answer(&question)),
        Command::Parse { question } => {
            let parsed = service.parse(&question);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Command::Repl => run_repl(&service)?,
    }

    Ok(())
}

fn run_repl(service: &QaService) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("ScenicQA {VERSION}. Type a question, \"reload\" to refresh names, \"exit\" to quit.");
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match line.trim() {
            "" => continue,
            "exit" | "quit" | "q" => break,
            "reload" => {
                service.reload_dictionary();
                println!("Dictionary reloaded.");
            }
            question => println!("{}", service.answer(question)),
        }
    }

    Ok(())
}
