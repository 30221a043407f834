use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mollystore::config::EngineConfig;
use mollystore::db::manager::Manager;
use mollystore::error::Result;
use mollystore::interpreter::auth::AllowAll;
use mollystore::interpreter::executor::{Session, StatementOutcome};
use mollystore::interpreter::run_sql;

#[derive(Parser)]
#[command(name = "mollystore")]
#[command(about = "An embedded relational storage and query engine", version)]
struct Cli {
    /// Storage root; falls back to MOLLYSTORE_ROOT, then ./mollystore_data.
    #[arg(long)]
    root: Option<PathBuf>,
    /// User the session runs as.
    #[arg(long, default_value = "root")]
    user: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.root {
        Some(root) => EngineConfig::new(root),
        None => EngineConfig::from_env(),
    };
    let manager = match Manager::open(config) {
        Ok(manager) => manager,
        Err(error) => {
            eprintln!("Could not open storage: {}", error);
            std::process::exit(1);
        }
    };
    let mut session = Session::with_authorizer(manager, cli.user, Box::new(AllowAll));
    if let Err(error) = repl(&mut session) {
        eprintln!("{}", error);
        std::process::exit(1);
    }
}

fn repl(session: &mut Session) -> Result<()> {
    println!("Welcome to the MollyStore CLI");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut buffer = String::new();
    let mut line_count = 1;

    loop {
        let prompt = if buffer.is_empty() { ">" } else { "..." };
        print!("({:03}) {} ", line_count, prompt);
        line_count += 1;
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();

        if buffer.is_empty() && (input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit")) {
            break;
        }
        if input.is_empty() {
            continue;
        }

        buffer.push_str(&line);
        buffer.push('\n');
        if !input.ends_with(';') {
            continue;
        }

        for result in run_sql(session, &buffer) {
            match result {
                Ok(outcome) => print_outcome(outcome),
                Err(error) => println!("{}", error),
            }
        }
        buffer.clear();
    }

    println!("Goodbye!");
    Ok(())
}

fn print_outcome(outcome: StatementOutcome) {
    match outcome {
        StatementOutcome::Done => println!("OK"),
        StatementOutcome::Affected(count) => println!("{} row(s) affected", count),
        StatementOutcome::Rows(result) => {
            println!("{}", result);
            println!("{} row(s) in set", result.rows.len());
        }
    }
}
