//! nestkv CLI
//!
//! Line-oriented interpreter for the nestkv transactional key-value store.
//!
//! # Commands
//!
//! - `SET <key> <value>`, `GET <key>`, `DELETE <key>`, `COUNT <value>`
//! - `BEGIN`, `COMMIT`, `ROLLBACK` - nested transactions
//! - `HELP`, `EXIT`
//!
//! Requests are read from standard input, or from a script file given as
//! the only positional argument.

mod commands;
mod config;
mod error;
mod help;
mod repl;
mod session;

use clap::Parser;
use config::{ReplConfig, DEFAULT_PROMPT};
use nestkv_core::{Config, Store};
use session::Session;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Interactive transactional key-value store.
#[derive(Parser)]
#[command(name = "nestkv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Read commands from this file instead of standard input
    script: Option<PathBuf>,

    /// Prompt printed before each command (defaults to "> " on a terminal)
    #[arg(long)]
    prompt: Option<String>,

    /// Do not print the banner and command list on start
    #[arg(short, long)]
    quiet: bool,

    /// Write every command back to the output
    #[arg(short, long)]
    echo: bool,

    /// Maximum transaction nesting depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn repl_config(&self, interactive: bool) -> ReplConfig {
        let prompt = match &self.prompt {
            Some(prompt) => Some(prompt.clone()),
            None if interactive => Some(DEFAULT_PROMPT.to_string()),
            None => None,
        };
        ReplConfig::new()
            .prompt(prompt)
            .banner(!self.quiet)
            .echo(self.echo)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let store = Store::with_config(Config::new().max_depth(cli.max_depth));
    let mut session = Session::new(store);
    let stdout = io::stdout();
    let mut output = stdout.lock();

    let result = match &cli.script {
        Some(path) => {
            let file = File::open(path)?;
            let config = cli.repl_config(false);
            repl::run(&mut session, BufReader::new(file), &mut output, &config)
        }
        None => {
            let stdin = io::stdin();
            let config = cli.repl_config(stdin.is_terminal());
            repl::run(&mut session, stdin.lock(), &mut output, &config)
        }
    };

    if let Err(err) = result {
        error!(%err, open = session.depth(), "session aborted");
        return Err(err.into());
    }
    info!(
        keys = session.store().len(),
        open = session.depth(),
        "session finished"
    );
    Ok(())
}
