mod cli;
mod demo;
mod error;
mod fmt;
mod importer;
mod models;
mod normalizer;
mod reports;
mod risk;
mod session;
mod settings;
mod sync;
mod workflow;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;
use settings::load_settings;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dcas={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Dashboard { session, as_of, caat } => {
            cli::dashboard::run(&session, as_of.as_deref(), caat, &load_settings(config)?)
        }
        Commands::Worksheet { session, caat } => {
            cli::worksheet::run(&session, caat, &load_settings(config)?)
        }
        Commands::Import { file } => cli::import::run(&file),
        Commands::Caat { session, json } => cli::caat::run(&session, json, &load_settings(config)?),
        Commands::Sync { session } => cli::sync::run(&session, &load_settings(config)?),
        Commands::Export {
            session,
            output,
            caat,
        } => cli::export::run(&session, &output, caat, &load_settings(config)?),
        Commands::Kkp { from, to, role } => cli::kkp::run(&from, &to, &role),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "dcas", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
