pub mod caat;
pub mod dashboard;
pub mod export;
pub mod import;
pub mod kkp;
pub mod sync;
pub mod worksheet;

use std::path::PathBuf;

use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::demo::demo_transactions;
use crate::error::Result;
use crate::importer::import_file;
use crate::models::RiskAnalysisResult;
use crate::risk::{analyze_transactions, scorer_from_settings};
use crate::session::{Action, Session};
use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "dcas",
    version,
    about = "Digital Cash Audit System: vouching worksheet, CAAT risk scoring and cash dashboard."
)]
pub struct Cli {
    /// Increase log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Settings file (default: ~/.config/dcas/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Ledger files (.csv, .xlsx, .xls) to import into the session
    pub files: Vec<PathBuf>,
    /// Start from an empty ledger instead of the sample transactions
    #[arg(long = "no-demo")]
    pub no_demo: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show cash position, risk KPIs and monthly cash flow.
    Dashboard {
        #[command(flatten)]
        session: SessionArgs,
        /// Month-to-date cut-off: YYYY-MM-DD (default: latest transaction date)
        #[arg(long = "as-of")]
        as_of: Option<String>,
        /// Run CAAT risk analysis before reporting
        #[arg(long)]
        caat: bool,
    },
    /// Show the vouching worksheet.
    Worksheet {
        #[command(flatten)]
        session: SessionArgs,
        /// Run CAAT risk analysis before showing the worksheet
        #[arg(long)]
        caat: bool,
    },
    /// Import a CSV/XLSX ledger and show the normalized transactions.
    Import {
        /// Path to a .csv, .xlsx or .xls file
        file: PathBuf,
    },
    /// Run CAAT risk analysis and show the results.
    Caat {
        #[command(flatten)]
        session: SessionArgs,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch transactions from the accounting system (simulated).
    Sync {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Write the session's transactions to a CSV file.
    Export {
        #[command(flatten)]
        session: SessionArgs,
        /// Output path
        #[arg(long, short)]
        output: PathBuf,
        /// Run CAAT risk analysis before exporting
        #[arg(long)]
        caat: bool,
    },
    /// Check a working-paper (KKP) status change for a role.
    Kkp {
        /// Current status: draft, in-progress, finish, approved
        #[arg(long)]
        from: String,
        /// Requested status
        #[arg(long)]
        to: String,
        /// Acting role: junior, senior, manager, partner
        #[arg(long)]
        role: String,
    },
    /// Generate shell completions.
    Completions {
        /// Shell to generate for
        shell: clap_complete::Shell,
    },
}

/// Seed the session and import each file in order. A file that fails to
/// import aborts the command before anything is shown.
pub(crate) fn build_session(args: &SessionArgs) -> Result<Session> {
    let seed = if args.no_demo {
        Vec::new()
    } else {
        demo_transactions()
    };
    let mut session = Session::new(seed);
    for file in &args.files {
        let batch = import_file(file, Utc::now())?;
        eprintln!("Imported {} transactions from {}", batch.len(), file.display());
        session.apply(Action::Imported(batch));
    }
    Ok(session)
}

/// One CAAT pass over the session. Returns the results that were merged.
pub(crate) fn run_caat(session: &mut Session, settings: &Settings) -> Result<Vec<RiskAnalysisResult>> {
    let snapshot = session.begin_analysis()?;
    let scorer = match scorer_from_settings(settings) {
        Ok(scorer) => scorer,
        Err(e) => {
            session.apply(Action::AnalysisFailed);
            return Err(e);
        }
    };
    let results = analyze_transactions(scorer.as_ref(), &snapshot);
    if results.is_empty() && !snapshot.is_empty() {
        eprintln!("Risk analysis returned no results; existing risk scores kept.");
    }
    session.apply(Action::RiskAnalyzed(results.clone()));
    Ok(results)
}
