use std::io::Write;
use std::path::Path;

use crate::cli::{build_session, run_caat, SessionArgs};
use crate::error::Result;
use crate::models::Transaction;
use crate::settings::Settings;

const HEADERS: &[&str] = &[
    "Date",
    "ReferenceNo",
    "Description",
    "Counterparty",
    "Amount",
    "Type",
    "Account",
    "RiskScore",
    "RiskLevel",
    "Anomaly",
];

/// Write transactions as CSV using headers the importer recognizes. Risk
/// columns are blank for pending transactions.
pub fn write_transactions<W: Write>(writer: W, txns: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADERS)?;
    for t in txns {
        let (score, level, anomaly) = match t.risk {
            Some(r) => (
                r.risk_score.to_string(),
                r.risk_level.to_string(),
                r.anomaly_flag.to_string(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        let amount = t.amount.to_string();
        wtr.write_record([
            t.date.as_str(),
            t.reference_no.as_str(),
            t.description.as_str(),
            t.counterparty.as_str(),
            amount.as_str(),
            t.txn_type.as_str(),
            t.account_code.as_str(),
            score.as_str(),
            level.as_str(),
            anomaly.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn run(args: &SessionArgs, output: &Path, caat: bool, settings: &Settings) -> Result<()> {
    let mut session = build_session(args)?;
    if caat {
        run_caat(&mut session, settings)?;
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(output)?;
    write_transactions(std::io::BufWriter::new(file), session.transactions())?;
    tracing::info!(path = %output.display(), records = session.len(), "exported worksheet");
    println!("Wrote {} transactions to {}", session.len(), output.display());
    Ok(())
}
