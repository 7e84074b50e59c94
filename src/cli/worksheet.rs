use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{build_session, run_caat, SessionArgs};
use crate::error::Result;
use crate::fmt::rupiah;
use crate::models::{RiskLevel, Transaction, TxnType, VouchingStatus};
use crate::settings::Settings;

fn risk_cell(txn: &Transaction) -> Cell {
    match txn.risk {
        Some(r) => {
            let label = format!("{} - {}", r.risk_score, r.risk_level);
            let label = match r.risk_level {
                RiskLevel::High => label.red().bold(),
                RiskLevel::Medium => label.yellow(),
                RiskLevel::Low => label.green(),
            };
            Cell::new(label)
        }
        None => Cell::new("Pending".dimmed().italic()),
    }
}

pub fn worksheet_table(txns: &[Transaction]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Date",
        "Ref No.",
        "Description",
        "Counterparty",
        "Amount (IDR)",
        "Type",
        "Risk",
        "Status",
    ]);
    for t in txns {
        let txn_type = match t.txn_type {
            TxnType::Debit => t.txn_type.as_str().green(),
            TxnType::Credit => t.txn_type.as_str().red(),
        };
        let status = match t.vouching_status() {
            VouchingStatus::Inspect => "Inspect".red().bold(),
            VouchingStatus::Ok => "OK".green(),
        };
        table.add_row(vec![
            Cell::new(&t.date),
            Cell::new(&t.reference_no),
            Cell::new(&t.description),
            Cell::new(&t.counterparty),
            Cell::new(rupiah(t.amount)).set_alignment(CellAlignment::Right),
            Cell::new(txn_type),
            risk_cell(t),
            Cell::new(status),
        ]);
    }
    table
}

pub fn run(args: &SessionArgs, caat: bool, settings: &Settings) -> Result<()> {
    let mut session = build_session(args)?;
    if caat {
        run_caat(&mut session, settings)?;
    }
    if session.is_empty() {
        println!("No transactions in this session.");
        return Ok(());
    }
    println!("Vouching Worksheet\n{}", worksheet_table(session.transactions()));
    Ok(())
}
