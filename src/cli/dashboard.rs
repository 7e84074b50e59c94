use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{build_session, run_caat, SessionArgs};
use crate::error::Result;
use crate::fmt::{idr, rupiah};
use crate::reports::get_dashboard;
use crate::settings::Settings;

pub fn run(args: &SessionArgs, as_of: Option<&str>, caat: bool, settings: &Settings) -> Result<()> {
    let mut session = build_session(args)?;
    if caat {
        run_caat(&mut session, settings)?;
    }
    let data = get_dashboard(session.transactions(), settings.opening_balance, as_of);

    let mut kpis = Table::new();
    kpis.set_header(vec!["Current Cash Balance", "High Risk Tx", "Inflow (MTD)", "Outflow (MTD)"]);
    let high = data.high_risk_count.to_string();
    kpis.add_row(vec![
        Cell::new(idr(data.cash_balance).bold()),
        Cell::new(if data.high_risk_count > 0 { high.red().bold() } else { high.normal() }),
        Cell::new(idr(data.inflow_mtd).green()),
        Cell::new(idr(data.outflow_mtd).yellow()),
    ]);
    let as_of_label = data.as_of.as_deref().unwrap_or("n/a");
    println!("Cash Position (as of {as_of_label})\n{kpis}");

    if !data.monthly.is_empty() {
        let mut flows = Table::new();
        flows.set_header(vec!["Month", "Inflow", "Outflow", "Net"]);
        for m in &data.monthly {
            flows.add_row(vec![
                Cell::new(&m.month),
                Cell::new(rupiah(m.inflow)).set_alignment(CellAlignment::Right),
                Cell::new(rupiah(m.outflow)).set_alignment(CellAlignment::Right),
                Cell::new(rupiah(m.inflow - m.outflow)).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("\nCash Flow Movements\n{flows}");
    }

    let mut risk = Table::new();
    risk.set_header(vec!["Risk Level", "Count"]);
    risk.add_row(vec![Cell::new("High".red()), Cell::new(data.risk.high)]);
    risk.add_row(vec![Cell::new("Medium".yellow()), Cell::new(data.risk.medium)]);
    risk.add_row(vec![Cell::new("Low".green()), Cell::new(data.risk.low)]);
    risk.add_row(vec![Cell::new("Pending".dimmed()), Cell::new(data.risk.pending)]);
    println!("\nRisk Profile ({} transactions)\n{risk}", data.total_transactions);

    if data.high_risk_count > 0 {
        println!(
            "\n{} {} transactions flagged as High Risk requiring immediate vouching.",
            "Audit Alerts:".red().bold(),
            data.high_risk_count
        );
    }
    Ok(())
}
