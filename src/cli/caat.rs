use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{build_session, run_caat, SessionArgs};
use crate::error::Result;
use crate::models::RiskLevel;
use crate::settings::Settings;

pub fn run(args: &SessionArgs, json: bool, settings: &Settings) -> Result<()> {
    let mut session = build_session(args)?;
    let results = run_caat(&mut session, settings)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Transaction", "Score", "Level", "Anomaly", "Reasoning"]);
    for r in &results {
        let level = match r.risk_level {
            RiskLevel::High => r.risk_level.as_str().red().bold(),
            RiskLevel::Medium => r.risk_level.as_str().yellow(),
            RiskLevel::Low => r.risk_level.as_str().green(),
        };
        table.add_row(vec![
            Cell::new(&r.transaction_id),
            Cell::new(r.risk_score),
            Cell::new(level),
            Cell::new(if r.is_anomaly { "yes" } else { "" }),
            Cell::new(textwrap::fill(&r.reasoning, 48)),
        ]);
    }
    let analyzed = results.len();
    let pending = session.len().saturating_sub(analyzed);
    println!("CAAT Risk Analysis\n{table}");
    println!("{analyzed} analyzed, {pending} not scored in this run");
    Ok(())
}
