use std::time::Duration;

use crate::cli::worksheet::worksheet_table;
use crate::cli::{build_session, SessionArgs};
use crate::error::Result;
use crate::session::Action;
use crate::settings::Settings;
use crate::sync::simulate_sync;

pub fn run(args: &SessionArgs, settings: &Settings) -> Result<()> {
    let mut session = build_session(args)?;
    println!("Syncing with accounting system...");
    let txn = simulate_sync(session.len(), Duration::from_millis(settings.sync_delay_ms));
    println!("Data import successful: {} ({})", txn.id, txn.reference_no);
    session.apply(Action::Synced(txn));
    println!("{}", worksheet_table(session.transactions()));
    Ok(())
}
