use std::path::Path;

use chrono::Utc;

use crate::cli::worksheet::worksheet_table;
use crate::error::Result;
use crate::importer::import_file;

pub fn run(file: &Path) -> Result<()> {
    let txns = import_file(file, Utc::now())?;
    println!("Successfully imported {} transactions.", txns.len());
    println!("{}", worksheet_table(&txns));
    Ok(())
}
