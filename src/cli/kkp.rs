use colored::Colorize;

use crate::error::Result;
use crate::workflow::{transition, KkpStatus, UserRole};

pub fn run(from: &str, to: &str, role: &str) -> Result<()> {
    let current: KkpStatus = from.parse()?;
    let target: KkpStatus = to.parse()?;
    let role: UserRole = role.parse()?;

    let status = transition(current, target, role)?;
    println!("{} {current} -> {status} ({role})", "Allowed:".green().bold());
    Ok(())
}
