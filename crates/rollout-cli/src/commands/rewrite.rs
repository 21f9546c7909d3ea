//! Rewrite command - literal text replacement across values files

use console::style;
use rollout_core::ChangeSet;
use std::path::Path;

use crate::display;
use crate::error::Result;

/// Run the rewrite command
pub fn run(changes_file: &Path) -> Result<()> {
    let changes = ChangeSet::from_file(changes_file)?;
    println!(
        "{} Scanning {}",
        style("→").blue(),
        changes.scan_directory.display()
    );

    let rewritten = changes.apply()?;
    display::rewrite_report(&rewritten);
    Ok(())
}
