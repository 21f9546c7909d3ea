//! Secrets command - inject secret values into values files

use console::style;
use rollout_core::{PlaceholderMap, Settings, inject_tree};
use std::path::Path;

use crate::display;
use crate::error::Result;

/// Run the secrets command
pub fn run(settings: &Settings, secrets_file: &Path) -> Result<()> {
    let map = PlaceholderMap::from_file(secrets_file)?;
    println!(
        "{} Loaded {} secret(s) from {}",
        style("→").blue(),
        map.len(),
        secrets_file.display()
    );

    let report = inject_tree(
        &settings.components_dir,
        &settings.values_file_name,
        &map,
    )?;
    display::injection_report(&report, &settings.components_dir);

    let changed = report.changed_files().count();
    if changed > 0 {
        println!(
            "{} Updated {} of {} values file(s)",
            style("✓").green().bold(),
            changed,
            report.files.len()
        );
    }
    Ok(())
}
