//! Check command - report unresolved placeholders without deploying

use console::style;
use rollout_core::{NameFilter, Settings, find_values_files, validate};

use crate::display;
use crate::error::{CliError, Result};

/// Run the check command
pub fn run(settings: &Settings, releases: Vec<String>, json_output: bool) -> Result<()> {
    let filter = NameFilter::from_names(releases);
    let files = find_values_files(
        &settings.components_dir,
        &settings.values_file_name,
        filter.as_ref(),
    )?;
    let unresolved = validate(&files)?;

    if json_output {
        let json = serde_json::json!({
            "valid": unresolved.is_empty(),
            "scanned": files.len(),
            "unresolved": unresolved,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else if unresolved.is_empty() {
        println!(
            "{} All placeholders resolved in {} values file(s)",
            style("✓").green().bold(),
            files.len()
        );
    } else {
        display::unresolved_report(&unresolved);
    }

    if unresolved.is_empty() {
        Ok(())
    } else {
        Err(CliError::validation_with_help(
            format!("{} values file(s) still contain placeholders", unresolved.len()),
            "Run `rollout secrets <file>` or edit the files listed above",
        ))
    }
}
