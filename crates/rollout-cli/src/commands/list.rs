//! List command - show the releases configuration files declare

use rollout_core::ConfigLoader;
use std::path::PathBuf;

use crate::display;
use crate::error::Result;

/// Run the list command
pub fn run(configs: &[PathBuf], output_json: bool) -> Result<()> {
    let batches = ConfigLoader::load_all(configs)?;

    if output_json {
        let json: Vec<_> = batches
            .iter()
            .map(|batch| {
                serde_json::json!({
                    "source": batch.source(),
                    "releases": batch.releases,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    for (i, batch) in batches.iter().enumerate() {
        if i > 0 {
            println!();
        }
        display::release_table(batch);
    }
    Ok(())
}
