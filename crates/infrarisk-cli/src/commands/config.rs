//! Config command implementation

use crate::config_loader::{config_path, load_config};
use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigOutput};
use anyhow::Result;
use std::path::Path;

pub fn execute(output: &OutputWriter, config_file: Option<&Path>) -> Result<()> {
    let config = load_config(config_file)?;

    let mut values: Vec<ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry { key, value, source })
        .collect();
    values.sort_by(|a, b| a.key.cmp(&b.key));

    let result = ConfigOutput {
        config_file: config_path(config_file).map(|p| p.display().to_string()),
        values,
    };

    if output.is_json() {
        output.result(result)?;
    } else {
        output.section("Configuration");
        output.kv("Config file", result.config_file.as_deref().unwrap_or("(none)"));
        output.table(result.values);
    }

    Ok(())
}
