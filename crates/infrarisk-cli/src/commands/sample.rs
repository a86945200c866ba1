//! Sample command implementation

use crate::cli::SampleArgs;
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::{SampleFile, SampleOutput};
use crate::storage::{write_json, EntityFile};
use anyhow::Result;
use infrarisk_catalog::{sample_catalog, Fetcher, SearchPreset, SAMPLE_REGION};
use infrarisk_core::normalize::DatasetKind;
use std::path::Path;

const SAMPLE_FILES: [(DatasetKind, &str); 2] =
    [(DatasetKind::Bridge, "bridges.json"), (DatasetKind::Pipe, "pipes.json")];

pub async fn execute(args: SampleArgs, output: &OutputWriter, config_file: Option<&Path>) -> Result<()> {
    let mut catalog_config = load_config(config_file)?.to_catalog_config();
    catalog_config.page_delay_ms = 0;

    let mut files = Vec::new();
    for (dataset, name) in SAMPLE_FILES {
        let fetcher = Fetcher::new(sample_catalog(dataset), &catalog_config);
        let fetched =
            fetcher.fetch_entities(&SearchPreset::for_dataset(dataset, SAMPLE_REGION)).await;

        let path = args.out_dir.join(name);
        let entity_count = fetched.entities.len();
        write_json(&path, &EntityFile::new(dataset, SAMPLE_REGION, fetched.entities))?;
        tracing::debug!("Wrote {} sample {} entities to {}", entity_count, dataset, path.display());

        files.push(SampleFile { dataset, path: path.display().to_string(), entity_count });
    }

    let result = SampleOutput { out_dir: args.out_dir.display().to_string(), files };

    if output.is_json() {
        output.result(result)?;
    } else {
        for file in &result.files {
            output.success(format!("Wrote {} {} entities to {}", file.entity_count, file.dataset, file.path));
        }
        if let [areas, linears] = result.files.as_slice() {
            output.info(format!(
                "Try: infrarisk analyze --areas {} --linears {}",
                areas.path, linears.path
            ));
        }
    }

    Ok(())
}
