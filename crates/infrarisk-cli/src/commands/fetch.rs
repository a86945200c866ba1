//! Fetch command implementation

use crate::cli::FetchArgs;
use crate::config_loader::load_config_with_overrides;
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::{FailureInfo, FetchOutput};
use crate::progress::{finish_success, finish_warning, spinner_for};
use crate::storage::{write_json, EntityFile};
use anyhow::{Context, Result};
use infrarisk_catalog::{
    sample_catalog, CatalogSource, FetchedEntities, Fetcher, HttpCatalog, SearchPreset,
    SAMPLE_REGION,
};
use infrarisk_core::config::{CatalogConfig, CliConfigOverrides};
use infrarisk_core::normalize::DatasetKind;
use std::path::{Path, PathBuf};

pub async fn execute(args: FetchArgs, output: &OutputWriter, config_file: Option<&Path>) -> Result<()> {
    let overrides = CliConfigOverrides {
        endpoint: args.endpoint.clone(),
        api_key: args.api_key.clone(),
        max_records: args.max_records,
        ..Default::default()
    };
    let config = load_config_with_overrides(config_file, overrides)?;
    let mut catalog_config = config.to_catalog_config();

    let term = resolve_term(args.dataset, args.term.as_deref(), args.sample)?;
    if args.sample && term != SAMPLE_REGION {
        output.warning(format!("The sample catalog only covers {}", SAMPLE_REGION));
    }
    let preset = SearchPreset::for_dataset(args.dataset, &term);

    let spinner = spinner_for(output.is_json(), &format!("Fetching {} records...", args.dataset));
    let (source, fetched) = if args.sample {
        // The sample catalog is local; pacing would only slow it down
        catalog_config.page_delay_ms = 0;
        let fetched = run(sample_catalog(args.dataset), &catalog_config, &preset).await;
        ("sample".to_string(), fetched)
    } else {
        let client = HttpCatalog::from_config(&catalog_config)
            .context("Failed to create catalog client")?;
        let source = client.source_name().to_string();
        (source, run(client, &catalog_config, &preset).await)
    };

    if fetched.failures.is_empty() {
        finish_success(&spinner, &format!("Fetched {} {} entities", fetched.entities.len(), args.dataset));
    } else {
        finish_warning(
            &spinner,
            &format!(
                "Fetched {} {} entities ({} search terms failed)",
                fetched.entities.len(),
                args.dataset,
                fetched.failures.len()
            ),
        );
    }
    for failure in &fetched.failures {
        output.warning(format!("Search for '{}' failed: {}", failure.term, failure.reason));
    }

    let out_path = args.out.unwrap_or_else(|| default_out_path(args.dataset));
    let file = EntityFile::new(args.dataset, term.clone(), fetched.entities);
    write_json(&out_path, &file)?;

    let result = FetchOutput {
        dataset: args.dataset,
        term,
        source,
        entity_count: file.entities.len(),
        dropped: fetched.dropped,
        failures: fetched.failures.iter().map(FailureInfo::from).collect(),
        out_path: out_path.display().to_string(),
        fetched_at: file.fetched_at,
    };

    if output.is_json() {
        output.result(result)?;
    } else {
        output.success(format!("Saved {} entities to {}", result.entity_count, result.out_path));
        output.kv("Dataset", result.dataset);
        output.kv("Term", if result.term.is_empty() { "(all regions)" } else { result.term.as_str() });
        output.kv("Source", &result.source);
        if result.dropped > 0 {
            output.kv("Dropped records", result.dropped);
        }
    }

    Ok(())
}

async fn run<S: CatalogSource>(
    source: S,
    config: &CatalogConfig,
    preset: &SearchPreset,
) -> FetchedEntities {
    Fetcher::new(source, config).fetch_entities(preset).await
}

/// Search term for the preset; dataset-id presets cannot search for nothing
/// and the sample catalog defaults to its own region
fn resolve_term(dataset: DatasetKind, term: Option<&str>, sample: bool) -> Result<String> {
    let term = term.map(str::trim).unwrap_or_default();
    if !term.is_empty() {
        return Ok(term.to_string());
    }
    if sample {
        return Ok(SAMPLE_REGION.to_string());
    }
    match dataset {
        DatasetKind::Bridge | DatasetKind::Pipe => Err(errors::term_required(dataset.as_str()).into()),
        DatasetKind::Xroad | DatasetKind::Sewage | DatasetKind::Water => Ok(String::new()),
    }
}

fn default_out_path(dataset: DatasetKind) -> PathBuf {
    PathBuf::from(format!("{}.json", dataset))
}
