//! Enrich command implementation

use crate::batch::discover_sidecars;
use crate::cli::EnrichArgs;
use crate::config_loader::load_config;
use crate::dry_run::{display_planned_actions, PlannedAction};
use crate::output::OutputWriter;
use crate::output_types::{EnrichOutput, FieldChangeRow, RecordRow};
use anyhow::{bail, Context, Result};
use geotag_core::config::{parse_field_list, CliConfigOverrides, LayeredConfig};
use geotag_core::formats::XmpSidecar;
use geotag_geocode::{GoogleGeocoder, GoogleGeocoderConfig};
use geotag_pipeline::{EnrichmentPipeline, RunSummary};
use geotag_store::LightroomCatalog;
use std::path::Path;
use tracing::{info, warn};

pub async fn execute(
    args: EnrichArgs,
    config_path: Option<&Path>,
    output: &OutputWriter,
    dry_run: bool,
) -> Result<()> {
    let mut fields = Vec::new();
    for control in &args.fields {
        fields.extend(parse_field_list(control).context("Invalid --field value")?);
    }

    let overrides = CliConfigOverrides {
        api_key: args.api_key.clone(),
        language: args.language.clone(),
        fields: (!fields.is_empty()).then_some(fields),
    };
    let config = load_config(config_path, overrides)?;
    let policy = config.override_policy().context("Invalid field controls")?;

    let sidecars = discover_sidecars(&args.sources)?;
    if sidecars.is_empty() {
        output.warning("No XMP sidecars found");
    }
    output.info(format!("Found {} sidecar(s)", sidecars.len()));

    let catalog = match &args.lightroom {
        Some(folder) => {
            let catalog = LightroomCatalog::open_folder(folder)
                .await
                .with_context(|| format!("Cannot open Lightroom catalog in {}", folder.display()))?;
            output.info(format!("Using catalog {}", catalog.path().display()));
            Some(catalog)
        }
        None => None,
    };

    let geocoder = build_geocoder(&config, args.no_geocode, output)?;

    let mut pipeline = EnrichmentPipeline::new(
        XmpSidecar::new(),
        XmpSidecar::new(),
        catalog,
        geocoder,
        policy,
    )
    .with_dry_run(dry_run);

    let summary = pipeline.run(&sidecars).await;

    if let Some(catalog) = pipeline.catalog() {
        catalog.close().await;
    }

    display_summary(&summary, output, dry_run)?;

    if summary.has_failures() {
        bail!("{} of {} sidecar(s) failed", summary.failed, summary.processed);
    }
    Ok(())
}

fn build_geocoder(
    config: &LayeredConfig,
    no_geocode: bool,
    output: &OutputWriter,
) -> Result<Option<GoogleGeocoder>> {
    if no_geocode {
        info!("Geocoder disabled by --no-geocode");
        return Ok(None);
    }

    let api_key = match config.require_api_key() {
        Ok(key) => key.to_string(),
        Err(e) => {
            warn!(error = %e, "Geocoder disabled");
            output.warning(format!("{} (set GEOTAG_API_KEY or --api-key); geocoder disabled", e));
            return Ok(None);
        }
    };

    let geocoder = GoogleGeocoder::new(GoogleGeocoderConfig {
        endpoint: config.endpoint.value.clone(),
        api_key: Some(api_key),
        language: config.language.value.clone(),
        timeout: config.timeout(),
        max_retries: config.max_retries.value,
    })
    .context("Failed to set up the geocoder")?;

    Ok(Some(geocoder))
}

fn display_summary(summary: &RunSummary, output: &OutputWriter, dry_run: bool) -> Result<()> {
    if output.is_json() {
        return output.result(EnrichOutput { dry_run, summary });
    }

    for outcome in &summary.records {
        for error in &outcome.coordinate_errors {
            output.warning(format!("{}: {}", outcome.base_name, error));
        }
        if !outcome.field_changes.is_empty() {
            output.section(outcome.path.display());
            output.table(outcome.field_changes.iter().map(FieldChangeRow::from).collect());
        }
    }

    if dry_run {
        let actions: Vec<PlannedAction> =
            summary.records.iter().filter_map(PlannedAction::for_outcome).collect();
        display_planned_actions(output, &actions);
    }

    output.section("Records");
    output.table(summary.records.iter().map(RecordRow::from).collect());

    for failure in &summary.failures {
        output.error(format!("{}: {}", failure.path.display(), failure.error));
    }

    output.section("Summary");
    output.kv("Processed", summary.processed);
    output.kv(if dry_run { "Would update" } else { "Updated" }, summary.updated);
    output.kv("Unchanged", summary.unchanged);
    output.kv("Failed", summary.failed);
    output.kv("Geocoder requests", summary.provider_calls);
    output.kv(
        "Cache",
        format!("{} hit(s), {} miss(es)", summary.cache.hits, summary.cache.misses),
    );
    if let Some(duration) = summary.duration() {
        output.kv("Duration", format!("{} ms", duration.num_milliseconds()));
    }

    if summary.has_failures() {
        output.warning(format!("{} sidecar(s) failed", summary.failed));
    } else if !dry_run {
        output.success("Enrichment complete");
    }
    Ok(())
}
