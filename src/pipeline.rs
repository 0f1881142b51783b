use geo::{Distance as _, Haversine};
use log::{debug, info};
use tokio::time::sleep;

use crate::change_gate::{self, RunCache};
use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::render;
use crate::routing::{Router, resolve_path};
use crate::segments;
use crate::sheet::DataSource;
use crate::validate;

/// Result of a pipeline run that did not fail fatally.
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// A fresh map artifact was written.
    Rendered { segments: usize, dropped: usize },
    /// The latest change token matched the cache; nothing to do.
    NoNewData,
}

/// One full run: fetch, validate, gate, resolve routes, assemble, render,
/// persist the change token. Strictly sequential; one routing call in flight
/// at a time with a pause between calls.
pub async fn run<S: DataSource, R: Router>(
    config: &PipelineConfig,
    source: &S,
    router: &R,
) -> Result<RunOutcome, PipelineError> {
    let records = source.fetch().await?;
    info!("Fetched {} rows from the walk log", records.len());

    let (walks, dropped) = validate::validate_records(&records)?;
    info!("Loaded {} walks ({} rows dropped)", walks.len(), dropped);
    change_gate::check_chronology(&walks);

    let cache = RunCache::new(&config.cache_path);
    let latest = change_gate::latest_token(&walks)
        .unwrap_or_default()
        .to_string();
    if let Some(previous) = cache.last_token() {
        if previous == latest {
            info!("No new walks since {previous}; skipping render");
            return Ok(RunOutcome::NoNewData);
        }
        debug!("Change token moved from {previous} to {latest}");
    }

    let mut resolved = Vec::with_capacity(walks.len());
    let mut snapped = 0usize;
    for (idx, walk) in walks.into_iter().enumerate() {
        let path = if config.snap_to_streets {
            if idx > 0 {
                // Third-party service etiquette: fixed pause between calls.
                sleep(config.route_pause).await;
            }
            let (path, was_snapped) = resolve_path(router, walk.start, walk.end).await;
            if was_snapped {
                snapped += 1;
            }
            path
        } else {
            vec![walk.start, walk.end]
        };
        resolved.push(segments::assemble(walk, path));
    }

    let total_m: f64 = resolved
        .iter()
        .map(|s| Haversine.distance(s.walk.start, s.walk.end))
        .sum();
    info!(
        "Resolved {} segments ({} street-snapped, {:.1} km walked)",
        resolved.len(),
        snapped,
        total_m / 1000.0
    );

    render::write_map(&config.output_path, &resolved)?;
    cache.store(&latest)?;

    Ok(RunOutcome::Rendered {
        segments: resolved.len(),
        dropped,
    })
}
