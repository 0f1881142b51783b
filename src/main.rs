mod change_gate;
mod config;
mod errors;
mod geometry;
mod pipeline;
mod render;
mod routing;
mod segments;
mod sheet;
mod validate;

use anyhow::Result;
use log::info;

use crate::config::PipelineConfig;
use crate::pipeline::RunOutcome;
use crate::routing::OsrmRouter;
use crate::sheet::SheetSource;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
    info!("Starting walklog");

    let config = PipelineConfig::from_env();
    let source = SheetSource::new(&config.sheet_csv_url)?;
    let router = OsrmRouter::new(&config.osrm_base_url, config.route_timeout)?;

    match pipeline::run(&config, &source, &router).await? {
        RunOutcome::Rendered { segments, dropped } => {
            info!(
                "Map written to {} with {} segments ({} rows dropped)",
                config.output_path.display(),
                segments,
                dropped
            );
        }
        RunOutcome::NoNewData => {
            info!("Walk log unchanged; kept the existing map");
        }
    }

    Ok(())
}
