use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// CSV export of the walk log sheet.
const SHEET_CSV_URL: &str = "https://docs.google.com/spreadsheets/d/1eTzd_iG590gVdbu6q7p0iDElsCVLr9QTSP1wRWagozg/export?format=csv&gid=1407515623";

/// Public OSRM demo instance; overridable for a self-hosted router.
const OSRM_BASE_URL: &str = "https://router.project-osrm.org";

/// All external knobs for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub sheet_csv_url: String,
    pub osrm_base_url: String,
    /// File holding the change token of the last successful run.
    pub cache_path: PathBuf,
    /// Where the map artifact is written.
    pub output_path: PathBuf,
    /// Per-request timeout for the routing service.
    pub route_timeout: Duration,
    /// Pause between consecutive routing calls.
    pub route_pause: Duration,
    /// Snap segments to street geometry; straight lines only when false.
    pub snap_to_streets: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sheet_csv_url: SHEET_CSV_URL.to_string(),
            osrm_base_url: OSRM_BASE_URL.to_string(),
            cache_path: PathBuf::from("last_run.txt"),
            output_path: PathBuf::from("manhattan_walklog_map.html"),
            route_timeout: Duration::from_secs(10),
            route_pause: Duration::from_secs(1),
            snap_to_streets: true,
        }
    }
}

impl PipelineConfig {
    /// Defaults with environment overrides for the operator-specific bits.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("WALKLOG_SHEET_URL") {
            config.sheet_csv_url = url;
        }
        if let Ok(url) = env::var("WALKLOG_OSRM_URL") {
            config.osrm_base_url = url;
        }
        if let Ok(path) = env::var("WALKLOG_OUT") {
            config.output_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("WALKLOG_CACHE") {
            config.cache_path = PathBuf::from(path);
        }
        config
    }
}
