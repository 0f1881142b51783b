use std::fs;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use log::warn;

use crate::errors::PipelineError;
use crate::validate::ValidatedWalk;

/// Timestamp shapes the sheet has produced so far (Google Forms default plus
/// ISO variants from manual edits).
const SHEET_TIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Single-token memory of the last successful run. Read once at run start,
/// overwritten once after the map artifact is written. Not safe against
/// concurrent runs.
pub struct RunCache {
    path: PathBuf,
}

impl RunCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Token written by the previous successful run, if any. Absent on the
    /// first run.
    pub fn last_token(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .map(|contents| contents.trim().to_string())
    }

    pub fn store(&self, token: &str) -> Result<(), PipelineError> {
        fs::write(&self.path, token)?;
        Ok(())
    }
}

/// Change token of the most recent record. Sheet order defines "latest";
/// the log is append-only, so no sort or max is applied.
pub fn latest_token(walks: &[ValidatedWalk]) -> Option<&str> {
    walks.last().map(|walk| walk.timestamp.as_str())
}

/// The gate keys on the last row, which only works while rows arrive in
/// chronological order. Warns once when parseable timestamps disagree.
pub fn check_chronology(walks: &[ValidatedWalk]) {
    let mut previous: Option<NaiveDateTime> = None;
    for walk in walks {
        let Some(current) = parse_sheet_timestamp(&walk.timestamp) else {
            continue;
        };
        if let Some(prev) = previous {
            if current < prev {
                warn!(
                    "Walk log timestamps are not in chronological order; \
                     change detection keys on the last row and may misfire"
                );
                return;
            }
        }
        previous = Some(current);
    }
}

fn parse_sheet_timestamp(raw: &str) -> Option<NaiveDateTime> {
    SHEET_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;
    use crate::validate::Side;

    fn walk(timestamp: &str) -> ValidatedWalk {
        ValidatedWalk {
            id: String::new(),
            start: Point::new(-73.9855, 40.7580),
            end: Point::new(-73.9845, 40.7590),
            side: Side::Unknown,
            direction: String::new(),
            street_name: String::new(),
            from_cross: String::new(),
            to_cross: String::new(),
            mode: String::new(),
            confidence: String::new(),
            timestamp: timestamp.to_string(),
            local_time: String::new(),
        }
    }

    #[test]
    fn latest_token_is_last_row_in_sheet_order() {
        let walks = vec![walk("1/5/2026 9:00:00"), walk("1/6/2026 10:30:00")];
        assert_eq!(latest_token(&walks), Some("1/6/2026 10:30:00"));
    }

    #[test]
    fn latest_token_of_empty_list_is_none() {
        assert_eq!(latest_token(&[]), None);
    }

    #[test]
    fn missing_cache_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RunCache::new(dir.path().join("last_run.txt"));
        assert_eq!(cache.last_token(), None);
    }

    #[test]
    fn store_then_read_round_trips_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RunCache::new(dir.path().join("last_run.txt"));
        cache.store("1/6/2026 10:30:00").unwrap();
        assert_eq!(cache.last_token().as_deref(), Some("1/6/2026 10:30:00"));
    }

    #[test]
    fn store_overwrites_previous_token() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RunCache::new(dir.path().join("last_run.txt"));
        cache.store("old").unwrap();
        cache.store("new").unwrap();
        assert_eq!(cache.last_token().as_deref(), Some("new"));
    }

    #[test]
    fn sheet_timestamps_parse_in_known_formats() {
        assert!(parse_sheet_timestamp("1/5/2026 9:12:43").is_some());
        assert!(parse_sheet_timestamp("2026-01-05 09:12:43").is_some());
        assert!(parse_sheet_timestamp("2026-01-05T09:12:43").is_some());
        assert!(parse_sheet_timestamp("last tuesday").is_none());
    }
}
