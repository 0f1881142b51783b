use std::collections::HashMap;
use std::fmt;

use geo::Point;
use log::{debug, warn};

use crate::errors::PipelineError;

/// One sheet row keyed by trimmed header name. Recreated every run.
pub type RawRecord = HashMap<String, String>;

/// Canonical column names used throughout the pipeline.
pub mod field {
    pub const TIMESTAMP: &str = "Timestamp";
    pub const START_LAT: &str = "Start Lat";
    pub const START_LON: &str = "Start Lon";
    pub const END_LAT: &str = "End Lat";
    pub const END_LON: &str = "End Lon";
    pub const SIDE: &str = "Side";
    pub const DIRECTION: &str = "Direction";
    pub const STREET_NAME: &str = "Street Name";
    pub const FROM_CROSS: &str = "From Cross St";
    pub const TO_CROSS: &str = "To Cross St";
    pub const MODE: &str = "Mode";
    pub const CONFIDENCE: &str = "Confidence";
    pub const UNIQUE_ID: &str = "Unique ID";
    pub const LOCAL_TIME: &str = "Local Time";
}

/// Accepted header spellings per canonical field; earlier spellings win.
/// Sheet versions have drifted between "Side of Street" and "Side".
const COLUMN_ALIASES: &[(&str, &[&str])] = &[
    (field::TIMESTAMP, &["Timestamp"]),
    (field::START_LAT, &["Start Lat"]),
    (field::START_LON, &["Start Lon"]),
    (field::END_LAT, &["End Lat"]),
    (field::END_LON, &["End Lon"]),
    (field::SIDE, &["Side of Street", "Side"]),
    (field::DIRECTION, &["Direction"]),
    (field::STREET_NAME, &["Street Name"]),
    (field::FROM_CROSS, &["From Cross St"]),
    (field::TO_CROSS, &["To Cross St"]),
    (field::MODE, &["Mode"]),
    (field::CONFIDENCE, &["Confidence"]),
    (field::UNIQUE_ID, &["Unique ID"]),
    (field::LOCAL_TIME, &["Local Time"]),
];

/// Columns the pipeline cannot work without.
const REQUIRED_COLUMNS: &[&str] = &[
    field::START_LAT,
    field::START_LON,
    field::END_LAT,
    field::END_LON,
];

/// Which side of the street a walked segment covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    North,
    South,
    East,
    West,
    Both,
    Unknown,
}

impl Side {
    /// Unrecognized input maps to `Unknown` rather than failing the row.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "N" => Side::North,
            "S" => Side::South,
            "E" => Side::East,
            "W" => Side::West,
            "BOTH" => Side::Both,
            _ => Side::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::North => "N",
            Side::South => "S",
            Side::East => "E",
            Side::West => "W",
            Side::Both => "BOTH",
            Side::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One walk with coordinates known to be finite and in range.
/// Points are x = longitude, y = latitude.
#[derive(Debug, Clone)]
pub struct ValidatedWalk {
    pub id: String,
    pub start: Point<f64>,
    pub end: Point<f64>,
    pub side: Side,
    pub direction: String,
    pub street_name: String,
    pub from_cross: String,
    pub to_cross: String,
    pub mode: String,
    pub confidence: String,
    /// Opaque change-detection token; the last row's value gates the run.
    pub timestamp: String,
    pub local_time: String,
}

/// Maps canonical fields to the header spellings this sheet actually uses.
pub struct ColumnMap {
    resolved: HashMap<&'static str, String>,
}

impl ColumnMap {
    pub fn resolve(headers: &[String]) -> Result<Self, PipelineError> {
        let mut resolved = HashMap::new();
        for (canonical, aliases) in COLUMN_ALIASES {
            let hit = aliases
                .iter()
                .find_map(|alias| headers.iter().find(|h| h.trim().eq_ignore_ascii_case(alias)));
            if let Some(header) = hit {
                resolved.insert(*canonical, header.clone());
            }
        }
        for &required in REQUIRED_COLUMNS {
            if !resolved.contains_key(required) {
                return Err(PipelineError::MissingColumn(required));
            }
        }
        Ok(Self { resolved })
    }

    /// Field value for a record, or "" when the column is absent.
    fn get<'a>(&self, record: &'a RawRecord, canonical: &str) -> &'a str {
        self.resolved
            .get(canonical)
            .and_then(|header| record.get(header))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Validates the full record list. Rows with unparseable coordinates are
/// dropped individually; only an unusable schema or an empty survivor set is
/// fatal.
pub fn validate_records(
    records: &[RawRecord],
) -> Result<(Vec<ValidatedWalk>, usize), PipelineError> {
    let first = records.first().ok_or(PipelineError::EmptyDataset)?;
    let headers: Vec<String> = first.keys().cloned().collect();
    let columns = ColumnMap::resolve(&headers)?;

    let mut walks = Vec::with_capacity(records.len());
    let mut dropped = 0usize;
    for (idx, record) in records.iter().enumerate() {
        match validate_row(&columns, record) {
            Some(walk) => walks.push(walk),
            None => {
                dropped += 1;
                debug!("Dropping row {} without usable coordinates", idx + 1);
            }
        }
    }

    if walks.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }
    if dropped > 0 {
        warn!("Dropped {} of {} rows during validation", dropped, records.len());
    }
    Ok((walks, dropped))
}

fn validate_row(columns: &ColumnMap, record: &RawRecord) -> Option<ValidatedWalk> {
    let start_lat = parse_coordinate(columns.get(record, field::START_LAT), 90.0)?;
    let start_lon = parse_coordinate(columns.get(record, field::START_LON), 180.0)?;
    let end_lat = parse_coordinate(columns.get(record, field::END_LAT), 90.0)?;
    let end_lon = parse_coordinate(columns.get(record, field::END_LON), 180.0)?;

    Some(ValidatedWalk {
        id: columns.get(record, field::UNIQUE_ID).to_string(),
        start: Point::new(start_lon, start_lat),
        end: Point::new(end_lon, end_lat),
        side: Side::parse(columns.get(record, field::SIDE)),
        direction: columns.get(record, field::DIRECTION).trim().to_uppercase(),
        street_name: columns.get(record, field::STREET_NAME).to_string(),
        from_cross: columns.get(record, field::FROM_CROSS).to_string(),
        to_cross: columns.get(record, field::TO_CROSS).to_string(),
        mode: columns.get(record, field::MODE).to_string(),
        confidence: columns.get(record, field::CONFIDENCE).to_string(),
        timestamp: columns.get(record, field::TIMESTAMP).to_string(),
        local_time: columns.get(record, field::LOCAL_TIME).to_string(),
    })
}

fn parse_coordinate(raw: &str, limit: f64) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    (value.is_finite() && value.abs() <= limit).then_some(value)
}
