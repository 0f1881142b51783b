use log::info;

use crate::errors::PipelineError;
use crate::validate::RawRecord;

/// Tabular walk-log source. Implementations return the full record list; the
/// pipeline never paginates or keeps rows across runs.
pub trait DataSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>, PipelineError>;
}

/// Google Sheets CSV export over HTTP.
pub struct SheetSource {
    client: reqwest::Client,
    csv_url: String,
}

impl SheetSource {
    pub fn new(csv_url: impl Into<String>) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| PipelineError::Fetch(e.to_string()))?;
        Ok(Self {
            client,
            csv_url: csv_url.into(),
        })
    }
}

impl DataSource for SheetSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>, PipelineError> {
        info!("Fetching walk log from the sheet");
        let body = self
            .client
            .get(&self.csv_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| PipelineError::Fetch(e.to_string()))?
            .text()
            .await
            .map_err(|e| PipelineError::Fetch(e.to_string()))?;
        parse_csv(&body)
    }
}

/// Parses the CSV export into raw records keyed by trimmed header name.
/// Empty cells come through as empty strings, never as missing keys.
pub fn parse_csv(body: &str) -> Result<Vec<RawRecord>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(body.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| PipelineError::Fetch(format!("unreadable CSV header: {e}")))?
        .clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| PipelineError::Fetch(format!("malformed CSV row: {e}")))?;
        let mut record = RawRecord::with_capacity(headers.len());
        for (header, value) in headers.iter().zip(row.iter()) {
            record.insert(header.to_string(), value.to_string());
        }
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_into_records_keyed_by_header() {
        let body = "Timestamp,Start Lat,Start Lon,End Lat,End Lon,Side\n\
                    1/5/2026 9:12:43,40.7580,-73.9855,40.7590,-73.9845,N\n";
        let records = parse_csv(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["Start Lat"], "40.7580");
        assert_eq!(records[0]["Side"], "N");
    }

    #[test]
    fn headers_are_trimmed() {
        let body = " Timestamp , Start Lat \nx,1.0\n";
        let records = parse_csv(body).unwrap();
        assert!(records[0].contains_key("Timestamp"));
        assert!(records[0].contains_key("Start Lat"));
    }

    #[test]
    fn empty_cells_become_empty_strings() {
        let body = "Start Lat,Start Lon\n,-73.9855\n";
        let records = parse_csv(body).unwrap();
        assert_eq!(records[0]["Start Lat"], "");
    }

    #[test]
    fn empty_body_yields_no_records() {
        assert!(parse_csv("").unwrap().is_empty());
    }

    #[test]
    fn quoted_fields_with_commas_survive() {
        let body = "Street Name,Start Lat\n\"Broadway, lower\",40.7\n";
        let records = parse_csv(body).unwrap();
        assert_eq!(records[0]["Street Name"], "Broadway, lower");
    }
}
