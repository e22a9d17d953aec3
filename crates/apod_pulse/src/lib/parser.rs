//! # APOD Parser
//!
//! Decodes the APOD API response body into [`ApodRecord`]s.
//!
//! The API answers a date-range query with an array of objects and a
//! single-date query with a bare object; both shapes are accepted. Each entry is
//! decoded on its own so one malformed day does not discard the rest.

use apod_datastore::ApodRecord;
use chrono::NaiveDate;
use itertools::Itertools;
use serde_json::Value;

use crate::error::Error;

#[derive(Debug, Default)]
pub struct Extracted {
    pub records: Vec<ApodRecord>,
    pub skipped: Vec<SkippedEntry>,
}

/// An entry of the response that could not be turned into a record
#[derive(Debug)]
pub struct SkippedEntry {
    pub index: usize,
    pub reason: String,
}

/// Parses the records from an APOD response body.
///
/// # Returns
/// * `Ok(Extracted)` with records in response order, one per date.
/// * `Err(Error)` if the body is not JSON or is neither an array nor an object.
#[tracing::instrument(skip(body), fields(body_len = body.len()))]
pub fn parse_records(body: &str) -> Result<Extracted, Error> {
    let entries = match serde_json::from_str::<Value>(body)? {
        Value::Array(entries) => entries,
        entry @ Value::Object(_) => vec![entry],
        _ => {
            return Err(Error::ParseError(
                "Expected a JSON array or object in the APOD response",
            ))
        }
    };

    let mut extracted = Extracted::default();
    let mut decoded = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<ApodRecord>(entry) {
            Ok(record) => decoded.push(record),
            Err(e) => {
                tracing::warn!(error = %e, index, "Skipping malformed APOD entry");
                extracted.skipped.push(SkippedEntry {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    let total = decoded.len();
    extracted.records = decoded
        .into_iter()
        .unique_by(|record| record.date)
        .collect();

    if extracted.records.len() < total {
        tracing::warn!(
            duplicates = total - extracted.records.len(),
            "Dropped entries with duplicate dates"
        );
    }

    Ok(extracted)
}

/// Dates of the parsed records, in response order
pub fn record_dates(records: &[ApodRecord]) -> Vec<NaiveDate> {
    records.iter().map(|r| r.date).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(date: &str, title: &str) -> Value {
        json!({
            "date": date,
            "explanation": format!("About {title}."),
            "media_type": "image",
            "service_version": "v1",
            "title": title,
            "url": format!("https://apod.nasa.gov/apod/image/{date}.jpg")
        })
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_array_keeps_response_order() {
        let body = json!([
            entry("2024-01-02", "Two"),
            entry("2024-01-01", "One"),
            entry("2024-01-03", "Three"),
        ])
        .to_string();

        let extracted = parse_records(&body).expect("Failed to parse records");
        assert!(extracted.skipped.is_empty());
        assert_eq!(
            record_dates(&extracted.records),
            vec![date(2), date(1), date(3)]
        );
        assert_eq!(extracted.records[0].title, "Two");
        assert_eq!(extracted.records[0].extra["service_version"], "v1");
    }

    #[test]
    fn test_single_object_yields_one_record() {
        let body = entry("2024-01-07", "Lonely").to_string();

        let extracted = parse_records(&body).expect("Failed to parse single object");
        assert_eq!(extracted.records.len(), 1);
        assert_eq!(extracted.records[0].date, date(7));
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let mut missing_title = entry("2024-01-02", "Two");
        missing_title.as_object_mut().unwrap().remove("title");
        let bad_date = entry("January 3rd", "Three");

        let body = json!([
            entry("2024-01-01", "One"),
            missing_title,
            bad_date,
            entry("2024-01-04", "Four"),
        ])
        .to_string();

        let extracted = parse_records(&body).expect("Batch should survive bad entries");
        assert_eq!(record_dates(&extracted.records), vec![date(1), date(4)]);
        assert_eq!(
            extracted.skipped.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(extracted.skipped[0].reason.contains("title"));
    }

    #[test]
    fn test_duplicate_dates_keep_first() {
        let body = json!([
            entry("2024-01-01", "First"),
            entry("2024-01-01", "Second"),
        ])
        .to_string();

        let extracted = parse_records(&body).unwrap();
        assert_eq!(extracted.records.len(), 1);
        assert_eq!(extracted.records[0].title, "First");
    }

    #[test]
    fn test_quotes_and_escapes_survive() {
        let mut tricky = entry("2024-01-05", "The \"Pillars\" of Creation");
        tricky["explanation"] = json!("Line one,\nline two with \\ and \"quotes\".");

        let extracted = parse_records(&json!([tricky]).to_string()).unwrap();
        assert_eq!(extracted.records[0].title, "The \"Pillars\" of Creation");
        assert_eq!(
            extracted.records[0].explanation,
            "Line one,\nline two with \\ and \"quotes\"."
        );
    }

    #[test]
    fn test_empty_array_is_empty_batch() {
        let extracted = parse_records("[]").unwrap();
        assert!(extracted.records.is_empty());
        assert!(extracted.skipped.is_empty());
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let result = parse_records("<html>Service Unavailable</html>");
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_scalar_body_is_parse_error() {
        let result = parse_records("42");
        assert!(matches!(result, Err(Error::ParseError(_))));
    }
}
