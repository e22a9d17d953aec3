use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// File names and display values use this form
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single day of APOD metadata.
///
/// Field names follow the NASA API payload, so the same type decodes the API
/// response, writes the per-date JSON file and reads it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApodRecord {
    pub date: NaiveDate,
    pub title: String,
    pub explanation: String,
    pub media_type: String,
    #[serde(rename = "url")]
    pub image_url: String,
    /// Remaining payload fields (`hdurl`, `copyright`, ...), kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApodRecord {
    pub fn new(
        date: NaiveDate,
        title: impl Into<String>,
        explanation: impl Into<String>,
        media_type: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        ApodRecord {
            date,
            title: title.into(),
            explanation: explanation.into(),
            media_type: media_type.into(),
            image_url: image_url.into(),
            extra: Map::new(),
        }
    }

    pub fn date_key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Label/value pairs shown by the view surface
    pub fn display_rows(&self) -> [(&'static str, String); 4] {
        [
            ("Date", self.date_key()),
            ("Title", self.title.clone()),
            ("Explanation", self.explanation.clone()),
            ("Image_url", self.image_url.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_api_payload_and_keeps_extra_fields() {
        let payload = json!({
            "copyright": "Jane Doe",
            "date": "2024-01-05",
            "explanation": "A spiral galaxy.",
            "hdurl": "https://apod.nasa.gov/apod/image/2401/galaxy_hd.jpg",
            "media_type": "image",
            "service_version": "v1",
            "title": "Galaxy",
            "url": "https://apod.nasa.gov/apod/image/2401/galaxy.jpg"
        });

        let record: ApodRecord = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(
            record.image_url,
            "https://apod.nasa.gov/apod/image/2401/galaxy.jpg"
        );
        assert_eq!(record.extra["copyright"], "Jane Doe");

        // writing it back yields the original payload
        assert_eq!(serde_json::to_value(&record).unwrap(), payload);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let payload = json!({
            "date": "2024-01-05",
            "explanation": "No title here.",
            "media_type": "image",
            "url": "https://example.com/a.jpg"
        });

        assert!(serde_json::from_value::<ApodRecord>(payload).is_err());
    }

    #[test]
    fn test_display_rows_order() {
        let record = ApodRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            "Galaxy",
            "A spiral galaxy.",
            "image",
            "https://example.com/galaxy.jpg",
        );

        let labels = record.display_rows().map(|(label, _)| label);
        assert_eq!(labels, ["Date", "Title", "Explanation", "Image_url"]);
        assert_eq!(record.display_rows()[0].1, "2024-01-05");
    }
}
