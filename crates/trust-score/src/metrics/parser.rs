use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::evaluation::{VideoId, VideoMetrics};

#[derive(Debug)]
pub(crate) struct MetricsRecord {
    pub(crate) video_id: VideoId,
    pub(crate) entry: CatalogEntry,
}

/// Catalog row after parsing; incomplete rows stay addressable so fetches can report them.
#[derive(Debug, Clone)]
pub(crate) enum CatalogEntry {
    Complete(VideoMetrics),
    Incomplete { field: &'static str },
}

/// Parse catalog rows. Rows without a video id are skipped.
pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<MetricsRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<MetricsRow>() {
        let row = record?;
        if row.video_id.is_empty() {
            continue;
        }

        records.push(MetricsRecord {
            video_id: VideoId(row.video_id.clone()),
            entry: row.into_entry(),
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct MetricsRow {
    video_id: String,
    #[serde(default)]
    subscriber_count: Option<u64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    published_at: Option<String>,
    #[serde(default)]
    view_count: Option<u64>,
    #[serde(default)]
    like_count: Option<u64>,
    #[serde(default)]
    comment_count: Option<u64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    title: Option<String>,
    #[serde(default)]
    description: String,
}

impl MetricsRow {
    fn into_entry(self) -> CatalogEntry {
        let Some(subscriber_count) = self.subscriber_count else {
            return CatalogEntry::Incomplete {
                field: "subscriber_count",
            };
        };
        let Some(published_at) = self.published_at.as_deref().and_then(parse_datetime) else {
            return CatalogEntry::Incomplete {
                field: "published_at",
            };
        };
        let Some(view_count) = self.view_count else {
            return CatalogEntry::Incomplete {
                field: "view_count",
            };
        };
        let Some(like_count) = self.like_count else {
            return CatalogEntry::Incomplete {
                field: "like_count",
            };
        };
        let Some(comment_count) = self.comment_count else {
            return CatalogEntry::Incomplete {
                field: "comment_count",
            };
        };
        let Some(title) = self.title else {
            return CatalogEntry::Incomplete { field: "title" };
        };

        CatalogEntry::Complete(VideoMetrics {
            subscriber_count,
            published_at,
            view_count,
            like_count,
            comment_count,
            title,
            description: self.description,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }

    None
}
