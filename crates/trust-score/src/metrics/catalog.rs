use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use super::parser::{self, CatalogEntry};
use super::{MetricsError, MetricsProvider};
use crate::evaluation::{VideoId, VideoMetrics};

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(err) => write!(f, "failed to read metrics catalog: {}", err),
            CatalogError::Csv(err) => write!(f, "invalid metrics catalog CSV data: {}", err),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            CatalogError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Read-only metrics provider loaded from a CSV export.
///
/// Columns: `video_id, subscriber_count, published_at, view_count,
/// like_count, comment_count, title, description`. A later row for the same
/// video replaces an earlier one.
#[derive(Debug, Default)]
pub struct CsvMetricsCatalog {
    entries: HashMap<VideoId, CatalogEntry>,
}

impl CsvMetricsCatalog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut entries = HashMap::new();
        for record in parser::parse_records(reader)? {
            entries.insert(record.video_id, record.entry);
        }
        debug!(videos = entries.len(), "loaded metrics catalog");
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Known video ids in sorted order.
    pub fn video_ids(&self) -> Vec<VideoId> {
        let mut ids: Vec<_> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl MetricsProvider for CsvMetricsCatalog {
    fn fetch(&self, video_id: &VideoId) -> Result<VideoMetrics, MetricsError> {
        match self.entries.get(video_id) {
            Some(CatalogEntry::Complete(metrics)) => Ok(metrics.clone()),
            Some(CatalogEntry::Incomplete { field }) => Err(MetricsError::Incomplete {
                video_id: video_id.clone(),
                field: *field,
            }),
            None => Err(MetricsError::NotFound(video_id.clone())),
        }
    }
}
