//! Feed log backed by a CSV file.
//!
//! The host (CLI) records feeds here and hands the loaded history to the
//! engine. Malformed rows are skipped with a warning rather than failing
//! the whole load.

use crate::{Error, FeedHistoryPoint, Result};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;

/// CSV row format for the feed log
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    at: String,
    amount_ml: Option<f64>,
}

impl TryFrom<CsvRow> for FeedHistoryPoint {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let at = DateTime::parse_from_rfc3339(&row.at)
            .map_err(|e| Error::Other(format!("Invalid feed timestamp: {}", e)))?
            .with_timezone(&Utc);

        Ok(FeedHistoryPoint {
            at,
            amount_ml: row.amount_ml,
        })
    }
}

/// Load the feed log, sorted oldest-first.
///
/// A missing file is an empty history, not an error.
pub fn load_feed_history(path: &Path) -> Result<Vec<FeedHistoryPoint>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut feeds = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match FeedHistoryPoint::try_from(row) {
                Ok(feed) => feeds.push(feed),
                Err(e) => {
                    tracing::warn!("Skipping feed log row: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize feed log row: {}", e);
            }
        }
    }

    feeds.sort_by_key(|f| f.at);
    tracing::debug!("Loaded {} feeds from {:?}", feeds.len(), path);
    Ok(feeds)
}

/// Append one feed to the log, creating the file (with headers) if needed
pub fn append_feed(path: &Path, feed: &FeedHistoryPoint) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    // Headers only when the file is brand new.
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    writer.serialize(CsvRow {
        at: feed.at.to_rfc3339(),
        amount_ml: feed.amount_ml,
    })?;

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::debug!("Logged feed at {} to {:?}", feed.at, path);
    Ok(())
}
