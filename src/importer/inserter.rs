use anyhow::{Context, Result};

use super::{Dataset, FeatureError};
use crate::domain::PropertyRecord;

/// Destination for normalized records in the direct-insert path
#[allow(async_fn_in_trait)]
pub trait PropertySink {
    /// Remove every existing row of `county`; returns the number of rows removed
    async fn delete_county(&mut self, county: &str) -> Result<u64>;

    /// Insert one chunk of records as a single bulk insert
    async fn insert_batch(&mut self, records: &[PropertyRecord]) -> Result<u64>;
}

/// A chunk whose bulk insert failed; its records were dropped, not retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFailure {
    pub chunk: usize,
    pub records: usize,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub total_features: usize,
    pub imported: usize,
    pub deleted: u64,
    pub skipped: Vec<FeatureError>,
    pub failed_chunks: Vec<ChunkFailure>,
}

impl ImportSummary {
    /// Partial imports count as success as long as something landed
    pub fn is_success(&self) -> bool {
        self.imported > 0
    }

    pub fn not_imported(&self) -> usize {
        self.total_features - self.imported
    }
}

/// Replace `dataset.county`'s rows in `sink` with the dataset's records.
///
/// Runs one bulk insert per chunk. A failing chunk is logged, recorded in the
/// summary and skipped; only a failed delete aborts the import.
///
/// At most one run per county may be active at a time. Nothing here enforces
/// it: two concurrent runs race on the delete and end up with both datasets.
pub async fn import_dataset<S: PropertySink>(
    dataset: &Dataset,
    sink: &mut S,
) -> Result<ImportSummary> {
    let county_name = dataset.display_name();
    let total = dataset.total();
    let total_chunks = dataset.chunk_count();

    tracing::info!("Clearing existing {} properties data", county_name);
    let deleted = sink
        .delete_county(&dataset.county)
        .await
        .with_context(|| format!("Failed to clear existing {} data", county_name))?;
    tracing::info!("Cleared {} existing {} rows", deleted, county_name);

    let mut summary = ImportSummary {
        total_features: total,
        deleted,
        ..Default::default()
    };

    for chunk in dataset.chunks() {
        tracing::info!(
            "Processing chunk {}/{} ({} properties)",
            chunk.number,
            total_chunks,
            chunk.feature_count
        );
        summary.skipped.extend(chunk.skipped);

        if chunk.records.is_empty() {
            continue;
        }

        match sink.insert_batch(&chunk.records).await {
            Ok(_) => {
                summary.imported += chunk.records.len();
                tracing::info!(
                    "Chunk {} imported ({} properties, {}/{} total)",
                    chunk.number,
                    chunk.records.len(),
                    summary.imported,
                    total
                );
            }
            Err(err) => {
                tracing::error!("Error importing chunk {}: {:#}", chunk.number, err);
                summary.failed_chunks.push(ChunkFailure {
                    chunk: chunk.number,
                    records: chunk.records.len(),
                    message: format!("{:#}", err),
                });
            }
        }
    }

    tracing::info!(
        "Imported {}/{} {} properties",
        summary.imported,
        total,
        county_name
    );
    if summary.imported < total {
        tracing::warn!("{} properties failed to import", summary.not_imported());
    }

    Ok(summary)
}
