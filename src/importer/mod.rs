pub mod detector;
pub mod inserter;
pub mod normalizer;
pub mod parser;
pub mod sql;

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::counties;
use crate::domain::PropertyRecord;
use detector::{detect_fields, FieldMapping};
use normalizer::{NormalizeContext, NormalizeError, NormalizeOptions};
use sql::{SqlHeader, SqlOptions, SqlWriter};

pub use inserter::{import_dataset, ChunkFailure, ImportSummary, PropertySink};

/// Features per chunk: one INSERT statement or one bulk insert call
pub const CHUNK_SIZE: usize = 100;

const PROGRESS_INTERVAL: usize = 1000;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("input file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid GeoJSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is not a FeatureCollection: no `features` list", path.display())]
    NotAFeatureCollection { path: PathBuf },

    #[error("no features found in {}", path.display())]
    EmptyCollection { path: PathBuf },

    #[error("county name must not be empty")]
    EmptyCounty,

    #[error("no default data file for county {0:?}; pass a GeoJSON path")]
    UnknownCounty(String),

    #[error("failed to write SQL output: {0}")]
    Output(#[source] io::Error),
}

impl ImportError {
    pub(crate) fn with_path(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            Self::Json { source, .. } => Self::Json { path, source },
            Self::NotAFeatureCollection { .. } => Self::NotAFeatureCollection { path },
            other => other,
        }
    }
}

/// Input path for a county: the explicit one, or the county's known data file
pub fn resolve_source(county: &str, path: Option<&Path>) -> Result<PathBuf, ImportError> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => counties::find(county)
            .map(|c| PathBuf::from(c.default_source))
            .ok_or_else(|| ImportError::UnknownCounty(county.to_string())),
    }
}

/// A feature that was skipped, with its 0-based position in the run
#[derive(Debug)]
pub struct FeatureError {
    pub index: usize,
    pub error: NormalizeError,
}

/// Normalized output of one chunk of features
#[derive(Debug)]
pub struct NormalizedChunk {
    /// 1-based chunk number
    pub number: usize,
    pub feature_count: usize,
    pub records: Vec<PropertyRecord>,
    pub skipped: Vec<FeatureError>,
}

/// One county's features loaded in memory together with the mapping detected
/// from the first feature
#[derive(Debug)]
pub struct Dataset {
    pub county: String,
    pub source: PathBuf,
    pub features: Vec<Value>,
    pub mapping: FieldMapping,
    pub has_properties: bool,
    pub options: NormalizeOptions,
}

impl Dataset {
    pub fn load(county: &str, path: &Path) -> Result<Self, ImportError> {
        // Validate the county before touching the file
        if county.trim().is_empty() {
            return Err(ImportError::EmptyCounty);
        }
        let features = parser::load_features(path)?;
        Self::from_features(county, path, features)
    }

    pub fn from_features(
        county: &str,
        source: impl Into<PathBuf>,
        features: Vec<Value>,
    ) -> Result<Self, ImportError> {
        let county = county.trim().to_lowercase();
        if county.is_empty() {
            return Err(ImportError::EmptyCounty);
        }

        let source = source.into();
        if features.is_empty() {
            return Err(ImportError::EmptyCollection { path: source });
        }

        let sample = features
            .first()
            .and_then(|f| f.get("properties"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        tracing::info!(
            "Sample properties keys: {:?}",
            sample.keys().collect::<Vec<_>>()
        );

        let mapping = detect_fields(&sample);
        tracing::info!("Detected field mapping: {}", mapping);

        let has_properties = !sample.is_empty();
        if !has_properties {
            tracing::warn!("Properties are empty - will generate synthetic property data");
        } else {
            let unmapped = mapping.unmapped();
            if !unmapped.is_empty() {
                tracing::warn!("No source key found for: {:?}", unmapped);
            }
        }

        Ok(Self {
            county,
            source,
            features,
            mapping,
            has_properties,
            options: NormalizeOptions::default(),
        })
    }

    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn total(&self) -> usize {
        self.features.len()
    }

    pub fn chunk_count(&self) -> usize {
        self.total().div_ceil(CHUNK_SIZE)
    }

    pub fn display_name(&self) -> String {
        counties::display_name(&self.county)
    }

    /// Uppercased 3-letter prefix used for synthetic ids
    pub fn synthetic_prefix(&self) -> String {
        self.context().synthetic_prefix()
    }

    pub fn context(&self) -> NormalizeContext<'_> {
        NormalizeContext {
            county: &self.county,
            mapping: &self.mapping,
            has_properties: self.has_properties,
            options: self.options,
        }
    }

    /// Normalize the features chunk by chunk, logging and collecting
    /// features that fail instead of aborting
    pub fn chunks(&self) -> impl Iterator<Item = NormalizedChunk> + '_ {
        let context = self.context();

        self.features
            .chunks(CHUNK_SIZE)
            .enumerate()
            .map(move |(chunk_index, chunk)| {
                let offset = chunk_index * CHUNK_SIZE;
                let mut records = Vec::with_capacity(chunk.len());
                let mut skipped = Vec::new();

                for (i, feature) in chunk.iter().enumerate() {
                    let index = offset + i;
                    match context.normalize(feature, index) {
                        Ok(record) => records.push(record),
                        Err(error) => {
                            tracing::warn!("Error processing feature {}: {}", index + 1, error);
                            skipped.push(FeatureError { index, error });
                        }
                    }
                }

                NormalizedChunk {
                    number: chunk_index + 1,
                    feature_count: chunk.len(),
                    records,
                    skipped,
                }
            })
    }
}

#[derive(Debug)]
pub struct GenerateSummary {
    pub total_features: usize,
    pub processed: usize,
    /// Row count of every INSERT statement written
    pub batch_sizes: Vec<usize>,
    pub skipped: Vec<FeatureError>,
}

/// Write the SQL import script for `dataset` to `out`
pub fn generate_sql<W: Write>(
    dataset: &Dataset,
    out: W,
    options: SqlOptions,
    generated_at: DateTime<Utc>,
) -> Result<GenerateSummary, ImportError> {
    let total = dataset.total();
    let header = SqlHeader {
        title: dataset.display_name(),
        source: dataset.source.display().to_string(),
        generated_at,
        total_features: total,
        has_properties: dataset.has_properties,
    };

    let mut writer = SqlWriter::new(out, options);
    writer
        .write_header(&header, &dataset.county)
        .map_err(ImportError::Output)?;

    let mut processed = 0;
    let mut consumed = 0;
    let mut batch_sizes = Vec::new();
    let mut skipped = Vec::new();

    for chunk in dataset.chunks() {
        writer
            .write_batch(&chunk.records)
            .map_err(ImportError::Output)?;

        if !chunk.records.is_empty() {
            batch_sizes.push(chunk.records.len());
        }
        processed += chunk.records.len();
        skipped.extend(chunk.skipped);

        let before = consumed;
        consumed += chunk.feature_count;
        if consumed / PROGRESS_INTERVAL > before / PROGRESS_INTERVAL {
            tracing::info!("Generated {}/{} rows...", consumed, total);
        }
    }

    let synthetic_prefix = (!dataset.has_properties).then(|| dataset.synthetic_prefix());
    writer
        .write_footer(&header, processed, synthetic_prefix.as_deref())
        .map_err(ImportError::Output)?;

    tracing::info!(
        "Wrote {} INSERT statements covering {}/{} {} properties",
        batch_sizes.len(),
        processed,
        total,
        header.title
    );
    if !skipped.is_empty() {
        tracing::warn!("{} features were skipped", skipped.len());
    }

    Ok(GenerateSummary {
        total_features: total,
        processed,
        batch_sizes,
        skipped,
    })
}
