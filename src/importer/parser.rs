use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::ImportError;

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: Option<String>,
    features: Option<Vec<Value>>,
}

/// Read a GeoJSON FeatureCollection fully into memory.
///
/// Features are kept as raw JSON; malformed individual features are dealt
/// with later, one at a time, by the normalizer.
pub fn load_features(path: &Path) -> Result<Vec<Value>, ImportError> {
    tracing::info!("Loading {}", path.display());

    let contents = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ImportError::MissingInput {
                path: path.to_path_buf(),
            }
        } else {
            ImportError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_features(&contents).map_err(|err| err.with_path(path))
}

/// Parse FeatureCollection text; errors carry an empty path until
/// [`ImportError::with_path`] fills it in.
pub fn parse_features(contents: &str) -> Result<Vec<Value>, ImportError> {
    let raw: RawCollection =
        serde_json::from_str(contents).map_err(|source| ImportError::Json {
            path: Default::default(),
            source,
        })?;

    if let Some(kind) = raw.kind.as_deref() {
        if kind != "FeatureCollection" {
            tracing::warn!("Unexpected GeoJSON type {:?}, reading features anyway", kind);
        }
    }

    raw.features.ok_or(ImportError::NotAFeatureCollection {
        path: Default::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feature_collection() {
        let features = parse_features(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"Prop_ID": "1"}, "geometry": null},
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [0, 0]}}
            ]}"#,
        )
        .unwrap();

        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["properties"]["Prop_ID"], "1");
    }

    #[test]
    fn test_malformed_features_are_kept_raw() {
        let features = parse_features(r#"{"features": [1, "two", {"properties": null}]}"#).unwrap();
        assert_eq!(features.len(), 3);
    }

    #[test]
    fn test_missing_features_list() {
        let err = parse_features(r#"{"type": "FeatureCollection"}"#).unwrap_err();
        assert!(matches!(err, ImportError::NotAFeatureCollection { .. }));
    }

    #[test]
    fn test_features_not_a_list() {
        let err = parse_features(r#"{"features": {"a": 1}}"#).unwrap_err();
        assert!(matches!(err, ImportError::Json { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_features("{not json").unwrap_err();
        assert!(matches!(err, ImportError::Json { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_features(Path::new("does/not/exist.geojson")).unwrap_err();
        match err {
            ImportError::MissingInput { path } => {
                assert_eq!(path, Path::new("does/not/exist.geojson"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
