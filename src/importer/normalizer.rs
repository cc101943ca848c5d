use serde_json::{Map, Value};
use thiserror::Error;

use super::detector::FieldMapping;
use crate::domain::{CanonicalField, PropertyRecord};

/// Why a single feature could not be turned into a [`PropertyRecord`]
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("feature is a JSON {0}, expected an object")]
    NotAnObject(&'static str),

    #[error("`properties` is a JSON {0}, expected an object or null")]
    InvalidProperties(&'static str),

    #[error("`geometry` is a JSON {0}, expected an object or null")]
    InvalidGeometry(&'static str),

    #[error("{field} (source key {key:?}) holds a JSON {kind}, expected a scalar")]
    UnsupportedValue {
        field: CanonicalField,
        key: String,
        kind: &'static str,
    },

    #[error("{field} (source key {key:?}) is not numeric: {value:?}")]
    NotNumeric {
        field: CanonicalField,
        key: String,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Replace `situs_addr` with whichever of situs/mailing address looks more complete
    pub prefer_complete_address: bool,
}

/// Everything that stays fixed while normalizing one dataset
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub county: &'a str,
    pub mapping: &'a FieldMapping,
    /// Whether the sample feature had any properties at all
    pub has_properties: bool,
    pub options: NormalizeOptions,
}

impl NormalizeContext<'_> {
    /// First 3 letters of the county, uppercased
    pub fn synthetic_prefix(&self) -> String {
        self.county.chars().take(3).collect::<String>().to_uppercase()
    }

    /// `<synthetic prefix>-<index + 1, 6 digits>`
    pub fn synthetic_prop_id(&self, index: usize) -> String {
        format!("{}-{:06}", self.synthetic_prefix(), index + 1)
    }

    /// Normalize the feature at 0-based position `index` of the run
    pub fn normalize(
        &self,
        feature: &Value,
        index: usize,
    ) -> Result<PropertyRecord, NormalizeError> {
        let feature = feature
            .as_object()
            .ok_or_else(|| NormalizeError::NotAnObject(json_kind(feature)))?;

        let empty = Map::new();
        let props = match feature.get("properties") {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(map)) => map,
            Some(other) => return Err(NormalizeError::InvalidProperties(json_kind(other))),
        };

        let geometry = match feature.get("geometry") {
            None => "{}".to_string(),
            Some(geometry) if geometry.is_object() || geometry.is_null() => geometry.to_string(),
            Some(other) => return Err(NormalizeError::InvalidGeometry(json_kind(other))),
        };

        let prop_id = self
            .text_value(props, CanonicalField::PropId)?
            .unwrap_or_else(|| self.synthetic_prop_id(index));

        // Owners are only invented when the whole dataset lacks properties
        let owner_name = match self.text_value(props, CanonicalField::OwnerName)? {
            Some(owner) => owner,
            None if !self.has_properties => format!("Property Owner {}", index + 1),
            None => String::new(),
        };

        let mut situs_addr = self
            .text_value(props, CanonicalField::SitusAddr)?
            .unwrap_or_default();
        let mail_addr = self
            .text_value(props, CanonicalField::MailAddr)?
            .unwrap_or_default();

        if self.options.prefer_complete_address {
            situs_addr = most_complete_address(&situs_addr, &mail_addr);
        }

        Ok(PropertyRecord {
            county: self.county.to_lowercase(),
            prop_id,
            owner_name,
            situs_addr,
            mail_addr,
            land_value: self.numeric_value(props, CanonicalField::LandValue)?,
            mkt_value: self.numeric_value(props, CanonicalField::MktValue)?,
            gis_area: self.numeric_value(props, CanonicalField::GisArea)?,
            geometry,
        })
    }

    fn lookup<'p>(
        &self,
        props: &'p Map<String, Value>,
        field: CanonicalField,
    ) -> Option<(&'p Value, &str)> {
        let key = self.mapping.get(field)?;
        props.get(key).map(|value| (value, key))
    }

    /// Trimmed text for `field`; blank and null values count as absent
    fn text_value(
        &self,
        props: &Map<String, Value>,
        field: CanonicalField,
    ) -> Result<Option<String>, NormalizeError> {
        match self.lookup(props, field) {
            None | Some((Value::Null, _)) => Ok(None),
            Some((Value::String(s), _)) => {
                let trimmed = s.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Some((Value::Number(n), _)) => Ok(Some(n.to_string())),
            Some((other, key)) => Err(NormalizeError::UnsupportedValue {
                field,
                key: key.to_string(),
                kind: json_kind(other),
            }),
        }
    }

    /// Numeric value for `field`; absent, null and blank values become 0
    fn numeric_value(
        &self,
        props: &Map<String, Value>,
        field: CanonicalField,
    ) -> Result<f64, NormalizeError> {
        let not_numeric = |key: &str, value: String| NormalizeError::NotNumeric {
            field,
            key: key.to_string(),
            value,
        };

        match self.lookup(props, field) {
            None | Some((Value::Null, _)) => Ok(0.0),
            Some((Value::Number(n), key)) => n
                .as_f64()
                .filter(|v| v.is_finite())
                .ok_or_else(|| not_numeric(key, n.to_string())),
            Some((Value::String(s), key)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(0.0);
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| not_numeric(key, s.clone()))
            }
            Some((other, key)) => Err(NormalizeError::UnsupportedValue {
                field,
                key: key.to_string(),
                kind: json_kind(other),
            }),
        }
    }
}

/// Pick the more complete of a situs and a mailing address.
///
/// A mailing address with at least three comma-separated parts wins, then a
/// situs address with at least two; otherwise the mailing address if present.
pub fn most_complete_address(situs: &str, mail: &str) -> String {
    let parts = |s: &str| {
        if s.trim().is_empty() {
            0
        } else {
            s.split(',').count()
        }
    };

    if parts(mail) >= 3 {
        mail.trim().to_string()
    } else if parts(situs) >= 2 {
        situs.trim().to_string()
    } else if !mail.trim().is_empty() {
        mail.trim().to_string()
    } else {
        situs.to_string()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
