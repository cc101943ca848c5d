use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::CanonicalField;

/// Source key aliases per canonical field, in priority order.
///
/// Upper-snake-case names used by the older county exports come first.
const ALIASES: [(CanonicalField, &[&str]); 7] = [
    (
        CanonicalField::PropId,
        &[
            "Prop_ID",
            "PROP_ID",
            "prop_id",
            "PROPERTY_ID",
            "property_id",
            "ID",
            "id",
        ],
    ),
    (
        CanonicalField::OwnerName,
        &["OWNER_NAME", "owner_name", "Owner_Name", "OWNER", "owner"],
    ),
    (
        CanonicalField::SitusAddr,
        &[
            "SITUS_ADDR",
            "situs_addr",
            "Situs_Addr",
            "SITUS_ADDRESS",
            "ADDRESS",
            "address",
        ],
    ),
    (
        CanonicalField::MailAddr,
        &[
            "MAIL_ADDR",
            "mail_addr",
            "Mail_Addr",
            "MAIL_ADDRESS",
            "MAILING_ADDRESS",
        ],
    ),
    (
        CanonicalField::LandValue,
        &["LAND_VALUE", "land_value", "Land_Value", "LANDVALUE"],
    ),
    (
        CanonicalField::MktValue,
        &[
            "MKT_VALUE",
            "mkt_value",
            "Market_Value",
            "MARKET_VALUE",
            "MKTVALUE",
        ],
    ),
    (
        CanonicalField::GisArea,
        &[
            "GIS_AREA", "gis_area", "Gis_Area", "AREA", "area", "ACREAGE", "acreage",
        ],
    ),
];

/// Accepted source keys for a canonical field, highest priority first
fn aliases(field: CanonicalField) -> &'static [&'static str] {
    ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

/// Canonical field -> source key, resolved once per dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    keys: BTreeMap<CanonicalField, String>,
}

impl FieldMapping {
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.keys.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn unmapped(&self) -> Vec<CanonicalField> {
        CanonicalField::ALL
            .into_iter()
            .filter(|f| !self.keys.contains_key(f))
            .collect()
    }
}

impl fmt::Display for FieldMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (field, key)) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} <- {}", field, key)?;
        }
        f.write_str("}")
    }
}

/// Detect the field mapping from one sample properties object.
///
/// For every canonical field the first alias present in `sample` wins; fields
/// without a matching alias are left unmapped.
pub fn detect_fields(sample: &Map<String, Value>) -> FieldMapping {
    let keys = CanonicalField::ALL
        .into_iter()
        .filter_map(|field| {
            aliases(field)
                .iter()
                .find(|key| sample.contains_key(**key))
                .map(|key| (field, key.to_string()))
        })
        .collect();

    FieldMapping { keys }
}
