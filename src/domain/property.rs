use std::fmt;

/// The seven attributes every row of the `properties` table is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalField {
    PropId,
    OwnerName,
    SitusAddr,
    MailAddr,
    LandValue,
    MktValue,
    GisArea,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 7] = [
        Self::PropId,
        Self::OwnerName,
        Self::SitusAddr,
        Self::MailAddr,
        Self::LandValue,
        Self::MktValue,
        Self::GisArea,
    ];

    /// Column name in the `properties` table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PropId => "prop_id",
            Self::OwnerName => "owner_name",
            Self::SitusAddr => "situs_addr",
            Self::MailAddr => "mail_addr",
            Self::LandValue => "land_value",
            Self::MktValue => "mkt_value",
            Self::GisArea => "gis_area",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized parcel, ready to become one SQL row or one bulk-insert entry.
///
/// Numeric fields hold `0.0` when the source had no usable value; whether that
/// becomes `NULL` or `0` is decided by the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    pub county: String,
    pub prop_id: String,
    pub owner_name: String,
    pub situs_addr: String,
    pub mail_addr: String,
    pub land_value: f64,
    pub mkt_value: f64,
    pub gis_area: f64,
    /// Source geometry serialized as JSON text
    pub geometry: String,
}

impl PropertyRecord {
    /// Column order shared by the SQL writer and the Postgres sink
    pub const COLUMNS: [&'static str; 9] = [
        "county",
        "prop_id",
        "owner_name",
        "situs_addr",
        "mail_addr",
        "land_value",
        "mkt_value",
        "gis_area",
        "geometry",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_field_names() {
        let names: Vec<&str> = CanonicalField::ALL.iter().map(|f| f.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "prop_id",
                "owner_name",
                "situs_addr",
                "mail_addr",
                "land_value",
                "mkt_value",
                "gis_area"
            ]
        );
    }

    #[test]
    fn test_columns_match_canonical_fields() {
        // county leads, geometry trails, canonical fields in between
        assert_eq!(PropertyRecord::COLUMNS[0], "county");
        assert_eq!(PropertyRecord::COLUMNS[8], "geometry");
        for (i, field) in CanonicalField::ALL.iter().enumerate() {
            assert_eq!(PropertyRecord::COLUMNS[i + 1], field.as_str());
        }
    }
}
