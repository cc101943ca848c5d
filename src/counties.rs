use heck::ToTitleCase;

/// A county with a known parcel export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct County {
    pub id: &'static str,
    pub name: &'static str,
    pub default_source: &'static str,
}

pub const COUNTIES: [County; 3] = [
    County {
        id: "burnet",
        name: "Burnet County",
        default_source: "data/burnet_parcels.geojson",
    },
    County {
        id: "madison",
        name: "Madison County",
        default_source: "data/madison_landparcels.geojson",
    },
    County {
        id: "burleson",
        name: "Burleson County",
        default_source: "data/burleson_landparcels.geojson",
    },
];

/// Look up a known county, ignoring case and surrounding whitespace
pub fn find(county: &str) -> Option<&'static County> {
    let key = county.trim().to_lowercase();
    COUNTIES.iter().find(|c| c.id == key)
}

/// "Burleson County" for known counties, title-cased input otherwise
pub fn display_name(county: &str) -> String {
    match find(county) {
        Some(c) => c.name.to_string(),
        None => format!("{} County", county.trim().to_title_case()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_county() {
        let county = find("Burleson").unwrap();
        assert_eq!(county.id, "burleson");
        assert_eq!(county.default_source, "data/burleson_landparcels.geojson");
        assert!(find(" MADISON ").is_some());
        assert!(find("travis").is_none());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("burnet"), "Burnet County");
        assert_eq!(display_name("san_saba"), "San Saba County");
        assert_eq!(display_name("llano"), "Llano County");
    }
}
