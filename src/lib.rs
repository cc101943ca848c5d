//! Load county land-parcel GeoJSON into the `properties` table, either as a
//! generated SQL script or through batched inserts against Postgres.

pub mod config;
pub mod counties;
pub mod db;
pub mod domain;
pub mod importer;
