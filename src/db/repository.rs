use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::PropertyRecord;
use crate::importer::PropertySink;

/// `properties` table access for the direct-insert path
#[derive(Debug, Clone)]
pub struct PgPropertySink {
    pool: PgPool,
}

impl PgPropertySink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub async fn delete_by_county(pool: &PgPool, county: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM properties WHERE county = $1")
        .bind(county)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Insert a batch with one multi-row INSERT.
///
/// Strings are bound as parameters, so they are stored unescaped. Nine
/// parameters per row keeps a 100-row chunk well under Postgres' limit.
pub async fn insert_properties(
    pool: &PgPool,
    records: &[PropertyRecord],
) -> Result<u64, sqlx::Error> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut query_builder = QueryBuilder::<Postgres>::new(format!(
        "INSERT INTO properties ({}) ",
        PropertyRecord::COLUMNS.join(", ")
    ));

    query_builder.push_values(records, |mut row, record| {
        row.push_bind(&record.county)
            .push_bind(&record.prop_id)
            .push_bind(&record.owner_name)
            .push_bind(&record.situs_addr)
            .push_bind(&record.mail_addr)
            .push_bind(record.land_value)
            .push_bind(record.mkt_value)
            .push_bind(record.gis_area)
            .push_bind(&record.geometry);
    });

    let result = query_builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn count_by_county(pool: &PgPool, county: &str) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM properties WHERE county = $1")
        .bind(county)
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

impl PropertySink for PgPropertySink {
    async fn delete_county(&mut self, county: &str) -> Result<u64> {
        Ok(delete_by_county(&self.pool, county).await?)
    }

    async fn insert_batch(&mut self, records: &[PropertyRecord]) -> Result<u64> {
        Ok(insert_properties(&self.pool, records).await?)
    }
}
