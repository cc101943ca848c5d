use chrono::{DateTime, Utc};
use std::io::{self, Write};

use crate::domain::PropertyRecord;

/// Quote a string as a SQL literal, doubling embedded single quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Numeric literal for generated SQL; zero means "no value" and becomes NULL
pub fn numeric_literal(value: f64) -> String {
    if value == 0.0 {
        "NULL".to_string()
    } else {
        value.to_string()
    }
}

/// One `( ... )` tuple of the VALUES list, in [`PropertyRecord::COLUMNS`] order
pub fn values_tuple(record: &PropertyRecord) -> String {
    format!(
        "({}, {}, {}, {}, {}, {}, {}, {}, {})",
        quote_literal(&record.county),
        quote_literal(&record.prop_id),
        quote_literal(&record.owner_name),
        quote_literal(&record.situs_addr),
        quote_literal(&record.mail_addr),
        numeric_literal(record.land_value),
        numeric_literal(record.mkt_value),
        numeric_literal(record.gis_area),
        quote_literal(&record.geometry),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlOptions {
    /// Wrap everything in BEGIN/COMMIT
    pub wrap_transaction: bool,
    /// Delete the county's existing rows before inserting
    pub clear_existing: bool,
}

impl Default for SqlOptions {
    fn default() -> Self {
        Self {
            wrap_transaction: true,
            clear_existing: true,
        }
    }
}

/// Descriptive values for the comment header and footer
#[derive(Debug, Clone)]
pub struct SqlHeader {
    pub title: String,
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub total_features: usize,
    pub has_properties: bool,
}

/// Writes an import script: header, optional preamble, one INSERT per batch, footer
pub struct SqlWriter<W: Write> {
    out: W,
    options: SqlOptions,
    batches: usize,
}

impl<W: Write> SqlWriter<W> {
    pub fn new(out: W, options: SqlOptions) -> Self {
        Self {
            out,
            options,
            batches: 0,
        }
    }

    pub fn write_header(&mut self, header: &SqlHeader, county: &str) -> io::Result<()> {
        writeln!(self.out, "-- {} Properties Import", header.title)?;
        writeln!(self.out, "-- Generated from {}", header.source)?;
        writeln!(
            self.out,
            "-- Generated at {}",
            header.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(self.out, "-- Total properties: {}", header.total_features)?;
        if !header.has_properties {
            writeln!(
                self.out,
                "-- Note: Original data has empty properties, synthetic data generated"
            )?;
        }
        writeln!(self.out, "--")?;
        writeln!(self.out)?;

        if self.options.wrap_transaction {
            writeln!(self.out, "BEGIN;")?;
            writeln!(self.out)?;
        }

        if self.options.clear_existing {
            writeln!(self.out, "-- Clear existing {} data", header.title)?;
            writeln!(
                self.out,
                "DELETE FROM properties WHERE county = {};",
                quote_literal(&county.to_lowercase())
            )?;
            writeln!(self.out)?;
        }

        Ok(())
    }

    /// Emit one INSERT statement for the batch; empty batches emit nothing
    pub fn write_batch(&mut self, records: &[PropertyRecord]) -> io::Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        self.batches += 1;
        writeln!(self.out, "-- Batch {}", self.batches)?;
        writeln!(
            self.out,
            "INSERT INTO properties ({}) VALUES",
            PropertyRecord::COLUMNS.join(", ")
        )?;

        for (i, record) in records.iter().enumerate() {
            let terminator = if i + 1 == records.len() { ";" } else { "," };
            writeln!(self.out, "{}{}", values_tuple(record), terminator)?;
        }
        writeln!(self.out)?;

        Ok(())
    }

    pub fn write_footer(
        &mut self,
        header: &SqlHeader,
        processed: usize,
        synthetic_prefix: Option<&str>,
    ) -> io::Result<()> {
        if self.options.wrap_transaction {
            writeln!(self.out, "COMMIT;")?;
            writeln!(self.out)?;
        }

        writeln!(
            self.out,
            "-- Import completed: {}/{} {} properties",
            processed, header.total_features, header.title
        )?;
        if let Some(prefix) = synthetic_prefix {
            writeln!(
                self.out,
                "-- Note: Properties have synthetic IDs ({}-000001, etc.) due to empty source data",
                prefix
            )?;
        }

        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
