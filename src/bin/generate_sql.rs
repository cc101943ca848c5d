use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use parcel_import::importer::{self, normalizer::NormalizeOptions, sql::SqlOptions, Dataset};

#[derive(Parser, Debug)]
#[command(name = "generate-sql")]
#[command(about = "Generate a SQL import script from a county GeoJSON file", long_about = None)]
struct Args {
    /// County name, e.g. burleson
    county: String,

    /// GeoJSON FeatureCollection; may be omitted for known counties
    geojson_file: Option<PathBuf>,

    /// Output file, or '-' for stdout [default: import_<county>.sql]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not wrap the script in BEGIN/COMMIT
    #[arg(long)]
    no_transaction: bool,

    /// Do not delete the county's existing rows first
    #[arg(long)]
    no_delete: bool,

    /// Use the mailing address as situs address when it is more complete
    #[arg(long)]
    prefer_complete_address: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = Args::parse();

    let source = importer::resolve_source(&args.county, args.geojson_file.as_deref())?;
    let output = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(format!("import_{}.sql", args.county.trim().to_lowercase()))
    });

    tracing::info!("Generating county property SQL import file");
    tracing::info!("County: {}", args.county);
    tracing::info!("Source: {}", source.display());
    tracing::info!("Output: {}", output.display());

    let dataset = Dataset::load(&args.county, &source)?.with_options(NormalizeOptions {
        prefer_complete_address: args.prefer_complete_address,
    });
    tracing::info!(
        "Found {} {} properties",
        dataset.total(),
        dataset.display_name()
    );

    let options = SqlOptions {
        wrap_transaction: !args.no_transaction,
        clear_existing: !args.no_delete,
    };

    let out: Box<dyn Write> = if output == Path::new("-") {
        Box::new(BufWriter::new(io::stdout().lock()))
    } else {
        let file = File::create(&output)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        Box::new(BufWriter::new(file))
    };

    let summary = importer::generate_sql(&dataset, out, options, chrono::Utc::now())?;

    tracing::info!(
        "Generated {} successfully: {} INSERT statements, {}/{} properties",
        output.display(),
        summary.batch_sizes.len(),
        summary.processed,
        summary.total_features
    );
    if output != Path::new("-") {
        tracing::info!("Run: psql \"$DATABASE_URL\" -f {}", output.display());
    }

    Ok(())
}
