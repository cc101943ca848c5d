use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use parcel_import::config::DatabaseConfig;
use parcel_import::db::{self, PgPropertySink};
use parcel_import::importer::{self, normalizer::NormalizeOptions, Dataset};

#[derive(Parser, Debug)]
#[command(name = "import")]
#[command(
    about = "Import county parcels from a GeoJSON file into the properties table",
    long_about = "Import county parcels from a GeoJSON file into the properties table.\n\n\
                  Existing rows of the county are deleted first. Run at most one import \
                  per county at a time; concurrent runs are not serialized."
)]
struct Args {
    /// County name, e.g. burleson
    county: String,

    /// GeoJSON FeatureCollection; may be omitted for known counties
    geojson_file: Option<PathBuf>,

    /// Apply bundled migrations before importing
    #[arg(long)]
    migrate: bool,

    /// Use the mailing address as situs address when it is more complete
    #[arg(long)]
    prefer_complete_address: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Credentials are checked before any file or network I/O
    let config = DatabaseConfig::from_env()?;

    let source = importer::resolve_source(&args.county, args.geojson_file.as_deref())?;

    tracing::info!("Starting county property import");
    tracing::info!("County: {}", args.county);
    tracing::info!("Source: {}", source.display());

    let dataset = Dataset::load(&args.county, &source)?.with_options(NormalizeOptions {
        prefer_complete_address: args.prefer_complete_address,
    });
    tracing::info!(
        "Found {} {} properties to import",
        dataset.total(),
        dataset.display_name()
    );

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config).await?;
    tracing::info!("Database connection established");

    if args.migrate {
        db::run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let mut sink = PgPropertySink::new(pool);
    let summary = importer::import_dataset(&dataset, &mut sink).await?;

    for failure in &summary.failed_chunks {
        tracing::warn!(
            "Chunk {} ({} properties) was not imported: {}",
            failure.chunk,
            failure.records,
            failure.message
        );
    }

    if !summary.is_success() {
        anyhow::bail!(
            "{} import failed: 0/{} properties imported",
            dataset.display_name(),
            summary.total_features
        );
    }

    tracing::info!(
        "{} import completed: {}/{} properties imported",
        dataset.display_name(),
        summary.imported,
        summary.total_features
    );

    Ok(())
}
