use std::path::PathBuf;

use backend::catalog::TrailCatalog;
use clap::Parser;
use shared::{RankedTrail, RankedTrailsResponse, ReferencePoint};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Rank hiking trails by distance from a reference point"
)]
struct Args {
    /// Trail list JSON (the bundled Dongguan trails when omitted)
    #[arg(long)]
    trails: Option<PathBuf>,

    /// Reference latitude; needs --lng too
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,

    /// Label for the reference point
    #[arg(long)]
    name: Option<String>,

    /// Keep only the nearest N trails
    #[arg(long)]
    limit: Option<usize>,

    /// Print the ranking as JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl Args {
    fn reference(&self) -> ReferencePoint {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => ReferencePoint::new(
                self.name.clone().unwrap_or_else(|| "Custom location".to_string()),
                lat,
                lng,
            ),
            _ => ReferencePoint::default(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let catalog = TrailCatalog::load(args.trails.as_deref())?;
    let reference = args.reference();
    tracing::info!(
        "ranking {} trails from {:?} ({}, {})",
        catalog.len(),
        reference.name,
        reference.lat,
        reference.lng
    );

    let trails = shared::rank(catalog.trails(), &reference, args.limit)?;

    if args.json {
        let response = RankedTrailsResponse { reference, trails };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    print!("{}", format_table(&reference, &trails));

    Ok(())
}

fn format_table(reference: &ReferencePoint, trails: &[RankedTrail]) -> String {
    let mut table = format!("Trails nearest to {}\n", reference.name);
    for (idx, ranked) in trails.iter().enumerate() {
        table.push_str(&format!(
            "{:>3}. {:<36} {:>8.2} km  {}\n",
            idx + 1,
            ranked.trail.name,
            ranked.distance_km,
            ranked.trail.difficulty
        ));
    }
    table
}
