//! busplan CLI - Debug tool for route planning
//!
//! Usage:
//!   busplan-cli plan --stops <stops.csv> --depots <depots.csv> \
//!       --origin-lat <lat> --origin-lng <lng> [--response <response.json>] \
//!       [--output <plan.json>]
//!
//! Loads stop and depot CSV files, runs the planner (normalizing a saved
//! optimizer response when one is given, falling back to directional
//! clustering otherwise) and prints a per-route summary.
//!
//! Stop CSV columns:  id,latitude,longitude,students
//! Depot CSV columns: name,latitude,longitude

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use busplan::{
    DepotRecord, ExternalResponse, GeoPoint, PlanConfig, PlanSource, RoutePlanner, StopRecord,
};

#[derive(Parser)]
#[command(name = "busplan-cli")]
#[command(about = "Debug tool for bus route planning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a route plan from stop and depot files
    Plan {
        /// CSV file of stops (id,latitude,longitude,students)
        #[arg(long)]
        stops: PathBuf,

        /// CSV file of depots (name,latitude,longitude)
        #[arg(long)]
        depots: PathBuf,

        /// Origin latitude (the school)
        #[arg(long)]
        origin_lat: f64,

        /// Origin longitude
        #[arg(long)]
        origin_lng: f64,

        /// Saved external optimizer response JSON; omit to force the
        /// clustering fallback
        #[arg(long)]
        response: Option<PathBuf>,

        /// Write the full plan as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seats per bus
        #[arg(long, default_value = "55")]
        capacity: u32,

        /// Stop inclusion radius in km
        #[arg(long, default_value = "40.0")]
        max_radius_km: f64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Plan {
            stops,
            depots,
            origin_lat,
            origin_lng,
            response,
            output,
            capacity,
            max_radius_km,
        } => run_plan(
            stops,
            depots,
            GeoPoint::new(origin_lat, origin_lng),
            response,
            output,
            capacity,
            max_radius_km,
        ),
    }
}

fn run_plan(
    stops_path: PathBuf,
    depots_path: PathBuf,
    origin: GeoPoint,
    response_path: Option<PathBuf>,
    output: Option<PathBuf>,
    capacity: u32,
    max_radius_km: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let stop_records = load_stop_records(&stops_path)?;
    let depot_records = load_depot_records(&depots_path)?;
    info!(
        "loaded {} stops, {} depots",
        stop_records.len(),
        depot_records.len()
    );

    let config = PlanConfig {
        capacity,
        max_radius_km,
        ..PlanConfig::default()
    };
    let planner = RoutePlanner::from_records(stop_records, depot_records, config)?;

    let external = match response_path {
        Some(path) => Some(ExternalResponse::from_json(&fs::read_to_string(path)?)),
        None => None,
    };

    let outcome = planner.plan(origin, external.as_ref());

    let source = match outcome.diagnostics.source {
        PlanSource::External => "external optimizer",
        PlanSource::FallbackClusterer => "directional clustering fallback",
    };
    println!(
        "{} routes via {}{}",
        outcome.routes.len(),
        source,
        if outcome.diagnostics.degraded {
            " (DEGRADED)"
        } else {
            ""
        }
    );

    for route in &outcome.routes {
        let metrics = planner.route_metrics(route, origin);
        println!(
            "  {:<10} depot={:<20} stops={:<3} students={:<3} {:>6.1}km {:>4.0}min eff={:.0}%{}",
            route.bus_id,
            route.depot.name,
            metrics.stops_count,
            route.total_students,
            route.distance_km,
            metrics.estimated_minutes,
            route.efficiency * 100.0,
            if route.is_salvaged { " [salvaged]" } else { "" }
        );
    }

    if !outcome.diagnostics.excluded_stops.is_empty() {
        println!(
            "excluded {} stops beyond {:.0}km: {}",
            outcome.diagnostics.excluded_stops.len(),
            max_radius_km,
            outcome.diagnostics.excluded_stops.join(", ")
        );
    }
    if outcome.diagnostics.dropped_tours > 0 || outcome.diagnostics.salvaged_tours > 0 {
        println!(
            "tours: {} total, {} accepted, {} dropped, {} salvaged",
            outcome.diagnostics.total_tours,
            outcome.diagnostics.accepted_tours,
            outcome.diagnostics.dropped_tours,
            outcome.diagnostics.salvaged_tours
        );
    }

    if let Some(path) = output {
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, &outcome)?;
        println!("plan written to {}", path.display());
    }

    Ok(())
}

fn load_stop_records(path: &PathBuf) -> Result<Vec<StopRecord>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: StopRecord = result?;
        records.push(record);
    }
    Ok(records)
}

fn load_depot_records(path: &PathBuf) -> Result<Vec<DepotRecord>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: DepotRecord = result?;
        records.push(record);
    }
    Ok(records)
}
