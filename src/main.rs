use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use bloodfind::config::FileConfig;
use bloodfind::domain::{Coordinate, Facility};
use bloodfind::geometry::BboxMode;
use bloodfind::render::{LeafletMap, ResultPresenter};
use bloodfind::search::{FacilitySearch, SearchOutcome, SearchSettings, validate_radius_range};
use bloodfind::server;

/// Find blood donation centers near a location using OpenStreetMap data
///
/// Examples:
///   # Search around a city with the default 5 km radius
///   bloodfind -l "Bengaluru, India"
///
///   # Wider search, JSON output, no map
///   bloodfind -l "Pune, India" -r 15 --json --no-map
///
///   # Search around coordinates directly
///   bloodfind --lat 12.9716 --lon 77.5946 -m centers.html
///
///   # Run the HTTP API
///   bloodfind --serve 0.0.0.0:3000
#[derive(Parser, Debug)]
#[command(name = "bloodfind")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches bloodfind.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Free-text location to search around (optional if --lat and --lon are provided)
    #[arg(short = 'l', long)]
    location: Option<String>,

    /// Latitude for direct coordinate input (use with --lon)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude for direct coordinate input (use with --lat)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Search radius in kilometers, 1-50 [default: 5]
    #[arg(short = 'r', long)]
    radius: Option<f64>,

    /// Output path of the HTML heatmap [default: blood_centers_heatmap.html]
    #[arg(short = 'm', long)]
    map: Option<PathBuf>,

    /// Skip writing the HTML heatmap
    #[arg(long)]
    no_map: bool,

    /// Print results as JSON instead of a list
    #[arg(long)]
    json: bool,

    /// How the search box is derived from the radius
    #[arg(long, value_enum)]
    bbox_mode: Option<BboxMode>,

    /// Run the HTTP API on this address instead of a one-off search
    #[arg(long, value_name = "ADDR")]
    serve: Option<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match args.config {
        Some(ref path) if path.exists() => FileConfig::from_path(path)?,
        Some(ref path) => bail!("Config file not found: {:?}", path),
        None => FileConfig::load().unwrap_or_default(),
    };

    let verbose = args.verbose || config.verbose;
    init_tracing(verbose);

    if let Some(mode) = args.bbox_mode {
        config.bbox_mode = mode;
    }
    let settings = SearchSettings::from(&config);

    if let Some(ref addr) = args.serve {
        let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
        return runtime.block_on(server::start(addr, settings));
    }

    let location = args.location.clone().or_else(|| config.location.clone());
    let lat = args.lat.or(config.lat);
    let lon = args.lon.or(config.lon);
    let radius_km = args.radius.unwrap_or(config.radius_km);
    let map_path = args.map.clone().unwrap_or_else(|| config.map.clone());

    if location.is_none() && (lat.is_none() || lon.is_none()) {
        bail!("Must provide either --location/-l, or --lat and --lon");
    }
    validate_radius_range(radius_km)?;

    let total_start = Instant::now();
    let search = FacilitySearch::from_settings(&settings)
        .context("Failed to set up OpenStreetMap clients")?;

    let (center, label) = match (lat, lon) {
        (Some(lt), Some(ln)) => {
            let center = Coordinate::new(lt, ln);
            if !args.json {
                println!("Using provided coordinates: {}", center);
            }
            (center, center.to_string())
        }
        _ => {
            let query = location.unwrap_or_default();
            let spinner = create_spinner(&format!("Geocoding \"{}\"...", query));
            let start = Instant::now();
            let center = search
                .resolve(&query)
                .context("Failed to geocode location")?;
            spinner.finish_with_message(format!(
                "Geocoded: {} -> {} [{:.1}s]",
                query,
                center,
                start.elapsed().as_secs_f32()
            ));
            (center, query)
        }
    };

    let spinner = create_spinner("Searching OpenStreetMap for blood donation centers...");
    let start = Instant::now();
    let outcome = search
        .search_at(center, radius_km)
        .context("Failed to search for blood donation centers")?;
    spinner.finish_with_message(format!(
        "Found {} centers within {} km [{:.1}s]",
        outcome.facilities.len(),
        radius_km,
        start.elapsed().as_secs_f32()
    ));

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome.facilities)
                .context("Failed to serialize results")?
        );
    } else {
        print_results(&outcome);
    }

    if !args.no_map {
        if outcome.facilities.is_empty() {
            eprintln!("No blood centers found to create heatmap");
        } else {
            let map = LeafletMap::new(map_path);
            map.present(&outcome, &label)
                .context("Failed to write heatmap")?;
            eprintln!("Heatmap saved as: {}", map.path().display());
        }
    }

    if verbose {
        eprintln!(
            "Done! Total time: {:.1}s",
            total_start.elapsed().as_secs_f32()
        );
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "bloodfind=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_results(outcome: &SearchOutcome) {
    println!();
    if outcome.facilities.is_empty() {
        println!(
            "No nearby blood donation centers found within {} km",
            outcome.radius_km
        );
        return;
    }

    for (i, facility) in outcome.facilities.iter().enumerate() {
        print_facility(i + 1, facility);
    }
}

fn print_facility(rank: usize, f: &Facility) {
    println!("{:>2}. {} ({:.2} km)", rank, f.name, f.distance_km);
    println!("    Type:    {}", f.facility_type);
    if !f.address.is_empty() {
        println!("    Address: {}", f.address);
    }
    println!("    Phone:   {}", f.phone);
    println!("    Hours:   {}", f.opening_hours);
    if f.has_website() {
        println!("    Website: {}", f.website);
    }
    println!("    Location: {}", f.coordinate);
    println!();
}

fn create_spinner(message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);

    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
