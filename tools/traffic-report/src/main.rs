use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::Parser;

use prediruta_traffic::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "traffic-report",
    author,
    version,
    about = "Inspect the Ecuador traffic dataset from the command line",
    long_about = "Loads the speed-violation CSV (';'-delimited, decimal-comma) and prints \
                  dataset summaries as JSON.\n\n\
                  Without further flags the tool prints the dataset summary and the \
                  province/city inventory. With --city it adds per-city statistics, \
                  peak hours, and the hourly recommended-speed table."
)]
struct Args {
    /// Input CSV file (e.g. trafico_ecuador.csv)
    #[arg(short, long)]
    input: PathBuf,

    /// City to analyze (case-insensitive, e.g. MANTA)
    #[arg(short, long)]
    city: Option<String>,

    /// Restrict the city inventory to one province
    #[arg(short, long)]
    provincia: Option<String>,

    /// Vehicle class for recommended speeds: liviano or pesado
    #[arg(long, default_value = "liviano")]
    vehicle: String,

    /// Nearby search as "lat,lon,radius_km"
    #[arg(long)]
    nearby: Option<String>,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    log::info!("=== Ecuador Traffic Report ===");
    log::info!("Input: {}", args.input.display());

    let store = TrafficStore::new(&args.input);
    if !store.load() {
        bail!(
            "could not load dataset from {} (missing file or no valid rows)",
            args.input.display()
        );
    }

    let vehicle = match VehicleClass::from_str(&args.vehicle) {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!(
                "unknown vehicle class '{}', using default speed limits",
                args.vehicle
            );
            None
        }
    };

    println!("{}", pretty(&store.summary()?)?);

    let cities = store.ciudades_detalle(args.provincia.as_deref())?;
    log::info!(
        "{} cities{}",
        cities.len(),
        args.provincia
            .as_deref()
            .map(|p| format!(" in {p}"))
            .unwrap_or_default()
    );
    println!("{}", pretty(&cities)?);

    if let Some(city) = &args.city {
        report_city(&store, city, vehicle)?;
    }

    if let Some(spec) = &args.nearby {
        report_nearby(&store, spec)?;
    }

    Ok(())
}

fn report_city(store: &TrafficStore, city: &str, vehicle: Option<VehicleClass>) -> Result<()> {
    log::info!("");
    log::info!("City report: {city}");

    let stats = store
        .stats_by_city(city)
        .with_context(|| format!("no statistics for {city}"))?;
    println!("{}", pretty(&stats)?);

    match store.peak_hours(Some(city)) {
        Ok(peaks) => println!("{}", pretty(&peaks)?),
        Err(err) => log::warn!("peak hours unavailable: {err}"),
    }

    let hourly = store.stats_by_hour(Some(city))?;
    if hourly.is_empty() {
        log::warn!("no hourly data for {city}");
        return Ok(());
    }

    // Historical excess speeds converted to recommended safe speeds.
    let adjusted = adjust_hourly(&hourly, vehicle);
    println!("{}", pretty(&adjusted)?);

    let base = recommended_speed(stats.mean_speed, vehicle, DEFAULT_SAFETY_FACTOR);
    log::info!(
        "zone: {} — recommended {} km/h (legal limit {} km/h)",
        base.zone.description(),
        base.recommended,
        base.legal_limit
    );

    Ok(())
}

fn report_nearby(store: &TrafficStore, spec: &str) -> Result<()> {
    let parts: Vec<f64> = spec
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("invalid --nearby spec '{spec}', expected lat,lon,radius_km"))?;
    let &[lat, lon, radius_km] = parts.as_slice() else {
        bail!("invalid --nearby spec '{spec}', expected lat,lon,radius_km");
    };

    log::info!("");
    log::info!("Nearby search: ({lat}, {lon}) within {radius_km} km");

    let spots = store.nearby(lat, lon, radius_km)?;
    if spots.is_empty() {
        log::warn!("no records within the search box");
    } else {
        println!("{}", pretty(&spots)?);
    }

    Ok(())
}

fn pretty<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize report")
}
