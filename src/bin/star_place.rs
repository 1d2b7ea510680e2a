//! Observed Place Tool
//!
//! Reads an observation description (date, Earth state, rotation angle and
//! site) from a JSON file and prints where a catalog star appears in the sky.
//!
//! Usage:
//!   cargo run --bin star_place -- --config night.json --ra 101.287 --dec -16.716

use std::path::PathBuf;
use std::time::Instant;

use clap::{ArgAction, Parser};
use starfield_astrometry::astrometry::ObservationConfig;
use starfield_astrometry::constants::ASEC2RAD;
use starfield_astrometry::transforms::{icrs_to_cirs, icrs_to_observed};
use starfield_astrometry::{CatalogStar, Deflectors, Equatorial};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Observed Place Tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Computes the observed place of a catalog star for a site and date",
    long_about = None
)]
struct Args {
    /// Observation description (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// ICRS right ascension (degrees)
    #[arg(long, allow_hyphen_values = true)]
    ra: f64,

    /// ICRS declination (degrees)
    #[arg(long, allow_hyphen_values = true)]
    dec: f64,

    /// Proper motion in RA, dRA/dt (mas/yr)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pm_ra: f64,

    /// Proper motion in Dec (mas/yr)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pm_dec: f64,

    /// Parallax (arcseconds)
    #[arg(long, default_value_t = 0.0)]
    parallax: f64,

    /// Radial velocity (km/s, positive receding)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    rv: f64,

    /// Skip gravitational light deflection by the Sun
    #[arg(long, action = ArgAction::SetTrue)]
    no_deflection: bool,

    /// Print the result as JSON
    #[arg(short, long, action = ArgAction::SetTrue)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let text = std::fs::read_to_string(&args.config)?;
    let config = ObservationConfig::from_json(&text)?;

    let start_time = Instant::now();
    let context = config.context()?;
    let context_time = start_time.elapsed();

    let star = CatalogStar::new(
        args.ra.to_radians(),
        args.dec.to_radians(),
        args.pm_ra * ASEC2RAD / 1000.0,
        args.pm_dec * ASEC2RAD / 1000.0,
        args.parallax,
        args.rv,
    );
    let deflectors = if args.no_deflection {
        Deflectors::None
    } else {
        Deflectors::Sun
    };

    let place = icrs_to_observed(&star, &context, &deflectors)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&place)?);
        return Ok(());
    }

    let cirs = icrs_to_cirs(&star, &context, &deflectors);
    let catalog = Equatorial::new(star.ra, star.dec);

    println!("Observation at {} (TDB)", config.date);
    println!("-------------------------------------------------------");
    println!(
        "Catalog (ICRS):   RA {:>12.6}°  Dec {:>+11.6}°",
        catalog.ra_degrees(),
        catalog.dec_degrees()
    );
    println!(
        "Apparent (CIRS):  RA {:>12.6}°  Dec {:>+11.6}°",
        cirs.ra_degrees(),
        cirs.dec_degrees()
    );
    println!(
        "Observed:         RA {:>12.6}°  Dec {:>+11.6}°",
        place.right_ascension.to_degrees(),
        place.declination.to_degrees()
    );
    println!(
        "                  HA {:>12.6}°",
        place.hour_angle.to_degrees()
    );
    println!(
        "                  Az {:>12.6}°  Alt {:>+11.6}°",
        place.azimuth.to_degrees(),
        place.altitude().to_degrees()
    );
    if place.altitude() < 0.0 {
        println!("Star is below the horizon");
    }
    println!("Context built in {:.2?}", context_time);

    Ok(())
}
