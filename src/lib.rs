//! Starfield astrometry: relativistic place computation for stars
//!
//! This crate maps catalog (ICRS) star positions to the directions an
//! observer actually sees, and back again. The work is split in two:
//!
//! - an [`astrometry::AstrometryContext`] is built once per observer and
//!   epoch from the Earth's ephemeris, the Earth orientation and the site;
//! - the [`transforms`] functions then move any number of stars through
//!   proper motion, parallax, light deflection, aberration and (for
//!   terrestrial sites) diurnal aberration and refraction, using that context.
//!
//! The [`starlib`] module models a star's space motion relativistically so a
//! catalog entry can be carried from one epoch to another.
//!
//! Routines and computations here are derived from the IAU SOFA astrometry
//! algorithms; this crate does not contain SOFA software.

use thiserror::Error;

pub mod astrometry;
pub mod constants;
pub mod coordinates;
pub mod framelib;
pub mod relativity;
pub mod starlib;
pub mod time;
pub mod transforms;

// Re-export commonly used types
pub use astrometry::{AstrometryContext, EphemerisSource, ObserverSite};
pub use coordinates::Equatorial;
pub use relativity::{DeflectingBody, Deflectors};
pub use starlib::{CatalogStar, SpaceMotionState, SpaceMotionWarnings};
pub use time::JulianDate;
pub use transforms::{ObservedCoordinates, ObservedPlace};

/// Main error type for the astrometry library
#[derive(Debug, Error)]
pub enum AstrometryError {
    #[error("State moves at or above the speed of light (v^2/c^2 = {0})")]
    SuperluminalState(f64),

    #[error("Invalid space motion state: {0}")]
    InvalidState(String),

    #[error("Invalid geodetic coordinates: {0}")]
    InvalidGeodetic(String),

    #[error("Ephemeris error: {0}")]
    Ephemeris(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for astrometry operations
pub type Result<T> = std::result::Result<T, AstrometryError>;
