//! Observer site description and terrestrial geometry
//!
//! The site records are plain serde types so an observatory can be described
//! once in a JSON file and loaded with [`ObserverSite::from_json`].

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::constants::{EARTH_ROTATION_RATE, WGS84_EQUATORIAL_RADIUS, WGS84_FLATTENING};
use crate::framelib::{celestial_to_intermediate, polar_motion_matrix, rotation_z};
use crate::{AstrometryError, Result};

/// Geodetic location of an observer on the WGS84 ellipsoid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverSite {
    /// Longitude in radians, east positive
    pub longitude: f64,
    /// Geodetic latitude in radians
    pub latitude: f64,
    /// Height above the ellipsoid in meters
    #[serde(default)]
    pub height: f64,
}

impl ObserverSite {
    pub fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude,
            latitude,
            height,
        }
    }

    /// Create a site from longitude and latitude in degrees
    pub fn from_degrees(longitude_deg: f64, latitude_deg: f64, height: f64) -> Self {
        Self::new(longitude_deg.to_radians(), latitude_deg.to_radians(), height)
    }

    /// Parse a site from a JSON object with `longitude`, `latitude`
    /// (radians) and an optional `height` (meters)
    pub fn from_json(json: &str) -> Result<Self> {
        let site: ObserverSite = serde_json::from_str(json)?;
        if !(-std::f64::consts::FRAC_PI_2..=std::f64::consts::FRAC_PI_2).contains(&site.latitude) {
            return Err(AstrometryError::InvalidParameter(format!(
                "latitude {} rad is outside [-pi/2, pi/2]",
                site.latitude
            )));
        }
        Ok(site)
    }

    /// Geocentric position of the site in the terrestrial frame (meters)
    pub fn geocentric_position(&self) -> Result<Vector3<f64>> {
        geodetic_to_geocentric(
            WGS84_EQUATORIAL_RADIUS,
            WGS84_FLATTENING,
            self.longitude,
            self.latitude,
            self.height,
        )
    }
}

/// Polar motion and TIO locator, all in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarMotion {
    pub xp: f64,
    pub yp: f64,
    /// TIO locator s'
    #[serde(default)]
    pub sp: f64,
}

impl PolarMotion {
    pub fn new(xp: f64, yp: f64, sp: f64) -> Self {
        Self { xp, yp, sp }
    }

    /// Matrix rotating terrestrial intermediate vectors into ITRS
    pub fn matrix(&self) -> Matrix3<f64> {
        polar_motion_matrix(self.xp, self.yp, self.sp)
    }
}

/// Refraction constants for the model dZ = A tan Z + B tan^3 Z (radians)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RefractionConstants {
    pub a: f64,
    pub b: f64,
}

impl RefractionConstants {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }
}

/// Celestial Intermediate Pole coordinates and CIO locator, radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CipCoordinates {
    pub x: f64,
    pub y: f64,
    pub s: f64,
}

impl CipCoordinates {
    pub fn new(x: f64, y: f64, s: f64) -> Self {
        Self { x, y, s }
    }

    /// GCRS to CIRS rotation matrix
    pub fn matrix(&self) -> Matrix3<f64> {
        celestial_to_intermediate(self.x, self.y, self.s)
    }
}

/// Geodetic to geocentric coordinates on an arbitrary reference ellipsoid
///
/// # Arguments
/// * `a` - Equatorial radius (meters)
/// * `f` - Flattening
/// * `longitude` - Longitude (radians, east positive)
/// * `latitude` - Geodetic latitude (radians)
/// * `height` - Height above the ellipsoid (meters)
pub fn geodetic_to_geocentric(
    a: f64,
    f: f64,
    longitude: f64,
    latitude: f64,
    height: f64,
) -> Result<Vector3<f64>> {
    let (sp, cp) = latitude.sin_cos();
    let w = (1.0 - f) * (1.0 - f);
    let d = cp * cp + w * sp * sp;
    if d <= 0.0 {
        return Err(AstrometryError::InvalidGeodetic(format!(
            "ellipsoid a = {}, f = {} gives non-positive denominator at latitude {}",
            a, f, latitude
        )));
    }
    let ac = a / d.sqrt();
    let as_ = w * ac;

    let r = (ac + height) * cp;
    Ok(Vector3::new(
        r * longitude.cos(),
        r * longitude.sin(),
        (as_ + height) * sp,
    ))
}

/// Position (m) and velocity (m/s) of a terrestrial observer in CIRS
///
/// `era` is the Earth rotation angle in radians. The velocity only accounts
/// for the Earth's rotation.
pub fn terrestrial_observer_pv(
    site: &ObserverSite,
    polar: &PolarMotion,
    era: f64,
) -> Result<(Vector3<f64>, Vector3<f64>)> {
    // ITRS position, then polar motion removed
    let itrs = site.geocentric_position()?;
    let tirs = polar.matrix().transpose() * itrs;

    // Rotate by the Earth rotation angle into CIRS
    let position = rotation_z(-era) * tirs;

    let (s, c) = era.sin_cos();
    let velocity = Vector3::new(
        EARTH_ROTATION_RATE * (-s * tirs.x - c * tirs.y),
        EARTH_ROTATION_RATE * (c * tirs.x - s * tirs.y),
        0.0,
    );

    Ok((position, velocity))
}
