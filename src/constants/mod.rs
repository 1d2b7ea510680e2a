//! Constants module for astrometric calculations

use std::f64::consts::PI;

// Astronomical distances
/// Astronomical Unit in meters (per IAU 2012 Resolution B2)
pub const AU_M: f64 = 149_597_870_700.0;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// Days per Julian year
pub const JULIAN_YEAR_DAYS: f64 = 365.25;
/// Days per Julian millennium
pub const JULIAN_MILLENNIUM_DAYS: f64 = 365_250.0;

// Angles
/// Arcseconds to radians conversion factor
pub const ASEC2RAD: f64 = 4.848_136_811_095_359_935_899_141e-6;
/// Radians to arcseconds conversion factor
pub const RAD2ASEC: f64 = 206_264.806_247_096_355_156_473_4;
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;

// Physics
/// Speed of light in m/s
pub const C: f64 = 299_792_458.0;
/// Schwarzschild radius of the Sun in AU (2 * GM_sun / c^2 / AU)
pub const SUN_SCHWARZSCHILD_AU: f64 = 1.974_125_743_36e-8;

// Derived constants
/// Light time for one AU in seconds
pub const AU_LIGHT_TIME_S: f64 = AU_M / C;
/// Light time for one AU in days
pub const AU_LIGHT_TIME_DAYS: f64 = AU_LIGHT_TIME_S / DAY_S;
/// Light time for one AU in Julian years
pub const AU_LIGHT_TIME_YEARS: f64 = AU_LIGHT_TIME_DAYS / JULIAN_YEAR_DAYS;
/// Speed of light in AU/day
pub const C_AUDAY: f64 = DAY_S / AU_LIGHT_TIME_S;
/// AU/day expressed in m/s
pub const AUDAY_TO_MS: f64 = AU_M / DAY_S;
/// km/s expressed in AU per Julian year
pub const KMS_TO_AUYEAR: f64 = DAY_S * JULIAN_MILLENNIUM_DAYS / AU_M;

// Earth constants
/// Earth rotation rate in radians per UT1 second
pub const EARTH_ROTATION_RATE: f64 = 1.002_737_811_911_354_48 * TAU / DAY_S;
/// WGS84 equatorial radius in meters
pub const WGS84_EQUATORIAL_RADIUS: f64 = 6_378_137.0;
/// WGS84 flattening
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

// Space motion limits
/// Smallest parallax accepted before the distance is overridden (arcsec)
pub const MIN_PARALLAX_ASEC: f64 = 1e-7;
/// Largest accepted space velocity as a fraction of c
pub const MAX_SPEED_FRACTION: f64 = 0.5;
/// Iteration cap for the inertial-to-observed relativistic solution
pub const MAX_RELATIVISTIC_ITERATIONS: usize = 100;

// Inverse pipeline iteration counts
/// Refinement passes when removing stellar aberration
pub const ABERRATION_INVERSE_ITERATIONS: usize = 2;
/// Refinement passes when removing gravitational light deflection
pub const DEFLECTION_INVERSE_ITERATIONS: usize = 5;
