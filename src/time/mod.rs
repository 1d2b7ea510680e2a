//! Two-part Julian Dates
//!
//! Astrometric routines consume dates as a pair of `f64` values whose sum is
//! the Julian Date. The split is the caller's choice: `(2451545.0, 0.25)`,
//! `(2451545.25, 0.0)` and `(2400000.5, 51544.75)` all name the same instant,
//! but keeping the integer part in one half and the day fraction in the other
//! preserves the most precision.
//!
//! Conversions between time scales (UTC, UT1, TT, TDB, TCB) are the caller's
//! responsibility; every date handed to this crate is assumed to already be in
//! the scale the receiving function documents.

use crate::constants::{J2000, JULIAN_YEAR_DAYS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Julian Date split into two parts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JulianDate {
    /// First part, usually the integer or reference epoch
    pub jd1: f64,
    /// Second part, usually the fraction of a day
    pub jd2: f64,
}

impl JulianDate {
    /// Create a date from its two parts
    pub fn new(jd1: f64, jd2: f64) -> Self {
        Self { jd1, jd2 }
    }

    /// Create a date from a single Julian Date value
    pub fn from_jd(jd: f64) -> Self {
        Self { jd1: jd, jd2: 0.0 }
    }

    /// Create a date from a Modified Julian Date
    pub fn from_mjd(mjd: f64) -> Self {
        Self {
            jd1: 2_400_000.5,
            jd2: mjd,
        }
    }

    /// The J2000.0 reference epoch
    pub fn j2000() -> Self {
        Self::from_jd(J2000)
    }

    /// Julian Date collapsed into a single value (loses precision)
    pub fn jd(&self) -> f64 {
        self.jd1 + self.jd2
    }

    /// Days elapsed since J2000.0, summed in the order that keeps precision
    pub fn days_since_j2000(&self) -> f64 {
        (self.jd1 - J2000) + self.jd2
    }

    /// Julian years elapsed since J2000.0
    pub fn julian_years_since_j2000(&self) -> f64 {
        self.days_since_j2000() / JULIAN_YEAR_DAYS
    }

    /// Days from `self` to `later`
    pub fn days_until(&self, later: &JulianDate) -> f64 {
        (later.jd1 - self.jd1) + (later.jd2 - self.jd2)
    }
}

impl From<f64> for JulianDate {
    fn from(jd: f64) -> Self {
        Self::from_jd(jd)
    }
}

impl From<(f64, f64)> for JulianDate {
    fn from((jd1, jd2): (f64, f64)) -> Self {
        Self::new(jd1, jd2)
    }
}

impl fmt::Display for JulianDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JD {:.1} + {:.9}", self.jd1, self.jd2)
    }
}
