//! JSON description of an observation
//!
//! Collects everything [`AstrometryContext::terrestrial`] needs into one
//! serde record, so an observing run can be set up from a file:
//!
//! ```json
//! {
//!   "date": { "jd1": 2456384.5, "jd2": 0.970031644 },
//!   "earth": {
//!     "heliocentric_position": [-0.973458265, -0.209215307, -0.0906996477],
//!     "barycentric_position": [-0.974170438, -0.211520082, -0.0917583024],
//!     "barycentric_velocity": [0.00364365824, -0.0154287319, -0.00668922024]
//!   },
//!   "era": 3.14540971,
//!   "site": { "longitude": -0.527800806, "latitude": -1.2345856, "height": 2738.0 }
//! }
//! ```
//!
//! `cip`, `polar` and `refraction` default to zero when left out.

use serde::{Deserialize, Serialize};

use super::context::AstrometryContext;
use super::ephemeris::{EarthState, EphemerisSource};
use super::site::{CipCoordinates, ObserverSite, PolarMotion, RefractionConstants};
use crate::time::JulianDate;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationConfig {
    /// TDB date of the observation
    pub date: JulianDate,
    /// Earth state at `date`
    pub earth: EarthState,
    /// Earth rotation angle (radians)
    pub era: f64,
    pub site: ObserverSite,
    #[serde(default)]
    pub cip: CipCoordinates,
    #[serde(default)]
    pub polar: PolarMotion,
    #[serde(default)]
    pub refraction: RefractionConstants,
}

impl ObservationConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the terrestrial context this observation describes
    pub fn context(&self) -> Result<AstrometryContext> {
        AstrometryContext::terrestrial(
            self.date,
            EphemerisSource::Supplied(self.earth),
            &self.cip,
            self.era,
            &self.site,
            &self.polar,
            &self.refraction,
        )
    }
}
