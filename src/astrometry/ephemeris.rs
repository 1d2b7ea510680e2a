//! Earth ephemeris input
//!
//! Building a context needs the Earth's barycentric position and velocity and
//! its heliocentric position at the epoch. Those can come from any provider
//! implementing [`EarthEphemeris`], or be handed over directly.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::time::JulianDate;
use crate::Result;

/// Earth state at a single epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarthState {
    /// Heliocentric position (AU)
    pub heliocentric_position: Vector3<f64>,
    /// Barycentric position (AU)
    pub barycentric_position: Vector3<f64>,
    /// Barycentric velocity (AU/day)
    pub barycentric_velocity: Vector3<f64>,
}

impl EarthState {
    pub fn new(
        heliocentric_position: Vector3<f64>,
        barycentric_position: Vector3<f64>,
        barycentric_velocity: Vector3<f64>,
    ) -> Self {
        Self {
            heliocentric_position,
            barycentric_position,
            barycentric_velocity,
        }
    }
}

/// A source of Earth positions and velocities
///
/// Dates are TDB (TT is adequate for most purposes).
pub trait EarthEphemeris {
    fn earth_state(&self, date: JulianDate) -> Result<EarthState>;
}

impl<F> EarthEphemeris for F
where
    F: Fn(JulianDate) -> Result<EarthState>,
{
    fn earth_state(&self, date: JulianDate) -> Result<EarthState> {
        self(date)
    }
}

/// Where a context gets the Earth's state from
#[derive(Clone, Copy)]
pub enum EphemerisSource<'a> {
    /// Evaluate a provider at the context epoch
    Provider(&'a dyn EarthEphemeris),
    /// Use a state the caller already has
    Supplied(EarthState),
}

impl EphemerisSource<'_> {
    /// Earth state at `date`
    pub fn resolve(&self, date: JulianDate) -> Result<EarthState> {
        match self {
            EphemerisSource::Provider(provider) => provider.earth_state(date),
            EphemerisSource::Supplied(state) => Ok(*state),
        }
    }
}

impl std::fmt::Debug for EphemerisSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EphemerisSource::Provider(_) => f.write_str("EphemerisSource::Provider(..)"),
            EphemerisSource::Supplied(state) => {
                f.debug_tuple("EphemerisSource::Supplied").field(state).finish()
            }
        }
    }
}

impl From<EarthState> for EphemerisSource<'_> {
    fn from(state: EarthState) -> Self {
        EphemerisSource::Supplied(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AstrometryError;

    fn state() -> EarthState {
        EarthState::new(
            Vector3::new(0.903358544, -0.415395237, -0.180084014),
            Vector3::new(0.901310875, -0.417402664, -0.180982288),
            Vector3::new(0.00742727954, 0.0140507459, 0.00609045792),
        )
    }

    #[test]
    fn test_supplied_state_ignores_date() {
        let source = EphemerisSource::from(state());
        assert_eq!(source.resolve(JulianDate::j2000()).unwrap(), state());
        assert_eq!(source.resolve(JulianDate::from_jd(2_460_000.5)).unwrap(), state());
    }

    #[test]
    fn test_closure_provider() {
        let provider = |date: JulianDate| {
            if date.jd() < 0.0 {
                Err(AstrometryError::Ephemeris("date before coverage".to_string()))
            } else {
                Ok(state())
            }
        };
        let source = EphemerisSource::Provider(&provider);

        assert_eq!(source.resolve(JulianDate::j2000()).unwrap(), state());
        assert!(matches!(
            source.resolve(JulianDate::from_jd(-1.0)),
            Err(AstrometryError::Ephemeris(_))
        ));
    }
}
