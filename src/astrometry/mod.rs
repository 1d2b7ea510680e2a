//! Astrometry context construction
//!
//! An [`AstrometryContext`] gathers everything about the observer and the
//! epoch that the star transforms need: the observer's barycentric position
//! and velocity, its distance and direction from the Sun, the
//! bias-precession-nutation matrix and, for observers on the ground, the
//! site geometry and local Earth rotation angle.
//!
//! ```
//! use nalgebra::Vector3;
//! use starfield_astrometry::astrometry::{AstrometryContext, EarthState, EpochParameters};
//! use starfield_astrometry::{EphemerisSource, JulianDate};
//!
//! let earth = EarthState::new(
//!     Vector3::new(-0.973458265, -0.209215307, -0.0906996477),
//!     Vector3::new(-0.974170438, -0.211520082, -0.0917583024),
//!     Vector3::new(0.00364365824, -0.0154287319, -0.00668922024),
//! );
//! let date = JulianDate::new(2456384.5, 0.970031644);
//! let epoch = EpochParameters::geocentric(date, EphemerisSource::Supplied(earth)).unwrap();
//! let context = AstrometryContext::new(epoch);
//! assert!(context.epoch().sun_distance > 0.99);
//! ```

pub mod config;
pub mod context;
pub mod ephemeris;
pub mod site;

pub use config::ObservationConfig;
pub use context::{AstrometryContext, EpochParameters, SiteParameters};
pub use ephemeris::{EarthEphemeris, EarthState, EphemerisSource};
pub use site::{
    geodetic_to_geocentric, terrestrial_observer_pv, CipCoordinates, ObserverSite, PolarMotion,
    RefractionConstants,
};
