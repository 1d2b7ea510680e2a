//! Star space motion
//!
//! A catalog entry (RA, Dec, proper motion, parallax, radial velocity)
//! describes what an imaginary observer at the solar-system barycenter sees.
//! Because the light arriving now left the star long ago, those "observed"
//! rates are not the star's inertial velocity. This module converts between
//! catalog entries and an inertial position-velocity state, and uses that
//! state to carry a star from one catalog epoch to another along a straight
//! line in space.
//!
//! # Warnings and errors
//!
//! Conversion to a state never fails, but it can substitute values:
//!
//! - a parallax below [`MIN_PARALLAX_ASEC`] (including zero and negative
//!   values) is replaced by that minimum, placing the star very far away;
//! - a space velocity above half the speed of light is discarded;
//! - the relativistic correction may fail to settle.
//!
//! Each substitution sets a flag in [`SpaceMotionWarnings`]. Conversions that
//! would require travelling at or above the speed of light are errors.

use bitflags::bitflags;
use log::{trace, warn};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{
    AU_M, C_AUDAY, DAY_S, JULIAN_YEAR_DAYS, MAX_RELATIVISTIC_ITERATIONS, MAX_SPEED_FRACTION,
    MIN_PARALLAX_ASEC, RAD2ASEC,
};
use crate::coordinates::{normalize_angle, pv_to_spherical, spherical_to_pv, SphericalMotion};
use crate::time::JulianDate;
use crate::{AstrometryError, Result};

bitflags! {
    /// Non-fatal conditions raised while building a space motion state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpaceMotionWarnings: u8 {
        /// Parallax too small; the minimum parallax was used instead
        const DISTANCE_OVERRIDDEN = 0b001;
        /// Space velocity exceeded the limit and was set to zero
        const EXCESSIVE_SPEED = 0b010;
        /// The relativistic correction did not settle
        const NOT_CONVERGED = 0b100;
    }
}

/// Catalog data for a single star
///
/// The RA proper motion is the rate of change of the RA coordinate itself,
/// not the great-circle rate (it is not multiplied by cos Dec).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogStar {
    /// Right ascension (radians)
    pub ra: f64,
    /// Declination (radians)
    pub dec: f64,
    /// Proper motion in RA, dRA/dt (radians per Julian year)
    pub pm_ra: f64,
    /// Proper motion in Dec, dDec/dt (radians per Julian year)
    pub pm_dec: f64,
    /// Parallax (arcseconds)
    pub parallax: f64,
    /// Radial velocity (km/s, positive when receding)
    pub radial_velocity: f64,
}

impl CatalogStar {
    pub fn new(
        ra: f64,
        dec: f64,
        pm_ra: f64,
        pm_dec: f64,
        parallax: f64,
        radial_velocity: f64,
    ) -> Self {
        Self {
            ra,
            dec,
            pm_ra,
            pm_dec,
            parallax,
            radial_velocity,
        }
    }

    /// A star with no measured space motion or distance
    pub fn fixed(ra: f64, dec: f64) -> Self {
        Self::new(ra, dec, 0.0, 0.0, 0.0, 0.0)
    }

    /// Convert to an inertial space motion state
    pub fn to_state(&self) -> (SpaceMotionState, SpaceMotionWarnings) {
        catalog_to_state(self)
    }

    /// Carry this star from one epoch to another
    pub fn propagate(
        &self,
        before: JulianDate,
        after: JulianDate,
    ) -> Result<(CatalogStar, SpaceMotionWarnings)> {
        propagate_epoch(self, before, after)
    }
}

/// Barycentric position (AU) and inertial velocity (AU/day) of a star
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceMotionState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl SpaceMotionState {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self { position, velocity }
    }

    /// Move the state along its straight-line track by `dt` days
    pub fn advanced_by(&self, dt: f64) -> Self {
        Self {
            position: self.position + self.velocity * dt,
            velocity: self.velocity,
        }
    }

    /// Time for light to travel from the star to the barycenter (days)
    pub fn light_time(&self) -> f64 {
        self.position.norm() / C_AUDAY
    }
}

/// Convert radial/transverse speed ratios (observed, v/c) into the
/// inertial-to-observed correction terms `d` and `delta`
///
/// The fixed point is found by plain iteration. The loop stops once the
/// changes in both terms stop shrinking, which happens when rounding noise
/// dominates; running out of iterations flags non-convergence.
fn relativistic_correction(beta_radial: f64, beta_transverse: f64) -> (f64, f64, bool) {
    let mut betr = beta_radial;
    let mut bett = beta_transverse;
    let mut d = 0.0;
    let mut del = 0.0;
    let mut od = 0.0;
    let mut odel = 0.0;
    let mut odd = 0.0;
    let mut oddel = 0.0;

    for i in 0..MAX_RELATIVISTIC_ITERATIONS {
        d = 1.0 + betr;
        del = (1.0 - betr * betr - bett * bett).sqrt() - 1.0;
        betr = d * beta_radial + del;
        bett = d * beta_transverse;
        if i > 0 {
            let dd = (d - od).abs();
            let ddel = (del - odel).abs();
            if i > 1 && dd >= odd && ddel >= oddel {
                trace!("relativistic correction settled after {} iterations", i + 1);
                return (d, del, true);
            }
            odd = dd;
            oddel = ddel;
        }
        od = d;
        odel = del;
    }

    (d, del, false)
}

/// Convert catalog data to a barycentric space motion state
///
/// The returned velocity is the star's inertial space velocity: the
/// light-time distortion built into observed proper motion and radial
/// velocity has been removed.
pub fn catalog_to_state(star: &CatalogStar) -> (SpaceMotionState, SpaceMotionWarnings) {
    let mut warnings = SpaceMotionWarnings::empty();

    // Distance (AU)
    let parallax = if star.parallax >= MIN_PARALLAX_ASEC {
        star.parallax
    } else {
        warn!(
            "parallax {} arcsec below minimum; using {} arcsec",
            star.parallax, MIN_PARALLAX_ASEC
        );
        warnings |= SpaceMotionWarnings::DISTANCE_OVERRIDDEN;
        MIN_PARALLAX_ASEC
    };
    let distance = RAD2ASEC / parallax;

    // Radial velocity (AU/day) and proper motion (radians/day)
    let (position, mut velocity) = spherical_to_pv(&SphericalMotion {
        longitude: star.ra,
        latitude: star.dec,
        distance,
        longitude_rate: star.pm_ra / JULIAN_YEAR_DAYS,
        latitude_rate: star.pm_dec / JULIAN_YEAR_DAYS,
        distance_rate: DAY_S * star.radial_velocity * 1e3 / AU_M,
    });

    if velocity.norm() / C_AUDAY > MAX_SPEED_FRACTION {
        warn!(
            "space velocity {:.3e} AU/day exceeds {}c; discarding it",
            velocity.norm(),
            MAX_SPEED_FRACTION
        );
        velocity = Vector3::zeros();
        warnings |= SpaceMotionWarnings::EXCESSIVE_SPEED;
    }

    // Split the velocity into radial and transverse parts
    let r = position.norm();
    let x = position / r;
    let vsr = x.dot(&velocity);
    let usr = x * vsr;
    let ust = velocity - usr;
    let vst = ust.norm();

    let beta_radial = vsr / C_AUDAY;
    let beta_transverse = vst / C_AUDAY;

    let (d, del, converged) = relativistic_correction(beta_radial, beta_transverse);
    if !converged {
        warn!(
            "relativistic correction did not settle (beta_r = {:e}, beta_t = {:e})",
            beta_radial, beta_transverse
        );
        warnings |= SpaceMotionWarnings::NOT_CONVERGED;
    }

    // Replace the observed radial and transverse velocities with inertial ones
    let w = if beta_radial != 0.0 {
        d + del / beta_radial
    } else {
        1.0
    };
    velocity = usr * w + ust * d;

    (SpaceMotionState { position, velocity }, warnings)
}

/// Convert a barycentric space motion state back to catalog data
///
/// Fails when the velocity is at or above the speed of light or the
/// position is null.
pub fn state_to_catalog(state: &SpaceMotionState) -> Result<CatalogStar> {
    let r = state.position.norm();
    if r == 0.0 {
        return Err(AstrometryError::InvalidState(
            "star position is the null vector".to_string(),
        ));
    }
    let x = state.position / r;

    // Radial and transverse components of the inertial velocity
    let vr = x.dot(&state.velocity);
    let ur = x * vr;
    let ut = state.velocity - ur;
    let vt = ut.norm();

    let bett = vt / C_AUDAY;
    let betr = vr / C_AUDAY;

    // Observed-to-inertial correction terms, in closed form
    let d = 1.0 + betr;
    let w = betr * betr + bett * bett;
    if d == 0.0 || w >= 1.0 {
        return Err(AstrometryError::SuperluminalState(w));
    }
    let del = -w / ((1.0 - w).sqrt() + 1.0);

    // Observed transverse and radial velocity vectors (AU/day)
    let ust = ut / d;
    let usr = x * (C_AUDAY * (betr - del) / d);
    let observed_velocity = usr + ust;

    let motion = pv_to_spherical(&state.position, &observed_velocity);

    Ok(CatalogStar {
        ra: normalize_angle(motion.longitude),
        dec: motion.latitude,
        pm_ra: motion.longitude_rate * JULIAN_YEAR_DAYS,
        pm_dec: motion.latitude_rate * JULIAN_YEAR_DAYS,
        parallax: RAD2ASEC / motion.distance,
        radial_velocity: 1e-3 * motion.distance_rate * AU_M / DAY_S,
    })
}

/// Carry a star's catalog data from one epoch to another
///
/// The star moves in a straight line at constant speed. Light time is
/// accounted for at both ends, so the result is again what a barycentric
/// observer would see at the `after` epoch. The returned warnings are those
/// raised converting the `before` data.
pub fn propagate_epoch(
    star: &CatalogStar,
    before: JulianDate,
    after: JulianDate,
) -> Result<(CatalogStar, SpaceMotionWarnings)> {
    let (state, warnings) = catalog_to_state(star);

    // Light time when observed (days)
    let tl1 = state.light_time();

    let dt = before.days_until(&after);

    // Move from the observed place at "before" to the geometric place at "after"
    let geometric = state.advanced_by(dt + tl1);

    // Light time from that geometric position, solving
    // |p + v t|^2 = (c t)^2 for the observed light time t
    let r2 = geometric.position.dot(&geometric.position);
    let rdv = geometric.position.dot(&geometric.velocity);
    let v2 = geometric.velocity.dot(&geometric.velocity);
    let c2mv2 = C_AUDAY * C_AUDAY - v2;
    if c2mv2 <= 0.0 {
        return Err(AstrometryError::SuperluminalState(v2 / (C_AUDAY * C_AUDAY)));
    }
    let tl2 = (-rdv + (rdv * rdv + c2mv2 * r2).sqrt()) / c2mv2;

    // Observed place at "after"
    let observed = state.advanced_by(dt + (tl1 - tl2));

    let propagated = state_to_catalog(&observed)?;
    Ok((propagated, warnings))
}
