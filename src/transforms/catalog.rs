//! Catalog (ICRS) to intermediate (GCRS/CIRS) places and back
//!
//! The forward chain for a star is:
//!
//! 1. proper motion and parallax give the BCRS coordinate direction,
//! 2. light deflection gives the natural direction,
//! 3. aberration gives the proper direction,
//! 4. the bias-precession-nutation matrix rotates it into CIRS.
//!
//! Going backward, aberration and deflection are removed by fixed-count
//! iteration, each step refining the correction from a better estimate of
//! the undistorted direction.

use log::trace;
use nalgebra::Vector3;

use crate::astrometry::{AstrometryContext, EpochParameters};
use crate::constants::{
    ABERRATION_INVERSE_ITERATIONS, ASEC2RAD, AU_LIGHT_TIME_YEARS, DEFLECTION_INVERSE_ITERATIONS,
    KMS_TO_AUYEAR,
};
use crate::coordinates::Equatorial;
use crate::relativity::{apply_aberration, Deflectors};
use crate::starlib::CatalogStar;

/// Apply proper motion and parallax to a catalog star
///
/// # Arguments
/// * `star` - ICRS catalog data at epoch J2000.0
/// * `pm_interval` - Julian years since J2000.0 to apply proper motion for
/// * `observer` - Observer barycentric position (AU)
///
/// # Returns
/// Unit BCRS coordinate direction of the star as seen by the observer.
///
/// The interval is stretched by the Roemer delay across the observer's
/// offset from the barycenter.
pub fn apply_proper_motion_parallax(
    star: &CatalogStar,
    pm_interval: f64,
    observer: &Vector3<f64>,
) -> Vector3<f64> {
    let p = Equatorial::new(star.ra, star.dec).to_unit_vector();
    let (sr, cr) = star.ra.sin_cos();
    let (_, cd) = star.dec.sin_cos();

    // Proper motion time interval (years) including Roemer effect
    let dt = pm_interval + p.dot(observer) * AU_LIGHT_TIME_YEARS;

    // Space motion (radians per year)
    let parallax = star.parallax * ASEC2RAD;
    let w = KMS_TO_AUYEAR * star.radial_velocity * parallax;
    let pdz = star.pm_dec * p.z;
    let pm = Vector3::new(
        -star.pm_ra * p.y - pdz * cr + w * p.x,
        star.pm_ra * p.x - pdz * sr + w * p.y,
        star.pm_dec * cd + w * p.z,
    );

    (p + pm * dt - observer * parallax).normalize()
}

/// Deflect and aberrate a BCRS coordinate direction
///
/// Returns the proper direction in the observer's frame, before the
/// bias-precession-nutation rotation.
pub fn forward_direction(
    direction: &Vector3<f64>,
    epoch: &EpochParameters,
    deflectors: &Deflectors<'_>,
) -> Vector3<f64> {
    let natural = deflectors.apply(
        direction,
        &epoch.barycentric_position,
        &epoch.sun_direction,
        epoch.sun_distance,
    );
    apply_aberration(
        &natural,
        &epoch.velocity,
        epoch.sun_distance,
        epoch.lorentz_reciprocal,
    )
}

/// Remove aberration and deflection from a proper direction
///
/// The inverse of [`forward_direction`]: returns the unit BCRS coordinate
/// direction that would be observed as `proper`.
pub fn inverse_direction(
    proper: &Vector3<f64>,
    epoch: &EpochParameters,
    deflectors: &Deflectors<'_>,
) -> Vector3<f64> {
    // Aberration, giving the natural direction
    let natural = remove_correction(proper, ABERRATION_INVERSE_ITERATIONS, |before| {
        apply_aberration(
            before,
            &epoch.velocity,
            epoch.sun_distance,
            epoch.lorentz_reciprocal,
        )
    });

    if deflectors.is_empty() {
        return natural;
    }

    // Light deflection, giving the BCRS coordinate direction
    remove_correction(&natural, DEFLECTION_INVERSE_ITERATIONS, |before| {
        deflectors.apply(
            before,
            &epoch.barycentric_position,
            &epoch.sun_direction,
            epoch.sun_distance,
        )
    })
}

/// Undo a small direction-dependent correction by fixed-count iteration
///
/// Each pass guesses the uncorrected direction from the current correction
/// estimate, reapplies the correction to that guess and takes the difference
/// as the new estimate.
fn remove_correction<F>(after: &Vector3<f64>, iterations: usize, correct: F) -> Vector3<f64>
where
    F: Fn(&Vector3<f64>) -> Vector3<f64>,
{
    let mut d = Vector3::zeros();
    for i in 0..iterations {
        let before = (after - d).normalize();
        let corrected = correct(&before);
        let next = corrected - before;
        trace!(
            "inverse iteration {}: correction {:e}, change {:e}",
            i,
            next.norm(),
            (next - d).norm()
        );
        d = next;
    }
    (after - d).normalize()
}

/// Transform a catalog star from ICRS to CIRS (or GCRS for an identity bpn)
///
/// # Arguments
/// * `star` - ICRS catalog data at epoch J2000.0
/// * `context` - Astrometry context for the observer and epoch
/// * `deflectors` - Bodies deflecting the light
pub fn icrs_to_cirs(
    star: &CatalogStar,
    context: &AstrometryContext,
    deflectors: &Deflectors<'_>,
) -> Equatorial {
    let epoch = context.epoch();

    let coordinate =
        apply_proper_motion_parallax(star, epoch.pm_interval, &epoch.barycentric_position);
    let proper = forward_direction(&coordinate, epoch, deflectors);

    Equatorial::from_vector(&(epoch.bpn * proper))
}

/// Transform a CIRS place back to an ICRS astrometric place
///
/// Space motion and parallax are not removed; the result is the direction
/// of the star from the observer, in ICRS axes.
pub fn cirs_to_icrs(
    place: &Equatorial,
    context: &AstrometryContext,
    deflectors: &Deflectors<'_>,
) -> Equatorial {
    let epoch = context.epoch();

    let proper = epoch.bpn.transpose() * place.to_unit_vector();
    let coordinate = inverse_direction(&proper, epoch, deflectors);

    Equatorial::from_vector(&coordinate)
}
