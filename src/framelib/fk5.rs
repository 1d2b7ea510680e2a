//! FK5 (J2000) to Hipparcos frame tie
//!
//! The Hipparcos catalog frame is the ICRS to within the accuracy that
//! matters here. FK5 differs from it by a small fixed orientation offset plus
//! a slow residual spin, both taken from Mignard & Froeschlé (2000).

use lazy_static::lazy_static;
use nalgebra::{Matrix3, Vector3};

use super::rotations::rotation_vector_to_matrix;
use crate::constants::{ASEC2RAD, JULIAN_YEAR_DAYS};
use crate::starlib::{catalog_to_state, state_to_catalog, CatalogStar, SpaceMotionState};
use crate::Result;

/// FK5 orientation with respect to Hipparcos as a rotation vector (mas)
const ORIENTATION_MAS: [f64; 3] = [-19.9, -9.1, 22.9];

/// FK5 spin with respect to Hipparcos (mas per Julian year)
const SPIN_MAS_PER_YEAR: [f64; 3] = [-0.30, 0.60, 0.70];

lazy_static! {
    static ref FK5_TO_HIPPARCOS: Matrix3<f64> =
        rotation_vector_to_matrix(&Vector3::from(ORIENTATION_MAS).scale(1e-3 * ASEC2RAD));

    /// Spin in radians per day
    static ref FK5_SPIN: Vector3<f64> =
        Vector3::from(SPIN_MAS_PER_YEAR).scale(1e-3 * ASEC2RAD / JULIAN_YEAR_DAYS);
}

/// FK5 to Hipparcos rotation matrix and spin (radians per Julian year)
pub fn fk5_hipparcos_rotation() -> (Matrix3<f64>, Vector3<f64>) {
    (*FK5_TO_HIPPARCOS, *FK5_SPIN * JULIAN_YEAR_DAYS)
}

/// Transform an FK5 (J2000.0, epoch J2000.0) star to the Hipparcos frame
///
/// Zero-parallax stars are moved out to the minimum-parallax distance while
/// they are transformed, so their parallax comes back small but non-zero.
pub fn fk5_to_hipparcos(star: &CatalogStar) -> Result<CatalogStar> {
    let (fk5, _) = catalog_to_state(star);

    let position = *FK5_TO_HIPPARCOS * fk5.position;
    let velocity = *FK5_TO_HIPPARCOS * (fk5.position.cross(&FK5_SPIN) + fk5.velocity);

    state_to_catalog(&SpaceMotionState::new(position, velocity))
}

/// Transform a Hipparcos star (epoch J2000.0) to the FK5 J2000.0 frame
pub fn hipparcos_to_fk5(star: &CatalogStar) -> Result<CatalogStar> {
    let (hip, _) = catalog_to_state(star);

    // Spin expressed in the Hipparcos frame
    let spin = *FK5_TO_HIPPARCOS * *FK5_SPIN;

    let inverse = FK5_TO_HIPPARCOS.transpose();
    let position = inverse * hip.position;
    let velocity = inverse * (hip.velocity - hip.position.cross(&spin));

    state_to_catalog(&SpaceMotionState::new(position, velocity))
}
