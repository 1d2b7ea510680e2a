//! Stellar aberration

use nalgebra::Vector3;

use crate::constants::SUN_SCHWARZSCHILD_AU;

/// Apply aberration to a natural direction
///
/// # Arguments
/// * `natural` - Unit vector toward the source in the observer's local
///   inertial frame
/// * `velocity` - Observer barycentric velocity in units of c
/// * `sun_distance` - Distance between the Sun and the observer (AU)
/// * `lorentz_reciprocal` - sqrt(1 - |v|^2), the reciprocal Lorentz factor
///
/// # Returns
/// The proper direction: unit vector toward the source as seen by the
/// moving observer.
///
/// Besides the special-relativistic term the result includes a small
/// correction for the Sun's gravitational potential at the observer.
pub fn apply_aberration(
    natural: &Vector3<f64>,
    velocity: &Vector3<f64>,
    sun_distance: f64,
    lorentz_reciprocal: f64,
) -> Vector3<f64> {
    let pdv = natural.dot(velocity);
    let w1 = 1.0 + pdv / (1.0 + lorentz_reciprocal);
    let w2 = SUN_SCHWARZSCHILD_AU / sun_distance;

    let proper = natural * lorentz_reciprocal + velocity * w1 + (velocity - natural * pdv) * w2;
    proper.normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::RAD2ASEC;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_reference_values() {
        let natural = Vector3::new(
            -0.76321968546737951,
            -0.60869453983060384,
            -0.21676408580639883,
        );
        let velocity = Vector3::new(
            2.1044018893653786e-5,
            -8.9108923304429319e-5,
            -3.8633714797716569e-5,
        );
        let proper = apply_aberration(&natural, &velocity, 0.99980921395708788, 0.99999999506209258);

        assert_relative_eq!(proper.x, -0.7631631094219556269, epsilon = 1e-12);
        assert_relative_eq!(proper.y, -0.6087553082505590832, epsilon = 1e-12);
        assert_relative_eq!(proper.z, -0.2167926269368471279, epsilon = 1e-12);
    }

    #[test]
    fn test_stationary_observer_far_from_sun_sees_natural_direction() {
        let natural = Vector3::new(0.6, 0.0, 0.8);
        let proper = apply_aberration(&natural, &Vector3::zeros(), 1e9, 1.0);
        assert_relative_eq!(proper, natural, epsilon = 1e-15);
    }

    #[test]
    fn test_shift_is_bounded_for_earth_like_velocity() {
        // About 30 km/s, the Earth's orbital speed
        let velocity: Vector3<f64> = Vector3::new(1e-4, 0.0, 0.0);
        let lorentz_reciprocal = (1.0 - velocity.norm_squared()).sqrt();

        let mut rng = StdRng::seed_from_u64(20_500);
        let mut largest: f64 = 0.0;
        for _ in 0..500 {
            let z: f64 = rng.gen_range(-1.0..1.0);
            let phi: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            let r = (1.0 - z * z).sqrt();
            let natural = Vector3::new(r * phi.cos(), r * phi.sin(), z);

            let proper = apply_aberration(&natural, &velocity, 1.0, lorentz_reciprocal);
            let shift = natural.cross(&proper).norm().atan2(natural.dot(&proper)) * RAD2ASEC;
            largest = largest.max(shift);
            assert!(shift <= 20.7, "aberration of {} arcsec", shift);
        }

        // Some direction close to perpendicular to the motion gets nearly the full shift
        assert!(largest > 20.0);
    }

    #[test]
    fn test_direction_is_pulled_toward_apex() {
        let velocity = Vector3::new(0.0, 1e-4, 0.0);
        let natural = Vector3::new(1.0, 0.0, 0.0);
        let proper = apply_aberration(&natural, &velocity, 1.0, (1.0 - 1e-8_f64).sqrt());
        assert!(proper.y > 0.0);
        assert_relative_eq!(proper.norm(), 1.0, epsilon = 1e-15);
    }
}
