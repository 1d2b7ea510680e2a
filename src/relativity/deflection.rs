//! Gravitational light deflection
//!
//! A body of mass M deflects light passing it by an angle proportional to
//! M / (impact distance). For a star seen close to the body the raw formula
//! diverges, so each body carries a *limiter*: once q.(q + e), which behaves
//! like half the squared angular separation for distant sources, falls below
//! the limiter the deflection shrinks smoothly to zero instead.

use log::trace;
use nalgebra::Vector3;

use crate::constants::{AU_LIGHT_TIME_DAYS, SUN_SCHWARZSCHILD_AU};

/// Limiter applied to the Sun when observed from 1 AU or closer (radians^2)
const SUN_LIMITER_AT_1AU: f64 = 1e-6;

/// A solar-system body that bends starlight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeflectingBody {
    /// Mass in solar masses
    pub mass: f64,
    /// Deflection limiter (radians^2)
    pub limiter: f64,
    /// Barycentric position (AU)
    pub position: Vector3<f64>,
    /// Barycentric velocity (AU/day)
    pub velocity: Vector3<f64>,
}

impl DeflectingBody {
    pub fn new(mass: f64, limiter: f64, position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self {
            mass,
            limiter,
            position,
            velocity,
        }
    }

    /// Deflect a star direction for an observer at `observer` (barycentric AU)
    ///
    /// The body is moved back to where it was when the light passed closest
    /// to it, which for most bodies is a small fraction of a day.
    pub fn deflect(&self, observer: &Vector3<f64>, direction: &Vector3<f64>) -> Vector3<f64> {
        // Body to observer vector at the observation epoch
        let v = observer - self.position;

        // Minus the time since the light passed the body, capped at zero
        let dt = (direction.dot(&v) * AU_LIGHT_TIME_DAYS).min(0.0);

        // Backtrack the body to that time
        let ev = v - self.velocity * dt;
        let em = ev.norm();
        let e = ev / em;

        deflect_by_body(self.mass, direction, direction, &e, em, self.limiter)
    }
}

/// The set of bodies whose deflection is applied along a light path
#[derive(Debug, Clone, Copy, Default)]
pub enum Deflectors<'a> {
    /// No deflection at all
    #[default]
    None,
    /// The Sun alone, using the context's Sun to observer geometry
    Sun,
    /// An explicit list, ordered the way the light passes the bodies
    Bodies(&'a [DeflectingBody]),
}

impl Deflectors<'_> {
    /// Apply every deflection in this set to a star direction
    ///
    /// # Arguments
    /// * `direction` - Unit vector from the observer to the star
    /// * `observer` - Observer barycentric position (AU)
    /// * `sun_direction` - Unit vector from the Sun to the observer
    /// * `sun_distance` - Distance from the Sun to the observer (AU)
    pub fn apply(
        &self,
        direction: &Vector3<f64>,
        observer: &Vector3<f64>,
        sun_direction: &Vector3<f64>,
        sun_distance: f64,
    ) -> Vector3<f64> {
        match self {
            Deflectors::None => *direction,
            Deflectors::Sun => deflect_by_sun(direction, sun_direction, sun_distance),
            Deflectors::Bodies(bodies) => deflect_by_bodies(bodies, observer, direction),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Deflectors::None => true,
            Deflectors::Sun => false,
            Deflectors::Bodies(bodies) => bodies.is_empty(),
        }
    }
}

/// Deflection of light by a single body
///
/// # Arguments
/// * `mass` - Mass of the body (solar masses)
/// * `direction` - Unit vector from the observer to the source
/// * `source` - Unit vector from the body to the source
/// * `body_to_observer` - Unit vector from the body to the observer
/// * `distance` - Distance from the body to the observer (AU)
/// * `limiter` - Deflection limiter (radians^2)
///
/// The result is not renormalized; the change in length is of second order
/// in the deflection.
pub fn deflect_by_body(
    mass: f64,
    direction: &Vector3<f64>,
    source: &Vector3<f64>,
    body_to_observer: &Vector3<f64>,
    distance: f64,
    limiter: f64,
) -> Vector3<f64> {
    let qdqpe = source.dot(&(source + body_to_observer));
    let w = mass * SUN_SCHWARZSCHILD_AU / distance / qdqpe.max(limiter);

    let eq = body_to_observer.cross(source);
    direction + direction.cross(&eq) * w
}

/// Deflection of a star direction by a sequence of bodies
///
/// Each body acts on the direction already deflected by the bodies before
/// it, so the order must follow the light path (furthest body first).
pub fn deflect_by_bodies(
    bodies: &[DeflectingBody],
    observer: &Vector3<f64>,
    direction: &Vector3<f64>,
) -> Vector3<f64> {
    bodies.iter().enumerate().fold(*direction, |sn, (i, body)| {
        let deflected = body.deflect(observer, &sn);
        trace!(
            "body {} (mass {:e}) deflected by {:e} rad",
            i,
            body.mass,
            (deflected - sn).norm()
        );
        deflected
    })
}

/// Deflection of a star direction by the Sun alone
///
/// The limiter shrinks as the observer moves beyond 1 AU, so observers far
/// out in the solar system can look closer to the Sun before it applies.
pub fn deflect_by_sun(
    direction: &Vector3<f64>,
    sun_direction: &Vector3<f64>,
    sun_distance: f64,
) -> Vector3<f64> {
    let limiter = SUN_LIMITER_AT_1AU / (sun_distance * sun_distance).max(1.0);
    deflect_by_body(1.0, direction, direction, sun_direction, sun_distance, limiter)
}
