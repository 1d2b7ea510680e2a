//! Relativistic corrections to star directions
//!
//! Stellar aberration from the observer's motion and gravitational light
//! deflection by solar-system bodies. Both act on unit direction vectors
//! and return unit (or very nearly unit) vectors.

pub mod aberration;
pub mod deflection;

pub use aberration::apply_aberration;
pub use deflection::{deflect_by_bodies, deflect_by_body, deflect_by_sun, DeflectingBody, Deflectors};
