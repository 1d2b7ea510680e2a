//! Star place transforms
//!
//! Functions here move star directions between the catalog frame (ICRS),
//! the intermediate frames (GCRS/CIRS) and observed places, using an
//! [`AstrometryContext`](crate::astrometry::AstrometryContext) built once
//! for the observer and epoch.

pub mod catalog;
pub mod observed;

pub use catalog::{
    apply_proper_motion_parallax, cirs_to_icrs, forward_direction, icrs_to_cirs,
    inverse_direction,
};
pub use observed::{
    cirs_to_observed, icrs_to_observed, observed_to_cirs, observed_to_icrs, ObservedCoordinates,
    ObservedPlace,
};
