//! Reference frame rotations
//!
//! Elementary and composite rotation matrices used to move directions
//! between the celestial, intermediate and terrestrial frames, plus the
//! FK5 to Hipparcos frame tie.

pub mod fk5;
pub mod rotations;

pub use fk5::{fk5_hipparcos_rotation, fk5_to_hipparcos, hipparcos_to_fk5};
pub use rotations::{
    celestial_to_intermediate, matrix_to_rotation_vector, polar_motion_matrix, position_angle,
    rotation_vector_to_matrix, rotation_x, rotation_y, rotation_z,
};
