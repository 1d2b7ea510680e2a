//! Rotation matrices between celestial and terrestrial frames
//!
//! All elementary rotations here are *frame* (passive) rotations: rotating the
//! axes by a positive angle moves the apparent position of a fixed vector the
//! other way. Composite matrices are built by premultiplying, so the first
//! rotation applied is the rightmost factor.

use nalgebra::{Matrix3, Vector3};

/// Frame rotation about the x-axis by `angle` radians
pub fn rotation_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, c, s, //
        0.0, -s, c,
    )
}

/// Frame rotation about the y-axis by `angle` radians
pub fn rotation_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, 0.0, -s, //
        0.0, 1.0, 0.0, //
        s, 0.0, c,
    )
}

/// Frame rotation about the z-axis by `angle` radians
pub fn rotation_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, s, 0.0, //
        -s, c, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// Build the rotation matrix described by a rotation vector
///
/// The vector's direction is the Euler axis and its length the angle in
/// radians. A null vector gives the identity.
pub fn rotation_vector_to_matrix(w: &Vector3<f64>) -> Matrix3<f64> {
    let phi = w.norm();
    let (s, c) = phi.sin_cos();
    let f = 1.0 - c;

    let (x, y, z) = if phi > 0.0 {
        (w.x / phi, w.y / phi, w.z / phi)
    } else {
        (w.x, w.y, w.z)
    };

    Matrix3::new(
        x * x * f + c,
        x * y * f + z * s,
        x * z * f - y * s,
        y * x * f - z * s,
        y * y * f + c,
        y * z * f + x * s,
        z * x * f + y * s,
        z * y * f - x * s,
        z * z * f + c,
    )
}

/// Recover the rotation vector of a rotation matrix
pub fn matrix_to_rotation_vector(r: &Matrix3<f64>) -> Vector3<f64> {
    let x = r[(1, 2)] - r[(2, 1)];
    let y = r[(2, 0)] - r[(0, 2)];
    let z = r[(0, 1)] - r[(1, 0)];
    let s2 = (x * x + y * y + z * z).sqrt();
    if s2 > 0.0 {
        let c2 = r[(0, 0)] + r[(1, 1)] + r[(2, 2)] - 1.0;
        let f = s2.atan2(c2) / s2;
        Vector3::new(x * f, y * f, z * f)
    } else {
        Vector3::zeros()
    }
}

/// Celestial-to-intermediate matrix from the CIP coordinates and CIO locator
///
/// `x` and `y` are the coordinates of the Celestial Intermediate Pole in the
/// GCRS and `s` the CIO locator, all in radians. The result rotates GCRS
/// vectors into CIRS.
pub fn celestial_to_intermediate(x: f64, y: f64, s: f64) -> Matrix3<f64> {
    let r2 = x * x + y * y;
    let e = if r2 > 0.0 { y.atan2(x) } else { 0.0 };
    let d = (r2 / (1.0 - r2)).sqrt().atan();
    rotation_z(-(e + s)) * rotation_y(d) * rotation_z(e)
}

/// Polar-motion matrix, rotating TIRS vectors into ITRS
///
/// `xp`, `yp` are the pole coordinates and `sp` the TIO locator s', radians.
pub fn polar_motion_matrix(xp: f64, yp: f64, sp: f64) -> Matrix3<f64> {
    rotation_x(-yp) * rotation_y(-xp) * rotation_z(sp)
}

/// Position angle of direction `b` as seen from direction `a`
///
/// Measured from north through east, in radians in (-π, π]. Neither vector
/// needs to be a unit vector; a null input gives zero.
pub fn position_angle(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let am = a.norm();
    let bm = b.norm();

    let (st, ct) = if am == 0.0 || bm == 0.0 {
        (0.0, 1.0)
    } else {
        let au = a / am;
        // "North" and "east" axes tangential to a
        let eta = Vector3::new(-a.x * a.z, -a.y * a.z, a.x * a.x + a.y * a.y);
        let xi = eta.cross(&au);

        let a2b = b - a;
        let st = a2b.dot(&xi);
        let ct = a2b.dot(&eta);
        if st == 0.0 && ct == 0.0 {
            (st, 1.0)
        } else {
            (st, ct)
        }
    };

    st.atan2(ct)
}
