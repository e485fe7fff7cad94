/*
NucleoFiber, atomistic chromatin fiber geometry and DNA damage scoring.
    Copyright (C) 2021  Nicolas Levy <nicolaspierrelevy@gmail.com> and Nicolas Schabanel <nicolas.schabanel@ens-lyon.fr>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
//! Rotation and polar-coordinate helpers used to wind base pairs around histones and to
//! replicate nucleosomes along the fiber.
//!
//! Most placement formulas are written with positions as *row* vectors multiplied on the right
//! by a rotation matrix (`v·M`). [`rotate_row`] implements that product so that the matrices
//! can be built exactly as they are described, e.g. `Rz(-iΔ)` for the i-th base pair.

use ultraviolet::{DMat3, DVec3};

/// Tolerance used when checking that a matrix is a rotation.
pub const ORTHONORMAL_TOLERANCE: f64 = 1e-9;

/// The rotation matrix of angle `angle` (in radians) around the z axis.
///
/// Applied to a column vector (`m * v`) this rotates counter-clockwise when looking down the z
/// axis.
pub fn rotation_z(angle: f64) -> DMat3 {
    let (s, c) = angle.sin_cos();
    DMat3::new(
        DVec3::new(c, s, 0.),
        DVec3::new(-s, c, 0.),
        DVec3::new(0., 0., 1.),
    )
}

/// The right-handed rotation of angle `angle` around `axis`. `axis` does not need to be
/// normalized but must not be zero.
pub fn rotation_about_axis(axis: DVec3, angle: f64) -> DMat3 {
    let k = axis.normalized();
    let (s, c) = angle.sin_cos();
    let t = 1. - c;
    DMat3::new(
        DVec3::new(t * k.x * k.x + c, t * k.x * k.y + s * k.z, t * k.x * k.z - s * k.y),
        DVec3::new(t * k.x * k.y - s * k.z, t * k.y * k.y + c, t * k.y * k.z + s * k.x),
        DVec3::new(t * k.x * k.z + s * k.y, t * k.y * k.z - s * k.x, t * k.z * k.z + c),
    )
}

/// The row-vector product `v·m`.
///
/// This is the same as applying the transpose of `m` to `v`, so for a rotation matrix it
/// applies the inverse rotation.
pub fn rotate_row(v: DVec3, m: &DMat3) -> DVec3 {
    m.transposed() * v
}

/// Rotate `v` by `angle` around the z axis.
pub fn rotate_z(v: DVec3, angle: f64) -> DVec3 {
    rotation_z(angle) * v
}

/// Angle between the x axis and the projection of `v` on the xy plane.
///
/// The result is in `[-π, π]` and is negative when `v.y < 0`. The projection of `v` must not be
/// the origin.
pub fn angle_to_x_axis(v: DVec3) -> f64 {
    let dxy = (v.x * v.x + v.y * v.y).sqrt();
    let angle = (v.x / dxy).acos();
    if v.y < 0. {
        -angle
    } else {
        angle
    }
}

/// Distance between `v` and the z axis.
pub fn radius_xy(v: DVec3) -> f64 {
    (v.x * v.x + v.y * v.y).sqrt()
}

pub fn determinant(m: &DMat3) -> f64 {
    m.cols[0].dot(m.cols[1].cross(m.cols[2]))
}

/// True iff `m` is a proper rotation up to `tolerance`.
pub fn is_orthonormal(m: &DMat3, tolerance: f64) -> bool {
    let c = &m.cols;
    let unit = c.iter().all(|col| (col.mag_sq() - 1.).abs() < tolerance);
    let orthogonal = c[0].dot(c[1]).abs() < tolerance
        && c[0].dot(c[2]).abs() < tolerance
        && c[1].dot(c[2]).abs() < tolerance;
    unit && orthogonal && (determinant(m) - 1.).abs() < tolerance
}

/// Polar decomposition of a residue offset around the local nucleotide axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarResidue {
    /// Distance to the z axis in the xy plane.
    pub radius_xy: f64,
    /// Angle of the xy projection with the x axis.
    pub initial_angle: f64,
    /// The z coordinate of the offset.
    pub initial_z: f64,
}

impl PolarResidue {
    pub fn from_offset(offset: DVec3) -> Self {
        Self {
            radius_xy: radius_xy(offset),
            initial_angle: angle_to_x_axis(offset),
            initial_z: offset.z,
        }
    }

    /// Position of the residue on the small helix after a rotation of `angle` around the local
    /// nucleotide axis.
    ///
    /// The canonical z coordinate becomes the local y coordinate: the small helix axis is the
    /// local y axis, tangent to the path around the histone.
    pub fn first_helix_point(&self, angle: f64) -> DVec3 {
        let a = angle + self.initial_angle;
        DVec3::new(
            self.radius_xy * a.cos(),
            self.initial_z,
            self.radius_xy * a.sin(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_close(a: DVec3, b: DVec3) {
        assert!((a - b).mag() < 1e-12, "{:?} != {:?}", a, b);
    }

    #[test]
    fn rotation_z_is_counter_clockwise() {
        let v = rotate_z(DVec3::unit_x(), FRAC_PI_2);
        assert_close(v, DVec3::unit_y());
    }

    #[test]
    fn row_product_applies_the_inverse_rotation() {
        let m = rotation_z(-0.7);
        let v = DVec3::new(1.3, -0.4, 2.);
        assert_close(rotate_row(v, &m), rotate_z(v, 0.7));
    }

    #[test]
    fn rotations_are_orthonormal() {
        for i in 0..50 {
            let angle = i as f64 * 0.37;
            assert!(is_orthonormal(&rotation_z(angle), ORTHONORMAL_TOLERANCE));
            let axis = DVec3::new(angle.cos(), 0.3, angle.sin() - 2.);
            assert!(is_orthonormal(
                &rotation_about_axis(axis, angle),
                ORTHONORMAL_TOLERANCE
            ));
        }
    }

    #[test]
    fn axis_rotation_matches_z_rotation() {
        let a = rotation_about_axis(DVec3::unit_z(), 1.1);
        let b = rotation_z(1.1);
        for (ca, cb) in a.cols.iter().zip(b.cols.iter()) {
            assert_close(*ca, *cb);
        }
    }

    #[test]
    fn angle_to_x_axis_is_signed() {
        assert!((angle_to_x_axis(DVec3::new(1., 1., 5.)) - PI / 4.).abs() < 1e-12);
        assert!((angle_to_x_axis(DVec3::new(1., -1., 5.)) + PI / 4.).abs() < 1e-12);
        assert!((angle_to_x_axis(DVec3::new(-1., 0., 0.)) - PI).abs() < 1e-12);
    }

    #[test]
    fn polar_residue_round_trip() {
        let offset = DVec3::new(-0.270308, -0.0308147, 0.0272545);
        let polar = PolarResidue::from_offset(offset);
        let p = polar.first_helix_point(0.);
        assert!((p.x - offset.x).abs() < 1e-12);
        assert!((p.z - offset.y).abs() < 1e-12);
        assert!((p.y - offset.z).abs() < 1e-12);
    }

    #[test]
    fn first_helix_keeps_the_radius() {
        let polar = PolarResidue::from_offset(DVec3::new(0.863185, -0.209463, -0.211519));
        for i in 0..20 {
            let p = polar.first_helix_point(i as f64 * 0.6);
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!((r - polar.radius_xy).abs() < 1e-12);
        }
    }
}
