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
//! Position of the basis nucleosomes on the fiber super helix.

use super::helix_math::{rotate_row, rotation_z};
use super::parameters::FiberHelix;
use ultraviolet::{DMat3, DVec3};

/// The frame of one basis nucleosome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NucleosomeFrame {
    /// Center of the histone cylinder.
    pub center: DVec3,
    /// The matrix `Rz(-nΔ)`, applied in row-vector convention to go from the nucleosome local
    /// frame to the global frame.
    pub inverse_rotation: DMat3,
    /// Position of the nucleosome on the fiber helix.
    pub translation: DVec3,
}

impl NucleosomeFrame {
    /// Compute the frame of the `n`-th nucleosome of the fiber helix.
    pub fn new(fiber: &FiberHelix, n: usize) -> Self {
        let angle = n as f64 * fiber.delta_angle();
        let translation = DVec3::new(
            fiber.central_radius * angle.cos(),
            fiber.central_radius * angle.sin(),
            n as f64 * fiber.z_shift(),
        );
        let inverse_rotation = rotation_z(-angle);
        let histone_offset = DVec3::new(0., 0., fiber.histone_z_offset);
        let center = rotate_row(histone_offset, &inverse_rotation) + translation;
        Self {
            center,
            inverse_rotation,
            translation,
        }
    }

    /// Express a point of the nucleosome local frame in the global frame.
    pub fn to_global(&self, local: DVec3) -> DVec3 {
        rotate_row(local, &self.inverse_rotation) + self.translation
    }

    /// Inverse of [`Self::to_global`].
    pub fn to_local(&self, global: DVec3) -> DVec3 {
        self.inverse_rotation * (global - self.translation)
    }
}

/// The frames of the basis nucleosomes.
pub fn calculate_nucleosome_frames(fiber: &FiberHelix) -> Vec<NucleosomeFrame> {
    (0..fiber.basis_nucleosomes)
        .map(|n| NucleosomeFrame::new(fiber, n))
        .collect()
}
