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
//! The solid modeling operations needed to build the fiber.
//!
//! The fiber is described through the [`GeometryKernel`] trait so that the placement and
//! cutting algorithms do not depend on a particular solid modeling backend. [`CsgKernel`] is
//! the built-in implementation.

mod csg;
mod solid;

pub use csg::{CsgKernel, LogicalVolume, Placement};
pub use solid::{Inside, Solid};

use super::helix_math::rotate_row;
use ultraviolet::{DMat3, DVec3};

/// Distance under which a point is considered to be on the surface of a solid.
pub const KERNEL_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SolidId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlacementId(pub usize);

#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("no solid with id {0}")]
    UnknownSolid(usize),
    #[error("no logical volume with id {0}")]
    UnknownLogical(usize),
    #[error("no placement with id {0}")]
    UnknownPlacement(usize),
    #[error("could not sample the surface of solid {0}")]
    NoSurfacePoint(String),
}

/// A rigid transformation. `rotation` is the active rotation applied to the object before the
/// translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub rotation: DMat3,
    pub translation: DVec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            rotation: DMat3::identity(),
            translation: DVec3::zero(),
        }
    }

    pub fn translation(translation: DVec3) -> Self {
        Self {
            rotation: DMat3::identity(),
            translation,
        }
    }

    pub fn new(rotation: DMat3, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Map a point of the object frame to the parent frame.
    pub fn apply(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }

    /// Map a point of the parent frame to the object frame.
    pub fn inverse_apply(&self, point: DVec3) -> DVec3 {
        rotate_row(point - self.translation, &self.rotation)
    }

    /// The transform `self ∘ other`.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.apply(other.translation),
        }
    }
}

/// The operations of a solid modeling backend.
pub trait GeometryKernel {
    fn orb(&mut self, name: &str, radius: f64) -> SolidId;
    /// A box of half lengths `half`.
    fn cuboid(&mut self, name: &str, half: DVec3) -> SolidId;
    /// A full cylinder along the z axis.
    fn tube(&mut self, name: &str, radius: f64, half_length: f64) -> SolidId;
    /// `a` minus `b` placed in the frame of `a` by `transform`.
    fn subtraction(
        &mut self,
        name: &str,
        a: SolidId,
        b: SolidId,
        transform: Transform,
    ) -> Result<SolidId, KernelError>;
    fn union(
        &mut self,
        name: &str,
        a: SolidId,
        b: SolidId,
        transform: Transform,
    ) -> Result<SolidId, KernelError>;
    fn cubic_volume(&self, solid: SolidId) -> Result<f64, KernelError>;
    fn logical_volume(&mut self, name: &str, solid: SolidId) -> Result<LogicalId, KernelError>;
    /// The logical volume instantiated by a placement.
    fn logical_of(&self, placement: PlacementId) -> Result<LogicalId, KernelError>;
    /// Place an instance of `logical` in `parent`. A placement without parent is a world
    /// volume.
    fn place(
        &mut self,
        name: &str,
        logical: LogicalId,
        transform: Transform,
        parent: Option<LogicalId>,
        copy_number: i64,
    ) -> Result<PlacementId, KernelError>;
    /// Return true iff the placement overlaps its mother volume or one of its siblings.
    ///
    /// `resolution` is the number of points sampled on the surface of the placed solid.
    fn check_overlaps(&self, placement: PlacementId, resolution: usize)
        -> Result<bool, KernelError>;
}
