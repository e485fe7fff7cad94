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
//! Atomistic geometry of a chromatin fiber.
//!
//! The base pairs of three basis nucleosomes are computed on the fiber super helix. The residue
//! spheres of the middle one are cut against their neighbours, and instanced along the whole
//! fiber by a [`FiberAssembler`].

#[macro_use]
extern crate serde_derive;
extern crate serde;

/// Re-export ultraviolet for linear algebra
pub use ultraviolet;

pub mod assembler;
pub mod base_pairs;
pub mod copy_number;
pub mod cut_solid;
pub mod helix_math;
pub mod kernel;
pub mod nucleosomes;
mod parameters;
pub mod radius_map;

pub use assembler::{
    mean_residue_volumes, AssemblyError, AssemblyOptions, FiberAssembler, FiberVolumes,
    LedgerEntry, PositionLedger, RotationMode,
};
pub use base_pairs::{BasePairPlacement, ResidueId, ResidueKind, ResidueSlot};
pub use copy_number::{CopyNumberError, DecodedCopyNumber, ResidueCode};
pub use cut_solid::{CutError, CutSolid, ExactPosition, OverlapResolver, TaggedResidue};
pub use kernel::{CsgKernel, GeometryKernel, KernelError, LogicalId, Transform};
pub use parameters::*;

#[cfg(test)]
mod tests;
