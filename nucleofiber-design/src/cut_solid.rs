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
//! Resolution of the overlaps between residue spheres.
//!
//! A sphere that intersects one of its neighbours is cut by a box whose face lies on the plane
//! of the intersection circle of the two spheres. Successive cuts are applied to the same solid,
//! so a residue overlapping several neighbours becomes a sphere with several flat faces.

use super::base_pairs::ResidueId;
use super::helix_math::{rotation_about_axis, rotation_z};
use super::kernel::{GeometryKernel, KernelError, SolidId, Transform};
use super::radius_map::{Neighbour, NeighbourSource};
use std::f64::consts::FRAC_PI_2;
use ultraviolet::{DMat3, DVec3};

/// Gap left between the face of a cut and the intersection plane, in nanometers.
pub const SLICE_SAFETY_MARGIN: f64 = 0.001;

#[derive(Debug, thiserror::Error)]
pub enum CutError {
    #[error("residue {reference:?} and residue {other:?} are both placed at {position:?}")]
    Coincident {
        reference: Option<ResidueId>,
        other: ResidueId,
        position: [f64; 3],
    },
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// The sphere to be cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueReference {
    pub position: DVec3,
    pub radius: f64,
    /// The residue of the radius map that this sphere represents, if any.
    pub id: Option<ResidueId>,
}

/// Recognize the entry of the radius map that is the reference sphere itself.
pub trait ResidueIdentity {
    fn is_self(&self, reference: &ResidueReference, candidate: &Neighbour, distance: f64) -> bool;
}

/// A neighbour at distance exactly zero is the reference itself.
///
/// The positions of the map and of the reference come from the same computation so they are
/// bitwise equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactPosition;

impl ResidueIdentity for ExactPosition {
    fn is_self(&self, _: &ResidueReference, _: &Neighbour, distance: f64) -> bool {
        distance == 0.
    }
}

/// Recognize the reference by its residue id.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedResidue;

impl ResidueIdentity for TaggedResidue {
    fn is_self(&self, reference: &ResidueReference, candidate: &Neighbour, _: f64) -> bool {
        reference.id == Some(candidate.id)
    }
}

/// A box subtracted from a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceCut {
    pub half_size: f64,
    /// Active rotation of the box. It maps the local z axis of the box on the direction from the
    /// center of the sphere to the neighbour.
    pub rotation: DMat3,
    /// Position of the center of the box relative to the center of the sphere.
    pub position: DVec3,
    pub neighbour: ResidueId,
}

impl SliceCut {
    fn transform(&self) -> Transform {
        Transform::new(self.rotation, self.position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CutSolid {
    Sphere { radius: f64 },
    Sliced { radius: f64, slices: Vec<SliceCut> },
}

impl CutSolid {
    pub fn radius(&self) -> f64 {
        match self {
            Self::Sphere { radius } | Self::Sliced { radius, .. } => *radius,
        }
    }

    pub fn slices(&self) -> &[SliceCut] {
        match self {
            Self::Sphere { .. } => &[],
            Self::Sliced { slices, .. } => slices,
        }
    }

    pub fn is_cut(&self) -> bool {
        !self.slices().is_empty()
    }

    /// Create the solid in `kernel`.
    pub fn build<K: GeometryKernel + ?Sized>(
        &self,
        kernel: &mut K,
        name: &str,
    ) -> Result<SolidId, KernelError> {
        let mut ret = kernel.orb(name, self.radius());
        for (i, slice) in self.slices().iter().enumerate() {
            let slice_box = kernel.cuboid(
                &format!("{}_slice{}", name, i),
                DVec3::broadcast(slice.half_size),
            );
            ret = kernel.subtraction(name, ret, slice_box, slice.transform())?;
        }
        Ok(ret)
    }
}

/// Orientation of a box whose local z axis points toward `direction`.
///
/// `phi` is the angle between `direction` and the z axis, `theta` the angle between its
/// projection on the xy plane and the x axis. The box is first turned by `-theta` around z, then
/// tilted by `phi` around the axis orthogonal to the projection.
pub fn slice_rotation(direction: DVec3) -> DMat3 {
    let length = direction.mag();
    let phi = (direction.z / length).clamp(-1., 1.).acos();
    let sin_phi = (FRAC_PI_2 - phi).cos();
    let theta = if sin_phi.abs() < f64::EPSILON {
        0.
    } else {
        let theta = (direction.x / (length * sin_phi)).clamp(-1., 1.).acos();
        if direction.y < 0. {
            -theta
        } else {
            theta
        }
    };
    let tilt_axis = DVec3::new((theta + FRAC_PI_2).cos(), (theta + FRAC_PI_2).sin(), 0.);
    rotation_about_axis(tilt_axis, phi) * rotation_z(-theta)
}

/// Computes the cut solids of residue spheres against a set of neighbours.
#[derive(Debug, Clone, Copy)]
pub struct OverlapResolver<I: ResidueIdentity> {
    identity: I,
    safety_margin: f64,
}

impl Default for OverlapResolver<ExactPosition> {
    fn default() -> Self {
        Self::new(ExactPosition, 1.)
    }
}

impl<I: ResidueIdentity> OverlapResolver<I> {
    pub fn new(identity: I, scale_factor: f64) -> Self {
        Self {
            identity,
            safety_margin: SLICE_SAFETY_MARGIN * scale_factor,
        }
    }

    /// The slice that removes from `reference` the part beyond the intersection plane with
    /// `neighbour`.
    fn slice(&self, reference: &ResidueReference, neighbour: &Neighbour, distance: f64) -> SliceCut {
        let half_size = reference.radius.max(neighbour.radius);
        let intersection = (reference.radius.powi(2) - neighbour.radius.powi(2)
            + distance.powi(2))
            / (2. * distance)
            + half_size
            - self.safety_margin;
        let direction = (neighbour.position - reference.position) / distance;
        let position = direction * intersection;
        SliceCut {
            half_size,
            rotation: slice_rotation(position),
            position,
            neighbour: neighbour.id,
        }
    }

    /// Cut `reference` by every neighbour that it overlaps.
    ///
    /// Fails if two entries of `neighbours` are at the position of the reference, or if an
    /// entry that is not the reference lies exactly at its center.
    pub fn resolve<S: NeighbourSource + ?Sized>(
        &self,
        reference: &ResidueReference,
        neighbours: &S,
    ) -> Result<CutSolid, CutError> {
        let mut found_self = false;
        let mut slices = Vec::new();
        for neighbour in neighbours.neighbours() {
            let distance = (reference.position - neighbour.position).mag();
            let coincident = || CutError::Coincident {
                reference: reference.id,
                other: neighbour.id,
                position: [
                    reference.position.x,
                    reference.position.y,
                    reference.position.z,
                ],
            };
            if self.identity.is_self(reference, &neighbour, distance) {
                if found_self {
                    return Err(coincident());
                }
                found_self = true;
                continue;
            }
            if distance == 0. {
                return Err(coincident());
            }
            if distance <= reference.radius + neighbour.radius {
                slices.push(self.slice(reference, &neighbour, distance));
            }
        }
        if slices.is_empty() {
            Ok(CutSolid::Sphere {
                radius: reference.radius,
            })
        } else {
            Ok(CutSolid::Sliced {
                radius: reference.radius,
                slices,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_pairs::ResidueSlot;
    use crate::helix_math::{is_orthonormal, ORTHONORMAL_TOLERANCE};

    fn id(base_pair: usize) -> ResidueId {
        ResidueId {
            nucleosome: 1,
            base_pair,
            slot: ResidueSlot::Phosphate1,
        }
    }

    fn reference() -> ResidueReference {
        ResidueReference {
            position: DVec3::new(1., 1., 1.),
            radius: 0.27,
            id: Some(id(0)),
        }
    }

    fn neighbour(position: DVec3, base_pair: usize) -> Neighbour {
        Neighbour {
            position,
            radius: 0.29,
            id: id(base_pair),
        }
    }

    #[test]
    fn far_neighbour_leaves_the_sphere_untouched() {
        let r = reference();
        let neighbours = vec![
            neighbour(r.position, 0),
            neighbour(r.position + DVec3::new(0.6, 0., 0.), 1),
        ];
        let solid = OverlapResolver::default().resolve(&r, &neighbours).unwrap();
        assert_eq!(solid, CutSolid::Sphere { radius: 0.27 });
    }

    #[test]
    fn tangent_spheres_are_cut() {
        // Exactly representable radii, the distance equals their sum.
        let r = ResidueReference {
            position: DVec3::zero(),
            radius: 0.25,
            id: Some(id(0)),
        };
        let neighbours = vec![
            Neighbour {
                position: DVec3::zero(),
                radius: 0.25,
                id: id(0),
            },
            Neighbour {
                position: DVec3::new(0.75, 0., 0.),
                radius: 0.5,
                id: id(1),
            },
            Neighbour {
                position: DVec3::new(0., -0.875, 0.),
                radius: 0.5,
                id: id(2),
            },
        ];
        let solid = OverlapResolver::default().resolve(&r, &neighbours).unwrap();
        assert_eq!(solid.slices().len(), 1);
        assert_eq!(solid.slices()[0].neighbour, id(1));
    }

    #[test]
    fn close_neighbour_cuts_the_sphere() {
        let r = reference();
        let neighbours = vec![
            neighbour(r.position, 0),
            neighbour(r.position + DVec3::new(0., 0.5, 0.), 1),
            neighbour(r.position + DVec3::new(0., 0., -0.55), 2),
        ];
        let solid = OverlapResolver::default().resolve(&r, &neighbours).unwrap();
        assert_eq!(solid.slices().len(), 2);
        let slice = solid.slices()[0];
        assert_eq!(slice.neighbour, id(1));
        assert!((slice.half_size - 0.29).abs() < 1e-12);
        let expected = (0.27f64.powi(2) - 0.29f64.powi(2) + 0.25) / 1. + 0.29 - 0.001;
        assert!((slice.position - DVec3::new(0., expected, 0.)).mag() < 1e-12);
    }

    #[test]
    fn second_self_match_is_an_error() {
        let r = reference();
        let neighbours = vec![neighbour(r.position, 0), neighbour(r.position, 3)];
        assert!(matches!(
            OverlapResolver::default().resolve(&r, &neighbours),
            Err(CutError::Coincident { .. })
        ));
    }

    #[test]
    fn tagged_identity_rejects_coincident_strangers() {
        let r = reference();
        let resolver = OverlapResolver::new(TaggedResidue, 1.);
        let ok = vec![
            neighbour(r.position, 0),
            neighbour(r.position + DVec3::new(0.3, 0., 0.), 1),
        ];
        assert_eq!(resolver.resolve(&r, &ok).unwrap().slices().len(), 1);
        let bad = vec![neighbour(r.position, 4)];
        assert!(resolver.resolve(&r, &bad).is_err());
    }

    #[test]
    fn slice_box_faces_the_neighbour() {
        let directions = [
            DVec3::new(1., 0., 0.),
            DVec3::new(0.3, -0.8, 0.2),
            DVec3::new(-0.5, 0.4, -0.7),
            DVec3::new(0., 0., 1.),
            DVec3::new(0., 0., -2.),
        ];
        for d in directions.iter() {
            let m = slice_rotation(*d);
            assert!(is_orthonormal(&m, ORTHONORMAL_TOLERANCE));
            let z = m * DVec3::unit_z();
            assert!((z - d.normalized()).mag() < 1e-9, "{:?} {:?}", z, d);
        }
    }
}
