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
//! Lookup of every residue sphere of the basis nucleosomes, keyed by its exact position.

use super::base_pairs::{BasePairPlacement, ResidueId};
use super::parameters::ResidueRadii;
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;
use ultraviolet::DVec3;

/// An exact position, ordered lexicographically.
pub type CoordKey = (OrderedFloat<f64>, OrderedFloat<f64>, OrderedFloat<f64>);

pub fn coord_key(v: DVec3) -> CoordKey {
    (OrderedFloat(v.x), OrderedFloat(v.y), OrderedFloat(v.z))
}

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("residues {first:?} and {second:?} are both at position {position:?}")]
    Duplicate {
        position: [f64; 3],
        first: ResidueId,
        second: ResidueId,
    },
}

/// A residue sphere that may overlap the sphere being cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    pub position: DVec3,
    pub radius: f64,
    pub id: ResidueId,
}

/// A collection of candidate neighbours for the overlap resolution.
pub trait NeighbourSource {
    fn neighbours(&self) -> Box<dyn Iterator<Item = Neighbour> + '_>;
    fn nb_neighbours(&self) -> usize;
}

impl NeighbourSource for [Neighbour] {
    fn neighbours(&self) -> Box<dyn Iterator<Item = Neighbour> + '_> {
        Box::new(self.iter().cloned())
    }

    fn nb_neighbours(&self) -> usize {
        self.len()
    }
}

impl NeighbourSource for Vec<Neighbour> {
    fn neighbours(&self) -> Box<dyn Iterator<Item = Neighbour> + '_> {
        self.as_slice().neighbours()
    }

    fn nb_neighbours(&self) -> usize {
        self.len()
    }
}

/// Map from the position of every residue to its radius.
///
/// Radii are the static residue radii, not the hydration shell ones.
#[derive(Debug, Clone, Default)]
pub struct CoordRadiusMap {
    entries: BTreeMap<CoordKey, (f64, ResidueId)>,
}

impl CoordRadiusMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a residue to the map. Two residues are never allowed at the same position.
    pub fn insert(&mut self, position: DVec3, radius: f64, id: ResidueId) -> Result<(), MapError> {
        let key = coord_key(position);
        if let Some((_, first)) = self.entries.get(&key) {
            return Err(MapError::Duplicate {
                position: [position.x, position.y, position.z],
                first: *first,
                second: id,
            });
        }
        self.entries.insert(key, (radius, id));
        Ok(())
    }

    /// Flatten the six residues of every base pair of every basis nucleosome.
    pub fn from_dna(
        dna: &[Vec<BasePairPlacement>],
        radii: &ResidueRadii,
    ) -> Result<Self, MapError> {
        let mut ret = Self::new();
        for (nucleosome, base_pairs) in dna.iter().enumerate() {
            for (base_pair, bp) in base_pairs.iter().enumerate() {
                for (slot, position) in bp.residues() {
                    let id = ResidueId {
                        nucleosome,
                        base_pair,
                        slot,
                    };
                    ret.insert(position, slot.radius(radii), id)?;
                }
            }
        }
        log::debug!("radius map contains {} residues", ret.len());
        Ok(ret)
    }

    pub fn get(&self, position: DVec3) -> Option<f64> {
        self.entries.get(&coord_key(position)).map(|(r, _)| *r)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NeighbourSource for CoordRadiusMap {
    fn neighbours(&self) -> Box<dyn Iterator<Item = Neighbour> + '_> {
        Box::new(self.entries.iter().map(|((x, y, z), (radius, id))| Neighbour {
            position: DVec3::new(x.0, y.0, z.0),
            radius: *radius,
            id: *id,
        }))
    }

    fn nb_neighbours(&self) -> usize {
        self.len()
    }
}
