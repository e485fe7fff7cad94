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
//! A small constructive solid geometry backend.

use super::solid::{transformed_extent, Extent};
use super::*;
use ahash::AHashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Side of the cells of the grids used to find the siblings of a placement.
const GRID_CELL_SIZE: f64 = 2.;
/// Placements covering more cells than this are tested against every point.
const MAX_GRID_CELLS: usize = 4096;
/// Number of random points used to estimate the volume of boolean solids.
const DEFAULT_VOLUME_SAMPLES: usize = 1_000_000;

type Cell = (i32, i32, i32);

fn cell_of(p: DVec3) -> Cell {
    (
        (p.x / GRID_CELL_SIZE).floor() as i32,
        (p.y / GRID_CELL_SIZE).floor() as i32,
        (p.z / GRID_CELL_SIZE).floor() as i32,
    )
}

/// Uniform grid of the daughters of a logical volume, indexed by their bounding boxes.
#[derive(Debug, Clone, Default)]
struct PlacementGrid {
    cells: AHashMap<Cell, Vec<PlacementId>>,
    oversized: Vec<PlacementId>,
}

impl PlacementGrid {
    fn insert(&mut self, id: PlacementId, extent: Extent) {
        let (min, max) = (cell_of(extent.0), cell_of(extent.1));
        let nb_cells = (max.0 - min.0 + 1) as usize
            * (max.1 - min.1 + 1) as usize
            * (max.2 - min.2 + 1) as usize;
        if nb_cells > MAX_GRID_CELLS {
            self.oversized.push(id);
            return;
        }
        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                for z in min.2..=max.2 {
                    self.cells.entry((x, y, z)).or_default().push(id);
                }
            }
        }
    }

    fn candidates(&self, p: DVec3) -> impl Iterator<Item = &PlacementId> {
        self.cells
            .get(&cell_of(p))
            .into_iter()
            .flatten()
            .chain(self.oversized.iter())
    }
}

#[derive(Debug, Clone)]
pub struct LogicalVolume {
    pub name: String,
    pub solid: SolidId,
    pub daughters: Vec<PlacementId>,
    grid: PlacementGrid,
}

#[derive(Debug, Clone)]
pub struct Placement {
    pub name: String,
    pub logical: LogicalId,
    pub parent: Option<LogicalId>,
    pub transform: Transform,
    pub copy_number: i64,
}

/// The built-in [`GeometryKernel`].
#[derive(Debug, Clone)]
pub struct CsgKernel {
    solids: Vec<Solid>,
    solid_names: Vec<String>,
    logicals: Vec<LogicalVolume>,
    placements: Vec<Placement>,
    seed: u64,
    volume_samples: usize,
}

impl Default for CsgKernel {
    fn default() -> Self {
        Self::new(0)
    }
}

impl CsgKernel {
    /// A new kernel. `seed` initializes the random generators used for the Monte Carlo volume
    /// estimations and the overlap checks.
    pub fn new(seed: u64) -> Self {
        Self {
            solids: Vec::new(),
            solid_names: Vec::new(),
            logicals: Vec::new(),
            placements: Vec::new(),
            seed,
            volume_samples: DEFAULT_VOLUME_SAMPLES,
        }
    }

    pub fn with_volume_samples(mut self, volume_samples: usize) -> Self {
        self.volume_samples = volume_samples;
        self
    }

    fn push_solid(&mut self, name: &str, solid: Solid) -> SolidId {
        self.solids.push(solid);
        self.solid_names.push(name.to_string());
        SolidId(self.solids.len() - 1)
    }

    pub fn solid(&self, id: SolidId) -> Result<&Solid, KernelError> {
        self.solids.get(id.0).ok_or(KernelError::UnknownSolid(id.0))
    }

    pub fn solid_name(&self, id: SolidId) -> Result<&str, KernelError> {
        self.solid_names
            .get(id.0)
            .map(String::as_str)
            .ok_or(KernelError::UnknownSolid(id.0))
    }

    pub fn logical(&self, id: LogicalId) -> Result<&LogicalVolume, KernelError> {
        self.logicals
            .get(id.0)
            .ok_or(KernelError::UnknownLogical(id.0))
    }

    pub fn placement(&self, id: PlacementId) -> Result<&Placement, KernelError> {
        self.placements
            .get(id.0)
            .ok_or(KernelError::UnknownPlacement(id.0))
    }

    pub fn nb_solids(&self) -> usize {
        self.solids.len()
    }

    pub fn nb_placements(&self) -> usize {
        self.placements.len()
    }

    pub fn placements(&self) -> impl Iterator<Item = (PlacementId, &Placement)> {
        self.placements
            .iter()
            .enumerate()
            .map(|(i, p)| (PlacementId(i), p))
    }

    /// Classify a point expressed in the frame of `solid`.
    pub fn inside(&self, solid: SolidId, p: DVec3) -> Result<Inside, KernelError> {
        Ok(self.solid(solid)?.inside(p, &self.solids))
    }

    fn boolean(
        &mut self,
        name: &str,
        a: SolidId,
        b: SolidId,
        transform: Transform,
        subtraction: bool,
    ) -> Result<SolidId, KernelError> {
        self.solid(a)?;
        self.solid(b)?;
        let solid = if subtraction {
            Solid::Subtraction {
                a: a.0,
                b: b.0,
                transform,
            }
        } else {
            Solid::Union {
                a: a.0,
                b: b.0,
                transform,
            }
        };
        Ok(self.push_solid(name, solid))
    }
}

impl GeometryKernel for CsgKernel {
    fn orb(&mut self, name: &str, radius: f64) -> SolidId {
        self.push_solid(name, Solid::Orb { radius })
    }

    fn cuboid(&mut self, name: &str, half: DVec3) -> SolidId {
        self.push_solid(name, Solid::Cuboid { half })
    }

    fn tube(&mut self, name: &str, radius: f64, half_length: f64) -> SolidId {
        self.push_solid(
            name,
            Solid::Tube {
                radius,
                half_length,
            },
        )
    }

    fn subtraction(
        &mut self,
        name: &str,
        a: SolidId,
        b: SolidId,
        transform: Transform,
    ) -> Result<SolidId, KernelError> {
        self.boolean(name, a, b, transform, true)
    }

    fn union(
        &mut self,
        name: &str,
        a: SolidId,
        b: SolidId,
        transform: Transform,
    ) -> Result<SolidId, KernelError> {
        self.boolean(name, a, b, transform, false)
    }

    fn cubic_volume(&self, solid: SolidId) -> Result<f64, KernelError> {
        let mut rng = StdRng::seed_from_u64(self.seed ^ solid.0 as u64);
        Ok(self
            .solid(solid)?
            .volume(&self.solids, self.volume_samples, &mut rng))
    }

    fn logical_volume(&mut self, name: &str, solid: SolidId) -> Result<LogicalId, KernelError> {
        self.solid(solid)?;
        self.logicals.push(LogicalVolume {
            name: name.to_string(),
            solid,
            daughters: Vec::new(),
            grid: Default::default(),
        });
        Ok(LogicalId(self.logicals.len() - 1))
    }

    fn logical_of(&self, placement: PlacementId) -> Result<LogicalId, KernelError> {
        Ok(self.placement(placement)?.logical)
    }

    fn place(
        &mut self,
        name: &str,
        logical: LogicalId,
        transform: Transform,
        parent: Option<LogicalId>,
        copy_number: i64,
    ) -> Result<PlacementId, KernelError> {
        let solid = self.logical(logical)?.solid;
        let extent = transformed_extent(self.solid(solid)?.extent(&self.solids), &transform);
        let id = PlacementId(self.placements.len());
        if let Some(parent) = parent {
            let mother = self
                .logicals
                .get_mut(parent.0)
                .ok_or(KernelError::UnknownLogical(parent.0))?;
            mother.daughters.push(id);
            mother.grid.insert(id, extent);
        }
        self.placements.push(Placement {
            name: name.to_string(),
            logical,
            parent,
            transform,
            copy_number,
        });
        Ok(id)
    }

    fn check_overlaps(
        &self,
        placement: PlacementId,
        resolution: usize,
    ) -> Result<bool, KernelError> {
        let p = self.placement(placement)?;
        let parent = match p.parent {
            Some(parent) => self.logical(parent)?,
            None => return Ok(false),
        };
        let solid = self.solid(self.logical(p.logical)?.solid)?;
        let mother_solid = self.solid(parent.solid)?;
        let mut rng = StdRng::seed_from_u64(self.seed ^ placement.0 as u64);
        let mut missed = 0;
        for _ in 0..resolution {
            let local = if let Some(point) = solid.point_on_surface(&self.solids, &mut rng) {
                point
            } else {
                missed += 1;
                continue;
            };
            let point = p.transform.apply(local);
            if mother_solid.inside(point, &self.solids) == Inside::Outside {
                log::warn!(
                    "Overlap is detected for volume {}:{} with its mother volume {}, local point {:?}",
                    p.name,
                    p.copy_number,
                    parent.name,
                    local
                );
                return Ok(true);
            }
            for sibling_id in parent.grid.candidates(point) {
                if *sibling_id == placement {
                    continue;
                }
                let sibling = self.placement(*sibling_id)?;
                let sibling_solid = self.solid(self.logical(sibling.logical)?.solid)?;
                let in_sibling = sibling_solid.inside(
                    sibling.transform.inverse_apply(point),
                    &self.solids,
                );
                if in_sibling == Inside::Inside {
                    log::warn!(
                        "Overlap is detected for volume {}:{} with {}:{}, local point {:?}",
                        p.name,
                        p.copy_number,
                        sibling.name,
                        sibling.copy_number,
                        local
                    );
                    return Ok(true);
                }
            }
        }
        if missed == resolution && resolution > 0 {
            return Err(KernelError::NoSurfacePoint(p.name.clone()));
        }
        log::debug!("Checking overlaps for volume {}:{} ... OK!", p.name, p.copy_number);
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(kernel: &mut CsgKernel) -> LogicalId {
        let solid = kernel.cuboid("world", DVec3::broadcast(10.));
        let logical = kernel.logical_volume("world", solid).unwrap();
        kernel
            .place("world", logical, Transform::identity(), None, 0)
            .unwrap();
        logical
    }

    #[test]
    fn disjoint_orbs_do_not_overlap() {
        let mut kernel = CsgKernel::new(1);
        let world = world(&mut kernel);
        let orb = kernel.orb("orb", 1.);
        let logical = kernel.logical_volume("orb", orb).unwrap();
        let a = kernel
            .place("a", logical, Transform::identity(), Some(world), 1)
            .unwrap();
        let b = kernel
            .place(
                "b",
                logical,
                Transform::translation(DVec3::new(2.5, 0., 0.)),
                Some(world),
                2,
            )
            .unwrap();
        assert!(!kernel.check_overlaps(a, 1000).unwrap());
        assert!(!kernel.check_overlaps(b, 1000).unwrap());
    }

    #[test]
    fn intersecting_orbs_overlap() {
        let mut kernel = CsgKernel::new(1);
        let world = world(&mut kernel);
        let orb = kernel.orb("orb", 1.);
        let logical = kernel.logical_volume("orb", orb).unwrap();
        kernel
            .place("a", logical, Transform::identity(), Some(world), 1)
            .unwrap();
        let b = kernel
            .place(
                "b",
                logical,
                Transform::translation(DVec3::new(1.5, 0., 0.)),
                Some(world),
                2,
            )
            .unwrap();
        assert!(kernel.check_overlaps(b, 1000).unwrap());
    }

    #[test]
    fn volume_protruding_from_mother_overlaps() {
        let mut kernel = CsgKernel::new(1);
        let world = world(&mut kernel);
        let orb = kernel.orb("orb", 1.);
        let logical = kernel.logical_volume("orb", orb).unwrap();
        let a = kernel
            .place(
                "a",
                logical,
                Transform::translation(DVec3::new(9.5, 0., 0.)),
                Some(world),
                1,
            )
            .unwrap();
        assert!(kernel.check_overlaps(a, 1000).unwrap());
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut kernel = CsgKernel::new(0);
        assert!(kernel.logical_volume("x", SolidId(3)).is_err());
        assert!(kernel.check_overlaps(PlacementId(0), 10).is_err());
        let orb = kernel.orb("orb", 1.);
        assert!(kernel
            .subtraction("cut", orb, SolidId(7), Transform::identity())
            .is_err());
    }
}
