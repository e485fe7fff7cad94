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
//! Assembly of the complete fiber from the middle basis nucleosome.
//!
//! The residues of the middle basis nucleosome are cut once, and every nucleosome of the fiber
//! is an instance of these cut solids rotated around the fiber axis and shifted along it.

use super::base_pairs::{calculate_dna_positions, BasePairPlacement, ResidueId, ResidueSlot};
use super::copy_number::{encode, RESIDUE_FACTOR};
use super::cut_solid::{
    CutError, CutSolid, ExactPosition, OverlapResolver, ResidueIdentity, ResidueReference,
};
use super::helix_math::{rotate_z, rotation_z};
use super::kernel::{GeometryKernel, KernelError, LogicalId, PlacementId, SolidId, Transform};
use super::nucleosomes::{calculate_nucleosome_frames, NucleosomeFrame};
use super::parameters::{GeometryParameters, ParameterError, ParameterSource};
use super::radius_map::{CoordRadiusMap, MapError};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;
use ultraviolet::DVec3;

pub const OVERLAP_MESSAGE: &str = "quitting due to the above geometry overlap problem. If you still want the geometry tests to continue, set the parameter QuitIfOverlapDetected to false";

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Cut(#[from] CutError),
    #[error(transparent)]
    Kernel(#[from] KernelError),
    #[error("{volume}:{copy_number}: {}", OVERLAP_MESSAGE)]
    Overlap { volume: String, copy_number: i64 },
    #[error("{requested} base pairs per nucleosome requested but only {available} are computed")]
    TooManyBasePairs { requested: usize, available: usize },
    #[error("{0} base pairs do not fit in the copy numbers of the residues")]
    TooManyNucleotides(usize),
}

/// How the residues of the middle basis nucleosome are brought to each nucleosome of the fiber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationMode {
    /// The rotation of the i-th nucleosome is computed from its angle.
    Absolute,
    /// The positions are rotated by one step at each nucleosome, accumulating rounding errors.
    Incremental,
}

/// Options of the fiber construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssemblyOptions {
    pub base_pairs_per_nucleosome: usize,
    pub nucleosomes_per_fiber: usize,
    pub cut_volumes: bool,
    pub check_overlaps: bool,
    pub overlap_resolution: usize,
    pub quit_if_overlap: bool,
    pub use_native_volumes: bool,
    pub build_hydration_shells: bool,
    pub rotation_mode: RotationMode,
    /// Radius of the fiber container, in nm.
    pub fiber_radius: f64,
    /// Half length of the fiber container, in nm.
    pub fiber_half_length: f64,
    pub overlap_seed: u64,
}

impl AssemblyOptions {
    pub const DEFAULT: AssemblyOptions = AssemblyOptions {
        base_pairs_per_nucleosome: 200,
        nucleosomes_per_fiber: 90,
        cut_volumes: true,
        check_overlaps: false,
        overlap_resolution: 1000,
        quit_if_overlap: true,
        use_native_volumes: true,
        build_hydration_shells: false,
        rotation_mode: RotationMode::Absolute,
        fiber_radius: 17.,
        fiber_half_length: 68.,
        overlap_seed: 0,
    };

    pub fn from_source<S: ParameterSource + ?Sized>(source: &S) -> Result<Self, ParameterError> {
        let d = Self::DEFAULT;
        let (fiber_radius, fiber_half_length) = match source.double_vector("FiberDimensions")? {
            None => (d.fiber_radius, d.fiber_half_length),
            Some(v) if v.len() == 2 && v[0] > 0. && v[1] > 0. => (v[0], v[1]),
            Some(v) => {
                return Err(ParameterError::OutOfRange {
                    name: String::from("FiberDimensions"),
                    reason: format!("expected a positive radius and half length, got {:?}", v),
                })
            }
        };
        let rotation_mode = if source.boolean_or("IncrementalFiberRotation", false)? {
            RotationMode::Incremental
        } else {
            RotationMode::Absolute
        };
        Ok(Self {
            base_pairs_per_nucleosome: source
                .count_or("DnaNumBpPerNucleosome", d.base_pairs_per_nucleosome)?,
            nucleosomes_per_fiber: source
                .count_or("DnaNumNucleosomePerFiber", d.nucleosomes_per_fiber)?,
            cut_volumes: source.boolean_or("CutVolumes", d.cut_volumes)?,
            check_overlaps: source.boolean_or("CheckForOverlaps", d.check_overlaps)?,
            overlap_resolution: source
                .count_or("CheckForOverlapsResolution", d.overlap_resolution)?,
            quit_if_overlap: source.boolean_or("QuitIfOverlapDetected", d.quit_if_overlap)?,
            use_native_volumes: source.boolean_or("UseNativeVolumes", d.use_native_volumes)?,
            build_hydration_shells: source
                .boolean_or("BuildHydrationShells", d.build_hydration_shells)?,
            rotation_mode,
            fiber_radius,
            fiber_half_length,
            overlap_seed: source.count_or("OverlapSamplingSeed", 0)? as u64,
        })
    }

    /// A placement strategy matching `self.use_native_volumes`.
    pub fn placement_strategy(&self) -> Box<dyn PlacementStrategy> {
        if self.use_native_volumes {
            Box::new(NativeVolumes::default())
        } else {
            Box::new(ComponentVolumes::default())
        }
    }
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One placed residue of the position ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub index: i64,
    /// 1 or 2 for residues, 0 for histones.
    pub strand: i64,
}

/// Positions of every placed volume, grouped by kind of residue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionLedger {
    entries: BTreeMap<String, Vec<LedgerEntry>>,
}

impl PositionLedger {
    pub fn push(&mut self, key: &str, position: DVec3, index: i64, strand: i64) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .push(LedgerEntry {
                x: position.x,
                y: position.y,
                z: position.z,
                index,
                strand,
            })
    }

    pub fn get(&self, key: &str) -> Option<&[LedgerEntry]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LedgerEntry])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn nb_entries(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear()
    }
}

/// The way components are attached to the fiber container.
pub trait PlacementStrategy {
    /// Prepare the placement of the components of the fiber, whose container is `fiber`. Return
    /// the logical volume in which the components are placed.
    fn open_fiber(
        &mut self,
        kernel: &mut dyn GeometryKernel,
        fiber: LogicalId,
        envelope: LogicalId,
    ) -> Result<LogicalId, KernelError>;

    fn place_component(
        &mut self,
        kernel: &mut dyn GeometryKernel,
        name: &str,
        logical: LogicalId,
        transform: Transform,
        copy_number: i64,
    ) -> Result<PlacementId, KernelError>;

    /// Finish the fiber and return its placement in the envelope.
    fn close_fiber(&mut self, kernel: &mut dyn GeometryKernel) -> Result<PlacementId, KernelError>;
}

/// Fill the fiber logical volume, then place it in the envelope.
#[derive(Debug, Default)]
pub struct NativeVolumes {
    fiber: Option<(LogicalId, LogicalId)>,
}

impl PlacementStrategy for NativeVolumes {
    fn open_fiber(
        &mut self,
        _: &mut dyn GeometryKernel,
        fiber: LogicalId,
        envelope: LogicalId,
    ) -> Result<LogicalId, KernelError> {
        self.fiber = Some((fiber, envelope));
        Ok(fiber)
    }

    fn place_component(
        &mut self,
        kernel: &mut dyn GeometryKernel,
        name: &str,
        logical: LogicalId,
        transform: Transform,
        copy_number: i64,
    ) -> Result<PlacementId, KernelError> {
        let (fiber, _) = self.fiber.ok_or(KernelError::UnknownLogical(usize::MAX))?;
        kernel.place(name, logical, transform, Some(fiber), copy_number)
    }

    fn close_fiber(&mut self, kernel: &mut dyn GeometryKernel) -> Result<PlacementId, KernelError> {
        let (fiber, envelope) = self.fiber.ok_or(KernelError::UnknownLogical(usize::MAX))?;
        kernel.place("Fiber", fiber, Transform::identity(), Some(envelope), 0)
    }
}

/// Place the fiber in the envelope first, then attach the components to the placed fiber.
#[derive(Debug, Default)]
pub struct ComponentVolumes {
    fiber: Option<PlacementId>,
}

impl PlacementStrategy for ComponentVolumes {
    fn open_fiber(
        &mut self,
        kernel: &mut dyn GeometryKernel,
        fiber: LogicalId,
        envelope: LogicalId,
    ) -> Result<LogicalId, KernelError> {
        let placement = kernel.place("Fiber", fiber, Transform::identity(), Some(envelope), 0)?;
        self.fiber = Some(placement);
        kernel.logical_of(placement)
    }

    fn place_component(
        &mut self,
        kernel: &mut dyn GeometryKernel,
        name: &str,
        logical: LogicalId,
        transform: Transform,
        copy_number: i64,
    ) -> Result<PlacementId, KernelError> {
        let fiber = self.fiber.ok_or(KernelError::UnknownPlacement(usize::MAX))?;
        let parent = kernel.logical_of(fiber)?;
        kernel.place(
            &format!("Fiber/{}", name),
            logical,
            transform,
            Some(parent),
            copy_number,
        )
    }

    fn close_fiber(&mut self, _: &mut dyn GeometryKernel) -> Result<PlacementId, KernelError> {
        self.fiber.ok_or(KernelError::UnknownPlacement(usize::MAX))
    }
}

/// The cut solids of one base pair of the middle basis nucleosome.
#[derive(Debug, Clone, PartialEq)]
pub struct BasePairSolids {
    pub residues: [CutSolid; 6],
    pub hydration_shells: Option<[CutSolid; 6]>,
}

/// The volumes created by [`FiberAssembler::build_fiber`].
#[derive(Debug, Clone)]
pub struct FiberVolumes {
    pub fiber: LogicalId,
    pub placement: PlacementId,
    /// The solid of each residue of each base pair.
    pub residues: Vec<[SolidId; 6]>,
    pub histone: SolidId,
    pub nb_placements: usize,
    pub nb_overlaps: usize,
}

fn base_name(slot: ResidueSlot, base_pair: usize) -> &'static str {
    match (slot, base_pair % 2) {
        (ResidueSlot::Phosphate1, _) | (ResidueSlot::Phosphate2, _) => "phosphate",
        (ResidueSlot::Deoxyribose1, _) | (ResidueSlot::Deoxyribose2, _) => "deoxyribose",
        (ResidueSlot::Base1, 1) => "cytosine",
        (ResidueSlot::Base2, 1) => "guanine",
        (ResidueSlot::Base1, _) => "thymine",
        (ResidueSlot::Base2, _) => "adenine",
    }
}

/// Builds a chromatin fiber.
#[derive(Debug, Clone)]
pub struct FiberAssembler {
    parameters: GeometryParameters,
    options: AssemblyOptions,
    frames: Vec<NucleosomeFrame>,
    dna: Vec<Vec<BasePairPlacement>>,
    radius_map: CoordRadiusMap,
    ledger: PositionLedger,
}

impl FiberAssembler {
    /// Compute the basis nucleosomes.
    pub fn new(
        parameters: GeometryParameters,
        options: AssemblyOptions,
    ) -> Result<Self, AssemblyError> {
        parameters.validate()?;
        let available = parameters.base_pairs_per_nucleosome();
        if options.base_pairs_per_nucleosome > available {
            return Err(AssemblyError::TooManyBasePairs {
                requested: options.base_pairs_per_nucleosome,
                available,
            });
        }
        let total = options.base_pairs_per_nucleosome * options.nucleosomes_per_fiber;
        if total as i64 > RESIDUE_FACTOR {
            return Err(AssemblyError::TooManyNucleotides(total));
        }
        let frames = calculate_nucleosome_frames(&parameters.fiber);
        let dna = calculate_dna_positions(&parameters, &frames);
        let radius_map = CoordRadiusMap::from_dna(&dna, &parameters.radii)?;
        log::debug!("{}", parameters.formated_string());
        Ok(Self {
            parameters,
            options,
            frames,
            dna,
            radius_map,
            ledger: Default::default(),
        })
    }

    pub fn from_source<S: ParameterSource + ?Sized>(source: &S) -> Result<Self, AssemblyError> {
        let parameters = GeometryParameters::from_source(source)?;
        let options = AssemblyOptions::from_source(source)?;
        Self::new(parameters, options)
    }

    pub fn parameters(&self) -> &GeometryParameters {
        &self.parameters
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    pub fn frames(&self) -> &[NucleosomeFrame] {
        &self.frames
    }

    pub fn dna(&self) -> &[Vec<BasePairPlacement>] {
        &self.dna
    }

    pub fn radius_map(&self) -> &CoordRadiusMap {
        &self.radius_map
    }

    pub fn position_ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    /// Index of the basis nucleosome whose residues are instanced along the fiber.
    pub fn middle_nucleosome(&self) -> usize {
        self.frames.len() / 2
    }

    /// Cut the residues of the middle basis nucleosome against all the residues of the basis
    /// nucleosomes.
    pub fn cut_solids<I: ResidueIdentity>(
        &self,
        resolver: &OverlapResolver<I>,
    ) -> Result<Vec<BasePairSolids>, CutError> {
        let middle = self.middle_nucleosome();
        let radii = &self.parameters.radii;
        let mut ret = Vec::with_capacity(self.options.base_pairs_per_nucleosome);
        for (j, bp) in self.dna[middle]
            .iter()
            .take(self.options.base_pairs_per_nucleosome)
            .enumerate()
        {
            let reference = |slot: ResidueSlot, radius: f64| ResidueReference {
                position: bp.residue(slot),
                radius,
                id: Some(ResidueId {
                    nucleosome: middle,
                    base_pair: j,
                    slot,
                }),
            };
            let resolve = |radius_of: &dyn Fn(ResidueSlot) -> f64| {
                let [a, b, c, d, e, f] = ResidueSlot::ALL.map(|slot| {
                    let radius = radius_of(slot);
                    if self.options.cut_volumes {
                        resolver.resolve(&reference(slot, radius), &self.radius_map)
                    } else {
                        Ok(CutSolid::Sphere { radius })
                    }
                });
                Ok::<_, CutError>([a?, b?, c?, d?, e?, f?])
            };
            let residues = resolve(&|slot| slot.radius(radii))?;
            let hydration_shells = if self.options.build_hydration_shells {
                Some(resolve(&|slot| slot.radius(radii) * radii.hydration_ratio)?)
            } else {
                None
            };
            ret.push(BasePairSolids {
                residues,
                hydration_shells,
            });
        }
        Ok(ret)
    }

    /// Build the fiber in `kernel` and place it in `envelope`.
    pub fn build_fiber(
        &mut self,
        kernel: &mut dyn GeometryKernel,
        envelope: LogicalId,
    ) -> Result<FiberVolumes, AssemblyError> {
        let resolver = OverlapResolver::new(ExactPosition, self.parameters.scale_factor);
        self.build_fiber_with(kernel, envelope, &resolver)
    }

    pub fn build_fiber_with<I: ResidueIdentity>(
        &mut self,
        kernel: &mut dyn GeometryKernel,
        envelope: LogicalId,
        resolver: &OverlapResolver<I>,
    ) -> Result<FiberVolumes, AssemblyError> {
        let start = Instant::now();
        let options = self.options;
        let cut_solids = self.cut_solids(resolver)?;
        log::info!(
            "{} residue solids computed in {} ms",
            6 * cut_solids.len(),
            start.elapsed().as_millis()
        );

        // One logical volume per residue of the middle nucleosome.
        let mut residues = Vec::with_capacity(cut_solids.len());
        let mut logicals = Vec::with_capacity(cut_solids.len());
        for (j, bp) in cut_solids.iter().enumerate() {
            let mut bp_solids = [SolidId(0); 6];
            let mut bp_logicals = [LogicalId(0); 6];
            for (k, slot) in ResidueSlot::ALL.iter().enumerate() {
                let name = format!("{}{}", slot.volume_prefix(), j);
                let solid = bp.residues[k].build(kernel, &name)?;
                let logical = kernel.logical_volume(base_name(*slot, j), solid)?;
                bp_solids[k] = solid;
                bp_logicals[k] = if let Some(shells) = bp.hydration_shells.as_ref() {
                    let shell_solid = shells[k].build(kernel, &format!("hydration_{}", name))?;
                    let shell = kernel.logical_volume("hydration_shell", shell_solid)?;
                    kernel.place(&name, logical, Transform::identity(), Some(shell), 0)?;
                    shell
                } else {
                    logical
                };
            }
            residues.push(bp_solids);
            logicals.push(bp_logicals);
        }

        let fiber_solid = kernel.tube("Fiber", options.fiber_radius, options.fiber_half_length);
        let fiber = kernel.logical_volume("Fiber", fiber_solid)?;
        let histone = kernel.tube(
            "histone",
            self.parameters.fiber.histone_radius,
            self.parameters.fiber.histone_half_height,
        );
        let histone_logical = kernel.logical_volume("histone", histone)?;

        let mut strategy = options.placement_strategy();
        strategy.open_fiber(kernel, fiber, envelope)?;

        let delta = self.parameters.fiber.delta_angle();
        let z_shift = self.parameters.fiber.z_shift();
        let minus_for_fiber = DVec3::new(
            0.,
            0.,
            -options.fiber_half_length + self.parameters.fiber.histone_half_height,
        );
        let middle = &self.dna[self.middle_nucleosome()][..cut_solids.len()];
        let mut incremental: Vec<[DVec3; 6]> = middle
            .iter()
            .map(|bp| ResidueSlot::ALL.map(|s| bp.residue(s)))
            .collect();

        self.ledger.clear();
        let mut nb_placements = 0;
        let mut nb_overlaps = 0;
        let mut check = |kernel: &mut dyn GeometryKernel,
                         placement: PlacementId,
                         name: &str,
                         copy_number: i64|
         -> Result<(), AssemblyError> {
            nb_placements += 1;
            if options.check_overlaps
                && kernel.check_overlaps(placement, options.overlap_resolution)?
            {
                nb_overlaps += 1;
                if options.quit_if_overlap {
                    log::error!("{}", OVERLAP_MESSAGE);
                    return Err(AssemblyError::Overlap {
                        volume: name.to_string(),
                        copy_number,
                    });
                }
            }
            Ok(())
        };

        for i in 0..options.nucleosomes_per_fiber {
            let nucleosome_start = Instant::now();
            let angle = (i as f64 - 1.) * delta;
            let shift = DVec3::new(0., 0., (i as f64 - 1.) * z_shift) + minus_for_fiber;
            let rotation = rotation_z(angle);
            if options.rotation_mode == RotationMode::Incremental {
                let step = if i == 0 { -delta } else { delta };
                for positions in incremental.iter_mut() {
                    *positions = positions.map(|p| rotate_z(p, step));
                }
            }
            for (j, bp) in middle.iter().enumerate() {
                let count = i * options.base_pairs_per_nucleosome + j;
                for (k, slot) in ResidueSlot::ALL.iter().enumerate() {
                    let rotated = match options.rotation_mode {
                        RotationMode::Absolute => rotate_z(bp.residue(*slot), angle),
                        RotationMode::Incremental => incremental[j][k],
                    };
                    let position = rotated + shift;
                    let name = format!("{}{}", slot.volume_prefix(), j);
                    let copy_number = encode(*slot, count);
                    let placement = strategy.place_component(
                        kernel,
                        &name,
                        logicals[j][k],
                        Transform::new(rotation, position),
                        copy_number,
                    )?;
                    check(kernel, placement, &name, copy_number)?;
                    self.ledger.push(
                        slot.ledger_key(),
                        position,
                        count as i64,
                        slot.strand() as i64,
                    );
                }
            }

            let histone_position = rotate_z(self.frames[0].center, i as f64 * delta)
                + DVec3::new(0., 0., i as f64 * z_shift)
                + minus_for_fiber;
            let name = format!("histone_{}", i);
            let placement = strategy.place_component(
                kernel,
                &name,
                histone_logical,
                Transform::translation(histone_position),
                i as i64,
            )?;
            check(kernel, placement, &name, i as i64)?;
            self.ledger.push("Histone", histone_position, i as i64, 0);
            log::debug!(
                "nucleosome {} placed in {} ms",
                i,
                nucleosome_start.elapsed().as_millis()
            );
        }

        let placement = strategy.close_fiber(kernel)?;
        check(kernel, placement, "Fiber", 0)?;
        log::info!(
            "fiber of {} nucleosomes built in {} ms, {} overlaps detected",
            options.nucleosomes_per_fiber,
            start.elapsed().as_millis(),
            nb_overlaps
        );
        Ok(FiberVolumes {
            fiber,
            placement,
            residues,
            histone,
            nb_placements,
            nb_overlaps,
        })
    }
}

/// Mean volume of each residue slot over all base pairs.
pub fn mean_residue_volumes<K: GeometryKernel + Sync + ?Sized>(
    kernel: &K,
    residues: &[[SolidId; 6]],
) -> Result<[f64; 6], KernelError> {
    if residues.is_empty() {
        return Ok([0.; 6]);
    }
    let mut ret = [0.; 6];
    for (k, mean) in ret.iter_mut().enumerate() {
        let volumes = residues
            .par_iter()
            .map(|bp| kernel.cubic_volume(bp[k]))
            .collect::<Result<Vec<f64>, KernelError>>()?;
        *mean = volumes.iter().sum::<f64>() / volumes.len() as f64;
        log::debug!(
            "mean volume of {:?}: {:.5} nm3",
            ResidueSlot::ALL[k],
            mean
        );
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::CsgKernel;

    fn source(json: &str) -> serde_json::Map<String, serde_json::Value> {
        serde_json::from_str(json).expect("invalid test json")
    }

    fn envelope(kernel: &mut CsgKernel) -> LogicalId {
        let solid = kernel.cuboid("World", DVec3::broadcast(100.));
        let logical = kernel.logical_volume("World", solid).unwrap();
        kernel
            .place("World", logical, Transform::identity(), None, 0)
            .unwrap();
        logical
    }

    #[test]
    fn options_from_source() {
        let src = source(
            r#"{"DnaNumNucleosomePerFiber": 4, "CutVolumes": false,
                "FiberDimensions": [20.0, 70.0], "IncrementalFiberRotation": true}"#,
        );
        let options = AssemblyOptions::from_source(&src).unwrap();
        assert_eq!(options.nucleosomes_per_fiber, 4);
        assert_eq!(options.base_pairs_per_nucleosome, 200);
        assert!(!options.cut_volumes);
        assert_eq!(options.fiber_radius, 20.);
        assert_eq!(options.rotation_mode, RotationMode::Incremental);
        let bad = source(r#"{"FiberDimensions": [20.0]}"#);
        assert!(AssemblyOptions::from_source(&bad).is_err());
    }

    #[test]
    fn too_many_base_pairs() {
        let mut options = AssemblyOptions::DEFAULT;
        options.base_pairs_per_nucleosome = 201;
        assert!(matches!(
            FiberAssembler::new(GeometryParameters::DEFAULT, options),
            Err(AssemblyError::TooManyBasePairs { .. })
        ));
    }

    #[test]
    fn small_fiber_ledger() {
        let mut options = AssemblyOptions::DEFAULT;
        options.nucleosomes_per_fiber = 2;
        options.base_pairs_per_nucleosome = 10;
        let mut assembler = FiberAssembler::new(GeometryParameters::DEFAULT, options).unwrap();
        let mut kernel = CsgKernel::new(0);
        let envelope = envelope(&mut kernel);
        let volumes = assembler.build_fiber(&mut kernel, envelope).unwrap();
        assert_eq!(volumes.residues.len(), 10);
        assert_eq!(volumes.nb_placements, 2 * 10 * 6 + 2 + 1);
        let ledger = assembler.position_ledger();
        assert_eq!(ledger.get("Phosphate").unwrap().len(), 40);
        assert_eq!(ledger.get("Base1").unwrap().len(), 20);
        assert_eq!(ledger.get("Histone").unwrap().len(), 2);
        let last = ledger.get("Base2").unwrap().last().unwrap();
        assert_eq!((last.index, last.strand), (19, 2));
    }

    #[test]
    fn native_and_component_strategies_agree_on_positions() {
        let mut options = AssemblyOptions::DEFAULT;
        options.nucleosomes_per_fiber = 2;
        options.base_pairs_per_nucleosome = 4;
        options.cut_volumes = false;
        let mut native = FiberAssembler::new(GeometryParameters::DEFAULT, options).unwrap();
        options.use_native_volumes = false;
        let mut component = FiberAssembler::new(GeometryParameters::DEFAULT, options).unwrap();

        let mut k1 = CsgKernel::new(0);
        let e1 = envelope(&mut k1);
        native.build_fiber(&mut k1, e1).unwrap();
        let mut k2 = CsgKernel::new(0);
        let e2 = envelope(&mut k2);
        component.build_fiber(&mut k2, e2).unwrap();

        assert_eq!(native.position_ledger(), component.position_ledger());
        assert!(k2.placements().any(|(_, p)| p.name == "Fiber/p_1_0"));
        assert!(k1.placements().any(|(_, p)| p.name == "p_1_0"));
    }

    #[test]
    fn hydration_shells_contain_their_residue() {
        let mut options = AssemblyOptions::DEFAULT;
        options.nucleosomes_per_fiber = 1;
        options.base_pairs_per_nucleosome = 2;
        options.build_hydration_shells = true;
        let assembler = FiberAssembler::new(GeometryParameters::DEFAULT, options).unwrap();
        let solids = assembler.cut_solids(&OverlapResolver::default()).unwrap();
        let shells = solids[0].hydration_shells.as_ref().unwrap();
        for (residue, shell) in solids[0].residues.iter().zip(shells.iter()) {
            assert!((shell.radius() / residue.radius() - 1.15).abs() < 1e-12);
        }
    }
}
