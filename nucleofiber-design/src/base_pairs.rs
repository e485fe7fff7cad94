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
//! Position of the residues of every base pair of the basis nucleosomes.
//!
//! The DNA wound around a histone follows two nested helices. The *first* helix is the double
//! helix itself: the six residues of a base pair rotate around the local nucleotide axis from
//! one base pair to the next. The *second* helix is the path of the nucleotide axis around the
//! histone. The linker DNA follows an arc of a wider circle that leaves the histone, and reaches
//! the next nucleosome.

use super::helix_math::{rotate_row, rotation_z, PolarResidue};
use super::nucleosomes::NucleosomeFrame;
use super::parameters::{GeometryParameters, ResidueRadii};
use ultraviolet::DVec3;

/// The six residues of a base pair.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    num_enum::TryFromPrimitive,
)]
#[repr(u8)]
pub enum ResidueSlot {
    Phosphate1 = 0,
    Deoxyribose1 = 1,
    Base1 = 2,
    Base2 = 3,
    Deoxyribose2 = 4,
    Phosphate2 = 5,
}

/// The chemical nature of a residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResidueKind {
    Phosphate,
    Deoxyribose,
    Base,
}

impl ResidueSlot {
    pub const ALL: [ResidueSlot; 6] = [
        Self::Phosphate1,
        Self::Deoxyribose1,
        Self::Base1,
        Self::Base2,
        Self::Deoxyribose2,
        Self::Phosphate2,
    ];

    pub fn kind(&self) -> ResidueKind {
        match self {
            Self::Phosphate1 | Self::Phosphate2 => ResidueKind::Phosphate,
            Self::Deoxyribose1 | Self::Deoxyribose2 => ResidueKind::Deoxyribose,
            Self::Base1 | Self::Base2 => ResidueKind::Base,
        }
    }

    /// The strand of the residue, 1 or 2.
    pub fn strand(&self) -> u8 {
        match self {
            Self::Phosphate1 | Self::Deoxyribose1 | Self::Base1 => 1,
            _ => 2,
        }
    }

    pub fn radius(&self, radii: &ResidueRadii) -> f64 {
        match self.kind() {
            ResidueKind::Phosphate => radii.phosphate,
            ResidueKind::Deoxyribose => radii.deoxyribose,
            ResidueKind::Base => radii.base,
        }
    }

    /// Name of the residue kind in the position ledger.
    pub fn ledger_key(&self) -> &'static str {
        match self {
            Self::Phosphate1 | Self::Phosphate2 => "Phosphate",
            Self::Deoxyribose1 | Self::Deoxyribose2 => "Desoxyribose",
            Self::Base1 => "Base1",
            Self::Base2 => "Base2",
        }
    }

    /// Prefix of the name of the physical volumes.
    pub fn volume_prefix(&self) -> &'static str {
        match self {
            Self::Phosphate1 => "p_1_",
            Self::Deoxyribose1 => "s_1_",
            Self::Base1 => "b_1_",
            Self::Base2 => "b_2_",
            Self::Deoxyribose2 => "s_2_",
            Self::Phosphate2 => "p_2_",
        }
    }
}

/// Identifier of a residue of the basis nucleosomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResidueId {
    pub nucleosome: usize,
    pub base_pair: usize,
    pub slot: ResidueSlot,
}

/// The position of the six residues of a base pair, and of its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasePairPlacement {
    /// Point of the nucleotide axis. Not used to build volumes.
    pub center: DVec3,
    pub phosphate1: DVec3,
    pub deoxyribose1: DVec3,
    pub base1: DVec3,
    pub base2: DVec3,
    pub deoxyribose2: DVec3,
    pub phosphate2: DVec3,
}

impl BasePairPlacement {
    fn from_points(center: DVec3, residues: [DVec3; 6]) -> Self {
        Self {
            center,
            phosphate1: residues[0],
            deoxyribose1: residues[1],
            base1: residues[2],
            base2: residues[3],
            deoxyribose2: residues[4],
            phosphate2: residues[5],
        }
    }

    pub fn residue(&self, slot: ResidueSlot) -> DVec3 {
        match slot {
            ResidueSlot::Phosphate1 => self.phosphate1,
            ResidueSlot::Deoxyribose1 => self.deoxyribose1,
            ResidueSlot::Base1 => self.base1,
            ResidueSlot::Base2 => self.base2,
            ResidueSlot::Deoxyribose2 => self.deoxyribose2,
            ResidueSlot::Phosphate2 => self.phosphate2,
        }
    }

    pub fn residues(&self) -> impl Iterator<Item = (ResidueSlot, DVec3)> + '_ {
        ResidueSlot::ALL.iter().map(move |s| (*s, self.residue(*s)))
    }

    fn map<F: Fn(DVec3) -> DVec3>(&self, f: F) -> Self {
        Self::from_points(
            f(self.center),
            ResidueSlot::ALL.map(|s| f(self.residue(s))),
        )
    }
}

/// Points of the path around the histone used to attach the linker.
#[derive(Debug, Clone, Copy)]
struct LinkerAnchors {
    first: DVec3,
    second: DVec3,
    last: DVec3,
}

/// The residues of one base pair in the local frame of the second helix.
fn small_helix(polar: &[PolarResidue; 6], angle: f64) -> [DVec3; 6] {
    polar.map(|p| p.first_helix_point(angle))
}

/// Compute the base pairs of every basis nucleosome.
///
/// Each returned sequence contains the wound base pairs followed by the linker base pairs.
pub fn calculate_dna_positions(
    parameters: &GeometryParameters,
    frames: &[NucleosomeFrame],
) -> Vec<Vec<BasePairPlacement>> {
    let polar = parameters
        .canonical
        .offsets()
        .map(PolarResidue::from_offset);
    let nucleosome = &parameters.nucleosome;
    let linker = &parameters.linker;
    let wound_count = nucleosome.wound_base_pairs;
    let delta = nucleosome.delta_angle();

    let mut anchors: Option<LinkerAnchors> = None;
    let mut ret = Vec::with_capacity(frames.len());

    for (n, frame) in frames.iter().enumerate() {
        let mut local = Vec::with_capacity(wound_count + linker.base_pairs);
        for i in 0..wound_count {
            let rotation = rotation_z(-(i as f64) * delta);
            let path = DVec3::new(
                nucleosome.central_radius * (i as f64 * delta).cos(),
                nucleosome.central_radius * (i as f64 * delta).sin(),
                i as f64 * nucleosome.pitch / nucleosome.base_pairs_per_turn as f64,
            );
            let residues = small_helix(&polar, i as f64 * nucleosome.base_pair_angle)
                .map(|r| rotate_row(r, &rotation) + path);
            local.push(BasePairPlacement::from_points(path, residues));
        }

        // The linker of every nucleosome starts from the path of the first one.
        if n == 0 && wound_count > 1 {
            anchors = Some(LinkerAnchors {
                first: local[0].center,
                second: local[1].center,
                last: local[wound_count - 1].center,
            });
        }

        if let Some(anchors) = anchors {
            let delta_linker = linker.delta_angle();
            let shift = DVec3::new(
                anchors.last.x - linker.central_radius,
                anchors.second.y - anchors.first.y,
                anchors.last.z,
            );
            for i in 0..linker.base_pairs {
                let angle = i as f64 * delta_linker;
                let rotation = rotation_z(-angle);
                let arc = DVec3::new(
                    linker.central_radius * angle.cos(),
                    linker.central_radius * angle.sin(),
                    linker.height(i),
                );
                let residues = small_helix(&polar, i as f64 * nucleosome.base_pair_angle)
                    .map(|r| rotate_row(r, &rotation) + arc + shift);
                local.push(BasePairPlacement::from_points(arc + shift, residues));
            }
        }

        log::debug!(
            "nucleosome {}: {} base pairs, histone center {:?}",
            n,
            local.len(),
            frame.center
        );
        ret.push(local.iter().map(|bp| bp.map(|v| frame.to_global(v))).collect());
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nucleosomes::calculate_nucleosome_frames;

    fn positions() -> (Vec<NucleosomeFrame>, Vec<Vec<BasePairPlacement>>) {
        let parameters = GeometryParameters::DEFAULT;
        let frames = calculate_nucleosome_frames(&parameters.fiber);
        let dna = calculate_dna_positions(&parameters, &frames);
        (frames, dna)
    }

    #[test]
    fn every_nucleosome_has_wound_and_linker_base_pairs() {
        let (_, dna) = positions();
        assert_eq!(dna.len(), 3);
        for bps in dna.iter() {
            assert_eq!(bps.len(), 200);
        }
    }

    #[test]
    fn residues_keep_their_distance_to_the_path() {
        let parameters = GeometryParameters::DEFAULT;
        let (_, dna) = positions();
        let offsets = parameters.canonical.offsets();
        for bps in dna.iter() {
            for bp in bps.iter() {
                for (slot, pos) in bp.residues() {
                    let canonical = offsets[slot as usize];
                    // The small helix keeps both the in-plane radius and the height of the
                    // canonical offset, hence its full norm.
                    let expected = canonical.mag();
                    assert!(((pos - bp.center).mag() - expected).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn wound_base_pairs_are_at_nucleosome_radius() {
        let parameters = GeometryParameters::DEFAULT;
        let (frames, dna) = positions();
        for (frame, bps) in frames.iter().zip(dna.iter()) {
            for bp in bps.iter().take(parameters.nucleosome.wound_base_pairs) {
                let local = frame.to_local(bp.center);
                let r = (local.x * local.x + local.y * local.y).sqrt();
                assert!((r - parameters.nucleosome.central_radius).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn linker_starts_near_the_last_wound_base_pair() {
        let (frames, dna) = positions();
        let last_wound = frames[0].to_local(dna[0][153].center);
        let first_linker = frames[0].to_local(dna[0][154].center);
        assert!((first_linker.z - last_wound.z).abs() < 1e-9);
        assert!((first_linker.x - last_wound.x).abs() < 1e-9);
        let distance = (first_linker - last_wound).mag();
        assert!(distance > 0. && distance < 1.);
    }

    #[test]
    fn slots_know_their_strand() {
        let strands: Vec<u8> = ResidueSlot::ALL.iter().map(|s| s.strand()).collect();
        assert_eq!(strands, vec![1, 1, 1, 2, 2, 2]);
        assert_eq!(ResidueSlot::try_from(3u8).ok(), Some(ResidueSlot::Base2));
    }
}
