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

use super::*;
use crate::radius_map::{CoordRadiusMap, MapError};
use ultraviolet::DVec3;

fn envelope(kernel: &mut CsgKernel) -> LogicalId {
    let solid = kernel.cuboid("World", DVec3::broadcast(200.));
    let logical = kernel.logical_volume("World", solid).unwrap();
    kernel
        .place("World", logical, Transform::identity(), None, 0)
        .unwrap();
    logical
}

fn small_options(nucleosomes: usize, base_pairs: usize) -> AssemblyOptions {
    let mut options = AssemblyOptions::DEFAULT;
    options.nucleosomes_per_fiber = nucleosomes;
    options.base_pairs_per_nucleosome = base_pairs;
    options
}

#[test]
fn radius_map_covers_the_three_basis_nucleosomes() {
    let assembler =
        FiberAssembler::new(GeometryParameters::DEFAULT, AssemblyOptions::DEFAULT).unwrap();
    let map = assembler.radius_map();
    assert_eq!(map.len(), 3 * 200 * 6);
    let radii = ResidueRadii::DEFAULT;
    for bp in assembler.dna()[1].iter() {
        for (slot, position) in bp.residues() {
            assert_eq!(map.get(position), Some(slot.radius(&radii)));
        }
    }
}

#[test]
fn duplicated_nucleosome_is_detected() {
    let assembler =
        FiberAssembler::new(GeometryParameters::DEFAULT, small_options(1, 200)).unwrap();
    let dna = assembler.dna();
    let degenerate = vec![dna[0].clone(), dna[1].clone(), dna[0].clone()];
    assert!(matches!(
        CoordRadiusMap::from_dna(&degenerate, &ResidueRadii::DEFAULT),
        Err(MapError::Duplicate { .. })
    ));
}

#[test]
fn backbone_residues_of_a_base_pair_are_cut() {
    let assembler =
        FiberAssembler::new(GeometryParameters::DEFAULT, small_options(1, 5)).unwrap();
    let solids = assembler.cut_solids(&OverlapResolver::default()).unwrap();
    assert_eq!(solids.len(), 5);
    for bp in solids.iter() {
        let phosphate = &bp.residues[ResidueSlot::Phosphate1 as usize];
        assert!(phosphate.is_cut());
        assert!(phosphate
            .slices()
            .iter()
            .any(|s| s.neighbour.slot == ResidueSlot::Deoxyribose1));
        for solid in bp.residues.iter() {
            for slice in solid.slices() {
                assert!(helix_math::is_orthonormal(
                    &slice.rotation,
                    helix_math::ORTHONORMAL_TOLERANCE
                ));
            }
        }
    }
}

#[test]
fn tagged_and_exact_identities_agree_on_the_basis() {
    let assembler =
        FiberAssembler::new(GeometryParameters::DEFAULT, small_options(1, 20)).unwrap();
    let exact = assembler.cut_solids(&OverlapResolver::default()).unwrap();
    let tagged = assembler
        .cut_solids(&OverlapResolver::new(TaggedResidue, 1.))
        .unwrap();
    assert_eq!(exact, tagged);
}

#[test]
fn uncut_solids_are_plain_spheres() {
    let mut options = small_options(1, 3);
    options.cut_volumes = false;
    let assembler = FiberAssembler::new(GeometryParameters::DEFAULT, options).unwrap();
    let solids = assembler.cut_solids(&OverlapResolver::default()).unwrap();
    for bp in solids.iter() {
        assert!(bp.residues.iter().all(|s| !s.is_cut()));
    }
}

#[test]
fn middle_nucleosome_is_placed_without_rotation() {
    let mut assembler =
        FiberAssembler::new(GeometryParameters::DEFAULT, small_options(3, 8)).unwrap();
    let mut kernel = CsgKernel::new(0);
    let envelope = envelope(&mut kernel);
    assembler.build_fiber(&mut kernel, envelope).unwrap();
    let shift = DVec3::new(0., 0., -68. + 2.86);
    let middle = &assembler.dna()[1];
    let base1 = assembler.position_ledger().get("Base1").unwrap();
    for entry in base1.iter().filter(|e| (8..16).contains(&e.index)) {
        let expected = middle[entry.index as usize - 8].base1 + shift;
        let actual = DVec3::new(entry.x, entry.y, entry.z);
        assert!((actual - expected).mag() < 1e-12);
        assert_eq!(entry.strand, 1);
    }
}

#[test]
fn incremental_rotation_stays_close_to_absolute() {
    let mut absolute =
        FiberAssembler::new(GeometryParameters::DEFAULT, small_options(12, 4)).unwrap();
    let mut options = small_options(12, 4);
    options.rotation_mode = RotationMode::Incremental;
    let mut incremental = FiberAssembler::new(GeometryParameters::DEFAULT, options).unwrap();
    for assembler in [&mut absolute, &mut incremental] {
        let mut kernel = CsgKernel::new(0);
        let envelope = envelope(&mut kernel);
        assembler.build_fiber(&mut kernel, envelope).unwrap();
    }
    let a = absolute.position_ledger().get("Phosphate").unwrap();
    let b = incremental.position_ledger().get("Phosphate").unwrap();
    assert_eq!(a.len(), b.len());
    for (a, b) in a.iter().zip(b.iter()) {
        assert_eq!(a.index, b.index);
        let d = DVec3::new(a.x - b.x, a.y - b.y, a.z - b.z);
        assert!(d.mag() < 1e-9);
    }
}

#[test]
fn histones_follow_the_fiber_helix() {
    let mut assembler =
        FiberAssembler::new(GeometryParameters::DEFAULT, small_options(7, 2)).unwrap();
    let mut kernel = CsgKernel::new(0);
    let envelope = envelope(&mut kernel);
    assembler.build_fiber(&mut kernel, envelope).unwrap();
    let histones = assembler.position_ledger().get("Histone").unwrap();
    assert_eq!(histones.len(), 7);
    let first = histones[0];
    let last = histones[6];
    // One full turn of the fiber.
    assert!((first.x - last.x).abs() < 1e-9);
    assert!((first.y - last.y).abs() < 1e-9);
    assert!((last.z - first.z - 8.5).abs() < 1e-9);
    for h in histones.iter() {
        assert!(((h.x * h.x + h.y * h.y).sqrt() - 10.46).abs() < 1e-9);
    }
}

#[test]
fn overlapping_spheres_stop_the_construction() {
    let mut options = small_options(1, 2);
    options.cut_volumes = false;
    options.check_overlaps = true;
    options.overlap_resolution = 500;
    let mut assembler = FiberAssembler::new(GeometryParameters::DEFAULT, options).unwrap();
    let mut kernel = CsgKernel::new(0);
    let envelope = envelope(&mut kernel);
    assert!(matches!(
        assembler.build_fiber(&mut kernel, envelope),
        Err(AssemblyError::Overlap { .. })
    ));

    options.quit_if_overlap = false;
    let mut assembler = FiberAssembler::new(GeometryParameters::DEFAULT, options).unwrap();
    let mut kernel = CsgKernel::new(0);
    let envelope = self::envelope(&mut kernel);
    let volumes = assembler.build_fiber(&mut kernel, envelope).unwrap();
    assert!(volumes.nb_overlaps > 0);
}

#[test]
fn mean_volume_of_cut_residues_is_smaller_than_the_sphere() {
    let mut assembler =
        FiberAssembler::new(GeometryParameters::DEFAULT, small_options(1, 3)).unwrap();
    let mut kernel = CsgKernel::new(0).with_volume_samples(20_000);
    let envelope = envelope(&mut kernel);
    let volumes = assembler.build_fiber(&mut kernel, envelope).unwrap();
    let means = mean_residue_volumes(&kernel, &volumes.residues).unwrap();
    let radii = ResidueRadii::DEFAULT;
    for (slot, mean) in ResidueSlot::ALL.iter().zip(means.iter()) {
        let sphere = 4. / 3. * std::f64::consts::PI * slot.radius(&radii).powi(3);
        assert!(*mean > 0.);
        assert!(*mean < sphere * 1.05);
    }
}

#[test]
fn parameter_summary_mentions_the_fiber() {
    let summary = GeometryParameters::DEFAULT.formated_string();
    assert!(summary.contains("Fiber pitch: 8.500 nm"));
    assert!(summary.contains("#Nucleosomes per turn: 6"));
}
