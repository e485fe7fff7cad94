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
use nucleofiber_design::copy_number::{RESIDUE_FACTOR, STRAND_FACTOR};

const BACKBONE: i64 = 0;
const BASE: i64 = 2;

fn copy_number(strand: i64, residue: i64, nucleotide: i64) -> i64 {
    strand * STRAND_FACTOR + residue * RESIDUE_FACTOR + nucleotide
}

fn hit(energy: f64, copy_number: i64, fiber_id: usize) -> StepHit {
    StepHit {
        energy,
        copy_number,
        fiber_id,
        split_track_id: None,
    }
}

fn score_event(scorer: &mut ClusteredDamageScorer, id: u64, hits: &[StepHit]) -> EventDamage {
    scorer.begin_event(id).unwrap();
    for h in hits {
        scorer.process_hit(h).unwrap();
    }
    scorer.end_event().unwrap()
}

#[test]
fn parameters_from_json() {
    let json = serde_json::json!({
        "BasePairDistanceForDefiningDSB": 5,
        "EnergyThresholdForHavingSSB": 10.,
        "NumberOfSplit": 3,
    });
    let map = json.as_object().unwrap();
    let parameters = DamageParameters::from_source(map).unwrap();
    assert_eq!(parameters.dsb_distance, 5);
    assert_eq!(parameters.ssb_threshold, 10.);
    assert_eq!(parameters.bd_threshold, 17.5);
    assert_eq!(parameters.nb_splits, 3);
    assert!(ClusteredDamageScorer::new(parameters).is_ok());
}

#[test]
fn zero_split_is_rejected() {
    let parameters = DamageParameters {
        nb_splits: 0,
        ..DamageParameters::DEFAULT
    };
    assert!(ClusteredDamageScorer::new(parameters).is_err());
}

#[test]
fn same_hits_give_same_records() {
    let hits = vec![
        hit(20., copy_number(0, BACKBONE, 10), 0),
        hit(20., copy_number(1, BASE, 30), 0),
        hit(25., copy_number(0, BACKBONE, 2_000), 1),
        hit(25., copy_number(1, BACKBONE, 2_003), 1),
        hit(18., copy_number(0, BASE, 9_000), 2),
    ];
    let mut scorer = ClusteredDamageScorer::new(DamageParameters::DEFAULT).unwrap();
    let first = score_event(&mut scorer, 0, &hits);
    let second = score_event(&mut scorer, 1, &hits);
    assert_eq!(first.event_id, 0);
    assert_eq!(second.event_id, 1);
    assert_eq!(
        EventDamage {
            event_id: 0,
            ..second
        },
        first
    );
}

#[test]
fn nearby_lesions_form_a_non_dsb_cluster() {
    let mut scorer = ClusteredDamageScorer::new(DamageParameters::DEFAULT).unwrap();
    let damage = score_event(
        &mut scorer,
        0,
        &[
            hit(20., copy_number(0, BACKBONE, 10), 0),
            hit(20., copy_number(1, BASE, 30), 0),
        ],
    );
    assert_eq!((damage.ssb, damage.bd, damage.dsb), (0, 0, 0));
    assert_eq!(damage.non_dsb_clusters, 1);
    assert_eq!(
        damage.non_dsb_cluster_details,
        vec![ClusterSummary {
            size: 21,
            ssb: 1,
            bd: 1,
            dsb: 0,
            total: 2,
        }]
    );
}

#[test]
fn lesions_of_different_fibers_are_not_paired() {
    let mut scorer = ClusteredDamageScorer::new(DamageParameters::DEFAULT).unwrap();
    let damage = score_event(
        &mut scorer,
        0,
        &[
            hit(20., copy_number(0, BACKBONE, 100), 0),
            hit(20., copy_number(1, BACKBONE, 100), 3),
        ],
    );
    assert_eq!((damage.ssb, damage.dsb), (2, 0));
    assert_eq!(damage.complex_dsb + damage.non_dsb_clusters, 0);
}

#[test]
fn unsplit_hits_are_scored_in_every_split() {
    let parameters = DamageParameters {
        nb_splits: 2,
        ..DamageParameters::DEFAULT
    };
    let mut scorer = ClusteredDamageScorer::new(parameters).unwrap();
    let everywhere = hit(20., copy_number(0, BACKBONE, 100), 0);
    let damage = score_event(&mut scorer, 0, &[everywhere]);
    assert_eq!(damage.ssb, 2);

    let second_split = StepHit {
        split_track_id: Some(4),
        ..everywhere
    };
    let damage = score_event(&mut scorer, 1, &[second_split]);
    assert_eq!(damage.ssb, 1);

    let unknown_split = StepHit {
        split_track_id: Some(5),
        ..everywhere
    };
    scorer.begin_event(2).unwrap();
    assert!(matches!(
        scorer.process_hit(&unknown_split),
        Err(DamageError::SplitOutOfRange {
            split: 2,
            nb_splits: 2
        })
    ));
}

#[test]
fn hits_outside_of_the_dna_are_ignored() {
    let mut scorer = ClusteredDamageScorer::new(DamageParameters::DEFAULT).unwrap();
    scorer.begin_event(0).unwrap();
    assert!(!scorer.process_hit(&hit(0., 12, 0)).unwrap());
    assert!(!scorer
        .process_hit(&hit(20., copy_number(2, BACKBONE, 12), 0))
        .unwrap());
    assert!(scorer.process_hit(&hit(20., 12, 0)).unwrap());
    assert_eq!(scorer.nb_scored_hits(), 1);
    assert!(scorer
        .process_hit(&hit(20., copy_number(0, BACKBONE, 18_000), 0))
        .is_err());
}

#[test]
fn records_serialize_with_details() {
    let mut scorer = ClusteredDamageScorer::new(DamageParameters::DEFAULT).unwrap();
    let damage = score_event(
        &mut scorer,
        7,
        &[
            hit(20., copy_number(0, BACKBONE, 10), 0),
            hit(20., copy_number(1, BASE, 30), 0),
        ],
    );
    let json = serde_json::to_value(&damage).unwrap();
    assert_eq!(json["event_id"], 7);
    assert_eq!(json["non_dsb_cluster_details"][0]["size"], 21);
    let back: EventDamage = serde_json::from_value(json).unwrap();
    assert_eq!(back, damage);
}
