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
//! The per event scorer of clustered DNA damage.

use super::clustering::{
    combine_simple_damage, count_strand_breaks, pair_dsb, record_clustered_damage,
    record_simple_damage, ClusterSummary, DamageTally, SimpleDamage, StrandBreaks,
};
use super::hits::{Channel, StepHit, Strand};
use super::ledger::EnergyLedger;
use super::parameters::DamageParameters;
use super::DamageError;
use std::collections::BTreeMap;

/// The steps of the processing of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScorerState {
    CollectingHits,
    DrainingToIndices,
    PairingDsb,
    Combining,
    Clustering,
    Emitting,
}

/// The damage record of one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDamage {
    pub event_id: u64,
    pub ssb: i64,
    pub dsb: i64,
    pub bd: i64,
    pub complex_dsb: usize,
    pub non_dsb_clusters: usize,
    pub complex_dsb_details: Vec<ClusterSummary>,
    pub non_dsb_cluster_details: Vec<ClusterSummary>,
}

impl EventDamage {
    fn new(event_id: u64, tally: DamageTally) -> Self {
        Self {
            event_id,
            ssb: tally.ssb,
            dsb: tally.dsb,
            bd: tally.bd,
            complex_dsb: tally.complex_dsb,
            non_dsb_clusters: tally.non_dsb_clusters,
            complex_dsb_details: tally.complex_dsb_details,
            non_dsb_cluster_details: tally.non_dsb_cluster_details,
        }
    }

    pub fn has_damage(&self) -> bool {
        self.ssb > 0 || self.bd > 0 || self.dsb > 0 || self.complex_dsb > 0 || self.non_dsb_clusters > 0
    }
}

/// Accumulates the energy deposited in the DNA during an event and classifies the resulting
/// lesions when the event ends.
///
/// Each worker simulating events must own its scorer.
#[derive(Debug, Clone)]
pub struct ClusteredDamageScorer {
    parameters: DamageParameters,
    ledger: EnergyLedger,
    state: ScorerState,
    event: Option<u64>,
    active: bool,
    skipped_while_inactive: usize,
    nb_scored_hits: usize,
}

impl ClusteredDamageScorer {
    pub fn new(parameters: DamageParameters) -> Result<Self, DamageError> {
        parameters.validate()?;
        log::debug!("{}", parameters.formated_string());
        Ok(Self {
            ledger: EnergyLedger::new(parameters.nb_splits, parameters.total_base_pairs()),
            parameters,
            state: ScorerState::CollectingHits,
            event: None,
            active: true,
            skipped_while_inactive: 0,
            nb_scored_hits: 0,
        })
    }

    pub fn parameters(&self) -> &DamageParameters {
        &self.parameters
    }

    pub fn state(&self) -> ScorerState {
        self.state
    }

    pub fn current_event(&self) -> Option<u64> {
        self.event
    }

    /// Enable or disable the scoring of hits.
    pub fn set_active(&mut self, active: bool) {
        self.active = active
    }

    /// Number of hits received while the scorer was inactive.
    pub fn skipped_while_inactive(&self) -> usize {
        self.skipped_while_inactive
    }

    pub fn nb_scored_hits(&self) -> usize {
        self.nb_scored_hits
    }

    pub fn begin_event(&mut self, event_id: u64) -> Result<(), DamageError> {
        if let Some(open) = self.event {
            return Err(DamageError::EventStillOpen(open));
        }
        if !self.ledger.is_empty() {
            return Err(DamageError::LedgerNotDrained);
        }
        self.event = Some(event_id);
        self.state = ScorerState::CollectingHits;
        Ok(())
    }

    /// Record the energy of a step. Return true iff the hit was scored.
    pub fn process_hit(&mut self, hit: &StepHit) -> Result<bool, DamageError> {
        if self.event.is_none() {
            return Err(DamageError::NoOpenEvent);
        }
        if !self.active {
            self.skipped_while_inactive += 1;
            return Ok(false);
        }
        match hit.decode(self.parameters.nb_splits)? {
            Some(scored) => {
                self.ledger.deposit(&scored)?;
                self.nb_scored_hits += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn drain_simple_damage(&mut self, fiber: usize, split: usize) -> SimpleDamage {
        let p = self.parameters;
        let mut drain = |strand: Strand, channel: Channel, threshold: f64| {
            record_simple_damage(threshold, &self.ledger.drain(fiber, split, strand, channel))
        };
        SimpleDamage {
            ssb1: drain(Strand::First, Channel::Backbone, p.ssb_threshold),
            ssb2: drain(Strand::Second, Channel::Backbone, p.ssb_threshold),
            bd1: drain(Strand::First, Channel::Base, p.bd_threshold),
            bd2: drain(Strand::Second, Channel::Base, p.bd_threshold),
            dsb: Vec::new(),
        }
    }

    fn close_event(&mut self) -> Result<u64, DamageError> {
        let event_id = self.event.take().ok_or(DamageError::NoOpenEvent)?;
        self.ledger.clear();
        self.state = ScorerState::CollectingHits;
        Ok(event_id)
    }

    /// Classify the lesions of the current event and reset the ledgers.
    pub fn end_event(&mut self) -> Result<EventDamage, DamageError> {
        if self.event.is_none() {
            return Err(DamageError::NoOpenEvent);
        }
        let mut tally = DamageTally::default();
        for fiber in self.ledger.touched_fibers() {
            for split in 0..self.parameters.nb_splits {
                self.state = ScorerState::DrainingToIndices;
                let mut damage = self.drain_simple_damage(fiber, split);

                self.state = ScorerState::PairingDsb;
                damage.dsb = pair_dsb(
                    &mut damage.ssb1,
                    &mut damage.ssb2,
                    self.parameters.dsb_distance,
                );
                tally.add_simple_damage(&damage);

                self.state = ScorerState::Combining;
                let sites = combine_simple_damage(&damage);

                self.state = ScorerState::Clustering;
                record_clustered_damage(&sites, self.parameters.cluster_distance, &mut tally);
            }
        }
        self.state = ScorerState::Emitting;
        tally.finalize();
        let event_id = self.close_event()?;
        let ret = EventDamage::new(event_id, tally);
        if ret.has_damage() {
            log::info!(
                "Event #{}: {} SSBs, {} BDs, {} simple DSBs, {} complex DSBs, {} non-DSB clusters",
                ret.event_id,
                ret.ssb,
                ret.bd,
                ret.dsb,
                ret.complex_dsb,
                ret.non_dsb_clusters
            );
        }
        Ok(ret)
    }

    /// Count the strand breaks of the current event without clustering, and reset the ledgers.
    pub fn end_event_strand_breaks(&mut self) -> Result<StrandBreaks, DamageError> {
        if self.event.is_none() {
            return Err(DamageError::NoOpenEvent);
        }
        let mut ret = StrandBreaks::default();
        for fiber in self.ledger.touched_fibers() {
            for split in 0..self.parameters.nb_splits {
                let mut strand1: BTreeMap<usize, f64> = self
                    .ledger
                    .drain(fiber, split, Strand::First, Channel::Backbone)
                    .into_iter()
                    .collect();
                let mut strand2: BTreeMap<usize, f64> = self
                    .ledger
                    .drain(fiber, split, Strand::Second, Channel::Backbone)
                    .into_iter()
                    .collect();
                ret += count_strand_breaks(
                    &mut strand1,
                    &mut strand2,
                    self.parameters.ssb_threshold,
                    self.parameters.dsb_distance,
                );
            }
        }
        self.close_event()?;
        Ok(ret)
    }
}
