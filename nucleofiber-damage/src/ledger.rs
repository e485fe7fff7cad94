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
//! Per event accumulation of the deposited energy.

use super::hits::{Channel, ScoredHit, SplitTarget, Strand};
use super::DamageError;
use std::collections::BTreeMap;

/// Deposited energy of every nucleotide of one fiber.
///
/// The energies are stored in a single buffer indexed by split, strand, channel and nucleotide.
#[derive(Debug, Clone)]
struct FiberLedger {
    energies: Vec<f64>,
    touched: bool,
}

/// The energy deposited in every nucleotide during the current event.
///
/// A buffer is allocated the first time a fiber receives energy and is zeroed when it is
/// drained, so the ledger must be empty between two events.
#[derive(Debug, Clone)]
pub struct EnergyLedger {
    fibers: BTreeMap<usize, FiberLedger>,
    nb_splits: usize,
    nb_nucleotides: usize,
}

fn strand_index(strand: Strand) -> usize {
    match strand {
        Strand::First => 0,
        Strand::Second => 1,
    }
}

fn channel_index(channel: Channel) -> usize {
    match channel {
        Channel::Backbone => 0,
        Channel::Base => 1,
    }
}

impl EnergyLedger {
    pub fn new(nb_splits: usize, nb_nucleotides: usize) -> Self {
        Self {
            fibers: BTreeMap::new(),
            nb_splits,
            nb_nucleotides,
        }
    }

    pub fn nb_splits(&self) -> usize {
        self.nb_splits
    }

    pub fn nb_nucleotides(&self) -> usize {
        self.nb_nucleotides
    }

    /// Number of fibers that have a ledger, touched or not.
    pub fn nb_fibers(&self) -> usize {
        self.fibers.len()
    }

    fn offset(&self, split: usize, strand: Strand, channel: Channel) -> usize {
        ((split * 2 + strand_index(strand)) * 2 + channel_index(channel)) * self.nb_nucleotides
    }

    /// Add the energy of `hit` to the ledgers it targets.
    pub fn deposit(&mut self, hit: &ScoredHit) -> Result<(), DamageError> {
        if hit.nucleotide >= self.nb_nucleotides {
            return Err(DamageError::NucleotideOutOfRange {
                nucleotide: hit.nucleotide,
                nb_nucleotides: self.nb_nucleotides,
            });
        }
        let splits = match hit.splits {
            SplitTarget::All => 0..self.nb_splits,
            SplitTarget::Single(split) if split < self.nb_splits => split..split + 1,
            SplitTarget::Single(split) => {
                return Err(DamageError::SplitOutOfRange {
                    split,
                    nb_splits: self.nb_splits,
                })
            }
        };
        let offsets: Vec<usize> = splits
            .map(|split| self.offset(split, hit.strand, hit.channel))
            .collect();
        let size = self.nb_splits * 4 * self.nb_nucleotides;
        let fiber = self.fibers.entry(hit.fiber).or_insert_with(|| FiberLedger {
            energies: vec![0.; size],
            touched: false,
        });
        fiber.touched = true;
        for offset in offsets {
            fiber.energies[offset + hit.nucleotide] += hit.energy;
        }
        Ok(())
    }

    /// The fibers that received energy during the current event, in ascending order.
    pub fn touched_fibers(&self) -> Vec<usize> {
        self.fibers
            .iter()
            .filter(|(_, f)| f.touched)
            .map(|(i, _)| *i)
            .collect()
    }

    /// Remove and return the deposits of one ledger, in ascending nucleotide order.
    pub fn drain(
        &mut self,
        fiber: usize,
        split: usize,
        strand: Strand,
        channel: Channel,
    ) -> Vec<(usize, f64)> {
        let offset = self.offset(split, strand, channel);
        let nb_nucleotides = self.nb_nucleotides;
        let mut ret = Vec::new();
        if let Some(fiber) = self.fibers.get_mut(&fiber) {
            for (nucleotide, energy) in fiber.energies[offset..offset + nb_nucleotides]
                .iter_mut()
                .enumerate()
            {
                if *energy > 0. {
                    ret.push((nucleotide, *energy));
                    *energy = 0.;
                }
            }
        }
        ret
    }

    /// True iff no energy is left in any ledger.
    pub fn is_empty(&self) -> bool {
        self.fibers
            .values()
            .all(|f| f.energies.iter().all(|e| *e == 0.))
    }

    /// Forget every deposit, keeping the buffers.
    pub fn clear(&mut self) {
        for fiber in self.fibers.values_mut() {
            if fiber.touched {
                fiber.energies.iter_mut().for_each(|e| *e = 0.);
                fiber.touched = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(nucleotide: usize, energy: f64, splits: SplitTarget) -> ScoredHit {
        fiber_hit(1, nucleotide, energy, splits)
    }

    fn fiber_hit(fiber: usize, nucleotide: usize, energy: f64, splits: SplitTarget) -> ScoredHit {
        ScoredHit {
            fiber,
            strand: Strand::Second,
            channel: Channel::Base,
            nucleotide,
            energy,
            splits,
        }
    }

    #[test]
    fn drain_in_ascending_order() {
        let mut ledger = EnergyLedger::new(1, 100);
        ledger.deposit(&hit(42, 3., SplitTarget::All)).unwrap();
        ledger.deposit(&hit(7, 1., SplitTarget::All)).unwrap();
        ledger.deposit(&hit(42, 4.5, SplitTarget::All)).unwrap();
        assert_eq!(ledger.touched_fibers(), vec![1]);
        assert!(ledger
            .drain(1, 0, Strand::First, Channel::Base)
            .is_empty());
        assert_eq!(
            ledger.drain(1, 0, Strand::Second, Channel::Base),
            vec![(7, 1.), (42, 7.5)]
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn split_targets() {
        let mut ledger = EnergyLedger::new(3, 10);
        ledger.deposit(&hit(2, 1., SplitTarget::All)).unwrap();
        ledger.deposit(&hit(3, 1., SplitTarget::Single(2))).unwrap();
        assert_eq!(ledger.drain(1, 0, Strand::Second, Channel::Base).len(), 1);
        assert_eq!(ledger.drain(1, 1, Strand::Second, Channel::Base).len(), 1);
        assert_eq!(ledger.drain(1, 2, Strand::Second, Channel::Base).len(), 2);
        assert!(ledger.deposit(&hit(3, 1., SplitTarget::Single(3))).is_err());
        assert!(ledger.deposit(&hit(10, 1., SplitTarget::All)).is_err());
    }

    #[test]
    fn clear_empties_the_ledger() {
        let mut ledger = EnergyLedger::new(1, 10);
        ledger.deposit(&hit(2, 1., SplitTarget::All)).unwrap();
        assert!(!ledger.is_empty());
        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.touched_fibers().is_empty());
        assert_eq!(ledger.nb_fibers(), 1);
    }

    #[test]
    fn only_touched_fibers_get_a_buffer() {
        let mut ledger = EnergyLedger::new(1, 10_000);
        ledger
            .deposit(&fiber_hit(1_000_000, 12, 2., SplitTarget::All))
            .unwrap();
        assert_eq!(ledger.nb_fibers(), 1);
        ledger.deposit(&fiber_hit(3, 12, 2., SplitTarget::All)).unwrap();
        assert_eq!(ledger.nb_fibers(), 2);
        assert_eq!(ledger.touched_fibers(), vec![3, 1_000_000]);
        assert_eq!(
            ledger.drain(1_000_000, 0, Strand::Second, Channel::Base),
            vec![(12, 2.)]
        );
        assert!(ledger.drain(7, 0, Strand::Second, Channel::Base).is_empty());
        assert_eq!(ledger.nb_fibers(), 2);
    }
}
