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
//! This crate classifies the DNA lesions produced by the energy deposited in a chromatin fiber
//! during a simulated event.
//!
//! Hits are accumulated per nucleotide by a [ClusteredDamageScorer]. At the end of an event the
//! deposits are turned into strand breaks and base damages, strand breaks of opposite strands
//! are paired into double strand breaks and nearby lesions are grouped into clusters.

#[macro_use]
extern crate serde_derive;
extern crate serde;

pub mod clustering;
pub mod hits;
pub mod ledger;
mod parameters;
pub mod scorer;

pub use clustering::{ClusterSummary, DamageKind, DamageSite, DamageTally, StrandBreaks};
pub use hits::{calculate_integer_magnitude, Channel, ScoredHit, SplitTarget, StepHit, Strand};
pub use ledger::EnergyLedger;
pub use parameters::DamageParameters;
pub use scorer::{ClusteredDamageScorer, EventDamage, ScorerState};

use nucleofiber_design::{CopyNumberError, ParameterError};

#[derive(Debug, thiserror::Error)]
pub enum DamageError {
    #[error("Unrecognized damage kind {0}")]
    UnrecognizedDamageKind(i64),
    #[error("Negative damage site {0}")]
    NegativeSite(i64),
    #[error(transparent)]
    CopyNumber(#[from] CopyNumberError),
    #[error("Split {split} does not exist, there are {nb_splits} splits")]
    SplitOutOfRange { split: usize, nb_splits: usize },
    #[error("Nucleotide {nucleotide} is out of range, a fiber has {nb_nucleotides} nucleotides")]
    NucleotideOutOfRange {
        nucleotide: usize,
        nb_nucleotides: usize,
    },
    #[error("Event {0} was not ended")]
    EventStillOpen(u64),
    #[error("No event is open")]
    NoOpenEvent,
    #[error("The energy ledger still holds deposits of a previous event")]
    LedgerNotDrained,
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error("{total} base pairs do not fit in a copy number, magnitude {magnitude}")]
    TooManyBasePairs { total: usize, magnitude: i64 },
}

#[cfg(test)]
mod tests;
