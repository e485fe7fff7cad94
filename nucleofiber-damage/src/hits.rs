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
//! Energy deposition steps and their decoding.

use super::DamageError;
use nucleofiber_design::copy_number::decode;
use nucleofiber_design::ResidueCode;

/// One energy deposition in a residue volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepHit {
    /// Deposited energy in eV.
    pub energy: f64,
    /// Copy number of the volume in which the step started.
    pub copy_number: i64,
    /// Index of the fiber containing the volume.
    #[serde(default)]
    pub fiber_id: usize,
    /// Identifier of the split track that made the step, when variance reduction is used.
    #[serde(default)]
    pub split_track_id: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strand {
    First,
    Second,
}

/// The two groups of residues scored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    /// Phosphates and deoxyriboses.
    Backbone,
    Base,
}

impl From<ResidueCode> for Channel {
    fn from(code: ResidueCode) -> Self {
        if code.is_backbone() {
            Self::Backbone
        } else {
            Self::Base
        }
    }
}

/// The ledgers that receive a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitTarget {
    All,
    Single(usize),
}

/// A hit that must be recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredHit {
    pub fiber: usize,
    pub strand: Strand,
    pub channel: Channel,
    pub nucleotide: usize,
    pub energy: f64,
    pub splits: SplitTarget,
}

impl StepHit {
    /// Decode the hit. Return `None` if the hit deposits no energy or is not in a DNA residue.
    pub fn decode(&self, nb_splits: usize) -> Result<Option<ScoredHit>, DamageError> {
        if !(self.energy > 0.) {
            return Ok(None);
        }
        let decoded = decode(self.copy_number)?;
        let strand = match decoded.strand {
            0 => Strand::First,
            1 => Strand::Second,
            _ => return Ok(None),
        };
        let splits = match self.split_track_id {
            Some(id) if nb_splits > 1 && id > 2 => {
                let split = id as usize - 3;
                if split >= nb_splits {
                    return Err(DamageError::SplitOutOfRange { split, nb_splits });
                }
                SplitTarget::Single(split)
            }
            _ => SplitTarget::All,
        };
        Ok(Some(ScoredHit {
            fiber: self.fiber_id,
            strand,
            channel: decoded.residue.into(),
            nucleotide: decoded.nucleotide,
            energy: self.energy,
            splits,
        }))
    }
}

/// The largest power of ten that is lower or equal to `value`, or 1 if `value < 10`.
pub fn calculate_integer_magnitude(value: i64) -> i64 {
    let mut ret = 1;
    while value / ret >= 10 {
        ret *= 10;
    }
    ret
}
