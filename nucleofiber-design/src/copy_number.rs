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
//! Copy numbers of the residue placements.
//!
//! The copy number of a residue encodes its strand, the kind of residue and the index of its
//! nucleotide along the fiber: `strand * 1_000_000 + residue * 100_000 + nucleotide`.

use super::base_pairs::{ResidueKind, ResidueSlot};
use std::convert::TryFrom;

pub const STRAND_FACTOR: i64 = 1_000_000;
pub const RESIDUE_FACTOR: i64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum ResidueCode {
    Phosphate = 0,
    Deoxyribose = 1,
    Base = 2,
}

impl ResidueCode {
    /// Phosphates and sugars form the backbone of the strands.
    pub fn is_backbone(&self) -> bool {
        matches!(self, Self::Phosphate | Self::Deoxyribose)
    }
}

impl From<ResidueKind> for ResidueCode {
    fn from(kind: ResidueKind) -> Self {
        match kind {
            ResidueKind::Phosphate => Self::Phosphate,
            ResidueKind::Deoxyribose => Self::Deoxyribose,
            ResidueKind::Base => Self::Base,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CopyNumberError {
    #[error("copy number {0} is negative")]
    Negative(i64),
    #[error("copy number {copy_number} has an unknown residue code {code}")]
    UnknownResidue { copy_number: i64, code: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedCopyNumber {
    /// 0 for the first strand, 1 for the second. Other values denote volumes that are not DNA
    /// residues.
    pub strand: i64,
    pub residue: ResidueCode,
    pub nucleotide: usize,
}

/// The copy number of the residue `slot` of the `count`-th base pair of the fiber.
pub fn encode(slot: ResidueSlot, count: usize) -> i64 {
    let strand = slot.strand() as i64 - 1;
    let residue = ResidueCode::from(slot.kind()) as i64;
    strand * STRAND_FACTOR + residue * RESIDUE_FACTOR + count as i64
}

pub fn decode(copy_number: i64) -> Result<DecodedCopyNumber, CopyNumberError> {
    if copy_number < 0 {
        return Err(CopyNumberError::Negative(copy_number));
    }
    let strand = copy_number / STRAND_FACTOR;
    let code = (copy_number % STRAND_FACTOR) / RESIDUE_FACTOR;
    let residue = u8::try_from(code)
        .ok()
        .and_then(|c| ResidueCode::try_from(c).ok())
        .ok_or(CopyNumberError::UnknownResidue { copy_number, code })?;
    Ok(DecodedCopyNumber {
        strand,
        residue,
        nucleotide: (copy_number % RESIDUE_FACTOR) as usize,
    })
}
