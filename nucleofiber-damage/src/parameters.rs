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
//! Thresholds and sizes of the damage scoring.

use super::DamageError;
use nucleofiber_design::copy_number::RESIDUE_FACTOR;
use nucleofiber_design::{ParameterError, ParameterSource};

/// Parameters of the clustered damage scorer. Energies are in eV, distances in base pairs.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DamageParameters {
    /// Maximal distance between two strand breaks on opposite strands forming a double strand
    /// break.
    pub dsb_distance: usize,
    /// Minimal energy deposited in the backbone of a nucleotide for a strand break.
    pub ssb_threshold: f64,
    /// Minimal energy deposited in a base for a base damage.
    pub bd_threshold: f64,
    /// Maximal distance between two consecutive lesions of a cluster.
    pub cluster_distance: usize,
    /// Number of variance reduction splits.
    pub nb_splits: usize,
    pub base_pairs_per_nucleosome: usize,
    pub nucleosomes_per_fiber: usize,
}

impl DamageParameters {
    pub const DEFAULT: DamageParameters = DamageParameters {
        dsb_distance: 10,
        ssb_threshold: 17.5,
        bd_threshold: 17.5,
        cluster_distance: 40,
        nb_splits: 1,
        base_pairs_per_nucleosome: 200,
        nucleosomes_per_fiber: 90,
    };

    pub fn from_source<S: ParameterSource + ?Sized>(source: &S) -> Result<Self, ParameterError> {
        let d = Self::DEFAULT;
        Ok(Self {
            dsb_distance: source.count_or("BasePairDistanceForDefiningDSB", d.dsb_distance)?,
            ssb_threshold: source.double_or("EnergyThresholdForHavingSSB", d.ssb_threshold)?,
            bd_threshold: source.double_or("EnergyThresholdForHavingBD", d.bd_threshold)?,
            cluster_distance: source
                .count_or("BasePairDistanceForDefiningCluster", d.cluster_distance)?,
            nb_splits: source.count_or("NumberOfSplit", d.nb_splits)?,
            base_pairs_per_nucleosome: source
                .count_or("DnaNumBpPerNucleosome", d.base_pairs_per_nucleosome)?,
            nucleosomes_per_fiber: source
                .count_or("DnaNumNucleosomePerFiber", d.nucleosomes_per_fiber)?,
        })
    }

    /// Number of nucleotides on each strand of a fiber.
    pub fn total_base_pairs(&self) -> usize {
        self.base_pairs_per_nucleosome * self.nucleosomes_per_fiber
    }

    pub fn validate(&self) -> Result<(), DamageError> {
        if self.nb_splits == 0 {
            return Err(ParameterError::OutOfRange {
                name: String::from("NumberOfSplit"),
                reason: String::from("at least one split is needed"),
            }
            .into());
        }
        let total = self.total_base_pairs();
        let magnitude = super::calculate_integer_magnitude(total as i64);
        if magnitude >= RESIDUE_FACTOR {
            return Err(DamageError::TooManyBasePairs { total, magnitude });
        }
        Ok(())
    }

    pub fn formated_string(&self) -> String {
        use std::fmt::Write;
        let mut ret = String::new();
        writeln!(&mut ret, "  SSB threshold: {} eV", self.ssb_threshold).unwrap_or_default();
        writeln!(&mut ret, "  BD threshold: {} eV", self.bd_threshold).unwrap_or_default();
        writeln!(&mut ret, "  DSB distance: {} bp", self.dsb_distance).unwrap_or_default();
        writeln!(
            &mut ret,
            "  Cluster distance: {} bp",
            self.cluster_distance
        )
        .unwrap_or_default();
        writeln!(&mut ret, "  #Splits: {}", self.nb_splits).unwrap_or_default();
        writeln!(
            &mut ret,
            "  #Base pairs per strand: {}",
            self.total_base_pairs()
        )
        .unwrap_or_default();
        ret
    }
}

impl Default for DamageParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_from_source() {
        let src: serde_json::Map<String, serde_json::Value> = serde_json::from_str(
            r#"{"EnergyThresholdForHavingSSB": 10.79, "NumberOfSplit": 4,
                "BasePairDistanceForDefiningDSB": 3}"#,
        )
        .unwrap();
        let p = DamageParameters::from_source(&src).unwrap();
        assert_eq!(p.ssb_threshold, 10.79);
        assert_eq!(p.bd_threshold, 17.5);
        assert_eq!(p.nb_splits, 4);
        assert_eq!(p.dsb_distance, 3);
        assert_eq!(p.cluster_distance, 40);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn fiber_too_long_for_copy_numbers() {
        let mut p = DamageParameters::DEFAULT;
        p.nucleosomes_per_fiber = 500;
        assert!(matches!(
            p.validate(),
            Err(DamageError::TooManyBasePairs {
                total: 100_000,
                magnitude: 100_000
            })
        ));
        p.nucleosomes_per_fiber = 499;
        assert!(p.validate().is_ok());
    }
}
