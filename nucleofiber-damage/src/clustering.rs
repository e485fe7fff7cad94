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
//! Classification of lesions and their grouping into clusters.

use super::DamageError;
use std::collections::BTreeMap;
use std::convert::TryFrom;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, num_enum::TryFromPrimitive,
)]
#[repr(u8)]
pub enum DamageKind {
    /// Single strand break
    Ssb = 0,
    BaseDamage = 1,
    /// One end of a double strand break
    Dsb = 2,
}

impl DamageKind {
    /// Read an integer damage label.
    pub fn from_label(label: i64) -> Result<Self, DamageError> {
        u8::try_from(label)
            .ok()
            .and_then(|l| Self::try_from(l).ok())
            .ok_or(DamageError::UnrecognizedDamageKind(label))
    }
}

/// A damaged nucleotide.
pub type DamageSite = (usize, DamageKind);

/// Read a list of `[index, label]` pairs.
pub fn parse_damage_sites(labels: &[[i64; 2]]) -> Result<Vec<DamageSite>, DamageError> {
    labels
        .iter()
        .map(|[index, label]| {
            let kind = DamageKind::from_label(*label)?;
            let index = usize::try_from(*index).map_err(|_| DamageError::NegativeSite(*index))?;
            Ok((index, kind))
        })
        .collect()
}

/// The nucleotides of `deposits` whose energy reaches `threshold`. `deposits` must be sorted by
/// nucleotide.
pub fn record_simple_damage(threshold: f64, deposits: &[(usize, f64)]) -> Vec<usize> {
    deposits
        .iter()
        .filter(|(_, energy)| *energy >= threshold)
        .map(|(nucleotide, _)| *nucleotide)
        .collect()
}

/// Pair strand breaks of opposite strands into double strand breaks.
///
/// The paired breaks are removed from `ssb1` and `ssb2`. Each double strand break contributes
/// its two ends to the returned list, the lower one first. Both inputs must be sorted.
pub fn pair_dsb(ssb1: &mut Vec<usize>, ssb2: &mut Vec<usize>, distance: usize) -> Vec<usize> {
    let mut ret = Vec::new();
    let mut left1 = Vec::with_capacity(ssb1.len());
    let mut left2 = Vec::with_capacity(ssb2.len());
    let (mut i, mut j) = (0, 0);
    while i < ssb1.len() && j < ssb2.len() {
        let (site1, site2) = (ssb1[i], ssb2[j]);
        if site1.abs_diff(site2) <= distance {
            ret.push(site1.min(site2));
            ret.push(site1.max(site2));
            i += 1;
            j += 1;
        } else if site2 < site1 {
            left2.push(site2);
            j += 1;
        } else {
            left1.push(site1);
            i += 1;
        }
    }
    left1.extend_from_slice(&ssb1[i..]);
    left2.extend_from_slice(&ssb2[j..]);
    *ssb1 = left1;
    *ssb2 = left2;
    ret
}

/// The simple lesions of one fiber in one split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleDamage {
    pub ssb1: Vec<usize>,
    pub bd1: Vec<usize>,
    pub ssb2: Vec<usize>,
    pub bd2: Vec<usize>,
    /// Ends of the double strand breaks.
    pub dsb: Vec<usize>,
}

/// Insert the sorted `sites` in the sorted `combined`. Sites are inserted after the existing
/// sites with the same index.
fn merge_into(combined: &mut Vec<DamageSite>, sites: &[usize], kind: DamageKind) {
    let mut ret = Vec::with_capacity(combined.len() + sites.len());
    let mut sites = sites.iter().peekable();
    for existing in combined.iter() {
        while let Some(site) = sites.next_if(|s| **s < existing.0) {
            ret.push((*site, kind));
        }
        ret.push(*existing);
    }
    ret.extend(sites.map(|s| (*s, kind)));
    *combined = ret;
}

/// Merge all the lesions in a single list sorted by nucleotide.
///
/// Lesions at the same nucleotide keep the order strand break of strand 1, base damage of strand
/// 1, strand break of strand 2, base damage of strand 2, double strand break.
pub fn combine_simple_damage(damage: &SimpleDamage) -> Vec<DamageSite> {
    let mut ret = damage.ssb1.iter().map(|s| (*s, DamageKind::Ssb)).collect();
    merge_into(&mut ret, &damage.bd1, DamageKind::BaseDamage);
    merge_into(&mut ret, &damage.ssb2, DamageKind::Ssb);
    merge_into(&mut ret, &damage.bd2, DamageKind::BaseDamage);
    merge_into(&mut ret, &damage.dsb, DamageKind::Dsb);
    ret
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DamageCluster {
    nb_ssb: usize,
    nb_bd: usize,
    nb_dsb: usize,
    start: usize,
    end: usize,
}

/// Size and composition of a closed cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Number of nucleotides between the first and the last lesion, both included.
    pub size: usize,
    pub ssb: usize,
    pub bd: usize,
    pub dsb: usize,
    pub total: usize,
}

/// Damage counts of one event.
///
/// The `ssb`, `bd` and `dsb` totals count the lesions that do not belong to a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageTally {
    pub ssb: i64,
    pub bd: i64,
    /// Counts the ends of the double strand breaks until [`DamageTally::finalize`] is called.
    pub dsb: i64,
    pub complex_dsb: usize,
    pub non_dsb_clusters: usize,
    pub complex_dsb_details: Vec<ClusterSummary>,
    pub non_dsb_cluster_details: Vec<ClusterSummary>,
    #[serde(skip)]
    finalized: bool,
}

impl DamageTally {
    /// Count the simple lesions of one fiber before they are clustered.
    pub fn add_simple_damage(&mut self, damage: &SimpleDamage) {
        self.ssb += (damage.ssb1.len() + damage.ssb2.len()) as i64;
        self.bd += (damage.bd1.len() + damage.bd2.len()) as i64;
        self.dsb += damage.dsb.len() as i64;
    }

    fn add_to_cluster(&mut self, cluster: &mut DamageCluster, site: DamageSite, first: bool) {
        if first {
            cluster.start = site.0;
        } else {
            cluster.end = site.0;
        }
        match site.1 {
            DamageKind::Ssb => {
                cluster.nb_ssb += 1;
                self.ssb -= 1;
            }
            DamageKind::BaseDamage => {
                cluster.nb_bd += 1;
                self.bd -= 1;
            }
            DamageKind::Dsb => {
                cluster.nb_dsb += 1;
                self.dsb -= 1;
            }
        }
    }

    fn record_cluster(&mut self, cluster: DamageCluster) {
        let size = cluster.end.saturating_sub(cluster.start) + 1;
        if cluster.nb_dsb > 0 {
            let dsb = cluster.nb_dsb / 2;
            self.complex_dsb_details.push(ClusterSummary {
                size,
                ssb: cluster.nb_ssb,
                bd: cluster.nb_bd,
                dsb,
                total: cluster.nb_ssb + cluster.nb_bd + dsb,
            });
            self.complex_dsb += 1;
        } else {
            self.non_dsb_cluster_details.push(ClusterSummary {
                size,
                ssb: cluster.nb_ssb,
                bd: cluster.nb_bd,
                dsb: 0,
                total: cluster.nb_ssb + cluster.nb_bd,
            });
            self.non_dsb_clusters += 1;
        }
    }

    /// Turn the count of double strand break ends into a count of double strand breaks. Only
    /// the first call has an effect.
    pub fn finalize(&mut self) {
        if !self.finalized {
            self.dsb /= 2;
            self.finalized = true;
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// True iff some damage was counted.
    pub fn has_damage(&self) -> bool {
        self.ssb > 0
            || self.bd > 0
            || self.dsb > 0
            || self.complex_dsb > 0
            || self.non_dsb_clusters > 0
    }
}

/// Group the lesions of `sites` into clusters.
///
/// Two consecutive lesions belong to the same cluster if they are at most `distance` nucleotides
/// apart. `sites` must be sorted.
pub fn record_clustered_damage(sites: &[DamageSite], distance: usize, tally: &mut DamageTally) {
    if sites.len() < 2 {
        return;
    }
    let mut cluster = DamageCluster::default();
    let mut building = false;
    for pair in sites.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        if current.0.saturating_sub(previous.0) <= distance {
            if !building {
                tally.add_to_cluster(&mut cluster, previous, true);
                building = true;
            }
            tally.add_to_cluster(&mut cluster, current, false);
        } else if building {
            building = false;
            tally.record_cluster(std::mem::take(&mut cluster));
        }
    }
    if building {
        tally.record_cluster(cluster);
    }
}

/// Result of the strand break counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrandBreaks {
    pub ssb: i64,
    pub dsb: i64,
}

impl std::ops::AddAssign for StrandBreaks {
    fn add_assign(&mut self, other: Self) {
        self.ssb += other.ssb;
        self.dsb += other.dsb;
    }
}

fn pop_first(map: &mut BTreeMap<usize, f64>) -> Option<(usize, f64)> {
    let key = *map.keys().next()?;
    map.remove(&key).map(|energy| (key, energy))
}

/// Count strand breaks without clustering, consuming the backbone deposits of both strands.
///
/// Each break of strand 1 is paired with the first break of strand 2 that is close enough.
pub fn count_strand_breaks(
    strand1: &mut BTreeMap<usize, f64>,
    strand2: &mut BTreeMap<usize, f64>,
    threshold: f64,
    distance: usize,
) -> StrandBreaks {
    let distance = distance as i64;
    let (mut ssb1, mut ssb2, mut dsb) = (0i64, 0i64, 0i64);
    while let Some((nucl1, energy1)) = pop_first(strand1) {
        let nucl1 = nucl1 as i64;
        if energy1 >= threshold {
            ssb1 += 1;
        }
        let (mut nucl2, mut energy2) = match pop_first(strand2) {
            Some((nucl2, energy2)) => (nucl2 as i64, energy2),
            None => continue,
        };
        loop {
            if energy2 >= threshold {
                ssb2 += 1;
            }
            if nucl1 - nucl2 <= distance {
                break;
            }
            match pop_first(strand2) {
                Some((n, e)) => {
                    nucl2 = n as i64;
                    energy2 = e;
                }
                None => break,
            }
        }
        if nucl2 - nucl1 > distance {
            strand2.insert(nucl2 as usize, energy2);
            if energy2 >= threshold {
                ssb2 -= 1;
            }
        }
        if (nucl2 - nucl1).abs() <= distance && energy1 >= threshold && energy2 >= threshold {
            ssb1 -= 1;
            ssb2 -= 1;
            dsb += 1;
        }
    }
    while let Some((_, energy2)) = pop_first(strand2) {
        if energy2 >= threshold {
            ssb2 += 1;
        }
    }
    StrandBreaks {
        ssb: ssb1 + ssb2,
        dsb,
    }
}
