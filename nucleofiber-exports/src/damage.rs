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
use itertools::Itertools;
use nucleofiber_damage::EventDamage;
use std::io::Write;

pub const DAMAGE_TABLE_HEADER: &str = "Event number, Single strand breaks, Double strand breaks, \
                                       Base damages, Complex DSBs, Non-DSB clusters";

fn row(record: &EventDamage) -> String {
    [
        record.event_id as i64,
        record.ssb,
        record.dsb,
        record.bd,
        record.complex_dsb as i64,
        record.non_dsb_clusters as i64,
    ]
    .iter()
    .join(", ")
}

/// Write the header and one row per event.
pub fn write_table<W: Write>(records: &[EventDamage], mut out: W) -> Result<(), std::io::Error> {
    writeln!(&mut out, "{DAMAGE_TABLE_HEADER}")?;
    for r in records.iter() {
        writeln!(&mut out, "{}", row(r))?;
    }
    Ok(())
}

/// Write the records with the details of every cluster.
pub fn write_json<W: Write>(records: &[EventDamage], out: W) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(out, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nucleofiber_damage::ClusterSummary;

    fn record() -> EventDamage {
        EventDamage {
            event_id: 12,
            ssb: 3,
            dsb: 1,
            bd: 2,
            complex_dsb: 1,
            non_dsb_clusters: 0,
            complex_dsb_details: vec![ClusterSummary {
                size: 5,
                ssb: 0,
                bd: 1,
                dsb: 1,
                total: 2,
            }],
            non_dsb_cluster_details: vec![],
        }
    }

    #[test]
    fn table_columns() {
        let mut out = Vec::new();
        write_table(&[record()], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Event number, Single strand breaks, Double strand breaks, Base damages, Complex DSBs, Non-DSB clusters")
        );
        assert_eq!(lines.next(), Some("12, 3, 1, 2, 1, 0"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn json_keeps_cluster_details() {
        let mut out = Vec::new();
        write_json(&[record()], &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["complex_dsb_details"][0]["bd"], 1);
    }
}
