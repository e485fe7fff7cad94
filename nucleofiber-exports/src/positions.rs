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
use nucleofiber_design::{LedgerEntry, PositionLedger};
use std::io::Write;

/// Write the entries of one kind of residue, one line `kind x y z index strand` per entry.
pub fn write_table<W: Write>(
    kind: &str,
    entries: &[LedgerEntry],
    mut out: W,
) -> Result<(), std::io::Error> {
    for e in entries.iter() {
        writeln!(
            &mut out,
            "{kind} {:.6} {:.6} {:.6} {} {}",
            e.x, e.y, e.z, e.index, e.strand
        )?;
    }
    Ok(())
}

pub fn write_json<W: Write>(ledger: &PositionLedger, out: W) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(out, ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nucleofiber_design::ultraviolet::DVec3;

    fn ledger() -> PositionLedger {
        let mut ledger = PositionLedger::default();
        ledger.push("Base1", DVec3::new(1., -2.5, 0.125), 3, 1);
        ledger.push("Base1", DVec3::new(0., 0., 1.), 4, 1);
        ledger.push("Histone", DVec3::new(10.46, 0., -65.14), 0, 0);
        ledger
    }

    #[test]
    fn table_lines() {
        let ledger = ledger();
        let mut out = Vec::new();
        write_table("Base1", ledger.get("Base1").unwrap(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Base1 1.000000 -2.500000 0.125000 3 1\nBase1 0.000000 0.000000 1.000000 4 1\n"
        );
    }

    #[test]
    fn json_keeps_every_kind() {
        let ledger = ledger();
        let mut out = Vec::new();
        write_json(&ledger, &mut out).unwrap();
        let read: PositionLedger = serde_json::from_slice(&out).unwrap();
        assert_eq!(read, ledger);
        assert_eq!(read.nb_entries(), 3);
    }
}
