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
//! Exports of the fiber positions and of the damage records to text and JSON files.

use std::path::{Path, PathBuf};
use strum::Display;

pub mod damage;
pub mod positions;

use nucleofiber_damage::EventDamage;
use nucleofiber_design::PositionLedger;

/// The file formats to which an export is implemented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ExportType {
    /// One whitespace separated table per kind of residue.
    PositionTable,
    PositionJson,
    /// One comma separated row per event.
    DamageTable,
    /// Damage records with the details of each cluster.
    DamageJson,
}

/// A value returned by the export functions when exports was successfull.
///
/// This means that both the format conversion and the write to the output files were successful.
#[derive(Debug)]
pub enum ExportSuccess {
    Positions(Vec<PathBuf>),
    Damage(PathBuf),
}

const SUCCESSFUL_EXPORT_MSG_PREFIX: &str = "Successfully exported to";

impl ExportSuccess {
    /// A message telling that the export operation was successfull and giving the paths to which
    /// the export was made
    pub fn message(&self) -> String {
        match self {
            Self::Positions(paths) => format!(
                "{SUCCESSFUL_EXPORT_MSG_PREFIX}\n{}",
                itertools::join(paths.iter().map(|p| p.to_string_lossy()), "\n")
            ),
            Self::Damage(p) => format!("{SUCCESSFUL_EXPORT_MSG_PREFIX}\n{}", p.to_string_lossy()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Could not write export file: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Could not serialize export: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0} is not an export of this kind of data")]
    WrongExportType(ExportType),
}

pub type ExportResult = Result<ExportSuccess, ExportError>;

/// Write the position ledger of a fiber.
///
/// Tables are written to `<prefix>_<kind>.txt`, the JSON export to `<prefix>.json`.
pub fn export_positions(
    ledger: &PositionLedger,
    export_type: ExportType,
    prefix: &Path,
) -> ExportResult {
    match export_type {
        ExportType::PositionTable => {
            let mut paths = Vec::new();
            for (kind, entries) in ledger.iter() {
                let path = suffixed_path(prefix, &format!("_{kind}.txt"));
                let mut file = std::fs::File::create(&path)?;
                positions::write_table(kind, entries, &mut file)?;
                log::debug!("{} {kind} positions written", entries.len());
                paths.push(path);
            }
            Ok(ExportSuccess::Positions(paths))
        }
        ExportType::PositionJson => {
            let path = suffixed_path(prefix, ".json");
            let file = std::fs::File::create(&path)?;
            positions::write_json(ledger, file)?;
            Ok(ExportSuccess::Positions(vec![path]))
        }
        t => Err(ExportError::WrongExportType(t)),
    }
}

/// Write the damage records of a run.
pub fn export_damage(records: &[EventDamage], export_type: ExportType, path: &Path) -> ExportResult {
    let file = std::fs::File::create(path)?;
    match export_type {
        ExportType::DamageTable => damage::write_table(records, file)?,
        ExportType::DamageJson => damage::write_json(records, file)?,
        t => return Err(ExportError::WrongExportType(t)),
    }
    Ok(ExportSuccess::Damage(path.to_path_buf()))
}

fn suffixed_path(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
