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
use std::env;
use std::path::{Path, PathBuf};

#[macro_use]
extern crate serde_derive;
extern crate serde;

/// Configuration files
mod config;
/// Scoring of recorded steps
mod replay;

use nucleofiber_damage::{ClusteredDamageScorer, DamageError, DamageParameters};
use nucleofiber_design::ultraviolet::DVec3;
use nucleofiber_design::{
    mean_residue_volumes, AssemblyError, CsgKernel, FiberAssembler, GeometryKernel, KernelError,
    Transform,
};
use nucleofiber_exports::{ExportError, ExportType};

const USAGE: &str = "usage:
    nucleofiber build <config.json> [output-prefix]
    nucleofiber score <config.json> <steps.json> <output>";

/// Margin between the fiber envelope and the world volume, in nm.
const WORLD_MARGIN: f64 = 1.;

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Geometry error: {0}")]
    Assembly(#[from] AssemblyError),
    #[error("Geometry error: {0}")]
    Kernel(#[from] KernelError),
    #[error("Damage scoring error: {0}")]
    Damage(#[from] DamageError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
    #[error("{0}")]
    Usage(&'static str),
}

fn default_prefix() -> PathBuf {
    use chrono::Utc;
    let now = Utc::now();
    PathBuf::from(now.format("fiber_%Y_%m_%d_%H_%M_%S").to_string())
}

fn build(config_path: &Path, prefix: &Path) -> Result<(), RunError> {
    let config = config::load_config(config_path)?;
    let mut assembler = FiberAssembler::from_source(&config)?;
    log::info!("{}", assembler.parameters().formated_string());
    let options = *assembler.options();

    let mut kernel = CsgKernel::new(options.overlap_seed);
    let world = kernel.cuboid(
        "World",
        DVec3::new(
            options.fiber_radius + WORLD_MARGIN,
            options.fiber_radius + WORLD_MARGIN,
            options.fiber_half_length + WORLD_MARGIN,
        ),
    );
    let world = kernel.logical_volume("World", world)?;
    kernel.place("World", world, Transform::identity(), None, 0)?;

    let volumes = assembler.build_fiber(&mut kernel, world)?;
    log::info!(
        "{} volumes placed in {} placements",
        kernel.nb_solids(),
        volumes.nb_placements
    );
    if options.check_overlaps {
        log::info!("{} overlaps detected", volumes.nb_overlaps);
    }
    if log::log_enabled!(log::Level::Debug) {
        mean_residue_volumes(&kernel, &volumes.residues)?;
    }

    for export_type in [ExportType::PositionTable, ExportType::PositionJson] {
        let success =
            nucleofiber_exports::export_positions(assembler.position_ledger(), export_type, prefix)?;
        log::info!("{}", success.message());
    }
    Ok(())
}

fn score(config_path: &Path, steps_path: &Path, output: &Path) -> Result<(), RunError> {
    let config = config::load_config(config_path)?;
    let parameters = DamageParameters::from_source(&config).map_err(DamageError::from)?;
    let mut scorer = ClusteredDamageScorer::new(parameters)?;
    log::info!("{}", scorer.parameters().formated_string());

    let events = replay::load_events(steps_path)?;
    let records = replay::replay(&mut scorer, &events)?;
    let export_type = match output.extension().and_then(|e| e.to_str()) {
        Some("json") => ExportType::DamageJson,
        _ => ExportType::DamageTable,
    };
    let success = nucleofiber_exports::export_damage(&records, export_type, output)?;
    log::info!("{}", success.message());
    Ok(())
}

fn run(args: &[String]) -> Result<(), RunError> {
    match args {
        [_, command, config] if command == "build" => build(Path::new(config), &default_prefix()),
        [_, command, config, prefix] if command == "build" => {
            build(Path::new(config), Path::new(prefix))
        }
        [_, command, config, steps, output] if command == "score" => {
            score(Path::new(config), Path::new(steps), Path::new(output))
        }
        _ => Err(RunError::Usage(USAGE)),
    }
}

fn main() {
    pretty_env_logger::init();
    let args: Vec<String> = env::args().collect();
    if let Err(e) = run(&args) {
        log::error!("{e}");
        if let RunError::Usage(usage) = e {
            eprintln!("{usage}");
        }
        std::process::exit(1);
    }
}
