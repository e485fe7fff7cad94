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
//! Reading of the configuration files.

use serde_json::{Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};

/// The named parameters of a run.
pub type Config = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("The configuration must be a json object")]
    NotAnObject,
}

pub fn read_config<R: Read>(reader: R) -> Result<Config, ConfigError> {
    match serde_json::from_reader(reader)? {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject),
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = read_config(std::io::BufReader::new(file))?;
    log::info!("{} parameters read from {:?}", config.len(), path);
    Ok(config)
}
