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
//! Replay of recorded simulation steps through the damage scorer.

use super::config::ConfigError;
use nucleofiber_damage::{ClusteredDamageScorer, DamageError, EventDamage, StepHit};
use std::io::Read;
use std::path::Path;

/// The steps of one simulated event that deposited energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub event_id: u64,
    #[serde(default)]
    pub hits: Vec<StepHit>,
}

pub fn read_events<R: Read>(reader: R) -> Result<Vec<RecordedEvent>, ConfigError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn load_events(path: &Path) -> Result<Vec<RecordedEvent>, ConfigError> {
    let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let events = read_events(std::io::BufReader::new(file))?;
    log::info!("{} events read from {:?}", events.len(), path);
    Ok(events)
}

/// Score every event, in order.
pub fn replay(
    scorer: &mut ClusteredDamageScorer,
    events: &[RecordedEvent],
) -> Result<Vec<EventDamage>, DamageError> {
    let mut ret = Vec::with_capacity(events.len());
    for event in events.iter() {
        scorer.begin_event(event.event_id)?;
        for hit in event.hits.iter() {
            scorer.process_hit(hit)?;
        }
        ret.push(scorer.end_event()?);
    }
    log::info!(
        "{} events scored, {} hits deposited energy in the DNA",
        ret.len(),
        scorer.nb_scored_hits()
    );
    Ok(ret)
}
