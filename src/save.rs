//! Campaign snapshots: everything the mission engine needs to survive a
//! process restart, written as JSONL collections keyed by stable IDs plus
//! one meta file for the scalars.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::id::IdGenerator;
use crate::model::{Entity, World};
use crate::settings::CampaignSettings;
use crate::sim::{MissionRecord, MissionRegistry};

const ENTITIES_FILE: &str = "entities.jsonl";
const MISSIONS_FILE: &str = "missions.jsonl";
const META_FILE: &str = "meta.json";

#[derive(Serialize, Deserialize)]
struct SaveMeta {
    current_day: u64,
    /// First ID the generator has not handed out yet; loading resumes past
    /// it so a restored campaign never reuses an ID.
    next_id: u64,
    player_faction: u64,
    player_party: u64,
    settings: CampaignSettings,
}

/// Write an iterator of serializable items to a JSONL file (one JSON
/// object per line).
fn write_jsonl<T: Serialize>(path: &Path, items: impl Iterator<Item = T>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Read a JSONL file back into a vector. Blank lines are tolerated;
/// malformed JSON surfaces as `InvalidData`.
fn read_jsonl<T: DeserializeOwned>(path: &Path) -> io::Result<Vec<T>> {
    let file = File::open(path)?;
    let mut items = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        items.push(serde_json::from_str(&line)?);
    }
    Ok(items)
}

/// Snapshot the campaign into `dir`, creating it if needed. Writes
/// `entities.jsonl`, `missions.jsonl` (one active mission record per
/// operative), and `meta.json`.
pub fn save_campaign(
    world: &World,
    registry: &MissionRegistry,
    settings: &CampaignSettings,
    dir: &Path,
) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    write_jsonl(&dir.join(ENTITIES_FILE), world.entities.values())?;
    write_jsonl(&dir.join(MISSIONS_FILE), registry.records())?;

    let meta = SaveMeta {
        current_day: world.current_day,
        next_id: world.id_gen.next_unassigned(),
        player_faction: world.player_faction,
        player_party: world.player_party,
        settings: settings.clone(),
    };
    let writer = BufWriter::new(File::create(dir.join(META_FILE))?);
    serde_json::to_writer_pretty(writer, &meta)?;
    Ok(())
}

/// Restore a campaign snapshot written by [`save_campaign`]. Settings are
/// clamped back into their option ranges in case the file was hand-edited.
pub fn load_campaign(dir: &Path) -> io::Result<(World, MissionRegistry, CampaignSettings)> {
    let meta: SaveMeta = serde_json::from_reader(BufReader::new(File::open(dir.join(META_FILE))?))?;

    let entities: Vec<Entity> = read_jsonl(&dir.join(ENTITIES_FILE))?;
    let records: Vec<MissionRecord> = read_jsonl(&dir.join(MISSIONS_FILE))?;

    let world = World {
        entities: entities.into_iter().map(|e| (e.id, e)).collect(),
        id_gen: IdGenerator::starting_from(meta.next_id),
        current_day: meta.current_day,
        player_faction: meta.player_faction,
        player_party: meta.player_party,
    };
    let registry = MissionRegistry::from_records(records);

    Ok((world, registry, meta.settings.clamped()))
}
