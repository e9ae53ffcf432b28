use std::collections::BTreeMap;

use super::entity::{Entity, EntityKind};
use super::entity_data::{EntityData, HeroData, HeroState, PartyData, SettlementData};
use crate::id::IdGenerator;

/// The campaign map: every hero, settlement, and mobile party, keyed by
/// stable ID, plus the campaign clock.
///
/// This is the collaborator surface the mission engine runs against. All
/// mutation happens through `&mut World` held by the single daily tick, so
/// no interior locking exists anywhere.
#[derive(Debug)]
pub struct World {
    pub entities: BTreeMap<u64, Entity>,
    pub id_gen: IdGenerator,
    /// Whole simulated days since campaign start.
    pub current_day: u64,
    /// Faction handle of the player's force. Set during campaign setup.
    pub player_faction: u64,
    /// The player's own mobile party. Set during campaign setup.
    pub player_party: u64,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            id_gen: IdGenerator::new(),
            current_day: 0,
            player_faction: 0,
            player_party: 0,
        }
    }

    /// Allocate an opaque faction handle. Factions carry no state of their
    /// own; the handle only identifies a controlling force.
    pub fn new_faction(&mut self) -> u64 {
        self.id_gen.next_id()
    }

    // -- Entity creation --

    pub fn add_hero(&mut self, name: &str, data: HeroData) -> u64 {
        self.add_entity(EntityKind::Hero, name, EntityData::Hero(data))
    }

    pub fn add_settlement(&mut self, name: &str, data: SettlementData) -> u64 {
        self.add_entity(EntityKind::Settlement, name, EntityData::Settlement(data))
    }

    pub fn add_party(&mut self, name: &str, data: PartyData) -> u64 {
        self.add_entity(EntityKind::Party, name, EntityData::Party(data))
    }

    fn add_entity(&mut self, kind: EntityKind, name: &str, data: EntityData) -> u64 {
        let id = self.id_gen.next_id();
        self.entities.insert(
            id,
            Entity {
                id,
                kind,
                name: name.to_string(),
                end: None,
                data,
            },
        );
        id
    }

    // -- Lifecycle --

    pub fn is_alive(&self, id: u64) -> bool {
        self.entities.get(&id).is_some_and(Entity::is_alive)
    }

    /// Take an entity out of play as of the current day. No-op if the
    /// entity is missing or already ended.
    pub fn end_entity(&mut self, id: u64) {
        let day = self.current_day;
        if let Some(entity) = self.entities.get_mut(&id) {
            if entity.end.is_none() {
                entity.end = Some(day);
            }
        }
    }

    // -- Typed accessors (live entities only) --

    pub fn hero(&self, id: u64) -> Option<&HeroData> {
        self.live(id)?.data.as_hero()
    }

    pub fn hero_mut(&mut self, id: u64) -> Option<&mut HeroData> {
        self.live_mut(id)?.data.as_hero_mut()
    }

    pub fn settlement(&self, id: u64) -> Option<&SettlementData> {
        self.live(id)?.data.as_settlement()
    }

    pub fn settlement_mut(&mut self, id: u64) -> Option<&mut SettlementData> {
        self.live_mut(id)?.data.as_settlement_mut()
    }

    pub fn party(&self, id: u64) -> Option<&PartyData> {
        self.live(id)?.data.as_party()
    }

    pub fn party_mut(&mut self, id: u64) -> Option<&mut PartyData> {
        self.live_mut(id)?.data.as_party_mut()
    }

    pub fn name_of(&self, id: u64) -> String {
        self.entities
            .get(&id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| format!("unknown entity {id}"))
    }

    fn live(&self, id: u64) -> Option<&Entity> {
        self.entities.get(&id).filter(|e| e.is_alive())
    }

    fn live_mut(&mut self, id: u64) -> Option<&mut Entity> {
        self.entities.get_mut(&id).filter(|e| e.is_alive())
    }

    // -- Positions & distance --

    /// Map position of a live party or settlement. Heroes have no position
    /// of their own; they are wherever their party is.
    pub fn position(&self, id: u64) -> Option<(f64, f64)> {
        let entity = self.live(id)?;
        match &entity.data {
            EntityData::Settlement(sd) => Some((sd.x, sd.y)),
            EntityData::Party(pd) => Some((pd.x, pd.y)),
            EntityData::Hero(_) => None,
        }
    }

    /// Euclidean map distance between two live positioned entities.
    pub fn distance(&self, a: u64, b: u64) -> Option<f64> {
        let (ax, ay) = self.position(a)?;
        let (bx, by) = self.position(b)?;
        Some(((ax - bx).powi(2) + (ay - by).powi(2)).sqrt())
    }

    // -- Party operations --

    /// Spawn a quest-locked escort party carrying one hero, standing at the
    /// given position with a movement order toward `destination`.
    pub fn spawn_traveling_party(
        &mut self,
        name: &str,
        owner_faction: u64,
        position: (f64, f64),
        destination: u64,
        hero: u64,
    ) -> u64 {
        self.add_party(
            name,
            PartyData {
                x: position.0,
                y: position.1,
                owner_faction,
                destination: Some(destination),
                roster: vec![hero],
                quest_locked: true,
            },
        )
    }

    /// Remove a party from play. Its roster is cleared so no hero appears
    /// to still be riding with it.
    pub fn despawn_party(&mut self, id: u64) {
        if let Some(pd) = self.party_mut(id) {
            pd.roster.clear();
            pd.destination = None;
        }
        self.end_entity(id);
    }

    /// Position of a live party, `None` once it is gone or despawned.
    pub fn party_position(&self, id: u64) -> Option<(f64, f64)> {
        self.party(id).map(|pd| (pd.x, pd.y))
    }

    // -- Roster operations --

    pub fn roster_contains(&self, party: u64, hero: u64) -> bool {
        self.party(party)
            .is_some_and(|pd| pd.roster.contains(&hero))
    }

    pub fn add_to_roster(&mut self, party: u64, hero: u64) {
        if let Some(pd) = self.party_mut(party) {
            if !pd.roster.contains(&hero) {
                pd.roster.push(hero);
            }
        }
    }

    /// Drop one occurrence of the hero from the party roster.
    pub fn remove_from_roster(&mut self, party: u64, hero: u64) {
        if let Some(pd) = self.party_mut(party) {
            if let Some(idx) = pd.roster.iter().position(|&h| h == hero) {
                pd.roster.remove(idx);
            }
        }
    }

    /// The live party this hero is currently riding with.
    pub fn party_of_hero(&self, hero: u64) -> Option<u64> {
        self.entities
            .values()
            .filter(|e| e.is_alive())
            .find(|e| {
                e.data
                    .as_party()
                    .is_some_and(|pd| pd.roster.contains(&hero))
            })
            .map(|e| e.id)
    }

    // -- Hero operations --

    pub fn hero_state(&self, hero: u64) -> Option<HeroState> {
        self.hero(hero).map(|hd| hd.state)
    }

    pub fn set_hero_state(&mut self, hero: u64, state: HeroState) {
        if let Some(hd) = self.hero_mut(hero) {
            hd.state = state;
        }
    }

    pub fn roguery(&self, hero: u64) -> Option<u32> {
        self.hero(hero).map(|hd| hd.roguery)
    }

    pub fn add_roguery_xp(&mut self, hero: u64, amount: f64) {
        if let Some(hd) = self.hero_mut(hero) {
            hd.add_roguery_xp(amount);
        }
    }

    /// Hand a hero to a capturing force's dungeon. The hero stays alive but
    /// leaves every roster.
    pub fn take_prisoner(&mut self, captor_faction: u64, hero: u64) {
        self.pull_from_all_rosters(hero);
        self.set_hero_state(
            hero,
            HeroState::Prisoner {
                of: captor_faction,
            },
        );
    }

    /// Move a hero instantly to a party's location. Membership is separate;
    /// pair with [`add_to_roster`](Self::add_to_roster).
    pub fn teleport_hero_to_party(&mut self, hero: u64, _party: u64) {
        // Heroes have no position of their own, so the teleport reduces to
        // detaching them from whatever party they were riding with.
        self.pull_from_all_rosters(hero);
    }

    fn pull_from_all_rosters(&mut self, hero: u64) {
        for entity in self.entities.values_mut() {
            if let Some(pd) = entity.data.as_party_mut() {
                pd.roster.retain(|&h| h != hero);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
