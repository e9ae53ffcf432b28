use serde::{Deserialize, Serialize};

use super::entity_data::EntityData;

/// What a campaign entity is. Factions are not entities; they are opaque
/// `u64` handles tagged onto settlements and parties, since the campaign
/// never inspects them beyond identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Hero,
    Settlement,
    Party,
}

/// A campaign entity: a hero, a settlement, or a traveling party.
///
/// Entities are never deleted from the world map. Leaving play (death,
/// razing, despawn) sets `end` to the campaign day it happened, so IDs held
/// elsewhere (mission records, rosters) stay resolvable while `is_alive`
/// filters them out of live logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u64,
    pub kind: EntityKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
    pub data: EntityData,
}

impl Entity {
    pub fn is_alive(&self) -> bool {
        self.end.is_none()
    }
}
