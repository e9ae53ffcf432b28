use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resource bounds
// ---------------------------------------------------------------------------
const LOYALTY_MIN: f64 = 0.0;
const LOYALTY_MAX: f64 = 100.0;
const SECURITY_MIN: f64 = 0.0;
const SECURITY_MAX: f64 = 100.0;

/// Where a hero currently stands with respect to the campaign.
///
/// `Prisoner` carries the faction handle of the captor so release/ransom
/// mechanics can find the holding force later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HeroState {
    Active,
    Disabled,
    Prisoner { of: u64 },
}

/// A hero: the player character or a companion who can be sent on missions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroData {
    pub state: HeroState,
    /// Roguery skill, the stat every covert action keys off.
    pub roguery: u32,
    /// Accumulated roguery experience. Skill-ups are the host's concern.
    #[serde(default)]
    pub roguery_xp: f64,
    /// Percent of full health, shown in agent selection.
    #[serde(default = "default_hit_points")]
    pub hit_points: u32,
    #[serde(default)]
    pub is_player: bool,
}

fn default_hit_points() -> u32 {
    100
}

impl Default for HeroData {
    fn default() -> Self {
        Self {
            state: HeroState::Active,
            roguery: 0,
            roguery_xp: 0.0,
            hit_points: 100,
            is_player: false,
        }
    }
}

impl HeroData {
    pub fn add_roguery_xp(&mut self, amount: f64) {
        self.roguery_xp += amount;
    }
}

/// A settlement: a fortified town holding the three resources covert
/// operations attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementData {
    pub x: f64,
    pub y: f64,
    /// Stored food, saturating at zero. Never negative.
    pub food_stocks: f64,
    /// Populace loyalty to the owner, 0-100.
    pub loyalty: f64,
    /// Guard presence, 0-100. Drives capture risk.
    pub security: f64,
    /// Faction handle of the controlling force.
    pub owner_faction: u64,
    #[serde(default)]
    pub is_village: bool,
    #[serde(default)]
    pub under_siege: bool,
}

impl Default for SettlementData {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            food_stocks: 100.0,
            loyalty: 50.0,
            security: 50.0,
            owner_faction: 0,
            is_village: false,
            under_siege: false,
        }
    }
}

impl SettlementData {
    /// Remove food from the stocks, saturating at zero.
    pub fn apply_food_loss(&mut self, amount: f64) {
        self.food_stocks = (self.food_stocks - amount).max(0.0);
    }

    /// Lower loyalty, clamped to its 0-100 band.
    pub fn apply_loyalty_loss(&mut self, amount: f64) {
        self.loyalty = (self.loyalty - amount).clamp(LOYALTY_MIN, LOYALTY_MAX);
    }

    /// Lower security, clamped to its 0-100 band.
    pub fn apply_security_loss(&mut self, amount: f64) {
        self.security = (self.security - amount).clamp(SECURITY_MIN, SECURITY_MAX);
    }
}

/// A mobile party on the campaign map.
///
/// The player's own party is one of these; mission travel parties are
/// spawned `quest_locked` so the host AI never reassigns or reroutes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyData {
    pub x: f64,
    pub y: f64,
    /// Faction handle of the owning force.
    pub owner_faction: u64,
    /// Settlement this party is walking toward, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<u64>,
    /// Hero IDs riding with this party.
    #[serde(default)]
    pub roster: Vec<u64>,
    #[serde(default)]
    pub quest_locked: bool,
}

impl Default for PartyData {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            owner_faction: 0,
            destination: None,
            roster: Vec::new(),
            quest_locked: false,
        }
    }
}

/// Per-kind payload attached to an [`Entity`](super::entity::Entity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityData {
    Hero(HeroData),
    Settlement(SettlementData),
    Party(PartyData),
}

macro_rules! entity_data_accessors {
    ($( $variant:ident, $data_ty:ident, $as_ref:ident, $as_mut:ident; )*) => {
        $(
            pub fn $as_ref(&self) -> Option<&$data_ty> {
                match self {
                    EntityData::$variant(d) => Some(d),
                    _ => None,
                }
            }

            pub fn $as_mut(&mut self) -> Option<&mut $data_ty> {
                match self {
                    EntityData::$variant(d) => Some(d),
                    _ => None,
                }
            }
        )*
    };
}

impl EntityData {
    entity_data_accessors! {
        Hero, HeroData, as_hero, as_hero_mut;
        Settlement, SettlementData, as_settlement, as_settlement_mut;
        Party, PartyData, as_party, as_party_mut;
    }
}
