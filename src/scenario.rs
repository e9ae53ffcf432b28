use crate::model::{HeroData, PartyData, SettlementData, World};

/// Fluent builder for constructing campaign state.
///
/// Every scenario starts with a player faction, the player hero, and the
/// main party camped at the origin, plus one hostile faction that owns all
/// added settlements by default. Closure-based field mutation means adding
/// new data fields never breaks callers.
///
/// Used by tests for deterministic setup; also a reasonable starting point
/// for headless balance runs.
pub struct Scenario {
    world: World,
    player: u64,
    enemy_faction: u64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    pub fn new() -> Self {
        let mut world = World::new();
        let player_faction = world.new_faction();
        let enemy_faction = world.new_faction();

        let player = world.add_hero(
            "Player",
            HeroData {
                is_player: true,
                ..Default::default()
            },
        );
        let player_party = world.add_party(
            "Main Party",
            PartyData {
                owner_faction: player_faction,
                roster: vec![player],
                ..Default::default()
            },
        );
        world.player_faction = player_faction;
        world.player_party = player_party;

        Self {
            world,
            player,
            enemy_faction,
        }
    }

    pub fn player(&self) -> u64 {
        self.player
    }

    pub fn player_faction(&self) -> u64 {
        self.world.player_faction
    }

    /// The hostile faction that owns scenario settlements by default.
    pub fn enemy_faction(&self) -> u64 {
        self.enemy_faction
    }

    // -- Entity creation --

    /// Add a living, active companion with the given roguery to the
    /// player's party.
    pub fn add_companion(&mut self, name: &str, roguery: u32) -> u64 {
        self.add_companion_with(name, |hd| hd.roguery = roguery)
    }

    /// Add a companion to the player's party, customizing them via closure.
    pub fn add_companion_with(&mut self, name: &str, modify: impl FnOnce(&mut HeroData)) -> u64 {
        let mut data = HeroData::default();
        modify(&mut data);
        let hero = self.world.add_hero(name, data);
        let player_party = self.world.player_party;
        self.world.add_to_roster(player_party, hero);
        hero
    }

    /// Add an enemy-held town at the given map position with default
    /// stocks (food 100, loyalty 50, security 50).
    pub fn add_settlement(&mut self, name: &str, x: f64, y: f64) -> u64 {
        self.add_settlement_with(name, x, y, |_| {})
    }

    /// Add an enemy-held town, customizing its data via closure.
    pub fn add_settlement_with(
        &mut self,
        name: &str,
        x: f64,
        y: f64,
        modify: impl FnOnce(&mut SettlementData),
    ) -> u64 {
        let mut data = SettlementData {
            x,
            y,
            owner_faction: self.enemy_faction,
            ..Default::default()
        };
        modify(&mut data);
        self.world.add_settlement(name, data)
    }

    /// Terminate the builder and hand over the world.
    pub fn build(self) -> World {
        self.world
    }
}
