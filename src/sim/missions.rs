use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::TickContext;
use super::outcome::MissionOutcome;
use super::rules;
use super::system::SimSystem;
use crate::model::HeroState;

// ---------------------------------------------------------------------------
// Mission pacing
// ---------------------------------------------------------------------------
/// Days of sabotage once inside the walls.
const INFILTRATION_DAYS: i32 = 5;
/// Map distance at which the escort party counts as having reached the gate.
const ARRIVAL_RADIUS: f64 = 5.0;
/// A returning operative this close to the player's party just walks in,
/// whatever the countdown says.
const RETURN_PROXIMITY: f64 = 10.0;
/// Roguery XP paid out when the sabotage phase wraps up.
const MISSION_XP: f64 = 800.0;

/// Where an operative currently is in the mission lifecycle.
///
/// The escort-party handle lives inside the `TravelingToTarget` variant, so
/// "a physical party exists" and "the operative is in transit" cannot drift
/// apart. Capture and completion are removals, never stored states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum MissionState {
    TravelingToTarget { party: u64 },
    Infiltrating,
    ReturningToPlayer,
}

/// Per-operative state for one active sabotage assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionRecord {
    pub operative: u64,
    pub target: u64,
    pub state: MissionState,
    /// Meaning depends on state: outbound it is the display-only travel
    /// estimate; infiltrating, sabotage days left; returning, walk-home days
    /// left. Decremented then checked, so it never goes below the transition
    /// threshold before being reset.
    pub days_remaining: i32,
    #[serde(default)]
    pub total_food_destroyed: u32,
    #[serde(default)]
    pub total_loyalty_lost: f64,
}

impl MissionRecord {
    pub fn new(operative: u64, target: u64, party: u64, travel_days: i32) -> Self {
        Self {
            operative,
            target,
            state: MissionState::TravelingToTarget { party },
            days_remaining: travel_days,
            total_food_destroyed: 0,
            total_loyalty_lost: 0.0,
        }
    }
}

/// Owns the operative → mission mapping and advances every record once per
/// simulated day. Knows nothing about how missions are created; the
/// dispatcher hands it finished records.
#[derive(Debug, Default)]
pub struct MissionRegistry {
    active: BTreeMap<u64, MissionRecord>,
}

impl MissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the registry from saved records, keyed by operative.
    pub fn from_records(records: impl IntoIterator<Item = MissionRecord>) -> Self {
        Self {
            active: records.into_iter().map(|r| (r.operative, r)).collect(),
        }
    }

    /// Store a new record. Returns `false` (leaving the existing record
    /// untouched) if the operative is already on a mission.
    pub fn register(&mut self, record: MissionRecord) -> bool {
        if self.active.contains_key(&record.operative) {
            return false;
        }
        self.active.insert(record.operative, record);
        true
    }

    pub fn contains(&self, operative: u64) -> bool {
        self.active.contains_key(&operative)
    }

    pub fn get(&self, operative: u64) -> Option<&MissionRecord> {
        self.active.get(&operative)
    }

    pub fn records(&self) -> impl Iterator<Item = &MissionRecord> {
        self.active.values()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    // -- Per-state resolution --

    fn resolve_travel(&mut self, ctx: &mut TickContext, operative: u64, party: u64, target: u64) {
        match ctx.world.party_position(party) {
            Some(_) => {
                let arrived = ctx
                    .world
                    .distance(party, target)
                    .is_some_and(|d| d < ARRIVAL_RADIUS);
                if !arrived {
                    return;
                }
                ctx.world.despawn_party(party);
                self.begin_infiltration(operative);
                ctx.outcomes
                    .push(MissionOutcome::Infiltrated { operative, target });
            }
            None => {
                // Escort gone without arriving; assume the operative
                // continued on foot.
                tracing::debug!("escort party {party} missing, operative {operative} slips in");
                self.begin_infiltration(operative);
            }
        }
    }

    fn begin_infiltration(&mut self, operative: u64) {
        if let Some(record) = self.active.get_mut(&operative) {
            record.state = MissionState::Infiltrating;
            record.days_remaining = INFILTRATION_DAYS;
        }
    }

    fn resolve_infiltration(&mut self, ctx: &mut TickContext, operative: u64, target: u64) {
        let days_left = {
            let Some(record) = self.active.get_mut(&operative) else {
                return;
            };
            record.days_remaining -= 1;
            record.days_remaining
        };

        let Some((security, owner_faction)) = ctx
            .world
            .settlement(target)
            .map(|sd| (sd.security, sd.owner_faction))
        else {
            return;
        };
        let roguery = ctx.world.roguery(operative).unwrap_or(0);

        let roll: f64 = ctx.rng.random_range(0.0..100.0);
        if roll < rules::risk_factor(security, roguery) * ctx.settings.difficulty_factor {
            // Caught. A knocked-out operative comes to before the guards
            // march them off; the dungeon holds conscious prisoners only.
            if ctx.world.hero_state(operative) == Some(HeroState::Disabled) {
                ctx.world.set_hero_state(operative, HeroState::Active);
            }
            ctx.world.take_prisoner(owner_faction, operative);
            self.active.remove(&operative);
            ctx.outcomes
                .push(MissionOutcome::Captured { operative, target });
            return;
        }

        // A day's sabotage: three independent hits. Loyalty reads the
        // security value from before today's erosion.
        let loyalty_dmg = rules::loyalty_damage(security, roguery);
        let security_dmg = rules::security_damage(roguery);
        let mut food_destroyed = 0u32;
        if let Some(sd) = ctx.world.settlement_mut(target) {
            if sd.food_stocks > 0.0 {
                let dmg = rules::food_damage(sd.food_stocks, roguery);
                sd.apply_food_loss(dmg);
                food_destroyed = dmg.floor() as u32;
            }
            sd.apply_loyalty_loss(loyalty_dmg);
            sd.apply_security_loss(security_dmg);
        }
        if let Some(record) = self.active.get_mut(&operative) {
            record.total_food_destroyed += food_destroyed;
            record.total_loyalty_lost += loyalty_dmg;
        }

        if days_left <= 0 {
            self.start_return(ctx, operative, target);
        }
    }

    fn start_return(&mut self, ctx: &mut TickContext, operative: u64, target: u64) {
        ctx.world
            .add_roguery_xp(operative, MISSION_XP * ctx.settings.xp_gain_multiplier);

        // Recomputed from today's player position, never inherited from
        // the outbound leg.
        let days = ctx
            .world
            .distance(ctx.world.player_party, target)
            .map(rules::return_days)
            .unwrap_or(rules::MIN_RETURN_DAYS);

        if let Some(record) = self.active.get_mut(&operative) {
            record.state = MissionState::ReturningToPlayer;
            record.days_remaining = days;
        }
        ctx.outcomes.push(MissionOutcome::ReturnStarted {
            operative,
            target,
            days,
        });
    }

    fn resolve_return(&mut self, ctx: &mut TickContext, operative: u64, target: u64) {
        let days_left = {
            let Some(record) = self.active.get_mut(&operative) else {
                return;
            };
            record.days_remaining -= 1;
            record.days_remaining
        };

        let close_to_home = ctx
            .world
            .distance(ctx.world.player_party, target)
            .is_some_and(|d| d < RETURN_PROXIMITY);
        if days_left > 0 && !close_to_home {
            return;
        }

        // Home. Restore the hero to the player's roster in fighting shape.
        if ctx.world.hero_state(operative) != Some(HeroState::Active) {
            ctx.world.set_hero_state(operative, HeroState::Active);
        }
        let player_party = ctx.world.player_party;
        ctx.world.teleport_hero_to_party(operative, player_party);
        if !ctx.world.roster_contains(player_party, operative) {
            ctx.world.add_to_roster(player_party, operative);
        }

        let Some(record) = self.active.remove(&operative) else {
            return;
        };
        ctx.outcomes.push(MissionOutcome::MissionComplete {
            operative,
            target,
            total_food_destroyed: record.total_food_destroyed,
            total_loyalty_lost: record.total_loyalty_lost,
        });
    }
}

impl SimSystem for MissionRegistry {
    fn name(&self) -> &str {
        "missions"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        // Snapshot the key set: removals during the sweep must not skip or
        // repeat anyone, and no record advances twice in one day.
        let operatives: Vec<u64> = self.active.keys().copied().collect();

        for operative in operatives {
            let Some(record) = self.active.get(&operative) else {
                continue;
            };
            let (state, target) = (record.state, record.target);

            // Safety sweep. An operative who died outside mission control
            // ends the mission with no event; a target that left play is
            // dropped before anything dereferences it.
            if ctx.world.hero(operative).is_none() {
                tracing::debug!("operative {operative} dead or missing, discarding mission");
                self.active.remove(&operative);
                continue;
            }
            if ctx.world.settlement(target).is_none() {
                tracing::warn!("target settlement {target} no longer valid, discarding mission");
                self.active.remove(&operative);
                continue;
            }

            match state {
                MissionState::TravelingToTarget { party } => {
                    self.resolve_travel(ctx, operative, party, target);
                }
                MissionState::Infiltrating => self.resolve_infiltration(ctx, operative, target),
                MissionState::ReturningToPlayer => self.resolve_return(ctx, operative, target),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;
    use crate::settings::CampaignSettings;
    use crate::testutil::tick_system;

    const EPS: f64 = 1e-9;

    /// Settings under which the capture roll can never succeed: any roll in
    /// [0,100) beats risk × 0.
    fn no_capture() -> CampaignSettings {
        CampaignSettings {
            difficulty_factor: 0.0,
            ..Default::default()
        }
    }

    /// Settings under which the capture roll always succeeds: the risk
    /// floor of 2 × 10000 exceeds any roll.
    fn always_capture() -> CampaignSettings {
        CampaignSettings {
            difficulty_factor: 10_000.0,
            ..Default::default()
        }
    }

    fn infiltrating(operative: u64, target: u64) -> MissionRecord {
        MissionRecord {
            operative,
            target,
            state: MissionState::Infiltrating,
            days_remaining: INFILTRATION_DAYS,
            total_food_destroyed: 0,
            total_loyalty_lost: 0.0,
        }
    }

    #[test]
    fn arrival_despawns_party_and_begins_infiltration() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let target = s.add_settlement("Ironhold", 100.0, 0.0);
        let mut world = s.build();

        let party = world.spawn_traveling_party("Escort", world.player_faction, (98.0, 0.0), target, spy);
        let mut registry = MissionRegistry::new();
        registry.register(MissionRecord::new(spy, target, party, 2));

        let outcomes = tick_system(&mut world, &mut registry, &no_capture(), 1);

        let record = registry.get(spy).unwrap();
        assert_eq!(record.state, MissionState::Infiltrating);
        assert_eq!(record.days_remaining, INFILTRATION_DAYS);
        assert!(world.party_position(party).is_none());
        assert_eq!(
            outcomes,
            vec![MissionOutcome::Infiltrated {
                operative: spy,
                target
            }]
        );
    }

    #[test]
    fn distant_party_keeps_traveling() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let target = s.add_settlement("Ironhold", 300.0, 0.0);
        let mut world = s.build();

        let party = world.spawn_traveling_party("Escort", world.player_faction, (0.0, 0.0), target, spy);
        let mut registry = MissionRegistry::new();
        registry.register(MissionRecord::new(spy, target, party, 6));

        let outcomes = tick_system(&mut world, &mut registry, &no_capture(), 1);

        assert_eq!(
            registry.get(spy).unwrap().state,
            MissionState::TravelingToTarget { party }
        );
        assert!(outcomes.is_empty());
    }

    #[test]
    fn missing_party_falls_back_to_infiltration_silently() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let target = s.add_settlement("Ironhold", 300.0, 0.0);
        let mut world = s.build();

        let party = world.spawn_traveling_party("Escort", world.player_faction, (0.0, 0.0), target, spy);
        world.despawn_party(party);

        let mut registry = MissionRegistry::new();
        registry.register(MissionRecord::new(spy, target, party, 6));

        let outcomes = tick_system(&mut world, &mut registry, &no_capture(), 1);

        let record = registry.get(spy).unwrap();
        assert_eq!(record.state, MissionState::Infiltrating);
        assert_eq!(record.days_remaining, INFILTRATION_DAYS);
        assert!(outcomes.is_empty());
    }

    #[test]
    fn sabotage_day_damages_all_three_resources() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let target = s.add_settlement_with("Ironhold", 100.0, 0.0, |sd| {
            sd.food_stocks = 100.0;
            sd.loyalty = 60.0;
            sd.security = 40.0;
        });
        let mut world = s.build();

        let mut registry = MissionRegistry::new();
        registry.register(infiltrating(spy, target));

        tick_system(&mut world, &mut registry, &no_capture(), 1);

        let sd = world.settlement(target).unwrap();
        assert!((sd.food_stocks - 80.5).abs() < EPS);
        assert!((sd.loyalty - 56.0).abs() < EPS);
        assert!((sd.security - 39.0).abs() < EPS);

        let record = registry.get(spy).unwrap();
        assert_eq!(record.days_remaining, INFILTRATION_DAYS - 1);
        assert_eq!(record.total_food_destroyed, 19);
        assert!((record.total_loyalty_lost - 4.0).abs() < EPS);
    }

    #[test]
    fn empty_granary_skips_food_but_not_the_rest() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let target = s.add_settlement_with("Ironhold", 100.0, 0.0, |sd| {
            sd.food_stocks = 0.0;
            sd.loyalty = 60.0;
            sd.security = 40.0;
        });
        let mut world = s.build();

        let mut registry = MissionRegistry::new();
        registry.register(infiltrating(spy, target));

        tick_system(&mut world, &mut registry, &no_capture(), 1);

        let sd = world.settlement(target).unwrap();
        assert!(sd.food_stocks.abs() < EPS);
        assert!((sd.loyalty - 56.0).abs() < EPS);
        assert_eq!(registry.get(spy).unwrap().total_food_destroyed, 0);
    }

    #[test]
    fn capture_removes_record_before_any_sabotage() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let enemy = s.enemy_faction();
        let target = s.add_settlement_with("Ironhold", 100.0, 0.0, |sd| {
            sd.food_stocks = 100.0;
        });
        let mut world = s.build();

        let mut registry = MissionRegistry::new();
        registry.register(infiltrating(spy, target));

        let outcomes = tick_system(&mut world, &mut registry, &always_capture(), 1);

        assert!(registry.is_empty());
        assert_eq!(
            outcomes,
            vec![MissionOutcome::Captured {
                operative: spy,
                target
            }]
        );
        assert_eq!(
            world.hero_state(spy),
            Some(HeroState::Prisoner { of: enemy })
        );
        // No sabotage lands on the day of capture.
        assert!((world.settlement(target).unwrap().food_stocks - 100.0).abs() < EPS);
    }

    #[test]
    fn disabled_operative_wakes_up_in_the_dungeon() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let enemy = s.enemy_faction();
        let target = s.add_settlement("Ironhold", 100.0, 0.0);
        let mut world = s.build();
        world.set_hero_state(spy, HeroState::Disabled);

        let mut registry = MissionRegistry::new();
        registry.register(infiltrating(spy, target));

        tick_system(&mut world, &mut registry, &always_capture(), 1);

        assert_eq!(
            world.hero_state(spy),
            Some(HeroState::Prisoner { of: enemy })
        );
    }

    #[test]
    fn fifth_quiet_day_starts_the_return_leg() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let target = s.add_settlement("Ironhold", 90.0, 0.0);
        let mut world = s.build();

        let mut registry = MissionRegistry::new();
        registry.register(infiltrating(spy, target));

        let mut outcomes = Vec::new();
        for day in 0..INFILTRATION_DAYS {
            outcomes = tick_system(&mut world, &mut registry, &no_capture(), day as u64);
        }

        let record = registry.get(spy).unwrap();
        assert_eq!(record.state, MissionState::ReturningToPlayer);
        // Player party sits at the origin, 90 units out: ceil(90/40) = 3,
        // freshly computed rather than left over from the travel leg.
        assert_eq!(record.days_remaining, 3);
        assert!(outcomes.contains(&MissionOutcome::ReturnStarted {
            operative: spy,
            target,
            days: 3
        }));
        // Return XP banked at the handover.
        assert!((world.hero(spy).unwrap().roguery_xp - 800.0).abs() < EPS);
    }

    #[test]
    fn return_xp_scales_with_multiplier() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let target = s.add_settlement("Ironhold", 90.0, 0.0);
        let mut world = s.build();

        let mut registry = MissionRegistry::new();
        let mut record = infiltrating(spy, target);
        record.days_remaining = 1;
        registry.register(record);

        let settings = CampaignSettings {
            difficulty_factor: 0.0,
            xp_gain_multiplier: 2.0,
            ..Default::default()
        };
        tick_system(&mut world, &mut registry, &settings, 1);

        assert!((world.hero(spy).unwrap().roguery_xp - 1600.0).abs() < EPS);
    }

    #[test]
    fn return_leg_counts_down_then_reinstates() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let target = s.add_settlement("Ironhold", 90.0, 0.0);
        let mut world = s.build();
        let player_party = world.player_party;
        world.remove_from_roster(player_party, spy);

        let mut registry = MissionRegistry::new();
        registry.register(MissionRecord {
            operative: spy,
            target,
            state: MissionState::ReturningToPlayer,
            days_remaining: 2,
            total_food_destroyed: 58,
            total_loyalty_lost: 12.5,
        });

        let outcomes = tick_system(&mut world, &mut registry, &no_capture(), 1);
        assert!(outcomes.is_empty());
        assert_eq!(registry.get(spy).unwrap().days_remaining, 1);

        let outcomes = tick_system(&mut world, &mut registry, &no_capture(), 2);
        assert!(registry.is_empty());
        assert_eq!(
            outcomes,
            vec![MissionOutcome::MissionComplete {
                operative: spy,
                target,
                total_food_destroyed: 58,
                total_loyalty_lost: 12.5,
            }]
        );
        assert!(world.roster_contains(player_party, spy));
        assert_eq!(world.hero_state(spy), Some(HeroState::Active));
    }

    #[test]
    fn returning_operative_walks_in_when_player_camps_nearby() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        // Target right next to the player's party at the origin.
        let target = s.add_settlement("Ironhold", 6.0, 0.0);
        let mut world = s.build();

        let mut registry = MissionRegistry::new();
        registry.register(MissionRecord {
            operative: spy,
            target,
            state: MissionState::ReturningToPlayer,
            days_remaining: 10,
            total_food_destroyed: 0,
            total_loyalty_lost: 0.0,
        });

        let outcomes = tick_system(&mut world, &mut registry, &no_capture(), 1);
        assert!(registry.is_empty());
        assert!(matches!(
            outcomes.as_slice(),
            [MissionOutcome::MissionComplete { .. }]
        ));
    }

    #[test]
    fn dead_operative_swept_without_events() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let target = s.add_settlement("Ironhold", 100.0, 0.0);
        let mut world = s.build();
        world.end_entity(spy);

        let mut registry = MissionRegistry::new();
        registry.register(infiltrating(spy, target));

        let outcomes = tick_system(&mut world, &mut registry, &no_capture(), 1);
        assert!(registry.is_empty());
        assert!(outcomes.is_empty());
    }

    #[test]
    fn invalidated_target_swept_without_resource_mutation() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let target = s.add_settlement_with("Ironhold", 100.0, 0.0, |sd| {
            sd.food_stocks = 100.0;
        });
        let mut world = s.build();
        world.end_entity(target);

        let mut registry = MissionRegistry::new();
        registry.register(infiltrating(spy, target));

        let outcomes = tick_system(&mut world, &mut registry, &no_capture(), 1);
        assert!(registry.is_empty());
        assert!(outcomes.is_empty());
        // The razed town's books are left alone.
        let entity = &world.entities[&target];
        assert!(
            (entity.data.as_settlement().unwrap().food_stocks - 100.0).abs() < EPS
        );
    }

    #[test]
    fn hero_on_unrelated_mission_is_untouched_by_removals() {
        let mut s = Scenario::new();
        let spy_a = s.add_companion("Mira", 50);
        let spy_b = s.add_companion("Talan", 60);
        let target_a = s.add_settlement("Ironhold", 100.0, 0.0);
        let target_b = s.add_settlement("Vathe", 200.0, 0.0);
        let mut world = s.build();
        world.end_entity(spy_a);

        let mut registry = MissionRegistry::new();
        registry.register(infiltrating(spy_a, target_a));
        registry.register(infiltrating(spy_b, target_b));

        tick_system(&mut world, &mut registry, &no_capture(), 1);

        // The sweep of spy A's record must not skip spy B's tick.
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(spy_b).unwrap().days_remaining, INFILTRATION_DAYS - 1);
    }

    #[test]
    fn register_refuses_duplicates() {
        let mut registry = MissionRegistry::new();
        assert!(registry.register(MissionRecord::new(1, 2, 3, 4)));
        assert!(!registry.register(MissionRecord::new(1, 9, 9, 9)));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(1).unwrap().state,
            MissionState::TravelingToTarget { party: 3 }
        );
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = MissionRecord {
            operative: 4,
            target: 9,
            state: MissionState::TravelingToTarget { party: 11 },
            days_remaining: 6,
            total_food_destroyed: 3,
            total_loyalty_lost: 1.5,
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: MissionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
