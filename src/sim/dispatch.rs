use rand::RngCore;

use super::missions::{MissionRecord, MissionRegistry};
use super::outcome::MissionOutcome;
use super::rules;
use super::runner;
use super::system::SimSystem;
use crate::model::{HeroState, World};
use crate::settings::CampaignSettings;

/// Minimum roguery to be trusted with a covert assignment.
const ROGUERY_REQUIREMENT: u32 = 30;

/// One row of the agent-selection list, with the stats the host displays.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCandidate {
    pub hero: u64,
    pub name: String,
    pub roguery: u32,
    pub hit_points: u32,
}

/// What a deploy call did. `Rejected` is informational, never fatal: the
/// caller is expected to have filtered through [`eligible_agents`]
/// already, so a rejection just means nothing happened.
///
/// [`eligible_agents`]: MissionDispatcher::eligible_agents
#[derive(Debug, Clone, PartialEq)]
pub enum DeployResult {
    Deployed { party: u64, travel_days: i32 },
    Rejected { reason: String },
}

/// Orchestrates mission creation and the daily hand-off of outcomes.
///
/// Owns the [`MissionRegistry`], which is passed in at construction; there
/// is no ambient global instance, so two campaigns can coexist in one
/// process (host menus, headless balance runs, tests).
#[derive(Debug, Default)]
pub struct MissionDispatcher {
    registry: MissionRegistry,
    /// Outcomes produced outside the tick (departures), delivered with the
    /// next day's batch so the caller sees one ordered stream.
    outbox: Vec<MissionOutcome>,
}

impl MissionDispatcher {
    pub fn new(registry: MissionRegistry) -> Self {
        Self {
            registry,
            outbox: Vec::new(),
        }
    }

    pub fn registry(&self) -> &MissionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut MissionRegistry {
        &mut self.registry
    }

    pub fn into_registry(self) -> MissionRegistry {
        self.registry
    }

    /// Heroes in the player's party fit for a covert assignment, in roster
    /// order: alive, active, not the player, roguery at requirement. An
    /// empty list is the "no capable agents" signal.
    pub fn eligible_agents(&self, world: &World) -> Vec<AgentCandidate> {
        let Some(party) = world.party(world.player_party) else {
            return Vec::new();
        };
        party
            .roster
            .iter()
            .filter_map(|&id| {
                let hd = world.hero(id)?;
                if hd.is_player
                    || hd.state != HeroState::Active
                    || hd.roguery < ROGUERY_REQUIREMENT
                {
                    return None;
                }
                Some(AgentCandidate {
                    hero: id,
                    name: world.name_of(id),
                    roguery: hd.roguery,
                    hit_points: hd.hit_points,
                })
            })
            .collect()
    }

    /// Send an operative toward a target settlement.
    ///
    /// Every precondition is re-checked here and answered with a rejection
    /// rather than a panic; in particular the one-mission-per-operative
    /// guard runs before any side effect, so a duplicate deploy cannot
    /// empty a roster slot twice or leave an orphan party on the map.
    pub fn deploy(&mut self, world: &mut World, operative: u64, target: u64) -> DeployResult {
        if self.registry.contains(operative) {
            return rejected("operative is already on assignment");
        }

        let Some(sd) = world.settlement(target) else {
            return rejected("target settlement is gone");
        };
        if sd.owner_faction == world.player_faction {
            return rejected("cannot sabotage a friendly settlement");
        }
        if sd.under_siege {
            return rejected("target is under siege");
        }
        if sd.is_village {
            return rejected("villages have nothing worth sabotaging");
        }

        let Some(hd) = world.hero(operative) else {
            return rejected("operative is dead or missing");
        };
        if hd.is_player {
            return rejected("the player cannot leave the party");
        }
        if hd.state != HeroState::Active {
            return rejected("operative is in no shape to travel");
        }
        if hd.roguery < ROGUERY_REQUIREMENT {
            return rejected("operative lacks the roguery for covert work");
        }

        // Pull the hero out of whatever party they ride with and put them
        // on the road from there.
        let origin = world.party_of_hero(operative).unwrap_or(world.player_party);
        let position = world.position(origin).unwrap_or((0.0, 0.0));
        world.remove_from_roster(origin, operative);

        let party_name = format!("{} escort", world.name_of(operative));
        let party = world.spawn_traveling_party(
            &party_name,
            world.player_faction,
            position,
            target,
            operative,
        );

        // Display estimate only. Arrival is proximity-triggered, so the
        // real trip may run longer or shorter without desyncing anything.
        let travel_days = world
            .distance(world.player_party, target)
            .map(|d| rules::travel_days(d, rules::OUTBOUND_SPEED))
            .unwrap_or(1);

        self.registry
            .register(MissionRecord::new(operative, target, party, travel_days));
        self.outbox.push(MissionOutcome::Departed {
            operative,
            target,
            travel_days,
        });

        DeployResult::Deployed { party, travel_days }
    }

    /// The once-per-day tick entry point. Advances the campaign clock,
    /// resolves every active mission exactly once, and returns the day's
    /// outcomes (pending departures first).
    pub fn advance_one_day(
        &mut self,
        world: &mut World,
        rng: &mut dyn RngCore,
        settings: &CampaignSettings,
    ) -> Vec<MissionOutcome> {
        let mut outcomes = std::mem::take(&mut self.outbox);
        let mut systems: [&mut dyn SimSystem; 1] = [&mut self.registry];
        outcomes.extend(runner::advance_day(world, &mut systems, rng, settings));
        outcomes
    }
}

fn rejected(reason: &str) -> DeployResult {
    DeployResult::Rejected {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;
    use crate::scenario::Scenario;
    use crate::sim::missions::MissionState;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn live_party_count(world: &World) -> usize {
        world
            .entities
            .values()
            .filter(|e| e.kind == EntityKind::Party && e.is_alive())
            .count()
    }

    #[test]
    fn eligibility_filters_and_keeps_roster_order() {
        let mut s = Scenario::new();
        let skilled = s.add_companion("Mira", 55);
        let _green = s.add_companion("Talan", 10);
        let hurt = s.add_companion_with("Edda", |hd| {
            hd.roguery = 80;
            hd.state = HeroState::Disabled;
        });
        let veteran = s.add_companion("Joren", 30);
        let world = s.build();

        let dispatcher = MissionDispatcher::default();
        let candidates = dispatcher.eligible_agents(&world);

        let ids: Vec<u64> = candidates.iter().map(|c| c.hero).collect();
        assert_eq!(ids, vec![skilled, veteran]);
        assert!(!ids.contains(&hurt));
        assert_eq!(candidates[0].name, "Mira");
        assert_eq!(candidates[0].roguery, 55);
        assert_eq!(candidates[0].hit_points, 100);
    }

    #[test]
    fn no_candidates_yields_empty_list() {
        let mut s = Scenario::new();
        s.add_companion("Talan", 10);
        let world = s.build();
        assert!(MissionDispatcher::default().eligible_agents(&world).is_empty());
    }

    #[test]
    fn deploy_spawns_quest_locked_party_and_registers() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let target = s.add_settlement("Ironhold", 275.0, 0.0);
        let mut world = s.build();

        let mut dispatcher = MissionDispatcher::default();
        let result = dispatcher.deploy(&mut world, spy, target);

        let DeployResult::Deployed { party, travel_days } = result else {
            panic!("deploy rejected: {result:?}");
        };
        assert_eq!(travel_days, 6);

        // Hero left the player's roster and rides the escort.
        assert!(!world.roster_contains(world.player_party, spy));
        assert!(world.roster_contains(party, spy));

        let pd = world.party(party).unwrap();
        assert!(pd.quest_locked);
        assert_eq!(pd.destination, Some(target));
        assert_eq!(pd.owner_faction, world.player_faction);
        // Spawned where the dispatching party stands.
        assert_eq!((pd.x, pd.y), (0.0, 0.0));

        let record = dispatcher.registry().get(spy).unwrap();
        assert_eq!(record.state, MissionState::TravelingToTarget { party });
        assert_eq!(record.days_remaining, 6);
    }

    #[test]
    fn duplicate_deploy_is_a_no_op() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let target = s.add_settlement("Ironhold", 275.0, 0.0);
        let other = s.add_settlement("Vathe", 100.0, 0.0);
        let mut world = s.build();

        let mut dispatcher = MissionDispatcher::default();
        assert!(matches!(
            dispatcher.deploy(&mut world, spy, target),
            DeployResult::Deployed { .. }
        ));
        let parties_after_first = live_party_count(&world);

        let second = dispatcher.deploy(&mut world, spy, other);
        assert!(matches!(second, DeployResult::Rejected { .. }));

        // Exactly one record, pointed at the original target, and no
        // second escort on the map.
        assert_eq!(dispatcher.registry().len(), 1);
        assert_eq!(dispatcher.registry().get(spy).unwrap().target, target);
        assert_eq!(live_party_count(&world), parties_after_first);
    }

    #[test]
    fn deploy_rejects_ineligible_targets() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let village = s.add_settlement_with("Hamlet", 50.0, 0.0, |sd| sd.is_village = true);
        let besieged = s.add_settlement_with("Walls", 60.0, 0.0, |sd| sd.under_siege = true);
        let player_faction = s.player_faction();
        let owned =
            s.add_settlement_with("Home", 70.0, 0.0, |sd| sd.owner_faction = player_faction);
        let mut world = s.build();

        let mut dispatcher = MissionDispatcher::default();
        for target in [village, besieged, owned] {
            assert!(matches!(
                dispatcher.deploy(&mut world, spy, target),
                DeployResult::Rejected { .. }
            ));
        }
        assert!(dispatcher.registry().is_empty());
        // No side effects leaked from the rejections.
        assert!(world.roster_contains(world.player_party, spy));
    }

    #[test]
    fn deploy_rejects_ineligible_operatives() {
        let mut s = Scenario::new();
        let green = s.add_companion("Talan", 10);
        let down = s.add_companion_with("Edda", |hd| {
            hd.roguery = 60;
            hd.state = HeroState::Disabled;
        });
        let player = s.player();
        let target = s.add_settlement("Ironhold", 100.0, 0.0);
        let mut world = s.build();

        let mut dispatcher = MissionDispatcher::default();
        for operative in [green, down, player] {
            assert!(matches!(
                dispatcher.deploy(&mut world, operative, target),
                DeployResult::Rejected { .. }
            ));
        }
        assert!(dispatcher.registry().is_empty());
    }

    #[test]
    fn advance_one_day_delivers_departure_then_tick_outcomes() {
        let mut s = Scenario::new();
        let spy = s.add_companion("Mira", 50);
        let target = s.add_settlement("Ironhold", 275.0, 0.0);
        let mut world = s.build();

        let mut dispatcher = MissionDispatcher::default();
        dispatcher.deploy(&mut world, spy, target);

        let mut rng = SmallRng::seed_from_u64(7);
        let outcomes = dispatcher.advance_one_day(&mut world, &mut rng, &CampaignSettings::default());

        assert_eq!(world.current_day, 1);
        assert_eq!(
            outcomes,
            vec![MissionOutcome::Departed {
                operative: spy,
                target,
                travel_days: 6
            }]
        );

        // Departure is delivered once, not every day.
        let outcomes = dispatcher.advance_one_day(&mut world, &mut rng, &CampaignSettings::default());
        assert!(outcomes.is_empty());
        assert_eq!(world.current_day, 2);
    }
}
