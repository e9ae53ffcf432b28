use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use super::context::TickContext;
use super::outcome::MissionOutcome;
use super::system::SimSystem;
use crate::model::World;
use crate::settings::CampaignSettings;

/// Configuration for a multi-day simulation run.
pub struct SimConfig {
    pub num_days: u64,
    pub seed: u64,
}

impl SimConfig {
    pub fn new(num_days: u64, seed: u64) -> Self {
        Self { num_days, seed }
    }
}

/// Advance the campaign by one simulated day: bump the clock, then tick
/// every system once in registration order. All outcomes emitted during the
/// day are returned together.
///
/// Each system gets a fresh [`TickContext`] over the same world, RNG, and
/// outcome buffer, so side effects of earlier systems (a party that moved,
/// a record that was removed) are visible to later ones within the day.
pub fn advance_day(
    world: &mut World,
    systems: &mut [&mut dyn SimSystem],
    rng: &mut dyn RngCore,
    settings: &CampaignSettings,
) -> Vec<MissionOutcome> {
    world.current_day += 1;

    let mut outcomes = Vec::new();
    for system in systems.iter_mut() {
        let mut ctx = TickContext {
            world: &mut *world,
            rng: &mut *rng,
            settings,
            outcomes: &mut outcomes,
        };
        system.tick(&mut ctx);
    }
    outcomes
}

/// Drive the simulation for the configured number of days.
///
/// The RNG is seeded from `config.seed`, so the same seed always produces
/// the same campaign, capture rolls included.
pub fn run(
    world: &mut World,
    systems: &mut [&mut dyn SimSystem],
    settings: &CampaignSettings,
    config: SimConfig,
) -> Vec<MissionOutcome> {
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut outcomes = Vec::new();
    for _ in 0..config.num_days {
        outcomes.extend(advance_day(world, systems, &mut rng, settings));
    }
    outcomes
}
