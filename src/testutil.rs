use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::model::World;
use crate::settings::CampaignSettings;
use crate::sim::{MissionOutcome, SimSystem, TickContext};

/// Run a single system tick with a freshly seeded RNG. Returns the
/// outcomes the system emitted. The campaign clock is left alone so tests
/// can drive one system in isolation.
pub fn tick_system(
    world: &mut World,
    system: &mut dyn SimSystem,
    settings: &CampaignSettings,
    seed: u64,
) -> Vec<MissionOutcome> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut outcomes = Vec::new();
    let mut ctx = TickContext {
        world,
        rng: &mut rng,
        settings,
        outcomes: &mut outcomes,
    };
    system.tick(&mut ctx);
    outcomes
}
