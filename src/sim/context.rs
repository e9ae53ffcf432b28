use rand::RngCore;

use super::outcome::MissionOutcome;
use crate::model::World;
use crate::settings::CampaignSettings;

/// Context passed to each system on every daily tick.
///
/// Bundled so fields can be added later without changing the `SimSystem`
/// trait signature.
pub struct TickContext<'a> {
    pub world: &'a mut World,
    pub rng: &'a mut dyn RngCore,
    /// Tuning knobs, read-only for the duration of the tick.
    pub settings: &'a CampaignSettings,
    /// Systems push mission outcomes here; the caller renders them after
    /// the day resolves.
    pub outcomes: &'a mut Vec<MissionOutcome>,
}
