use super::context::TickContext;
use super::rules;
use super::system::SimSystem;
use crate::model::EntityKind;

/// Minimal stand-in for the host map AI: walks every quest-locked party
/// straight toward its destination settlement, one day's march per tick.
///
/// Terrain and pathing are not modeled, so real trips can still diverge
/// from the dispatcher's outbound estimate; mission arrival is
/// proximity-triggered rather than a countdown for that reason.
pub struct MovementSystem;

impl SimSystem for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let party_ids: Vec<u64> = ctx
            .world
            .entities
            .values()
            .filter(|e| e.kind == EntityKind::Party && e.is_alive())
            .map(|e| e.id)
            .collect();

        for id in party_ids {
            let Some(pd) = ctx.world.party(id) else {
                continue;
            };
            if !pd.quest_locked {
                continue;
            }
            let Some(destination) = pd.destination else {
                continue;
            };
            let (px, py) = (pd.x, pd.y);
            let Some((dx, dy)) = ctx.world.position(destination) else {
                continue;
            };

            let dist = ((dx - px).powi(2) + (dy - py).powi(2)).sqrt();
            if dist <= f64::EPSILON {
                continue;
            }
            let step = dist.min(rules::OUTBOUND_SPEED);
            let (nx, ny) = (px + (dx - px) / dist * step, py + (dy - py) / dist * step);
            if let Some(pd) = ctx.world.party_mut(id) {
                pd.x = nx;
                pd.y = ny;
            }
        }
    }
}
