use super::context::TickContext;

/// A pluggable simulation system advanced once per simulated day.
///
/// The campaign clock has no finer granularity: ticks are whole days, and
/// the runner calls every registered system exactly once per day in
/// registration order. Object-safe so systems can be stored as
/// `Box<dyn SimSystem>` or mixed in a `&mut [&mut dyn SimSystem]` slice.
pub trait SimSystem {
    fn name(&self) -> &str;
    fn tick(&mut self, ctx: &mut TickContext);
}
