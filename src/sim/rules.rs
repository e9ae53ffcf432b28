//! Pure mission arithmetic: capture risk, sabotage damage, travel time.
//!
//! No `SimSystem` and no world access — these are called from the mission
//! registry each Infiltrating tick and from the dispatcher when estimating
//! travel. Keeping them free functions makes the balance numbers testable
//! without building a world.

// ---------------------------------------------------------------------------
// Capture risk
// ---------------------------------------------------------------------------
/// Guards always have some chance of a lucky catch, however skilled the spy.
const RISK_FLOOR: f64 = 2.0;
const RISK_SECURITY_WEIGHT: f64 = 1.2;

// ---------------------------------------------------------------------------
// Sabotage damage
// ---------------------------------------------------------------------------
const FOOD_DAMAGE_FRACTION: f64 = 0.10;
const FOOD_DAMAGE_BASE: f64 = 5.0;
const FOOD_DAMAGE_CAP: f64 = 50.0;
const FOOD_SKILL_BASE: f64 = 0.8;
const LOYALTY_SECURITY_DIVISOR: f64 = 20.0;
const SECURITY_DAMAGE_BASE: f64 = 1.0;
const SKILL_BASE: f64 = 0.5;

// ---------------------------------------------------------------------------
// Travel
// ---------------------------------------------------------------------------
/// Map units per day for the outbound escort party.
pub const OUTBOUND_SPEED: f64 = 50.0;
/// Map units per day walking home alone: slower, off the roads.
pub const RETURN_SPEED: f64 = 40.0;
pub const MIN_RETURN_DAYS: i32 = 1;

/// Percent chance per infiltration day that the guards catch the operative,
/// before the difficulty multiplier. Never below [`RISK_FLOOR`].
pub fn risk_factor(security: f64, roguery: u32) -> f64 {
    (security * RISK_SECURITY_WEIGHT - f64::from(roguery)).max(RISK_FLOOR)
}

fn skill_factor(roguery: u32) -> f64 {
    f64::from(roguery) / 100.0
}

/// Food destroyed in one day of sabotage. Proportional to the stockpile so
/// rich granaries bleed faster, capped so one spy cannot starve a city
/// overnight. Callers must skip this entirely when the stockpile is empty.
pub fn food_damage(food_stocks: f64, roguery: u32) -> f64 {
    ((food_stocks * FOOD_DAMAGE_FRACTION + FOOD_DAMAGE_BASE)
        * (FOOD_SKILL_BASE + skill_factor(roguery)))
    .min(FOOD_DAMAGE_CAP)
}

/// Loyalty lost in one day of sabotage. Rumor-mongering lands harder where
/// security is already poor.
pub fn loyalty_damage(security: f64, roguery: u32) -> f64 {
    (1.0 + (100.0 - security) / LOYALTY_SECURITY_DIVISOR) * (SKILL_BASE + skill_factor(roguery))
}

/// Security eroded in one day of sabotage.
pub fn security_damage(roguery: u32) -> f64 {
    SECURITY_DAMAGE_BASE * (SKILL_BASE + skill_factor(roguery))
}

/// Whole days needed to cover `distance` at `speed` map units per day.
pub fn travel_days(distance: f64, speed: f64) -> i32 {
    (distance / speed).ceil() as i32
}

/// Return-leg duration from the current player-party distance, never less
/// than a day even when the party is camped next door.
pub fn return_days(distance: f64) -> i32 {
    travel_days(distance, RETURN_SPEED).max(MIN_RETURN_DAYS)
}
