use serde::{Deserialize, Serialize};

/// A mission event surfaced to the caller at the end of a tick (or of a
/// deploy call). Payloads are plain data; whether they become popups or
/// log lines is the host's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MissionOutcome {
    /// An operative left the player's party and is traveling to the target.
    /// `travel_days` is the outbound estimate, for display only; arrival
    /// is triggered by map proximity, not this countdown.
    Departed {
        operative: u64,
        target: u64,
        travel_days: i32,
    },
    /// The operative slipped inside the target settlement; sabotage begins.
    Infiltrated { operative: u64, target: u64 },
    /// Sabotage wrapped up and the operative is walking home.
    ReturnStarted {
        operative: u64,
        target: u64,
        days: i32,
    },
    /// The operative was caught by the target's guards and imprisoned.
    Captured { operative: u64, target: u64 },
    /// The operative made it back to the player's party.
    MissionComplete {
        operative: u64,
        target: u64,
        total_food_destroyed: u32,
        total_loyalty_lost: f64,
    },
}
