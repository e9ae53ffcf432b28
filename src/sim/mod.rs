mod context;
mod dispatch;
mod missions;
mod outcome;
mod runner;
pub mod rules;
mod system;
mod travel;

pub use context::TickContext;
pub use dispatch::{AgentCandidate, DeployResult, MissionDispatcher};
pub use missions::{MissionRecord, MissionRegistry, MissionState};
pub use outcome::MissionOutcome;
pub use runner::{SimConfig, advance_day, run};
pub use system::SimSystem;
pub use travel::MovementSystem;
