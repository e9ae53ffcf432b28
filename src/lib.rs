pub mod id;
pub mod model;
pub mod save;
pub mod scenario;
pub mod settings;
pub mod sim;
pub mod testutil;

pub use id::IdGenerator;
pub use model::{
    Entity, EntityData, EntityKind, HeroData, HeroState, PartyData, SettlementData, World,
};
pub use settings::CampaignSettings;
pub use sim::{
    AgentCandidate, DeployResult, MissionDispatcher, MissionOutcome, MissionRecord,
    MissionRegistry, MissionState, MovementSystem, SimConfig, SimSystem, TickContext,
};
