pub mod entity;
pub mod entity_data;
pub mod world;

pub use entity::{Entity, EntityKind};
pub use entity_data::{EntityData, HeroData, HeroState, PartyData, SettlementData};
pub use world::World;
