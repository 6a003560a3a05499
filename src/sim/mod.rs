//! Shared simulation core
//!
//! All gameplay logic lives here and in `games`. This module must stay
//! deterministic:
//! - dt comes from the caller, capped
//! - Seeded RNG only
//! - Stable iteration order (insertion order, compaction with `retain`)
//! - No rendering or platform dependencies beyond the `Surface` trait

pub mod aabb;
pub mod collision;
pub mod entity;
pub mod level;
pub mod particles;
pub mod state;
pub mod tick;
pub mod world;

pub use aabb::{Aabb, Axis};
pub use collision::{Contact, ground_ahead, land_on_platforms, move_and_collide};
pub use entity::{
    Body, CollectibleKind, Countdown, EnemyKind, Entity, EntityKind, Facing, IdGen, Outcome,
    PowerKind,
};
pub use level::LevelDescriptor;
pub use particles::{ParticleKind, ParticleSystem};
pub use state::{FlowEvent, FrameContext, GameMode, Session, Transition, Verdict, transition};
pub use tick::Arcade;
pub use world::{TileKind, World};
