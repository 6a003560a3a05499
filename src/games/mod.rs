//! The three game sessions
//!
//! Each game owns its world and entities and plugs into `sim::Arcade`
//! through the `Session` trait.

pub mod platformer;
pub mod serpent;
pub mod shooter;

pub use platformer::Platformer;
pub use serpent::Serpent;
pub use shooter::Shooter;
