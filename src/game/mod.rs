//! Core game logic module
//!
//! Everything here is I/O-free and scheduler-agnostic: the engine exposes
//! `tick`, `set_direction`, and `on_special_food_expiry` entry points and
//! hands out render snapshots. Rendering, input, audio, and persistence
//! live in the adapter modules around this one.

pub mod config;
pub mod direction;
pub mod engine;
pub mod food;
pub mod state;

// Re-export commonly used types
pub use config::GameConfig;
pub use direction::Direction;
pub use engine::{GameEngine, GameOverReport, TickReport};
pub use food::{Consumed, FoodManager};
pub use state::{CellRole, GamePhase, Position, Snake, Snapshot};
