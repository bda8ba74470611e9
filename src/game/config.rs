use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the game
///
/// Grid size and tick rate are CLI-selectable; the food constants are the
/// fixed arcade rules and only change in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the game grid in cells
    pub grid_width: usize,
    /// Height of the game grid in cells
    pub grid_height: usize,
    /// Milliseconds between simulation ticks
    pub tick_interval_ms: u64,

    /// Probability that a food spawn also places a special food
    pub special_food_chance: f64,
    /// Milliseconds a special food stays on the board before expiring
    pub special_food_duration_ms: u64,
    /// Points awarded for ordinary food
    pub normal_food_score: u32,
    /// Points awarded for special food
    pub special_food_score: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            tick_interval_ms: 100,
            special_food_chance: 0.2,
            special_food_duration_ms: 5000,
            normal_food_score: 1,
            special_food_score: 10,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn special_food_duration(&self) -> Duration {
        Duration::from_millis(self.special_food_duration_ms)
    }
}
