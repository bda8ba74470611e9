use super::config::GameConfig;
use super::state::Position;
use rand::seq::SliceRandom;
use rand::Rng;

/// What the snake's head landed on this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumed {
    None,
    Normal,
    Special,
}

/// Pick a uniformly random cell that is not occupied
///
/// Samples from the explicit complement set, so it terminates even on a
/// nearly full board. Returns `None` when every cell is occupied.
pub fn random_free_cell<R: Rng>(
    rng: &mut R,
    width: usize,
    height: usize,
    occupied: &[Position],
) -> Option<Position> {
    let mut free = Vec::with_capacity(width * height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let pos = Position::new(x, y);
            if !occupied.contains(&pos) {
                free.push(pos);
            }
        }
    }
    free.choose(rng).copied()
}

/// Owns the food and special-food lifecycle
///
/// The special food's expiry countdown lives outside the core (the app
/// layer sleeps and calls back); the manager tracks only a generation
/// counter. Every respawn, consumption, or cancel bumps the generation,
/// so a countdown armed for an earlier generation expires into a no-op.
/// At most one countdown is ever live.
#[derive(Debug, Clone)]
pub struct FoodManager {
    food: Option<Position>,
    special: Option<Position>,
    special_generation: u64,
}

impl FoodManager {
    pub fn new() -> Self {
        Self {
            food: None,
            special: None,
            special_generation: 0,
        }
    }

    pub fn food(&self) -> Option<Position> {
        self.food
    }

    pub fn special(&self) -> Option<Position> {
        self.special
    }

    /// Place the pre-game preview food without rolling for a special
    pub fn place_initial<R: Rng>(
        &mut self,
        rng: &mut R,
        config: &GameConfig,
        occupied: &[Position],
    ) {
        self.food = random_free_cell(rng, config.grid_width, config.grid_height, occupied);
    }

    /// Place new food, avoiding the snake, and roll for a special food
    ///
    /// Any special food already on the board is rerolled along with its
    /// countdown. With probability `special_food_chance` a special food
    /// lands on a free cell (resampled once if it hits the new food; a
    /// residual collision is tolerated and resolved by consumption
    /// priority). Returns the generation token to arm a countdown with
    /// when a special spawned.
    pub fn spawn<R: Rng>(
        &mut self,
        rng: &mut R,
        config: &GameConfig,
        occupied: &[Position],
    ) -> Option<u64> {
        let (width, height) = (config.grid_width, config.grid_height);
        self.special_generation += 1;
        self.food = random_free_cell(rng, width, height, occupied);
        self.special = None;

        if self.food.is_some() && rng.gen_bool(config.special_food_chance) {
            let mut pos = random_free_cell(rng, width, height, occupied);
            if pos == self.food {
                pos = random_free_cell(rng, width, height, occupied);
            }
            self.special = pos;
            if self.special.is_some() {
                return Some(self.special_generation);
            }
        }
        None
    }

    /// Classify what sits at `position`, consuming the special if matched
    ///
    /// Special food takes priority over normal food. Consuming the special
    /// clears it and cancels its countdown; normal food is left in place
    /// for the caller to replace via `spawn`.
    pub fn consume_if_match(&mut self, position: Position) -> Consumed {
        if self.special == Some(position) {
            self.special = None;
            self.special_generation += 1;
            Consumed::Special
        } else if self.food == Some(position) {
            Consumed::Normal
        } else {
            Consumed::None
        }
    }

    /// Expiry callback from the external countdown
    ///
    /// Clears the special food only when `token` matches the generation it
    /// was armed for; stale expiries are ignored.
    pub fn expire(&mut self, token: u64) {
        if token == self.special_generation {
            self.special = None;
        }
    }

    /// Cancel any outstanding countdown without touching the board
    pub fn cancel_countdown(&mut self) {
        self.special_generation += 1;
    }

    #[cfg(test)]
    pub(crate) fn set_food(&mut self, food: Option<Position>) {
        self.food = food;
    }

    #[cfg(test)]
    pub(crate) fn set_special(&mut self, special: Option<Position>) -> u64 {
        self.special = special;
        self.special_generation += 1;
        self.special_generation
    }
}

impl Default for FoodManager {
    fn default() -> Self {
        Self::new()
    }
}
