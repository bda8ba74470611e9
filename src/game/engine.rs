use super::{
    config::GameConfig,
    direction::Direction,
    food::{Consumed, FoodManager},
    state::{in_bounds, GamePhase, Position, Snake, Snapshot},
};

/// Report emitted when a game finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOverReport {
    pub final_score: u32,
    /// Best score after this game was accounted for
    pub best_score: u32,
    pub new_record: bool,
}

/// Result of one simulation tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// What the head landed on
    pub consumed: Consumed,
    /// Token to arm a special-food countdown with, when one just spawned
    pub armed_special: Option<u64>,
    /// Present when this tick ended the game
    pub game_over: Option<GameOverReport>,
    /// Render-ready projection of the board after this tick
    pub snapshot: Snapshot,
}

/// The game state machine
///
/// Owns the snake, the food, the score, and the phase. Scheduler-agnostic:
/// an external loop calls `tick` at a fixed rate, forwards direction
/// events to `set_direction`, and arms/relays the special-food countdown
/// through `armed_special` tokens and `on_special_food_expiry`.
pub struct GameEngine {
    config: GameConfig,
    phase: GamePhase,
    snake: Snake,
    pending_direction: Option<Direction>,
    food: FoodManager,
    score: u32,
    best_score: u32,
    last_game_over: Option<GameOverReport>,
    rng: rand::rngs::ThreadRng,
}

impl GameEngine {
    /// Create an engine showing the pre-game board
    ///
    /// The board is populated (snake at the center, one food) so the start
    /// screen has something to draw, but nothing moves until `start`.
    pub fn new(config: GameConfig, best_score: u32) -> Self {
        let mut rng = rand::thread_rng();
        let snake = Snake::new(Self::origin(&config), Direction::Right, 1);
        let mut food = FoodManager::new();
        food.place_initial(&mut rng, &config, &snake.body);

        Self {
            config,
            phase: GamePhase::NotStarted,
            snake,
            pending_direction: None,
            food,
            score: 0,
            best_score,
            last_game_over: None,
            rng,
        }
    }

    fn origin(config: &GameConfig) -> Position {
        Position::new(
            (config.grid_width / 2) as i32,
            (config.grid_height / 2) as i32,
        )
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Report for the most recently finished game, frozen until restart
    pub fn last_game_over(&self) -> Option<&GameOverReport> {
        self.last_game_over.as_ref()
    }

    /// Start a new game (also restarts after game over)
    ///
    /// Resets the snake to a single segment at the center moving right,
    /// zeroes the score, respawns food, and cancels any countdown left
    /// over from the previous game. Returns the token to arm a countdown
    /// with when the fresh spawn produced a special food.
    pub fn start(&mut self) -> Option<u64> {
        self.snake = Snake::new(Self::origin(&self.config), Direction::Right, 1);
        self.pending_direction = None;
        self.score = 0;
        self.last_game_over = None;
        let armed = self
            .food
            .spawn(&mut self.rng, &self.config, &self.snake.body);
        self.phase = GamePhase::Running;
        armed
    }

    /// Request a direction change, applied at the next tick
    ///
    /// Ignored silently when it would reverse the direction applied on the
    /// previous tick. Last accepted request wins.
    pub fn set_direction(&mut self, requested: Direction) {
        if self.snake.direction.is_opposite(requested) {
            return;
        }
        self.pending_direction = Some(requested);
    }

    /// Advance the simulation by one step
    ///
    /// Returns `None` unless the game is running. Order per tick: apply
    /// the pending direction, move the head, classify consumption, then
    /// check wall and self collision.
    pub fn tick(&mut self) -> Option<TickReport> {
        if self.phase != GamePhase::Running {
            return None;
        }

        if let Some(requested) = self.pending_direction.take() {
            if !self.snake.direction.is_opposite(requested) {
                self.snake.direction = requested;
            }
        }

        let new_head = self.snake.advance();

        let consumed = self.food.consume_if_match(new_head);
        let mut armed_special = None;
        match consumed {
            Consumed::Special => {
                self.score += self.config.special_food_score;
                armed_special = self
                    .food
                    .spawn(&mut self.rng, &self.config, &self.snake.body);
            }
            Consumed::Normal => {
                self.score += self.config.normal_food_score;
                armed_special = self
                    .food
                    .spawn(&mut self.rng, &self.config, &self.snake.body);
            }
            Consumed::None => {
                self.snake.retreat();
            }
        }

        let hit_wall = !in_bounds(new_head, self.config.grid_width, self.config.grid_height);
        let game_over = if hit_wall || self.snake.hits_self() {
            Some(self.end())
        } else {
            None
        };

        Some(TickReport {
            consumed,
            armed_special,
            game_over,
            snapshot: self.snapshot(),
        })
    }

    /// Expiry callback for a previously armed special-food countdown
    pub fn on_special_food_expiry(&mut self, token: u64) {
        self.food.expire(token);
    }

    /// Renderable projection of the current state, valid in every phase
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            snake: self.snake.body.clone(),
            food: self.food.food(),
            special_food: self.food.special(),
            score: self.score,
        }
    }

    fn end(&mut self) -> GameOverReport {
        self.phase = GamePhase::Over;
        self.food.cancel_countdown();

        let new_record = self.score > self.best_score;
        if new_record {
            self.best_score = self.score;
        }
        let report = GameOverReport {
            final_score: self.score,
            best_score: self.best_score,
            new_record,
        };
        self.last_game_over = Some(report.clone());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_engine(config: GameConfig) -> GameEngine {
        let mut engine = GameEngine::new(config, 0);
        engine.start();
        engine
    }

    /// Strip the board so ticks move over empty cells only
    fn clear_food(engine: &mut GameEngine) {
        engine.food.set_food(None);
        engine.food.set_special(None);
    }

    #[test]
    fn test_new_engine_shows_pre_game_board() {
        let engine = GameEngine::new(GameConfig::default(), 0);
        assert_eq!(engine.phase(), GamePhase::NotStarted);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.snapshot().snake, vec![Position::new(10, 10)]);
        assert!(engine.snapshot().food.is_some());
    }

    #[test]
    fn test_tick_is_noop_unless_running() {
        let mut engine = GameEngine::new(GameConfig::default(), 0);
        assert_eq!(engine.tick(), None);

        engine.start();
        engine.score = 3;
        let over = engine.end();
        assert_eq!(over.final_score, 3);
        assert_eq!(engine.tick(), None);
    }

    #[test]
    fn test_start_resets_state() {
        let mut engine = running_engine(GameConfig::default());
        engine.score = 7;
        engine.end();

        engine.start();
        assert_eq!(engine.phase(), GamePhase::Running);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.snapshot().snake, vec![Position::new(10, 10)]);
        assert!(engine.last_game_over().is_none());
        assert!(engine.snapshot().food.is_some());
    }

    #[test]
    fn test_tick_on_empty_cell_keeps_length() {
        let mut engine = running_engine(GameConfig::default());
        clear_food(&mut engine);

        let report = engine.tick().expect("running");
        assert_eq!(report.consumed, Consumed::None);
        assert!(report.game_over.is_none());
        assert_eq!(report.snapshot.snake, vec![Position::new(11, 10)]);
        assert_eq!(report.snapshot.score, 0);
    }

    #[test]
    fn test_tick_onto_food_grows_and_scores() {
        let mut engine = running_engine(GameConfig::default());
        clear_food(&mut engine);
        engine.food.set_food(Some(Position::new(11, 10)));

        let report = engine.tick().expect("running");
        assert_eq!(report.consumed, Consumed::Normal);
        assert_eq!(
            report.snapshot.snake,
            vec![Position::new(11, 10), Position::new(10, 10)]
        );
        assert_eq!(report.snapshot.score, 1);

        // Replacement food avoids every snake cell
        let food = report.snapshot.food.expect("respawned");
        assert!(!report.snapshot.snake.contains(&food));
    }

    #[test]
    fn test_tick_onto_special_scores_ten() {
        let mut engine = running_engine(GameConfig::default());
        clear_food(&mut engine);
        let token = engine.food.set_special(Some(Position::new(11, 10)));

        let report = engine.tick().expect("running");
        assert_eq!(report.consumed, Consumed::Special);
        assert_eq!(report.snapshot.score, 10);
        assert_eq!(report.snapshot.snake.len(), 2);

        // The countdown armed for the eaten special is dead: firing it
        // must not clear anything that spawned afterwards.
        let respawned = engine.food.special();
        engine.on_special_food_expiry(token);
        assert_eq!(engine.food.special(), respawned);
    }

    #[test]
    fn test_direction_reversal_rejected() {
        for dir in Direction::ALL {
            let mut engine = running_engine(GameConfig::default());
            engine.snake.direction = dir;

            for requested in Direction::ALL {
                engine.pending_direction = None;
                engine.set_direction(requested);
                if dir.is_opposite(requested) {
                    assert_eq!(engine.pending_direction, None);
                } else {
                    assert_eq!(engine.pending_direction, Some(requested));
                }
            }
        }
    }

    #[test]
    fn test_reversal_ignored_keeps_heading() {
        let mut engine = running_engine(GameConfig::default());
        clear_food(&mut engine);

        engine.set_direction(Direction::Left);
        let report = engine.tick().expect("running");
        assert_eq!(report.snapshot.head(), Position::new(11, 10));
    }

    #[test]
    fn test_two_quick_presses_cannot_reverse() {
        let mut engine = running_engine(GameConfig::default());
        clear_food(&mut engine);

        // Up is accepted, but Left is still a reversal of the applied
        // direction until the next tick lands.
        engine.set_direction(Direction::Up);
        engine.set_direction(Direction::Left);
        let report = engine.tick().expect("running");
        assert_eq!(report.snapshot.head(), Position::new(10, 9));
    }

    #[test]
    fn test_wall_collision_ends_game() {
        let mut engine = running_engine(GameConfig::small());
        clear_food(&mut engine);
        engine.snake = Snake::new(Position::new(0, 5), Direction::Left, 1);

        let report = engine.tick().expect("running");
        let over = report.game_over.expect("hit the wall");
        assert_eq!(engine.phase(), GamePhase::Over);
        assert_eq!(over.final_score, 0);
    }

    #[test]
    fn test_bottom_wall_collision_ends_game() {
        let mut engine = running_engine(GameConfig::small());
        clear_food(&mut engine);
        engine.snake = Snake::new(Position::new(5, 9), Direction::Down, 1);

        let report = engine.tick().expect("running");
        assert!(report.game_over.is_some());
        assert_eq!(engine.phase(), GamePhase::Over);
    }

    #[test]
    fn test_self_collision_ends_game() {
        let mut engine = running_engine(GameConfig::small());
        clear_food(&mut engine);

        // Snake at (5,5) going Right, length 5: (5,5) (4,5) (3,5) (2,5) (1,5).
        // Walking a tight square lands the head on a cell the body still
        // holds. (Length 4 would be a safe tail chase.)
        engine.snake = Snake::new(Position::new(5, 5), Direction::Right, 5);

        assert!(engine.tick().expect("running").game_over.is_none());
        engine.set_direction(Direction::Down);
        assert!(engine.tick().expect("running").game_over.is_none());
        engine.set_direction(Direction::Left);
        assert!(engine.tick().expect("running").game_over.is_none());
        engine.set_direction(Direction::Up);
        let report = engine.tick().expect("running");
        assert!(report.game_over.is_some());
        assert_eq!(engine.phase(), GamePhase::Over);
    }

    #[test]
    fn test_tail_chase_is_safe() {
        let mut engine = running_engine(GameConfig::small());
        clear_food(&mut engine);

        // Length 4 around a 2x2 loop: turning Left moves the head onto
        // the cell the tail vacates this same tick.
        engine.snake = Snake {
            body: vec![
                Position::new(5, 5),
                Position::new(5, 6),
                Position::new(4, 6),
                Position::new(4, 5),
            ],
            direction: Direction::Up,
        };
        engine.set_direction(Direction::Left);
        let report = engine.tick().expect("running");
        assert!(report.game_over.is_none());
        assert_eq!(report.snapshot.head(), Position::new(4, 5));
    }

    #[test]
    fn test_high_score_updates_only_on_record() {
        let mut engine = running_engine(GameConfig::small());
        engine.best_score = 10;

        engine.score = 5;
        let over = engine.end();
        assert!(!over.new_record);
        assert_eq!(over.best_score, 10);
        assert_eq!(engine.best_score(), 10);

        engine.start();
        engine.score = 15;
        let over = engine.end();
        assert!(over.new_record);
        assert_eq!(over.best_score, 15);
        assert_eq!(engine.best_score(), 15);
    }

    #[test]
    fn test_expiry_clears_live_special() {
        let mut engine = running_engine(GameConfig::default());
        let token = engine.food.set_special(Some(Position::new(3, 3)));

        engine.on_special_food_expiry(token);
        assert_eq!(engine.snapshot().special_food, None);
    }

    #[test]
    fn test_start_cancels_pending_countdown() {
        let mut engine = running_engine(GameConfig::default());
        let token = engine.food.set_special(Some(Position::new(3, 3)));

        engine.start();
        let live = engine.snapshot().special_food;
        engine.on_special_food_expiry(token);
        assert_eq!(engine.snapshot().special_food, live);
    }
}
