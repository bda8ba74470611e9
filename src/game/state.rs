use super::direction::Direction;

/// A position on the game grid, in cell units
///
/// The renderer owns scaling from cells to screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position one cell in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// Returns true when the position lies inside `[0, width) x [0, height)`
pub fn in_bounds(pos: Position, width: usize, height: usize) -> bool {
    pos.x >= 0 && pos.x < width as i32 && pos.y >= 0 && pos.y < height as i32
}

/// The snake in the game
///
/// Invariants: head at index 0, body order head to tail, length >= 1,
/// no duplicate cells while the game is running.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Direction applied on the most recent tick
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given head position and direction
    ///
    /// Extra segments are laid out behind the head, opposite the direction
    /// of travel.
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        let (dx, dy) = direction.delta();
        let (back_dx, back_dy) = (-dx, -dy);

        for i in 1..length.max(1) {
            let prev = body[i - 1];
            body.push(prev.moved_by(back_dx, back_dy));
        }

        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Advance one cell in the current direction, prepending the new head
    ///
    /// The tail is untouched; callers pair this with `retreat` when no food
    /// was consumed.
    pub fn advance(&mut self) -> Position {
        let new_head = self.head().moved_in_direction(self.direction);
        self.body.insert(0, new_head);
        new_head
    }

    /// Remove the tail segment, keeping net length unchanged after `advance`
    pub fn retreat(&mut self) {
        self.body.pop();
    }

    /// Check if a position collides with the body at index >= 1
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body[1..].contains(&pos)
    }

    /// Check if the head has run into the body
    pub fn hits_self(&self) -> bool {
        self.collides_with_body(self.head())
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Lifecycle phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    NotStarted,
    Running,
    Over,
}

/// Role of a cell in a render snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRole {
    Head,
    Body,
    Food,
    SpecialFood,
}

/// Read-only projection of the board for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Snake cells, head first
    pub snake: Vec<Position>,
    pub food: Option<Position>,
    pub special_food: Option<Position>,
    pub score: u32,
}

impl Snapshot {
    pub fn head(&self) -> Position {
        self.snake[0]
    }

    /// Role-tagged cells in paint order: food first, snake last, head on top
    pub fn cells(&self) -> impl Iterator<Item = (Position, CellRole)> + '_ {
        let food = self.food.map(|p| (p, CellRole::Food));
        let special = self.special_food.map(|p| (p, CellRole::SpecialFood));
        let body = self.snake.iter().skip(1).map(|&p| (p, CellRole::Body));
        let head = self.snake.first().map(|&p| (p, CellRole::Head));
        food.into_iter().chain(special).chain(body).chain(head)
    }
}
