//! # grid_snake
//!
//! A deterministic snake simulation on a rectangular grid.
//!
//! The simulation knows nothing about windows, keyboards or cameras.  It is
//! advanced with [`Simulation::tick`], which is handed the current wall-clock
//! instant and (optionally) the direction the player most recently asked
//! for.  Whether the snake actually moves is decided by the [`MoveTimer`]
//! gate, so the caller can spin its render loop at any rate.
//!
//! ## Boundary policies
//!
//! | Policy | Leaving the grid |
//! |---|---|
//! | [`Boundary::Wall`] | the move is a collision |
//! | [`Boundary::Wrap`] | the head re-enters on the opposite edge |
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use grid_snake::{Direction, GridConfig, MoveOutcome, Simulation};
//!
//! let t0  = Instant::now();
//! let cfg = GridConfig::default();
//! let mut sim = Simulation::new(cfg, t0);
//!
//! // Not due yet: nothing happens.
//! assert_eq!(sim.tick(t0, Some(Direction::Down)), MoveOutcome::Pending);
//!
//! // One full delay later the snake steps down one cell.
//! let before = sim.snake().head();
//! assert_eq!(sim.tick(t0 + cfg.base_delay, Some(Direction::Down)), MoveOutcome::Moved);
//! assert_eq!(sim.snake().head().row, before.row + 1);
//! # let _ = Duration::ZERO;
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

mod food;

pub use food::FoodSpawner;

// ════════════════════════════════════════════════════════════════════════════
// Cell
// ════════════════════════════════════════════════════════════════════════════

/// A grid coordinate: `col` grows to the right, `row` grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(col: i32, row: i32) -> Self {
        Cell { col, row }
    }

    /// The neighbouring cell in `dir`, with no bounds applied.
    pub fn step(self, dir: Direction) -> Cell {
        let (dc, dr) = dir.delta();
        Cell::new(self.col + dc, self.row + dr)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((col, row): (i32, i32)) -> Self {
        Cell::new(col, row)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Direction
// ════════════════════════════════════════════════════════════════════════════

/// One of the four movement directions, in screen space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit `(d_col, d_row)` for this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up    => ( 0, -1),
            Direction::Down  => ( 0,  1),
            Direction::Left  => (-1,  0),
            Direction::Right => ( 1,  0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up    => Direction::Down,
            Direction::Down  => Direction::Up,
            Direction::Left  => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up    => "up",
            Direction::Down  => "down",
            Direction::Left  => "left",
            Direction::Right => "right",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GridConfig
// ════════════════════════════════════════════════════════════════════════════

/// What happens when the head leaves the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Boundary {
    /// Leaving the grid is a collision.
    #[default]
    Wall,
    /// Edges are identified with the opposite edge (a torus).
    Wrap,
}

/// Static parameters of one game.
///
/// `width` and `height` must both be positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConfig {
    pub width:      i32,
    pub height:     i32,
    pub boundary:   Boundary,
    /// Inter-move interval at the start of a run.
    pub base_delay: Duration,
    /// The interval never shrinks below this.
    pub min_delay:  Duration,
    /// How much the interval shrinks per food eaten.
    pub delay_step: Duration,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            width:      16,
            height:     12,
            boundary:   Boundary::Wall,
            base_delay: Duration::from_millis(100),
            min_delay:  Duration::from_millis(40),
            delay_step: Duration::from_millis(5),
        }
    }
}

impl GridConfig {
    /// Where a fresh snake is placed.
    pub fn center(&self) -> Cell {
        Cell::new(self.width / 2, self.height / 2)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.col) && (0..self.height).contains(&cell.row)
    }

    pub fn cell_count(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }

    /// Apply the boundary policy to a candidate head position.
    /// `None` means the move runs into a wall.
    pub fn resolve(&self, cell: Cell) -> Option<Cell> {
        match self.boundary {
            Boundary::Wrap => Some(Cell::new(
                cell.col.rem_euclid(self.width),
                cell.row.rem_euclid(self.height),
            )),
            Boundary::Wall => self.contains(cell).then_some(cell),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Snake
// ════════════════════════════════════════════════════════════════════════════

/// The snake's body, head first.
///
/// Only [`Simulation`] mutates a snake once it is in play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body:      VecDeque<Cell>,
    direction: Direction,
    /// Keep the tail on the next move.
    grow:      bool,
}

impl Snake {
    /// A one-cell snake.
    pub fn new(head: Cell, direction: Direction) -> Self {
        Snake {
            body: VecDeque::from([head]),
            direction,
            grow: false,
        }
    }

    /// Build a snake from explicit cells (head first).
    ///
    /// Returns `None` for an empty body or one that overlaps itself.
    pub fn from_body<I>(cells: I, direction: Direction) -> Option<Self>
    where
        I: IntoIterator<Item = Cell>,
    {
        let body: VecDeque<Cell> = cells.into_iter().collect();
        if body.is_empty() {
            return None;
        }
        let distinct = body
            .iter()
            .enumerate()
            .all(|(i, c)| !body.iter().skip(i + 1).any(|d| d == c));
        distinct.then_some(Snake { body, direction, grow: false })
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false; a snake has at least its head.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// True between eating and the move that lengthens the body.
    pub fn is_growing(&self) -> bool {
        self.grow
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Turn toward `dir` unless it would reverse onto the neck.
    /// Returns whether the direction was accepted.
    fn steer(&mut self, dir: Direction) -> bool {
        if dir.is_opposite(self.direction) {
            return false;
        }
        self.direction = dir;
        true
    }

    /// Would moving the head to `next` run into the body?
    ///
    /// The tail does not count when it is about to move out of the way.
    fn hits_itself(&self, next: Cell) -> bool {
        let body = if self.grow {
            self.body.len()
        } else {
            self.body.len() - 1
        };
        self.body.iter().take(body).any(|&c| c == next)
    }

    fn advance(&mut self, next: Cell) {
        self.body.push_front(next);
        if self.grow {
            self.grow = false;
        } else {
            self.body.pop_back();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MoveTimer
// ════════════════════════════════════════════════════════════════════════════

/// Wall-clock gate between moves.  The delay only ever shrinks, and never
/// below its floor.
#[derive(Clone, Copy, Debug)]
pub struct MoveTimer {
    delay:     Duration,
    min_delay: Duration,
    step:      Duration,
    baseline:  Instant,
}

impl MoveTimer {
    pub fn new(config: &GridConfig, now: Instant) -> Self {
        MoveTimer {
            delay:     config.base_delay,
            min_delay: config.min_delay,
            step:      config.delay_step,
            baseline:  now,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.baseline) >= self.delay
    }

    /// Record a completed move.
    pub fn mark(&mut self, now: Instant) {
        self.baseline = now;
    }

    pub fn speed_up(&mut self) {
        if self.delay > self.min_delay {
            self.delay = self.delay.saturating_sub(self.step).max(self.min_delay);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Simulation
// ════════════════════════════════════════════════════════════════════════════

/// Result of one call to [`Simulation::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move delay has not elapsed; nothing changed.
    Pending,
    Moved,
    /// Moved onto the food.  The body grows on the next move.
    Ate,
    /// Hit a wall or the body.  Terminal for this run.
    Collided,
}

/// One run of the game: snake, food and the move gate.
#[derive(Clone, Debug)]
pub struct Simulation {
    config:   GridConfig,
    snake:    Snake,
    food:     Option<Cell>,
    timer:    MoveTimer,
    collided: bool,
}

impl Simulation {
    /// A fresh run: one-cell snake in the centre heading right, no food.
    pub fn new(config: GridConfig, now: Instant) -> Self {
        Self::with_snake(config, Snake::new(config.center(), Direction::Right), now)
    }

    pub fn with_snake(config: GridConfig, snake: Snake, now: Instant) -> Self {
        debug_assert!(config.width > 0 && config.height > 0);
        Simulation {
            config,
            snake,
            food:     None,
            timer:    MoveTimer::new(&config, now),
            collided: false,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn place_food(&mut self, cell: Cell) {
        debug_assert!(self.config.contains(cell) && !self.snake.contains(cell));
        self.food = Some(cell);
    }

    pub fn move_delay(&self) -> Duration {
        self.timer.delay()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        !self.collided && self.timer.is_due(now)
    }

    pub fn is_over(&self) -> bool {
        self.collided
    }

    /// Advance the run if a move is due.
    ///
    /// `pending` is the most recent direction request; a request that would
    /// reverse the snake onto itself is ignored and the current heading kept.
    pub fn tick(&mut self, now: Instant, pending: Option<Direction>) -> MoveOutcome {
        if self.collided {
            return MoveOutcome::Collided;
        }
        if !self.timer.is_due(now) {
            return MoveOutcome::Pending;
        }

        if let Some(dir) = pending {
            if !self.snake.steer(dir) {
                log::trace!("ignoring reversal {:?} while heading {:?}", dir, self.snake.direction());
            }
        }

        let head = self.snake.head();
        let next = match self.config.resolve(head.step(self.snake.direction())) {
            Some(cell) => cell,
            None => {
                log::debug!("wall hit leaving {:?} heading {:?}", head, self.snake.direction());
                self.collided = true;
                return MoveOutcome::Collided;
            }
        };

        if self.snake.hits_itself(next) {
            log::debug!("self collision at {:?}", next);
            self.collided = true;
            return MoveOutcome::Collided;
        }

        self.snake.advance(next);
        self.timer.mark(now);

        if self.food == Some(next) {
            self.food = None;
            self.snake.grow = true;
            self.timer.speed_up();
            log::debug!("ate at {:?}, move delay now {:?}", next, self.timer.delay());
            MoveOutcome::Ate
        } else {
            MoveOutcome::Moved
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
