//! Top-level game state machine and the main loop.
//!
//! [`Game`] owns everything a session needs: the current [`Simulation`], the
//! food spawner, the [`InputArbiter`], the [`GesturePipeline`], and the
//! score bookkeeping.  The loop in [`run`] feeds it controls from the
//! window, calls [`Game::update`] once per frame, and hands the resulting
//! [`Snapshot`] to the visualizer.
//!
//! ```text
//!            Confirm                    Collided
//!   Start ─────────────► Playing ─────────────────► GameOver
//!     ▲                    │                           │  │
//!     │      Cancel        │                           │  │ Confirm
//!     ├────────────────────┘                           │  └────────► Playing
//!     │                     Cancel                     │
//!     └────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use grid_snake::{Cell, FoodSpawner, GridConfig, MoveOutcome, Simulation, Snake};
use swipe_gesture::sim::{BrightSpotDetector, PointerCamera, PointerFeed};
use swipe_gesture::{Camera, GesturePipeline, LandmarkDetector, PipelineConfig};

use crate::input::{Control, InputArbiter, InputSource};
use crate::visualizer::Visualizer;

/// Points for each food eaten.
pub const SCORE_PER_FOOD: u32 = 10;

/// Longest a gesture toggle mid-run holds up the frame waiting for the
/// capture loop.  The loop releases the camera itself if it is slower.
pub const TOGGLE_STOP_WAIT: Duration = Duration::from_millis(50);

// ════════════════════════════════════════════════════════════════════════════
// AppConfig / AppError
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Copy, Debug, Default)]
pub struct AppConfig {
    pub grid:     GridConfig,
    pub pipeline: PipelineConfig,
    /// Start gesture tracking as soon as the window opens.
    pub gestures: bool,
    /// Fixed food sequence; `None` seeds from entropy.
    pub seed:     Option<u64>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("window: {0}")]
    Window(String),
}

// ════════════════════════════════════════════════════════════════════════════
// GamePhase / Snapshot
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase { Start, Playing, GameOver }

/// Everything the renderer needs for one frame.
pub struct Snapshot<'a> {
    pub phase:      GamePhase,
    pub grid:       &'a GridConfig,
    pub snake:      &'a Snake,
    pub food:       Option<Cell>,
    pub score:      u32,
    pub high_score: u32,
    pub gestures:   bool,
    pub last_input: Option<InputSource>,
    pub status:     &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Game
// ════════════════════════════════════════════════════════════════════════════

pub struct Game {
    // ── current run ──────────────────────────────────────────────────────
    sim:        Simulation,
    spawner:    FoodSpawner,
    arbiter:    InputArbiter,
    phase:      GamePhase,
    /// When the current run began.  Swipes captured earlier are stale.
    run_started: Instant,

    // ── scores ───────────────────────────────────────────────────────────
    score:      u32,
    /// Best score since launch.
    high_score: u32,

    // ── gestures ─────────────────────────────────────────────────────────
    pipeline:   GesturePipeline,
    /// Tracking was switched on and has not been switched off since.
    gestures:   bool,

    status:     String,
}

impl Game {
    pub fn new(grid: GridConfig, spawner: FoodSpawner, pipeline: GesturePipeline, now: Instant) -> Self {
        Game {
            sim:        Simulation::new(grid, now),
            spawner,
            arbiter:    InputArbiter::new(),
            phase:      GamePhase::Start,
            run_started: now,
            score:      0,
            high_score: 0,
            pipeline,
            gestures:   false,
            status:     "Press SPACE to start".to_string(),
        }
    }

    // ── controls ─────────────────────────────────────────────────────────

    /// Apply one control.  Returns `false` when the application should exit.
    pub fn handle(&mut self, control: Control, now: Instant) -> bool {
        match (control, self.phase) {
            (Control::Quit, _) => {
                log::info!("quit requested");
                return false;
            }
            (Control::ToggleGestures, _) => self.toggle_gestures(),
            (Control::Confirm, GamePhase::Start | GamePhase::GameOver) => self.begin(now),
            (Control::Cancel, GamePhase::Playing | GamePhase::GameOver) => self.to_title(),
            (Control::Direction(d), GamePhase::Playing) => self.arbiter.push_key(d),
            _ => {}
        }
        true
    }

    /// Switch gesture tracking on or off.  A camera that cannot be acquired
    /// leaves tracking off; keyboard play carries on either way.
    ///
    /// Switching off blocks for the pipeline's stop timeout at most, or for
    /// [`TOGGLE_STOP_WAIT`] while a run is in progress.
    pub fn toggle_gestures(&mut self) {
        if self.pipeline.is_running() {
            if self.phase == GamePhase::Playing {
                let wait = TOGGLE_STOP_WAIT.min(self.pipeline.config().stop_timeout);
                self.pipeline.stop_within(wait);
            } else {
                self.pipeline.stop();
            }
            self.gestures = false;
            self.status = "Gestures off".to_string();
            return;
        }

        match self.pipeline.start() {
            Ok(()) => {
                self.gestures = true;
                self.status = "Gestures on - swipe to steer".to_string();
            }
            Err(e) => {
                self.gestures = false;
                log::warn!("gestures unavailable: {}", e);
                self.status = format!("Gestures unavailable: {}", e);
            }
        }
    }

    /// Enter `Playing` with a fresh run.
    fn begin(&mut self, now: Instant) {
        let from = self.phase;
        self.sim = Simulation::new(*self.sim.config(), now);
        self.run_started = now;
        self.score = 0;
        self.arbiter.clear();
        let stale = self.pipeline.clear();
        self.phase = GamePhase::Playing;
        self.status = "Arrows or WASD to steer".to_string();
        log::info!("{:?} -> Playing ({} stale swipe(s) dropped)", from, stale);
    }

    fn to_title(&mut self) {
        log::info!("{:?} -> Start", self.phase);
        self.phase = GamePhase::Start;
        self.arbiter.clear();
        self.status = "Press SPACE to start".to_string();
    }

    fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.high_score = self.high_score.max(self.score);
        log::info!(
            "Playing -> GameOver at {:?}, score {} (best {})",
            self.sim.snake().head(), self.score, self.high_score
        );
        self.status = "SPACE to restart  ESC for menu".to_string();
    }

    // ── per-frame ────────────────────────────────────────────────────────

    /// One frame of game logic: take at most one swipe, top up food, and
    /// advance the snake if a move is due.
    pub fn update(&mut self, now: Instant) {
        if self.gestures && !self.pipeline.is_running() {
            self.gestures = false;
            log::warn!("gesture tracking stopped by itself");
            self.status = "Gesture tracking stopped - G to retry".to_string();
        }

        if let Some(event) = self.pipeline.poll() {
            match self.phase {
                GamePhase::Playing if event.at < self.run_started => {
                    log::debug!("dropping {} swipe captured before this run", event.direction.name());
                }
                GamePhase::Playing => self.arbiter.push_gesture(event),
                _ => log::debug!("swipe {} ignored in {:?}", event.direction.name(), self.phase),
            }
        }

        if self.phase != GamePhase::Playing {
            return;
        }

        if self.sim.food().is_none() {
            match self.spawner.spawn(self.sim.config(), self.sim.snake().cells()) {
                Some(cell) => self.sim.place_food(cell),
                None => log::trace!("no free cell for food"),
            }
        }

        // The pending request belongs to the next move, not to this frame.
        if !self.sim.is_due(now) {
            return;
        }
        let pending = self.arbiter.take();
        match self.sim.tick(now, pending) {
            MoveOutcome::Ate => {
                self.score += SCORE_PER_FOOD;
                log::info!("food eaten: score {}, delay {:?}", self.score, self.sim.move_delay());
            }
            MoveOutcome::Collided => self.game_over(),
            MoveOutcome::Moved | MoveOutcome::Pending => {}
        }
    }

    /// Stop gesture tracking ahead of exit.
    pub fn shutdown(&mut self) {
        if self.pipeline.is_running() {
            self.pipeline.stop();
        }
        self.gestures = false;
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase:      self.phase,
            grid:       self.sim.config(),
            snake:      self.sim.snake(),
            food:       self.sim.food(),
            score:      self.score,
            high_score: self.high_score,
            gestures:   self.gestures_enabled(),
            last_input: self.arbiter.last_source(),
            status:     &self.status,
        }
    }

    pub fn phase(&self)            -> GamePhase     { self.phase }
    pub fn score(&self)            -> u32           { self.score }
    pub fn high_score(&self)       -> u32           { self.high_score }
    pub fn status(&self)           -> &str          { &self.status }
    pub fn simulation(&self)       -> &Simulation   { &self.sim }
    pub fn arbiter(&self)          -> &InputArbiter { &self.arbiter }
    pub fn gestures_enabled(&self) -> bool          { self.pipeline.is_running() }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the game until the window closes or the player quits.
///
/// Gestures come from the simulated camera: the mouse pointer over the
/// playfield stands in for the index fingertip.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let feed = PointerFeed::default();
    let camera: Arc<dyn Camera> = Arc::new(PointerCamera::new(feed.clone()));
    let detectors = || -> Box<dyn LandmarkDetector> { Box::new(BrightSpotDetector::default()) };
    let pipeline = GesturePipeline::new(camera, detectors, cfg.pipeline);
    let spawner = cfg.seed.map_or_else(FoodSpawner::new, FoodSpawner::seeded);

    let mut vis = Visualizer::new(&cfg.grid, feed)?;
    let mut game = Game::new(cfg.grid, spawner, pipeline, Instant::now());

    log::info!(
        "{}x{} grid, {:?} boundary, move delay {:?}",
        cfg.grid.width, cfg.grid.height, cfg.grid.boundary, cfg.grid.base_delay
    );
    if cfg.gestures {
        game.toggle_gestures();
    }

    'frames: while vis.is_open() {
        let now = Instant::now();
        for control in vis.poll_controls() {
            if !game.handle(control, now) {
                break 'frames;
            }
        }

        game.update(now);
        vis.render(&game.snapshot())?;
    }

    game.shutdown();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use grid_snake::{Boundary, Direction};
    use std::collections::VecDeque;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::Mutex;
    use std::thread;
    use swipe_gesture::{CameraDevice, CaptureRequest, DeviceError, Frame, SwipeConfig};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn bright_spot() -> Box<dyn LandmarkDetector> {
        Box::new(BrightSpotDetector::default())
    }

    fn test_config(fps: u32) -> PipelineConfig {
        PipelineConfig {
            request: CaptureRequest { width: 64, height: 48, fps },
            swipe:   SwipeConfig { threshold_px: 10.0, cooldown: Duration::ZERO },
            ..PipelineConfig::default()
        }
    }

    fn pipeline(camera: &Arc<PointerCamera>) -> GesturePipeline {
        GesturePipeline::new(Arc::clone(camera) as Arc<dyn Camera>, bright_spot, test_config(200))
    }

    fn wait_until(cond: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(3);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(ms(5));
        }
        false
    }

    // ── Camera that holds its last frame back ────────────────────────────

    /// Serves `spots` in order.  The last frame is timestamped, announced on
    /// `captured`, and only handed over once `gate` fires.
    struct GatedDevice {
        spots:    VecDeque<(u32, u32)>,
        captured: Sender<Instant>,
        gate:     Receiver<()>,
    }

    impl CameraDevice for GatedDevice {
        fn read_frame(&mut self) -> Result<Frame, DeviceError> {
            let Some((x, y)) = self.spots.pop_front() else {
                thread::sleep(ms(2));
                return Err(DeviceError::ReadFailed("no more frames".into()));
            };
            let captured_at = Instant::now();
            if self.spots.is_empty() {
                let _ = self.captured.send(captured_at);
                let _ = self.gate.recv();
            }
            let mut frame = Frame::blank(64, 48, captured_at);
            frame.luma[(y * 64 + x) as usize] = 255;
            Ok(frame)
        }

        fn release(&mut self) {}
    }

    struct GatedCamera(Mutex<Option<GatedDevice>>);

    impl Camera for GatedCamera {
        fn open(&self, _req: &CaptureRequest) -> Result<Box<dyn CameraDevice>, DeviceError> {
            match self.0.lock().unwrap().take() {
                Some(device) => Ok(Box::new(device)),
                None => Err(DeviceError::Busy),
            }
        }
    }

    fn game_with(grid: GridConfig) -> (Game, Arc<PointerCamera>, PointerFeed) {
        let feed = PointerFeed::default();
        let camera = Arc::new(PointerCamera::new(feed.clone()));
        let game = Game::new(grid, FoodSpawner::seeded(7), pipeline(&camera), Instant::now());
        (game, camera, feed)
    }

    fn small_walled() -> GridConfig {
        GridConfig { width: 4, height: 4, boundary: Boundary::Wall, ..GridConfig::default() }
    }

    /// Start on a 4×4 walled grid and run into the right-hand wall, eating
    /// one food on the way.  Returns the instant of the crash.
    fn crash_after_one_food(game: &mut Game, t0: Instant) -> Instant {
        game.handle(Control::Confirm, t0);
        game.sim.place_food(Cell::new(3, 2));
        game.update(t0 + ms(100));
        assert_eq!(game.score(), SCORE_PER_FOOD);
        game.update(t0 + ms(300));
        assert_eq!(game.phase(), GamePhase::GameOver);
        t0 + ms(300)
    }

    /// Wiggle the pointer from bottom to top of the source and give the
    /// capture thread time to see it.
    fn swipe_up(feed: &PointerFeed) {
        feed.set(Some((0.5, 0.9)));
        thread::sleep(ms(80));
        feed.set(Some((0.5, 0.1)));
        thread::sleep(ms(80));
    }

    #[test]
    fn opens_on_title_screen_ignoring_steering() {
        let (mut game, _, _) = game_with(GridConfig::default());
        assert_eq!(game.phase(), GamePhase::Start);
        assert!(game.handle(Control::Direction(Direction::Up), Instant::now()));
        assert_eq!(game.arbiter().peek(), None);
        assert!(!game.gestures_enabled());
    }

    #[test]
    fn confirm_starts_a_fresh_centered_run() {
        let (mut game, _, _) = game_with(GridConfig::default());
        let t0 = Instant::now();
        game.handle(Control::Confirm, t0);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.score(), 0);

        let snake = game.simulation().snake();
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), GridConfig::default().center());

        game.update(t0);
        let food = game.simulation().food().expect("food spawned on first frame");
        assert!(!game.simulation().snake().contains(food));
    }

    #[test]
    fn keyboard_request_waits_for_the_due_tick() {
        let (mut game, _, _) = game_with(GridConfig::default());
        let t0 = Instant::now();
        game.handle(Control::Confirm, t0);
        let start = game.simulation().snake().head();

        game.handle(Control::Direction(Direction::Down), t0);
        game.update(t0 + ms(50));
        assert_eq!(game.simulation().snake().head(), start);
        assert_eq!(game.arbiter().peek(), Some(Direction::Down));

        game.update(t0 + ms(100));
        assert_eq!(game.simulation().snake().head(), start.step(Direction::Down));
        assert_eq!(game.arbiter().peek(), None);
    }

    #[test]
    fn last_request_before_a_tick_wins() {
        let (mut game, _, _) = game_with(GridConfig::default());
        let t0 = Instant::now();
        game.handle(Control::Confirm, t0);
        let start = game.simulation().snake().head();

        game.handle(Control::Direction(Direction::Down), t0);
        game.handle(Control::Direction(Direction::Up), t0);
        game.update(t0 + ms(100));
        assert_eq!(game.simulation().snake().head(), start.step(Direction::Up));
    }

    #[test]
    fn eating_scores_grows_and_speeds_up() {
        let (mut game, _, _) = game_with(GridConfig::default());
        let t0 = Instant::now();
        game.handle(Control::Confirm, t0);
        let ahead = game.simulation().snake().head().step(Direction::Right);
        game.sim.place_food(ahead);

        game.update(t0 + ms(100));
        assert_eq!(game.score(), SCORE_PER_FOOD);
        assert_eq!(game.simulation().snake().len(), 1, "growth shows on the next move");
        assert_eq!(game.simulation().move_delay(), ms(95));

        game.update(t0 + ms(195));
        assert_eq!(game.simulation().snake().len(), 2);
    }

    #[test]
    fn high_score_survives_restart() {
        let (mut game, _, _) = game_with(small_walled());
        let t0 = Instant::now();
        let crashed = crash_after_one_food(&mut game, t0);
        assert_eq!(game.high_score(), SCORE_PER_FOOD);

        game.handle(Control::Confirm, crashed);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.high_score(), SCORE_PER_FOOD);

        // A worse run leaves the best alone.
        game.sim.place_food(Cell::new(0, 0));
        game.update(crashed + ms(100));
        game.update(crashed + ms(200));
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert_eq!(game.high_score(), SCORE_PER_FOOD);
    }

    #[test]
    fn restart_gives_a_clean_run() {
        let (mut game, _, _) = game_with(small_walled());
        let t0 = Instant::now();
        let crashed = crash_after_one_food(&mut game, t0);

        game.handle(Control::Confirm, crashed);
        let sim = game.simulation();
        assert_eq!(sim.snake().len(), 1);
        assert_eq!(sim.snake().head(), small_walled().center());
        assert_eq!(sim.snake().direction(), Direction::Right);
        assert_eq!(sim.move_delay(), small_walled().base_delay);
        assert!(!sim.is_over());
    }

    #[test]
    fn cancel_returns_to_title() {
        let (mut game, _, _) = game_with(small_walled());
        let t0 = Instant::now();

        game.handle(Control::Confirm, t0);
        game.handle(Control::Direction(Direction::Up), t0);
        game.handle(Control::Cancel, t0);
        assert_eq!(game.phase(), GamePhase::Start);
        assert_eq!(game.arbiter().peek(), None);

        let crashed = crash_after_one_food(&mut game, t0 + ms(1000));
        game.handle(Control::Cancel, crashed);
        assert_eq!(game.phase(), GamePhase::Start);
    }

    #[test]
    fn confirm_while_playing_is_ignored() {
        let (mut game, _, _) = game_with(GridConfig::default());
        let t0 = Instant::now();
        game.handle(Control::Confirm, t0);
        game.update(t0 + ms(100));
        let head = game.simulation().snake().head();
        game.handle(Control::Confirm, t0 + ms(150));
        assert_eq!(game.simulation().snake().head(), head);
    }

    #[test]
    fn quit_ends_the_loop() {
        let (mut game, _, _) = game_with(GridConfig::default());
        assert!(!game.handle(Control::Quit, Instant::now()));
    }

    #[test]
    fn swipe_steers_the_snake() {
        let (mut game, _, feed) = game_with(GridConfig::default());
        let t0 = Instant::now();
        game.handle(Control::Confirm, t0);
        game.handle(Control::ToggleGestures, t0);
        assert!(game.gestures_enabled());

        swipe_up(&feed);
        game.update(t0);
        assert_eq!(game.arbiter().peek(), Some(Direction::Up));
        assert_eq!(game.arbiter().last_source(), Some(InputSource::Gesture));

        let start = game.simulation().snake().head();
        game.update(t0 + ms(100));
        assert_eq!(game.simulation().snake().head(), start.step(Direction::Up));

        game.handle(Control::ToggleGestures, t0 + ms(100));
        assert!(!game.gestures_enabled());
    }

    #[test]
    fn restart_drops_swipes_queued_during_game_over() {
        let (mut game, camera, feed) = game_with(small_walled());
        let t0 = Instant::now();
        let crashed = crash_after_one_food(&mut game, t0);

        game.handle(Control::ToggleGestures, crashed);
        swipe_up(&feed);
        // Tracking off again; whatever it produced is still queued.
        game.handle(Control::ToggleGestures, crashed);
        assert!(!camera.in_use());

        game.handle(Control::Confirm, crashed);
        let start = game.simulation().snake().head();
        game.update(crashed + ms(100));
        assert_eq!(game.simulation().snake().head(), start.step(Direction::Right));
    }

    #[test]
    fn swipe_in_flight_across_restart_is_not_applied() {
        let (captured_tx, captured_rx) = mpsc::channel();
        let (gate_tx, gate_rx) = mpsc::channel();
        let device = GatedDevice {
            spots:    VecDeque::from([(32, 40), (32, 5)]),
            captured: captured_tx,
            gate:     gate_rx,
        };
        let camera: Arc<dyn Camera> = Arc::new(GatedCamera(Mutex::new(Some(device))));
        let pipeline = GesturePipeline::new(camera, bright_spot, test_config(200));
        let mut game = Game::new(GridConfig::default(), FoodSpawner::seeded(7), pipeline, Instant::now());

        game.handle(Control::ToggleGestures, Instant::now());
        assert!(game.gestures_enabled());

        // The upward swipe's frame is captured, then the run starts, then
        // the frame reaches the classifier.
        let swiped_at = captured_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        thread::sleep(ms(5));
        let t0 = Instant::now();
        assert!(t0 > swiped_at);
        game.handle(Control::Confirm, t0);
        gate_tx.send(()).unwrap();
        thread::sleep(ms(100));

        game.update(t0);
        assert_eq!(game.arbiter().peek(), None);

        let start = game.simulation().snake().head();
        game.update(t0 + ms(100));
        assert_eq!(game.simulation().snake().head(), start.step(Direction::Right));
    }

    #[test]
    fn switching_gestures_off_mid_run_does_not_stall_the_frame() {
        let camera = Arc::new(PointerCamera::new(PointerFeed::default()));
        // One frame per second: the second read paces for most of a second
        // while holding the device.
        let pipeline = GesturePipeline::new(Arc::clone(&camera) as Arc<dyn Camera>, bright_spot, test_config(1));
        let mut game = Game::new(GridConfig::default(), FoodSpawner::seeded(7), pipeline, Instant::now());
        let t0 = Instant::now();
        game.handle(Control::Confirm, t0);
        game.handle(Control::ToggleGestures, t0);
        assert!(game.gestures_enabled());
        thread::sleep(ms(30));

        let t = Instant::now();
        game.handle(Control::ToggleGestures, t0);
        assert!(t.elapsed() < ms(300), "toggle blocked for {:?}", t.elapsed());
        assert!(!game.gestures_enabled());

        // The capture loop hands the camera back once its read returns.
        assert!(wait_until(|| !camera.in_use()));
    }

    #[test]
    fn camera_failure_keeps_keyboard_play() {
        let (mut game, camera, _) = game_with(GridConfig::default());
        camera.set_connected(false);
        let t0 = Instant::now();
        game.handle(Control::Confirm, t0);

        game.handle(Control::ToggleGestures, t0);
        assert!(!game.gestures_enabled());
        assert!(game.status().contains("unavailable"));
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.simulation().move_delay(), GridConfig::default().base_delay);

        let start = game.simulation().snake().head();
        game.handle(Control::Direction(Direction::Up), t0);
        game.update(t0 + ms(100));
        assert_eq!(game.simulation().snake().head(), start.step(Direction::Up));
    }

    #[test]
    fn toggling_gestures_leaves_the_move_timer_alone() {
        let (mut game, _, _) = game_with(GridConfig::default());
        let t0 = Instant::now();
        game.handle(Control::Confirm, t0);
        let start = game.simulation().snake().head();

        game.handle(Control::ToggleGestures, t0 + ms(10));
        game.handle(Control::ToggleGestures, t0 + ms(20));
        game.update(t0 + ms(50));
        assert_eq!(game.simulation().snake().head(), start);
        game.update(t0 + ms(100));
        assert_eq!(game.simulation().snake().head(), start.step(Direction::Right));
    }

    #[test]
    fn snapshot_reflects_state() {
        let (mut game, _, _) = game_with(GridConfig::default());
        let t0 = Instant::now();
        game.handle(Control::Confirm, t0);
        game.handle(Control::Direction(Direction::Down), t0);
        game.update(t0);

        let snap = game.snapshot();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.score, 0);
        assert!(snap.food.is_some());
        assert!(!snap.gestures);
        assert_eq!(snap.last_input, Some(InputSource::Keyboard));
        assert_eq!(snap.snake.len(), 1);
    }
}
