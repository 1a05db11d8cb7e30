//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ SCORE 40   BEST 120          GESTURES ON  KB │  HUD bar
//! ├──────────────────────────────────────────────┤
//! │                                              │
//! │        ██                                    │
//! │        ████████         ◆                    │  playfield, CELL px per cell
//! │                                              │
//! ├──────────────────────────────────────────────┤
//! │ status line                                  │
//! │ key legend                                   │  footer
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Besides drawing, the window is the control surface: key presses become
//! [`Control`]s, and the mouse position over the playfield is written to the
//! [`PointerFeed`] that drives the simulated camera.

use std::time::Duration;

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use grid_snake::{Cell, Direction, GridConfig};
use swipe_gesture::sim::PointerFeed;

use crate::app::{AppError, GamePhase, Snapshot};
use crate::input::{Control, InputSource};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const CELL:      usize = 40;
const HUD_H:         usize = 28;
const FOOTER_H:      usize = 36;
const TEXT_SCALE:    usize = 2;
const BG_COLOR:      u32   = 0xFF1A1A2E;
const BAR_COLOR:     u32   = 0xFF0F3460;
const GRID_COLOR:    u32   = 0xFF202040;
const SNAKE_COLOR:   u32   = 0xFF2ECC71;
const HEAD_COLOR:    u32   = 0xFFA8F0C0;
const FOOD_COLOR:    u32   = 0xFFE74C3C;
const GOLD:          u32   = 0xFFFFD700;
const TEXT_COLOR:    u32   = 0xFFEEEEEE;
const DIM_TEXT:      u32   = 0xFF888888;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    width:  usize,
    height: usize,
    /// Playfield size in pixels.
    play_w: usize,
    play_h: usize,
    feed:   PointerFeed,
}

impl Visualizer {
    pub fn new(grid: &GridConfig, feed: PointerFeed) -> Result<Self, AppError> {
        let play_w = grid.width.max(1) as usize * CELL;
        let play_h = grid.height.max(1) as usize * CELL;
        let width  = play_w;
        let height = HUD_H + play_h + FOOTER_H;

        let mut window = Window::new(
            "Gesture Snake",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; width * height],
            width,
            height,
            play_w,
            play_h,
            feed,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Collect this frame's controls and publish the pointer position.
    pub fn poll_controls(&mut self) -> Vec<Control> {
        let pointer = self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| pointer_in_playfield(x, y, self.play_w, self.play_h));
        self.feed.set(pointer);

        self.window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .filter_map(control_for)
            .collect()
    }

    /// Render one frame.
    pub fn render(&mut self, snap: &Snapshot<'_>) -> Result<(), AppError> {
        self.buf.fill(BG_COLOR);

        // ── Playfield ─────────────────────────────────────────────────────
        self.draw_grid_lines();
        if let Some(food) = snap.food {
            self.draw_food(food);
        }
        let head = snap.snake.head();
        for cell in snap.snake.cells() {
            let color = if cell == head { HEAD_COLOR } else { SNAKE_COLOR };
            self.draw_cell(cell, color);
        }

        // ── HUD ───────────────────────────────────────────────────────────
        self.fill_rect(0, 0, self.width, HUD_H, BAR_COLOR);
        let scores = format!("SCORE {}   BEST {}", snap.score, snap.high_score);
        self.draw_label(&scores, 8, 8, TEXT_SCALE, TEXT_COLOR);
        let input = match (snap.gestures, snap.last_input) {
            (false, _)                         => "GESTURES OFF",
            (true, Some(InputSource::Gesture)) => "GESTURES ON - SWIPE",
            (true, _)                          => "GESTURES ON",
        };
        let x = self.width.saturating_sub(label_width(input, TEXT_SCALE) + 8);
        self.draw_label(input, x, 8, TEXT_SCALE, if snap.gestures { GOLD } else { DIM_TEXT });

        // ── Phase overlays ────────────────────────────────────────────────
        match snap.phase {
            GamePhase::Start => {
                self.draw_centered("GESTURE SNAKE", HUD_H + self.play_h / 2 - 30, 4, GOLD);
                self.draw_centered("PRESS SPACE TO START", HUD_H + self.play_h / 2 + 10, TEXT_SCALE, TEXT_COLOR);
            }
            GamePhase::GameOver => {
                self.draw_centered("GAME OVER", HUD_H + self.play_h / 2 - 30, 4, FOOD_COLOR);
                let line = format!("FINAL SCORE {}", snap.score);
                self.draw_centered(&line, HUD_H + self.play_h / 2 + 10, TEXT_SCALE, TEXT_COLOR);
            }
            GamePhase::Playing => {}
        }

        // ── Footer ────────────────────────────────────────────────────────
        let footer_y = HUD_H + self.play_h;
        self.fill_rect(0, footer_y, self.width, FOOTER_H, BAR_COLOR);
        self.draw_label(snap.status, 8, footer_y + 4, 1, TEXT_COLOR);
        self.draw_label(
            "ARROWS/WASD=STEER  SPACE=START  ESC=MENU  G=GESTURES  Q=QUIT",
            8, footer_y + 22, 1, DIM_TEXT,
        );

        self.window
            .update_with_buffer(&self.buf, self.width, self.height)
            .map_err(|e| AppError::Window(e.to_string()))
    }

    // ── Playfield ─────────────────────────────────────────────────────────

    fn draw_grid_lines(&mut self) {
        for x in (0..self.play_w).step_by(CELL) {
            self.fill_rect(x, HUD_H, 1, self.play_h, GRID_COLOR);
        }
        for y in (0..self.play_h).step_by(CELL) {
            self.fill_rect(0, HUD_H + y, self.play_w, 1, GRID_COLOR);
        }
    }

    fn draw_cell(&mut self, cell: Cell, color: u32) {
        if let Some((x, y)) = cell_origin(cell) {
            self.fill_rect(x + 1, HUD_H + y + 1, CELL - 2, CELL - 2, color);
        }
    }

    fn draw_food(&mut self, cell: Cell) {
        if let Some((x, y)) = cell_origin(cell) {
            self.draw_diamond(x + CELL / 2, HUD_H + y + CELL / 2, CELL / 2 - 4, FOOD_COLOR);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(self.height) {
            for col in x..(x+w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    /// Filled diamond of radius `r` centred on `(cx, cy)`.
    fn draw_diamond(&mut self, cx: usize, cy: usize, r: usize, color: u32) {
        for dy in 0..=r {
            let half = r - dy;
            let x0 = cx.saturating_sub(half);
            self.fill_rect(x0, cy + dy, 2 * half + 1, 1, color);
            if dy > 0 && cy >= dy {
                self.fill_rect(x0, cy - dy, 2 * half + 1, 1, color);
            }
        }
    }

    fn draw_centered(&mut self, text: &str, y: usize, scale: usize, color: u32) {
        let x = self.width.saturating_sub(label_width(text, scale)) / 2;
        self.draw_label(text, x, y, scale, color);
    }

    /// 3×5 bitmap font, each dot drawn as a `scale`×`scale` square.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > self.width { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Input mapping
// ────────────────────────────────────────────────────────────────────────────

fn control_for(key: Key) -> Option<Control> {
    let control = match key {
        Key::Up    | Key::W => Control::Direction(Direction::Up),
        Key::Down  | Key::S => Control::Direction(Direction::Down),
        Key::Left  | Key::A => Control::Direction(Direction::Left),
        Key::Right | Key::D => Control::Direction(Direction::Right),
        Key::Space | Key::Enter => Control::Confirm,
        Key::Escape => Control::Cancel,
        Key::G      => Control::ToggleGestures,
        Key::Q      => Control::Quit,
        _ => return None,
    };
    Some(control)
}

/// Window pixel → normalized playfield position.  Positions over the HUD or
/// footer fall outside `0.0..=1.0`.
fn pointer_in_playfield(x: f32, y: f32, play_w: usize, play_h: usize) -> (f32, f32) {
    (x / play_w as f32, (y - HUD_H as f32) / play_h as f32)
}

/// Top-left pixel of `cell` within the playfield.
fn cell_origin(cell: Cell) -> Option<(usize, usize)> {
    let col = usize::try_from(cell.col).ok()?;
    let row = usize::try_from(cell.row).ok()?;
    Some((col * CELL, row * CELL))
}

fn label_width(text: &str, scale: usize) -> usize {
    text.chars().count() * 4 * scale
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}
