//! # gesture_snake
//!
//! Grid snake steered with the keyboard or with hand swipes, drawn in a
//! software-rendered `minifb` window.
//!
//! ## Controls
//!
//! | Key | Control |
//! |---|---|
//! | Arrows / `WASD` | Steer |
//! | `Space` / `Enter` | Start (title screen) or restart (game over) |
//! | `Escape` | Back to the title screen |
//! | `G` | Gesture tracking on / off |
//! | `Q` | Quit |
//!
//! ## Gestures
//!
//! With tracking on, a quick swipe of the index fingertip steers the snake:
//! one swipe, one turn, then a cooldown before the next is recognised.  The
//! built-in camera is simulated: move the mouse briskly across the
//! playfield and the pointer plays the fingertip.  Keyboard and swipes can
//! be mixed freely; whichever request arrives last before a move wins.

pub mod app;
pub mod input;
pub mod visualizer;
