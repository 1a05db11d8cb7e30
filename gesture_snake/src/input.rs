//! Abstract controls and the arbiter that merges keyboard and swipe steering.
//!
//! The window translates key presses into [`Control`]s; the game feeds the
//! steering ones (and swipes drained from the pipeline) into the
//! [`InputArbiter`].  The arbiter holds a single pending direction: the most
//! recently processed request wins, whatever its source, and it is consumed
//! by the next due tick.  Reversal checking is the simulation's job.

use grid_snake::Direction;
use swipe_gesture::GestureEvent;

// ════════════════════════════════════════════════════════════════════════════
// Control
// ════════════════════════════════════════════════════════════════════════════

/// A user intent, independent of the key that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Steer.
    Direction(Direction),
    /// Start from the title screen, or restart after game over.
    Confirm,
    /// Back to the title screen.
    Cancel,
    /// Start or stop gesture tracking.
    ToggleGestures,
    /// Leave the application.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// InputArbiter
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSource {
    Keyboard,
    Gesture,
}

#[derive(Clone, Debug, Default)]
pub struct InputArbiter {
    pending:     Option<Direction>,
    last_source: Option<InputSource>,
}

impl InputArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_key(&mut self, direction: Direction) {
        self.push(direction, InputSource::Keyboard);
    }

    pub fn push_gesture(&mut self, event: GestureEvent) {
        self.push(event.direction, InputSource::Gesture);
    }

    fn push(&mut self, direction: Direction, source: InputSource) {
        if let Some(old) = self.pending.replace(direction) {
            log::trace!("{:?} request replaces pending {:?}", direction, old);
        }
        self.last_source = Some(source);
    }

    /// The pending request, without consuming it.
    pub fn peek(&self) -> Option<Direction> {
        self.pending
    }

    /// Consume the pending request.  Call once per due tick.
    pub fn take(&mut self) -> Option<Direction> {
        self.pending.take()
    }

    /// Drop any pending request and forget where input came from.
    pub fn clear(&mut self) {
        self.pending = None;
        self.last_source = None;
    }

    /// Source of the most recent request, for the status line.
    pub fn last_source(&self) -> Option<InputSource> {
        self.last_source
    }
}
