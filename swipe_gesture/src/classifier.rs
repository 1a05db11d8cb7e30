//! Swipe classification: fingertip positions in, debounced directions out.
//!
//! The classifier compares each sample against the one before it (not
//! against where the last swipe ended), picks the dominant axis, and emits
//! when the displacement along that axis beats the threshold.  After an
//! emission nothing more is emitted until the cooldown has passed.

use std::time::{Duration, Instant};

use grid_snake::Direction;

// ════════════════════════════════════════════════════════════════════════════
// GestureEvent
// ════════════════════════════════════════════════════════════════════════════

/// A recognised swipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureEvent {
    pub direction: Direction,
    /// Capture time of the frame that completed the swipe.
    pub at:        Instant,
}

// ════════════════════════════════════════════════════════════════════════════
// SwipeConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwipeConfig {
    /// Minimum displacement (frame pixels) between consecutive samples.
    pub threshold_px: f32,
    /// Quiet period after each emitted swipe.
    pub cooldown:     Duration,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        SwipeConfig {
            threshold_px: 60.0,
            cooldown:     Duration::from_secs(1),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SwipeClassifier
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct SwipeClassifier {
    config:    SwipeConfig,
    /// Most recent sample.
    last:      Option<((f32, f32), Instant)>,
    last_emit: Option<Instant>,
}

impl SwipeClassifier {
    pub fn new(config: SwipeConfig) -> Self {
        SwipeClassifier { config, last: None, last_emit: None }
    }

    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    /// Forget all history, as if freshly constructed.
    pub fn reset(&mut self) {
        self.last = None;
        self.last_emit = None;
    }

    /// Feed one fingertip sample (frame pixels, y down).
    ///
    /// Timestamps must not go backwards.
    pub fn observe(&mut self, position: (f32, f32), now: Instant) -> Option<GestureEvent> {
        let previous = self.last.replace((position, now));
        let ((px, py), _) = previous?;

        if let Some(emitted) = self.last_emit {
            if now.saturating_duration_since(emitted) < self.config.cooldown {
                return None;
            }
        }

        let dx = position.0 - px;
        let dy = position.1 - py;
        let threshold = self.config.threshold_px;

        let direction = if dx.abs() >= dy.abs() && dx.abs() > threshold {
            if dx > 0.0 { Direction::Right } else { Direction::Left }
        } else if dy.abs() > threshold {
            if dy > 0.0 { Direction::Down } else { Direction::Up }
        } else {
            return None;
        };

        self.last_emit = Some(now);
        Some(GestureEvent { direction, at: now })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
