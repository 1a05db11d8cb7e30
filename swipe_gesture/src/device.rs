//! The camera and the hand-landmark detector, as seen by the pipeline.
//!
//! Both are external collaborators.  The pipeline only needs a camera that
//! can be opened, read and released, and a detector that turns a frame into
//! zero or more hands of normalized landmarks.

use std::time::Instant;

use thiserror::Error;

/// Index of the index-finger tip in the 21-point hand model.
pub const INDEX_FINGERTIP: usize = 8;

/// Landmarks per hand in the 21-point hand model.
pub const HAND_LANDMARKS: usize = 21;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("camera unavailable: {0}")]
    Unavailable(String),

    #[error("camera is already in use")]
    Busy,

    #[error("frame read failed: {0}")]
    ReadFailed(String),

    #[error("camera has been released")]
    Released,
}

#[derive(Debug, Error)]
#[error("landmark detection failed: {0}")]
pub struct DetectError(pub String);

// ════════════════════════════════════════════════════════════════════════════
// CaptureRequest / Frame / Hand
// ════════════════════════════════════════════════════════════════════════════

/// Resolution and rate asked of the camera when opening it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureRequest {
    pub width:  u32,
    pub height: u32,
    pub fps:    u32,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        CaptureRequest { width: 640, height: 480, fps: 30 }
    }
}

/// One grayscale camera frame, row-major, one byte per pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width:       u32,
    pub height:      u32,
    pub luma:        Vec<u8>,
    pub captured_at: Instant,
}

impl Frame {
    pub fn blank(width: u32, height: u32, captured_at: Instant) -> Self {
        Frame {
            width,
            height,
            luma: vec![0; width as usize * height as usize],
            captured_at,
        }
    }

    /// Flip left/right in place, so the image reads like a mirror.
    pub fn mirror(&mut self) {
        let w = self.width as usize;
        if w == 0 {
            return;
        }
        for row in self.luma.chunks_exact_mut(w) {
            row.reverse();
        }
    }

    /// Scale a normalized `(x, y)` landmark to pixel coordinates.
    pub fn to_pixels(&self, (x, y): (f32, f32)) -> (f32, f32) {
        (x * self.width as f32, y * self.height as f32)
    }
}

/// One detected hand: landmarks normalized to `0.0..=1.0` of the frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    pub landmarks: Vec<(f32, f32)>,
}

impl Hand {
    pub fn landmark(&self, index: usize) -> Option<(f32, f32)> {
        self.landmarks.get(index).copied()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Traits
// ════════════════════════════════════════════════════════════════════════════

/// Something that can hand out an exclusive capture handle.
pub trait Camera: Send + Sync {
    /// Acquire and configure the device.  Fails with [`DeviceError::Busy`]
    /// while another handle is open.
    fn open(&self, request: &CaptureRequest) -> Result<Box<dyn CameraDevice>, DeviceError>;
}

/// An open capture handle.
pub trait CameraDevice: Send {
    fn read_frame(&mut self) -> Result<Frame, DeviceError>;

    /// Give the device back.  Must be safe to call more than once.
    fn release(&mut self);
}

/// The hand-pose model.
pub trait LandmarkDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Hand>, DetectError>;
}
