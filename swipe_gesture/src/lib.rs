//! # swipe_gesture
//!
//! Turns index-fingertip motion seen by a camera into debounced
//! [`Direction`](grid_snake::Direction) events.
//!
//! | Module | Contents |
//! |---|---|
//! | [`classifier`] | `SwipeClassifier`: consecutive-sample displacement, threshold, cooldown |
//! | [`device`] | `Camera` / `CameraDevice` / `LandmarkDetector` traits, `Frame`, `Hand` |
//! | [`pipeline`] | `GesturePipeline`: capture thread, start/stop, non-blocking `poll` |
//! | [`sim`] | `PointerCamera` + `BrightSpotDetector`: a hardware-free stand-in |
//!
//! ## Coordinates
//!
//! Landmarks arrive normalized to the frame.  The pipeline scales them to
//! frame pixels before classifying, so the swipe threshold is in pixels of
//! the requested capture resolution.  Frames are mirrored first (by
//! default), which makes a rightward hand movement read as `Right` on
//! screen.  Vertical follows screen convention: y grows downward.

pub mod classifier;
pub mod device;
pub mod pipeline;
pub mod sim;

pub use classifier::{GestureEvent, SwipeClassifier, SwipeConfig};
pub use device::{
    Camera, CameraDevice, CaptureRequest, DetectError, DeviceError, Frame, Hand, LandmarkDetector,
    INDEX_FINGERTIP,
};
pub use pipeline::{GesturePipeline, PipelineConfig, PipelineError, PipelineState};
