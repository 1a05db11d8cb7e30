//! Simulated camera and detector, for running without hardware.
//!
//! [`PointerCamera`] stands in for a webcam: whatever writes to its
//! [`PointerFeed`] (the game window forwards the mouse) shows up in each
//! frame as a single bright pixel, laid out the way a real front camera
//! sees it, i.e. un-mirrored.  [`BrightSpotDetector`] stands in for the
//! hand-pose model: it reports the brightest pixel as a hand whose every
//! landmark sits on that spot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::device::{
    Camera, CameraDevice, CaptureRequest, DetectError, DeviceError, Frame, Hand, LandmarkDetector,
    HAND_LANDMARKS,
};

// ════════════════════════════════════════════════════════════════════════════
// PointerFeed
// ════════════════════════════════════════════════════════════════════════════

/// Latest pointer position, normalized to `0.0..=1.0` in screen orientation
/// (x right, y down).  `None` while no pointer is over the source.
#[derive(Clone, Debug, Default)]
pub struct PointerFeed(Arc<Mutex<Option<(f32, f32)>>>);

impl PointerFeed {
    pub fn set(&self, position: Option<(f32, f32)>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = position;
    }

    pub fn get(&self) -> Option<(f32, f32)> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PointerCamera
// ════════════════════════════════════════════════════════════════════════════

pub struct PointerCamera {
    feed:      PointerFeed,
    in_use:    Arc<AtomicBool>,
    connected: AtomicBool,
}

impl PointerCamera {
    pub fn new(feed: PointerFeed) -> Self {
        PointerCamera {
            feed,
            in_use:    Arc::new(AtomicBool::new(false)),
            connected: AtomicBool::new(true),
        }
    }

    /// Simulate plugging/unplugging the device.  Affects later `open`s only.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn in_use(&self) -> bool {
        self.in_use.load(Ordering::SeqCst)
    }
}

impl Camera for PointerCamera {
    fn open(&self, request: &CaptureRequest) -> Result<Box<dyn CameraDevice>, DeviceError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(DeviceError::Unavailable("no camera connected".into()));
        }
        if request.width == 0 || request.height == 0 || request.fps == 0 {
            return Err(DeviceError::Unavailable(format!(
                "unsupported mode {}x{} @ {} fps",
                request.width, request.height, request.fps
            )));
        }
        if self.in_use.swap(true, Ordering::SeqCst) {
            return Err(DeviceError::Busy);
        }

        let interval = Duration::from_secs(1) / request.fps;
        Ok(Box::new(PointerDevice {
            feed:     self.feed.clone(),
            in_use:   Arc::clone(&self.in_use),
            width:    request.width,
            height:   request.height,
            interval,
            next_due: Instant::now(),
            released: false,
        }))
    }
}

struct PointerDevice {
    feed:     PointerFeed,
    in_use:   Arc<AtomicBool>,
    width:    u32,
    height:   u32,
    interval: Duration,
    next_due: Instant,
    released: bool,
}

impl CameraDevice for PointerDevice {
    fn read_frame(&mut self) -> Result<Frame, DeviceError> {
        if self.released {
            return Err(DeviceError::Released);
        }

        // Pace to the requested frame rate.
        let now = Instant::now();
        if self.next_due > now {
            thread::sleep(self.next_due - now);
        }
        let captured_at = Instant::now();
        self.next_due = (self.next_due + self.interval).max(captured_at);

        let mut frame = Frame::blank(self.width, self.height, captured_at);
        if let Some((nx, ny)) = self.feed.get() {
            if (0.0..=1.0).contains(&nx) && (0.0..=1.0).contains(&ny) {
                let px = ((nx * self.width as f32) as u32).min(self.width - 1);
                let py = ((ny * self.height as f32) as u32).min(self.height - 1);
                // A front camera sees the scene flipped left/right.
                let raw_x = self.width - 1 - px;
                frame.luma[(py * self.width + raw_x) as usize] = 255;
            }
        }
        Ok(frame)
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.in_use.store(false, Ordering::SeqCst);
        }
    }
}

impl Drop for PointerDevice {
    fn drop(&mut self) {
        self.release();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// BrightSpotDetector
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct BrightSpotDetector {
    /// Brightest pixel must reach this to count as a hand.
    pub threshold: u8,
}

impl Default for BrightSpotDetector {
    fn default() -> Self {
        BrightSpotDetector { threshold: 200 }
    }
}

impl LandmarkDetector for BrightSpotDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Hand>, DetectError> {
        let expected = frame.width as usize * frame.height as usize;
        if frame.luma.len() != expected {
            return Err(DetectError(format!(
                "frame is {} bytes, expected {}x{}",
                frame.luma.len(),
                frame.width,
                frame.height
            )));
        }

        let brightest = frame
            .luma
            .iter()
            .enumerate()
            .max_by_key(|&(_, &v)| v)
            .filter(|&(_, &v)| v >= self.threshold);

        Ok(brightest
            .map(|(i, _)| {
                let x = (i % frame.width as usize) as f32 / frame.width as f32;
                let y = (i / frame.width as usize) as f32 / frame.height as f32;
                vec![Hand { landmarks: vec![(x, y); HAND_LANDMARKS] }]
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CaptureRequest {
        CaptureRequest { width: 64, height: 48, fps: 240 }
    }

    #[test]
    fn pointer_shows_up_mirrored_in_raw_frame() {
        let feed = PointerFeed::default();
        let camera = PointerCamera::new(feed.clone());
        let mut dev = camera.open(&request()).unwrap();

        feed.set(Some((0.25, 0.5)));
        let mut frame = dev.read_frame().unwrap();
        let hands = BrightSpotDetector::default().detect(&frame).unwrap();
        let (x, y) = frame.to_pixels(hands[0].landmarks[8]);
        assert_eq!((x, y), (47.0, 24.0));

        // After the selfie flip the spot is back under the pointer.
        frame.mirror();
        let hands = BrightSpotDetector::default().detect(&frame).unwrap();
        assert_eq!(frame.to_pixels(hands[0].landmarks[8]), (16.0, 24.0));
    }

    #[test]
    fn no_pointer_no_hand() {
        let camera = PointerCamera::new(PointerFeed::default());
        let mut dev = camera.open(&request()).unwrap();
        let frame = dev.read_frame().unwrap();
        assert!(BrightSpotDetector::default().detect(&frame).unwrap().is_empty());
    }

    #[test]
    fn pointer_outside_source_is_ignored() {
        let feed = PointerFeed::default();
        let camera = PointerCamera::new(feed.clone());
        let mut dev = camera.open(&request()).unwrap();
        feed.set(Some((1.5, 0.5)));
        let frame = dev.read_frame().unwrap();
        assert!(BrightSpotDetector::default().detect(&frame).unwrap().is_empty());
    }

    #[test]
    fn one_handle_at_a_time() {
        let camera = PointerCamera::new(PointerFeed::default());
        let mut first = camera.open(&request()).unwrap();
        assert!(matches!(camera.open(&request()), Err(DeviceError::Busy)));
        first.release();
        first.release();
        assert!(!camera.in_use());
        assert!(camera.open(&request()).is_ok());
    }

    #[test]
    fn released_handle_reads_nothing() {
        let camera = PointerCamera::new(PointerFeed::default());
        let mut dev = camera.open(&request()).unwrap();
        dev.release();
        assert!(matches!(dev.read_frame(), Err(DeviceError::Released)));
    }

    #[test]
    fn unplugged_camera_refuses_to_open() {
        let camera = PointerCamera::new(PointerFeed::default());
        camera.set_connected(false);
        assert!(matches!(camera.open(&request()), Err(DeviceError::Unavailable(_))));
        assert!(!camera.in_use());
    }

    #[test]
    fn malformed_frame_is_a_detector_error() {
        let mut frame = Frame::blank(4, 4, Instant::now());
        frame.luma.pop();
        assert!(BrightSpotDetector::default().detect(&frame).is_err());
    }
}
