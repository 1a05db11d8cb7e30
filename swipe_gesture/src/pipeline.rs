//! The capture pipeline: camera → landmark detector → classifier → channel.
//!
//! ```text
//!   game thread                      capture thread
//!   ───────────                      ──────────────
//!   start() ── open camera ────────► loop {
//!                                      read frame   (failure: skip)
//!                                      mirror
//!                                      detect hands (failure: exit loop)
//!                                      observe fingertip
//!   poll()  ◄──── mpsc::channel ────── send GestureEvent
//!                                    }
//!   stop()  ── stop flag, bounded wait, release camera
//! ```
//!
//! The game loop never blocks on the pipeline: `poll` is a `try_recv`, and
//! `stop` waits at most [`PipelineConfig::stop_timeout`].  The only state
//! shared with the capture thread is the channel, the stop flag, and the
//! slot holding the open camera.  Whoever empties the slot releases the
//! camera; the loop checks the slot before every read, so a loop that
//! outlives `stop` finds it empty and exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::classifier::{GestureEvent, SwipeClassifier, SwipeConfig};
use crate::device::{
    Camera, CameraDevice, CaptureRequest, DeviceError, LandmarkDetector, INDEX_FINGERTIP,
};

type DeviceSlot = Arc<Mutex<Option<Box<dyn CameraDevice>>>>;
type DetectorFactory = Box<dyn FnMut() -> Box<dyn LandmarkDetector> + Send>;

// ════════════════════════════════════════════════════════════════════════════
// Config / state / errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineConfig {
    pub request:        CaptureRequest,
    /// Which landmark of the first detected hand drives the classifier.
    pub landmark_index: usize,
    /// Flip frames left/right before detection (selfie view).
    pub mirror:         bool,
    pub swipe:          SwipeConfig,
    /// Longest `stop` waits for the capture loop before giving up on it.
    pub stop_timeout:   Duration,
    /// Drop queued events older than this when polled.  `None` keeps every
    /// event however late it is read.
    pub max_event_age:  Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            request:        CaptureRequest::default(),
            landmark_index: INDEX_FINGERTIP,
            mirror:         true,
            swipe:          SwipeConfig::default(),
            stop_timeout:   Duration::from_millis(500),
            max_event_age:  None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Starting,
    Running,
    Stopping,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not acquire camera: {0}")]
    DeviceUnavailable(#[source] DeviceError),

    #[error("gesture pipeline is already running")]
    AlreadyRunning,

    #[error("could not spawn capture thread: {0}")]
    Spawn(#[source] std::io::Error),
}

// ════════════════════════════════════════════════════════════════════════════
// GesturePipeline
// ════════════════════════════════════════════════════════════════════════════

struct Worker {
    stop:   Arc<AtomicBool>,
    device: DeviceSlot,
    /// Disconnects when the capture loop has exited.
    done:   Receiver<()>,
    handle: JoinHandle<()>,
}

/// Owner of the capture thread and the consuming end of its event channel.
pub struct GesturePipeline {
    config:    PipelineConfig,
    camera:    Arc<dyn Camera>,
    detectors: DetectorFactory,
    state:     PipelineState,
    worker:    Option<Worker>,
    events_tx: Sender<GestureEvent>,
    events_rx: Receiver<GestureEvent>,
}

impl GesturePipeline {
    /// `detectors` builds a fresh detector for every `start`.
    pub fn new<F>(camera: Arc<dyn Camera>, detectors: F, config: PipelineConfig) -> Self
    where
        F: FnMut() -> Box<dyn LandmarkDetector> + Send + 'static,
    {
        let (events_tx, events_rx) = mpsc::channel();
        GesturePipeline {
            config,
            camera,
            detectors: Box::new(detectors),
            state: PipelineState::Idle,
            worker: None,
            events_tx,
            events_rx,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Current lifecycle state.  A loop that has died on its own reads as
    /// `Idle` even before the next `poll` tidies up after it.
    pub fn state(&self) -> PipelineState {
        match &self.worker {
            Some(w) if w.handle.is_finished() => PipelineState::Idle,
            _ => self.state,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == PipelineState::Running
    }

    /// Acquire the camera and launch the capture loop.
    ///
    /// On failure nothing is spawned and the pipeline stays `Idle`.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        self.reap();
        if self.worker.is_some() {
            return Err(PipelineError::AlreadyRunning);
        }

        let req = self.config.request;
        self.state = PipelineState::Starting;
        log::info!("gesture pipeline starting ({}x{} @ {} fps)", req.width, req.height, req.fps);

        let device = match self.camera.open(&req) {
            Ok(d) => d,
            Err(e) => {
                self.state = PipelineState::Idle;
                log::warn!("gesture pipeline not started: {}", e);
                return Err(PipelineError::DeviceUnavailable(e));
            }
        };

        let slot: DeviceSlot = Arc::new(Mutex::new(Some(device)));
        let stop = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let capture = CaptureLoop {
            device:         Arc::clone(&slot),
            detector:       (self.detectors)(),
            classifier:     SwipeClassifier::new(self.config.swipe),
            landmark_index: self.config.landmark_index,
            mirror:         self.config.mirror,
            stop:           Arc::clone(&stop),
            events:         self.events_tx.clone(),
        };

        let spawned = thread::Builder::new()
            .name("gesture-capture".into())
            .spawn(move || capture.run(done_tx));

        match spawned {
            Ok(handle) => {
                self.worker = Some(Worker { stop, device: slot, done: done_rx, handle });
                self.state = PipelineState::Running;
                log::info!("gesture pipeline running");
                Ok(())
            }
            Err(e) => {
                release(&mut lock(&slot));
                self.state = PipelineState::Idle;
                log::error!("gesture pipeline not started: {}", e);
                Err(PipelineError::Spawn(e))
            }
        }
    }

    /// Ask the capture loop to exit, wait for it (bounded), release the
    /// camera.  A no-op when nothing is running.
    pub fn stop(&mut self) {
        self.stop_within(self.config.stop_timeout);
    }

    /// [`stop`](Self::stop), waiting at most `wait` for the capture loop
    /// instead of the configured timeout.
    pub fn stop_within(&mut self, wait: Duration) {
        let Some(worker) = self.worker.take() else {
            self.state = PipelineState::Idle;
            return;
        };

        self.state = PipelineState::Stopping;
        worker.stop.store(true, Ordering::Release);

        match worker.done.recv_timeout(wait) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.handle.join().is_err() {
                    log::error!("capture loop panicked");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("capture loop still busy after {:?}; continuing without it", wait);
            }
        }

        match worker.device.try_lock() {
            Ok(mut slot) => release(&mut slot),
            Err(TryLockError::Poisoned(p)) => release(&mut p.into_inner()),
            Err(TryLockError::WouldBlock) => {
                log::warn!("camera mid-read; the capture loop releases it on exit");
            }
        }

        self.state = PipelineState::Idle;
        log::info!("gesture pipeline stopped");
    }

    /// Next queued swipe, oldest first.  Never blocks.
    pub fn poll(&mut self) -> Option<GestureEvent> {
        self.poll_at(Instant::now())
    }

    /// [`poll`](Self::poll) with an explicit clock for the staleness check.
    pub fn poll_at(&mut self, now: Instant) -> Option<GestureEvent> {
        self.reap();
        loop {
            let event = self.events_rx.try_recv().ok()?;
            match self.config.max_event_age {
                Some(max) if now.saturating_duration_since(event.at) > max => {
                    log::debug!("dropping stale {:?} swipe", event.direction);
                }
                _ => return Some(event),
            }
        }
    }

    /// Throw away everything queued.  Returns how many events were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.events_rx.try_iter().count();
        if dropped > 0 {
            log::debug!("cleared {} queued swipe(s)", dropped);
        }
        dropped
    }

    /// Tidy up after a capture loop that exited without being asked.
    fn reap(&mut self) {
        let finished = self.worker.as_ref().is_some_and(|w| w.handle.is_finished());
        if !finished {
            return;
        }
        if let Some(worker) = self.worker.take() {
            if worker.handle.join().is_err() {
                log::error!("capture loop panicked");
            }
            release(&mut lock(&worker.device));
            self.state = PipelineState::Idle;
            log::warn!("gesture pipeline stopped on its own");
        }
    }
}

impl Drop for GesturePipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CaptureLoop — runs on the capture thread
// ════════════════════════════════════════════════════════════════════════════

struct CaptureLoop {
    device:         DeviceSlot,
    detector:       Box<dyn LandmarkDetector>,
    classifier:     SwipeClassifier,
    landmark_index: usize,
    mirror:         bool,
    stop:           Arc<AtomicBool>,
    events:         Sender<GestureEvent>,
}

/// Releases the camera however the loop ends, then signals `done`.
struct ExitGuard {
    device: DeviceSlot,
    _done:  Sender<()>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        release(&mut lock(&self.device));
    }
}

impl CaptureLoop {
    fn run(mut self, done: Sender<()>) {
        let _guard = ExitGuard { device: Arc::clone(&self.device), _done: done };

        while !self.stop.load(Ordering::Acquire) {
            let read = {
                let mut slot = lock(&self.device);
                match slot.as_mut() {
                    Some(dev) => dev.read_frame(),
                    None => break,
                }
            };

            let mut frame = match read {
                Ok(f) => f,
                Err(e) => {
                    log::trace!("frame skipped: {}", e);
                    thread::yield_now();
                    continue;
                }
            };

            if self.mirror {
                frame.mirror();
            }

            let hands = match self.detector.detect(&frame) {
                Ok(h) => h,
                Err(e) => {
                    log::error!("{}; capture loop exiting", e);
                    break;
                }
            };

            let Some(tip) = hands.first().and_then(|h| h.landmark(self.landmark_index)) else {
                continue;
            };

            if let Some(event) = self.classifier.observe(frame.to_pixels(tip), frame.captured_at) {
                if self.stop.load(Ordering::Acquire) {
                    break;
                }
                log::debug!("swipe {}", event.direction.name());
                if self.events.send(event).is_err() {
                    break;
                }
            }
        }
    }
}

fn lock(slot: &DeviceSlot) -> MutexGuard<'_, Option<Box<dyn CameraDevice>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Take the device out of its slot and release it.  Empty slot: no-op.
fn release(slot: &mut Option<Box<dyn CameraDevice>>) {
    if let Some(mut device) = slot.take() {
        device.release();
        log::debug!("camera released");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
