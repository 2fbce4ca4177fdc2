use std::time::Duration;

use crate::capture::camera::{CameraDevice, StreamConstraints, StreamGuard};
use crate::capture::clock::{Clock, TimerId, TimerQueue};
use crate::foundation::config::CaptureTiming;
use crate::foundation::core::Photo;
use crate::foundation::error::BoothResult;
use crate::session::wizard::PHOTOS_PER_STRIP;

/// Something the capture screen should show, reported in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureEvent {
    /// The countdown now reads `value`.
    Countdown {
        /// Displayed number.
        value: u8,
    },
    /// The curtain slid in to mask rasterization.
    CurtainShown,
    /// The curtain slid away.
    CurtainHidden,
    /// A still was appended.
    PhotoTaken {
        /// 0-based position on the strip.
        index: usize,
        /// Native width of the still.
        width: u32,
        /// Native height of the still.
        height: u32,
    },
    /// Three stills are in and the stream is released.
    Completed,
}

/// Observable state of the capture screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaptureState {
    /// Countdown value on screen, if a countdown is running.
    pub countdown: Option<u8>,
    /// Whether the curtain covers the frame.
    pub curtain_visible: bool,
    /// Stills taken so far.
    pub photos_taken: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Timer {
    Tick,
    CurtainDone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Counting,
    Curtain,
    Done,
    Abandoned,
}

/// One capture screen lifetime: three countdown/curtain/rasterize cycles over an
/// exclusively held camera stream.
///
/// Each countdown tick and the curtain are one-shot timers on a single-threaded queue;
/// at most one timer is pending at a time, so only one cycle can be active. The stream is
/// released when the third still is taken, on [`CaptureSession::abandon`], or on drop.
pub struct CaptureSession {
    timing: CaptureTiming,
    stream: StreamGuard,
    timers: TimerQueue<Timer>,
    pending: Option<TimerId>,
    phase: Phase,
    state: CaptureState,
    photos: Vec<Photo>,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("pending_timers", &self.timers.len())
            .field("stream", &self.stream)
            .finish()
    }
}

impl CaptureSession {
    /// Acquire the camera. Failure is fatal for the screen and is not retried.
    pub fn open(camera: &mut dyn CameraDevice, timing: CaptureTiming) -> BoothResult<Self> {
        let stream = StreamGuard::acquire(camera, &StreamConstraints::default())?;
        Ok(Self {
            timing,
            stream,
            timers: TimerQueue::default(),
            pending: None,
            phase: Phase::Idle,
            state: CaptureState::default(),
            photos: Vec::new(),
        })
    }

    /// Current on-screen state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Stills taken so far, in order.
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Whether the camera stream is still held.
    pub fn is_streaming(&self) -> bool {
        self.stream.is_live()
    }

    /// Whether all three stills are in.
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Start a countdown if none is pending and stills are still missing.
    ///
    /// Returns `false` (and does nothing) otherwise.
    pub fn start_cycle(
        &mut self,
        now: Duration,
        observer: &mut dyn FnMut(Duration, &CaptureEvent),
    ) -> bool {
        if self.phase != Phase::Idle || self.photos.len() >= PHOTOS_PER_STRIP {
            return false;
        }
        self.phase = Phase::Counting;
        self.set_countdown(self.timing.countdown_from, now, observer);
        true
    }

    /// Run the next due timer, waiting on `clock` until it fires.
    ///
    /// Returns `Ok(false)` once nothing is pending.
    pub fn step(
        &mut self,
        clock: &mut dyn Clock,
        observer: &mut dyn FnMut(Duration, &CaptureEvent),
    ) -> BoothResult<bool> {
        let Some((deadline, id, timer)) = self.timers.pop() else {
            return Ok(false);
        };
        if self.pending != Some(id) {
            tracing::trace!(?timer, "ignoring stale timer");
            return Ok(true);
        }
        self.pending = None;
        clock.wait_until(deadline);
        let now = clock.now();

        match timer {
            Timer::Tick => {
                let value = self.state.countdown.unwrap_or(0).saturating_sub(1);
                self.set_countdown(value, now, observer);
            }
            Timer::CurtainDone => self.finish_cycle(now, observer)?,
        }
        Ok(true)
    }

    /// Drive cycles until three stills are taken, then hand them over.
    #[tracing::instrument(skip_all)]
    pub fn run(
        mut self,
        clock: &mut dyn Clock,
        observer: &mut dyn FnMut(Duration, &CaptureEvent),
    ) -> BoothResult<Vec<Photo>> {
        self.start_cycle(clock.now(), observer);
        while self.step(clock, observer)? {}
        Ok(std::mem::take(&mut self.photos))
    }

    /// Leave the screen early: clear pending timers and release the stream.
    pub fn abandon(&mut self) {
        if matches!(self.phase, Phase::Done | Phase::Abandoned) {
            return;
        }
        let cleared = self.timers.clear();
        self.pending = None;
        self.phase = Phase::Abandoned;
        self.state.countdown = None;
        self.state.curtain_visible = false;
        tracing::info!(cleared, taken = self.photos.len(), "capture abandoned");
        self.stream.release();
    }

    fn set_countdown(
        &mut self,
        value: u8,
        now: Duration,
        observer: &mut dyn FnMut(Duration, &CaptureEvent),
    ) {
        self.state.countdown = Some(value);
        observer(now, &CaptureEvent::Countdown { value });
        if value > 0 {
            self.schedule(now + self.timing.tick(), Timer::Tick);
        } else {
            self.phase = Phase::Curtain;
            self.state.curtain_visible = true;
            observer(now, &CaptureEvent::CurtainShown);
            self.schedule(now + self.timing.curtain(), Timer::CurtainDone);
        }
    }

    fn finish_cycle(
        &mut self,
        now: Duration,
        observer: &mut dyn FnMut(Duration, &CaptureEvent),
    ) -> BoothResult<()> {
        let photo = match self.stream.grab_frame() {
            Ok(photo) => photo,
            Err(err) => {
                tracing::error!(error = %err, index = self.photos.len(), "frame grab failed");
                self.abandon();
                return Err(err);
            }
        };
        let index = self.photos.len();
        tracing::debug!(index, width = photo.width(), height = photo.height(), "still captured");
        observer(
            now,
            &CaptureEvent::PhotoTaken {
                index,
                width: photo.width(),
                height: photo.height(),
            },
        );
        self.photos.push(photo);
        self.state.photos_taken = self.photos.len();

        self.state.curtain_visible = false;
        self.state.countdown = None;
        observer(now, &CaptureEvent::CurtainHidden);

        if self.photos.len() >= PHOTOS_PER_STRIP {
            self.stream.release();
            self.phase = Phase::Done;
            observer(now, &CaptureEvent::Completed);
            return Ok(());
        }

        self.phase = Phase::Idle;
        self.start_cycle(now, observer);
        Ok(())
    }

    fn schedule(&mut self, deadline: Duration, timer: Timer) {
        self.pending = Some(self.timers.schedule(deadline, timer));
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.abandon();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/controller.rs"]
mod tests;
