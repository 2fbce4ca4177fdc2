use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::capture::camera::CameraStream;
use crate::capture::clock::ManualClock;
use crate::foundation::error::BoothError;

#[derive(Default)]
struct StreamCounts {
    opens: Cell<usize>,
    grabs: Cell<usize>,
    stops: Cell<usize>,
    fail_grabs: Cell<bool>,
}

struct FakeCamera {
    counts: Rc<StreamCounts>,
    deny: bool,
}

struct FakeStream {
    counts: Rc<StreamCounts>,
}

impl CameraDevice for FakeCamera {
    fn name(&self) -> &str {
        "fake"
    }

    fn open(&mut self, _c: &StreamConstraints) -> BoothResult<Box<dyn CameraStream>> {
        if self.deny {
            return Err(BoothError::permission_denied("user said no"));
        }
        self.counts.opens.set(self.counts.opens.get() + 1);
        Ok(Box::new(FakeStream {
            counts: self.counts.clone(),
        }))
    }
}

impl CameraStream for FakeStream {
    fn grab_frame(&mut self) -> BoothResult<Photo> {
        if self.counts.fail_grabs.get() {
            return Err(BoothError::render("sensor glitch"));
        }
        let n = self.counts.grabs.get();
        self.counts.grabs.set(n + 1);
        Photo::solid(8 + n as u32, 6, [n as u8, 0, 0, 255])
    }

    fn stop(self: Box<Self>) {
        self.counts.stops.set(self.counts.stops.get() + 1);
    }
}

fn camera() -> (FakeCamera, Rc<StreamCounts>) {
    let counts = Rc::new(StreamCounts::default());
    (
        FakeCamera {
            counts: counts.clone(),
            deny: false,
        },
        counts,
    )
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn one_cycle_counts_down_then_curtain_then_one_photo() {
    let (mut cam, counts) = camera();
    let mut session = CaptureSession::open(&mut cam, CaptureTiming::default()).unwrap();
    let mut clock = ManualClock::new();
    let mut log = Vec::new();
    let mut observer = |t: Duration, e: &CaptureEvent| log.push((t, e.clone()));

    assert!(session.start_cycle(clock.now(), &mut observer));
    while session.photos().is_empty() {
        assert!(session.step(&mut clock, &mut observer).unwrap());
    }

    let first_cycle: Vec<_> = log
        .iter()
        .take_while(|(_, e)| !matches!(e, CaptureEvent::CurtainHidden))
        .cloned()
        .collect();
    assert_eq!(
        first_cycle,
        vec![
            (ms(0), CaptureEvent::Countdown { value: 3 }),
            (ms(1000), CaptureEvent::Countdown { value: 2 }),
            (ms(2000), CaptureEvent::Countdown { value: 1 }),
            (ms(3000), CaptureEvent::Countdown { value: 0 }),
            (ms(3000), CaptureEvent::CurtainShown),
            (
                ms(3800),
                CaptureEvent::PhotoTaken {
                    index: 0,
                    width: 8,
                    height: 6
                }
            ),
        ]
    );
    assert_eq!(counts.grabs.get(), 1);
    assert_eq!(session.photos().len(), 1);
    // Next countdown starts right away.
    assert_eq!(session.state().countdown, Some(3));
}

#[test]
fn run_takes_three_photos_and_releases_once() {
    let (mut cam, counts) = camera();
    let session = CaptureSession::open(&mut cam, CaptureTiming::default()).unwrap();
    let mut clock = ManualClock::new();
    let mut events = Vec::new();

    let photos = session
        .run(&mut clock, &mut |_: Duration, e: &CaptureEvent| {
            events.push(e.clone())
        })
        .unwrap();

    assert_eq!(photos.len(), 3);
    assert_eq!(photos[0].width(), 8);
    assert_eq!(photos[2].width(), 10);
    assert_eq!(counts.grabs.get(), 3);
    assert_eq!(counts.stops.get(), 1);
    assert_eq!(events.last(), Some(&CaptureEvent::Completed));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, CaptureEvent::PhotoTaken { .. }))
            .count(),
        3
    );
    assert_eq!(clock.now(), ms(3 * 3800));
}

#[test]
fn no_second_countdown_while_one_is_pending() {
    let (mut cam, _counts) = camera();
    let mut session = CaptureSession::open(&mut cam, CaptureTiming::default()).unwrap();
    let mut clock = ManualClock::new();
    let mut ticks = 0;
    let mut observer = |_: Duration, e: &CaptureEvent| {
        if matches!(e, CaptureEvent::Countdown { .. }) {
            ticks += 1;
        }
    };

    assert!(session.start_cycle(clock.now(), &mut observer));
    assert!(!session.start_cycle(clock.now(), &mut observer));
    session.step(&mut clock, &mut observer).unwrap();
    assert!(!session.start_cycle(clock.now(), &mut observer));
    assert_eq!(ticks, 2);
}

#[test]
fn completed_session_never_rasterizes_again() {
    let (mut cam, counts) = camera();
    let mut session = CaptureSession::open(&mut cam, CaptureTiming::default()).unwrap();
    let mut clock = ManualClock::new();
    let mut observer = |_: Duration, _: &CaptureEvent| {};

    session.start_cycle(clock.now(), &mut observer);
    while session.step(&mut clock, &mut observer).unwrap() {}
    assert!(session.is_complete());
    assert!(!session.is_streaming());

    assert!(!session.start_cycle(clock.now(), &mut observer));
    assert!(!session.step(&mut clock, &mut observer).unwrap());
    assert_eq!(counts.grabs.get(), 3);
    drop(session);
    assert_eq!(counts.stops.get(), 1);
}

#[test]
fn abandoning_mid_countdown_releases_once_and_clears_timers() {
    let (mut cam, counts) = camera();
    let mut session = CaptureSession::open(&mut cam, CaptureTiming::default()).unwrap();
    let mut clock = ManualClock::new();
    let mut observer = |_: Duration, _: &CaptureEvent| {};

    session.start_cycle(clock.now(), &mut observer);
    session.step(&mut clock, &mut observer).unwrap();
    session.abandon();

    assert!(!session.is_streaming());
    assert_eq!(session.state().countdown, None);
    assert!(!session.step(&mut clock, &mut observer).unwrap());
    assert!(!session.start_cycle(clock.now(), &mut observer));

    session.abandon();
    drop(session);
    assert_eq!(counts.stops.get(), 1);
    assert_eq!(counts.grabs.get(), 0);
}

#[test]
fn dropping_the_screen_releases_the_stream() {
    let (mut cam, counts) = camera();
    {
        let mut session = CaptureSession::open(&mut cam, CaptureTiming::default()).unwrap();
        session.start_cycle(Duration::ZERO, &mut |_: Duration, _: &CaptureEvent| {});
    }
    assert_eq!(counts.opens.get(), 1);
    assert_eq!(counts.stops.get(), 1);
}

#[test]
fn permission_denied_is_fatal() {
    let (mut cam, counts) = camera();
    cam.deny = true;
    let err = CaptureSession::open(&mut cam, CaptureTiming::default()).unwrap_err();
    assert!(matches!(err, BoothError::PermissionDenied(_)));
    assert_eq!(err.severity(), crate::Severity::Fatal);
    assert_eq!(counts.stops.get(), 0);
}

#[test]
fn curtain_state_is_visible_only_between_zero_and_capture() {
    let (mut cam, _counts) = camera();
    let timing = CaptureTiming {
        countdown_from: 1,
        tick_ms: 10,
        curtain_ms: 5,
    };
    let mut session = CaptureSession::open(&mut cam, timing).unwrap();
    let mut clock = ManualClock::new();
    let mut observer = |_: Duration, _: &CaptureEvent| {};

    session.start_cycle(clock.now(), &mut observer);
    assert!(!session.state().curtain_visible);
    session.step(&mut clock, &mut observer).unwrap();
    assert_eq!(session.state().countdown, Some(0));
    assert!(session.state().curtain_visible);
    session.step(&mut clock, &mut observer).unwrap();
    assert!(!session.state().curtain_visible);
    assert_eq!(session.state().photos_taken, 1);
    assert_eq!(clock.now(), ms(15));
}

#[test]
fn failed_grab_ends_the_run_and_releases_the_stream() {
    let (mut cam, counts) = camera();
    counts.fail_grabs.set(true);
    let timing = CaptureTiming {
        countdown_from: 0,
        tick_ms: 10,
        curtain_ms: 5,
    };
    let mut session = CaptureSession::open(&mut cam, timing).unwrap();
    let mut clock = ManualClock::new();
    let mut observer = |_: Duration, _: &CaptureEvent| {};

    assert!(session.start_cycle(clock.now(), &mut observer));
    assert!(session.state().curtain_visible);
    let err = session.step(&mut clock, &mut observer).unwrap_err();
    assert!(err.to_string().contains("sensor glitch"));

    assert!(!session.is_streaming());
    assert!(!session.state().curtain_visible);
    assert_eq!(session.state().countdown, None);
    assert!(!session.start_cycle(clock.now(), &mut observer));
    assert!(!session.step(&mut clock, &mut observer).unwrap());
    assert!(!session.is_complete());

    drop(session);
    assert_eq!(counts.stops.get(), 1);
}
