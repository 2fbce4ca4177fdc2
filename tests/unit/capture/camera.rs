use std::cell::Cell;
use std::rc::Rc;

use super::*;

struct CountingCamera {
    stops: Rc<Cell<usize>>,
}

struct CountingStream {
    stops: Rc<Cell<usize>>,
}

impl CameraDevice for CountingCamera {
    fn name(&self) -> &str {
        "counting"
    }

    fn open(&mut self, _c: &StreamConstraints) -> BoothResult<Box<dyn CameraStream>> {
        Ok(Box::new(CountingStream {
            stops: self.stops.clone(),
        }))
    }
}

impl CameraStream for CountingStream {
    fn grab_frame(&mut self) -> BoothResult<Photo> {
        Photo::solid(2, 2, [1, 2, 3, 255])
    }

    fn stop(self: Box<Self>) {
        self.stops.set(self.stops.get() + 1);
    }
}

#[test]
fn default_constraints_are_front_facing_video_only() {
    let c = StreamConstraints::default();
    assert_eq!(c.facing, Facing::User);
    assert!(c.video);
    assert!(!c.audio);
}

#[test]
fn guard_releases_once_on_explicit_release_and_drop() {
    let stops = Rc::new(Cell::new(0));
    let mut cam = CountingCamera {
        stops: stops.clone(),
    };
    let mut guard = StreamGuard::acquire(&mut cam, &StreamConstraints::default()).unwrap();
    assert!(guard.grab_frame().is_ok());

    assert!(guard.release());
    assert!(!guard.release());
    assert!(guard.grab_frame().is_err());
    drop(guard);
    assert_eq!(stops.get(), 1);
}

#[test]
fn guard_releases_on_drop_alone() {
    let stops = Rc::new(Cell::new(0));
    let mut cam = CountingCamera {
        stops: stops.clone(),
    };
    {
        let _guard = StreamGuard::acquire(&mut cam, &StreamConstraints::default()).unwrap();
    }
    assert_eq!(stops.get(), 1);
}

#[test]
fn audio_only_constraints_are_rejected() {
    let mut cam = TestPatternCamera::default();
    let c = StreamConstraints {
        video: false,
        ..StreamConstraints::default()
    };
    assert!(StreamGuard::acquire(&mut cam, &c).is_err());
}

#[test]
fn missing_frame_dir_is_device_unavailable() {
    let mut cam = FrameDirCamera::new("target/no-such-camera-dir");
    let err = StreamGuard::acquire(&mut cam, &StreamConstraints::default()).unwrap_err();
    assert!(matches!(err, BoothError::DeviceUnavailable(_)));
}

#[test]
fn frame_dir_replays_images_in_name_order() {
    let dir = PathBuf::from("target").join("unit_frame_dir_camera");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let red = Photo::solid(3, 2, [255, 0, 0, 255]).unwrap();
    let blue = Photo::solid(3, 2, [0, 0, 255, 255]).unwrap();
    std::fs::write(dir.join("b.png"), blue.encode_png().unwrap()).unwrap();
    std::fs::write(dir.join("a.png"), red.encode_png().unwrap()).unwrap();
    std::fs::write(dir.join("notes.txt"), b"ignored").unwrap();

    let mut cam = FrameDirCamera::new(&dir);
    let mut guard = StreamGuard::acquire(&mut cam, &StreamConstraints::default()).unwrap();
    assert_eq!(guard.grab_frame().unwrap(), red);
    assert_eq!(guard.grab_frame().unwrap(), blue);
    assert_eq!(guard.grab_frame().unwrap(), red);
}

#[test]
fn empty_frame_dir_is_device_unavailable() {
    let dir = PathBuf::from("target").join("unit_empty_frame_dir");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let mut cam = FrameDirCamera::new(&dir);
    assert!(matches!(
        cam.open(&StreamConstraints::default()),
        Err(BoothError::DeviceUnavailable(_))
    ));
}

#[test]
fn test_pattern_keeps_native_resolution() {
    let mut cam = TestPatternCamera::new(32, 24);
    let mut stream = cam.open(&StreamConstraints::default()).unwrap();
    let a = stream.grab_frame().unwrap();
    let b = stream.grab_frame().unwrap();
    assert_eq!((a.width(), a.height()), (32, 24));
    assert_ne!(a.pixel(0, 0), b.pixel(0, 0));
    stream.stop();
}
