use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::{Photo, decode_photo};
use crate::foundation::error::{BoothError, BoothResult};

/// Which way the requested camera should face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    /// Towards the user (selfie camera).
    #[default]
    User,
    /// Away from the user.
    Environment,
}

/// What the booth asks of a camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Preferred facing.
    pub facing: Facing,
    /// Whether video is requested.
    pub video: bool,
    /// Whether audio is requested.
    pub audio: bool,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            facing: Facing::User,
            video: true,
            audio: false,
        }
    }
}

/// A camera that can hand out an exclusive live stream.
pub trait CameraDevice {
    /// Human-readable device name, for logs.
    fn name(&self) -> &str;

    /// Acquire the stream.
    ///
    /// Implementations report a refused grant as [`BoothError::PermissionDenied`] and a
    /// missing device as [`BoothError::DeviceUnavailable`].
    fn open(&mut self, constraints: &StreamConstraints) -> BoothResult<Box<dyn CameraStream>>;
}

/// A live, exclusively owned camera stream.
pub trait CameraStream {
    /// Rasterize the current frame at the stream's native resolution.
    fn grab_frame(&mut self) -> BoothResult<Photo>;

    /// Release the device. Consumes the stream, so a stopped stream cannot be reused.
    fn stop(self: Box<Self>);
}

/// Scoped owner of a [`CameraStream`].
///
/// The stream is stopped exactly once: on [`StreamGuard::release`] or, failing that, on
/// drop.
pub struct StreamGuard {
    device: String,
    stream: Option<Box<dyn CameraStream>>,
}

impl std::fmt::Debug for StreamGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamGuard")
            .field("device", &self.device)
            .field("live", &self.is_live())
            .finish()
    }
}

impl StreamGuard {
    /// Acquire a stream from `camera`.
    #[tracing::instrument(skip(camera), fields(device = camera.name()))]
    pub fn acquire(
        camera: &mut dyn CameraDevice,
        constraints: &StreamConstraints,
    ) -> BoothResult<Self> {
        if !constraints.video {
            return Err(BoothError::validation("camera constraints must request video"));
        }
        let stream = camera.open(constraints).inspect_err(|e| {
            tracing::error!(error = %e, "camera acquisition failed");
        })?;
        tracing::info!("camera stream acquired");
        Ok(Self {
            device: camera.name().to_string(),
            stream: Some(stream),
        })
    }

    /// Whether the stream is still held.
    pub fn is_live(&self) -> bool {
        self.stream.is_some()
    }

    /// Rasterize the current frame.
    pub fn grab_frame(&mut self) -> BoothResult<Photo> {
        let stream = self.stream.as_mut().ok_or_else(|| {
            BoothError::validation("camera stream was released; acquire a new one")
        })?;
        stream.grab_frame()
    }

    /// Stop the stream. Returns `false` if it was already released.
    pub fn release(&mut self) -> bool {
        match self.stream.take() {
            Some(stream) => {
                stream.stop();
                tracing::info!(device = %self.device, "camera stream released");
                true
            }
            None => false,
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// A camera that replays still images from a directory in file-name order.
///
/// Each grab returns the next file, wrapping around at the end.
#[derive(Clone, Debug)]
pub struct FrameDirCamera {
    name: String,
    dir: PathBuf,
}

impl FrameDirCamera {
    /// Camera backed by `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            name: format!("frames:{}", dir.display()),
            dir,
        }
    }
}

impl CameraDevice for FrameDirCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self, _constraints: &StreamConstraints) -> BoothResult<Box<dyn CameraStream>> {
        let frames = list_frame_files(&self.dir)?;
        Ok(Box::new(FrameDirStream { frames, next: 0 }))
    }
}

struct FrameDirStream {
    frames: Vec<PathBuf>,
    next: usize,
}

impl CameraStream for FrameDirStream {
    fn grab_frame(&mut self) -> BoothResult<Photo> {
        let path = &self.frames[self.next % self.frames.len()];
        self.next += 1;
        let bytes =
            std::fs::read(path).with_context(|| format!("read frame '{}'", path.display()))?;
        decode_photo(&bytes)
    }

    fn stop(self: Box<Self>) {}
}

const FRAME_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "gif", "webp", "tiff"];

fn list_frame_files(dir: &Path) -> BoothResult<Vec<PathBuf>> {
    let rd = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(BoothError::permission_denied(format!(
                "cannot read '{}': {e}",
                dir.display()
            )));
        }
        Err(e) => {
            return Err(BoothError::device_unavailable(format!(
                "no camera at '{}': {e}",
                dir.display()
            )));
        }
    };

    let mut frames = Vec::new();
    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        if FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            frames.push(path);
        }
    }
    if frames.is_empty() {
        return Err(BoothError::device_unavailable(format!(
            "no image frames in '{}'",
            dir.display()
        )));
    }
    frames.sort();
    Ok(frames)
}

/// A synthetic camera producing solid frames that change color on every grab.
#[derive(Clone, Debug)]
pub struct TestPatternCamera {
    width: u32,
    height: u32,
}

impl Default for TestPatternCamera {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl TestPatternCamera {
    /// Pattern camera with the given native resolution.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl CameraDevice for TestPatternCamera {
    fn name(&self) -> &str {
        "test-pattern"
    }

    fn open(&mut self, _constraints: &StreamConstraints) -> BoothResult<Box<dyn CameraStream>> {
        if self.width == 0 || self.height == 0 {
            return Err(BoothError::device_unavailable(
                "test pattern has zero resolution",
            ));
        }
        Ok(Box::new(TestPatternStream {
            width: self.width,
            height: self.height,
            grabs: 0,
        }))
    }
}

struct TestPatternStream {
    width: u32,
    height: u32,
    grabs: usize,
}

const PATTERN_COLORS: [[u8; 4]; 3] = [
    [0xE8, 0x6A, 0x5C, 0xFF],
    [0x5C, 0xB8, 0xE8, 0xFF],
    [0x8C, 0xE8, 0x5C, 0xFF],
];

impl CameraStream for TestPatternStream {
    fn grab_frame(&mut self) -> BoothResult<Photo> {
        let color = PATTERN_COLORS[self.grabs % PATTERN_COLORS.len()];
        self.grabs += 1;
        Photo::solid(self.width, self.height, color)
    }

    fn stop(self: Box<Self>) {}
}

#[cfg(test)]
#[path = "../../tests/unit/capture/camera.rs"]
mod tests;
