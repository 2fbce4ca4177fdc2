//! Snapstrip is a photo-booth engine that turns three stills into a decorated photostrip.
//!
//! A session moves through five screens, each owned by the [`Wizard`]:
//!
//! - Start
//! - Capture three photos from a [`CameraDevice`] (countdown + curtain per shot), or pick
//!   them with an [`UploadSelection`]
//! - Add an optional note
//! - Customize colors and stickers with a [`Customizer`]
//! - Render the strip with a [`Compositor`], then download or [`share`] it
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod capture;
pub(crate) mod compose;
pub(crate) mod customize;
pub(crate) mod session;
pub(crate) mod upload;

pub use crate::foundation::color::HexColor;
pub use crate::foundation::config::{BoothConfig, CaptureTiming, ExportConfig};
pub use crate::foundation::core::{Affine, Photo, Point, Rect, Size, Vec2, decode_photo};
pub use crate::foundation::error::{BoothError, BoothResult, Severity};

pub use crate::capture::camera::{
    CameraDevice, CameraStream, Facing, FrameDirCamera, StreamConstraints, StreamGuard,
    TestPatternCamera,
};
pub use crate::capture::clock::{Clock, ManualClock, SystemClock, TimerId};
pub use crate::capture::controller::{CaptureEvent, CaptureSession, CaptureState};
pub use crate::compose::export::{
    ARTIFACT_FILE_NAME, CommandShareTarget, DirectoryShareTarget, ExportArtifact,
    SHARE_TITLE_ENV, ShareTarget, share,
};
pub use crate::compose::layout::{
    Corner, GlyphEstimate, Layer, StripMetrics, StripPlan, TextMeasure, plan_strip,
};
pub use crate::compose::raster::{Compositor, render_strip};
pub use crate::compose::stickers::{StickerArt, StickerLibrary};
pub use crate::compose::text::{FontMeasure, load_note_fonts};
pub use crate::customize::palette::{
    BACKGROUND_COLORS, CustomizationChoice, Customizer, DEFAULT_BACKGROUND, DEFAULT_FRAME,
    FRAME_COLORS, PRESELECTED_BACKGROUND, PRESELECTED_FRAME, STICKER_IDS, StickerId,
    StickerSelection,
};
pub use crate::session::wizard::{PHOTOS_PER_STRIP, Session, Step, StepEvent, Wizard};
pub use crate::upload::selection::UploadSelection;
