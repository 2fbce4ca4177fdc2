use serde::Serialize;

use crate::customize::palette::{
    CustomizationChoice, DEFAULT_BACKGROUND, DEFAULT_FRAME, StickerSelection,
};
use crate::foundation::color::HexColor;
use crate::foundation::core::Photo;
use crate::foundation::error::{BoothError, BoothResult};

/// Number of photos on a strip.
pub const PHOTOS_PER_STRIP: usize = 3;

/// Wizard screens in their fixed order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Step {
    /// Intro screen.
    Start,
    /// Taking (or uploading) the three photos.
    Capturing,
    /// Writing the note.
    Noting,
    /// Picking colors and stickers.
    Customizing,
    /// Showing, downloading, and sharing the finished strip. Terminal.
    Final,
}

impl Step {
    /// 1-based screen number.
    pub fn number(self) -> u8 {
        match self {
            Self::Start => 1,
            Self::Capturing => 2,
            Self::Noting => 3,
            Self::Customizing => 4,
            Self::Final => 5,
        }
    }

    /// The step after this one; `None` for [`Step::Final`].
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::Capturing),
            Self::Capturing => Some(Self::Noting),
            Self::Noting => Some(Self::Customizing),
            Self::Customizing => Some(Self::Final),
            Self::Final => None,
        }
    }
}

/// Completion event emitted by the active screen.
///
/// Each variant is only accepted while the wizard sits on the matching step.
#[derive(Clone, Debug)]
pub enum StepEvent {
    /// The intro screen was dismissed.
    Started,
    /// Capture or upload finished with the given stills.
    PhotosCaptured(Vec<Photo>),
    /// The note screen was submitted (empty text is allowed).
    NoteSubmitted(String),
    /// The customization screen was submitted.
    Customized(CustomizationChoice),
}

impl StepEvent {
    fn expected_step(&self) -> Step {
        match self {
            Self::Started => Step::Start,
            Self::PhotosCaptured(_) => Step::Capturing,
            Self::NoteSubmitted(_) => Step::Noting,
            Self::Customized(_) => Step::Customizing,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::PhotosCaptured(_) => "photos_captured",
            Self::NoteSubmitted(_) => "note_submitted",
            Self::Customized(_) => "customized",
        }
    }
}

/// Data accumulated over one wizard run.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    step: Step,
    photos: Vec<Photo>,
    note: String,
    background_color: HexColor,
    frame_color: HexColor,
    stickers: StickerSelection,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            step: Step::Start,
            photos: Vec::new(),
            note: String::new(),
            background_color: DEFAULT_BACKGROUND,
            frame_color: DEFAULT_FRAME,
            stickers: StickerSelection::none(),
        }
    }
}

impl Session {
    /// Active step.
    pub fn step(&self) -> Step {
        self.step
    }

    /// Photos in capture order.
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Note text.
    pub fn note(&self) -> &str {
        &self.note
    }

    /// Strip background color.
    pub fn background_color(&self) -> HexColor {
        self.background_color
    }

    /// Frame color.
    pub fn frame_color(&self) -> HexColor {
        self.frame_color
    }

    /// Stickers placed on the strip.
    pub fn stickers(&self) -> &StickerSelection {
        &self.stickers
    }

    /// Build a finished session directly, bypassing the screens.
    ///
    /// Useful for re-rendering a strip from stored choices. Requires exactly three photos.
    pub fn finished(
        photos: Vec<Photo>,
        note: impl Into<String>,
        choice: CustomizationChoice,
    ) -> BoothResult<Self> {
        let mut wizard = Wizard::new();
        wizard.apply(StepEvent::Started)?;
        wizard.apply(StepEvent::PhotosCaptured(photos))?;
        wizard.apply(StepEvent::NoteSubmitted(note.into()))?;
        wizard.apply(StepEvent::Customized(choice))?;
        Ok(wizard.session)
    }
}

/// Owner of the [`Session`]; the only code that mutates it.
///
/// Screens read an immutable [`Wizard::snapshot`] and hand back a [`StepEvent`]; the
/// wizard validates the payload and advances exactly one step.
#[derive(Debug, Default)]
pub struct Wizard {
    session: Session,
}

impl Wizard {
    /// Fresh wizard on [`Step::Start`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Active step.
    pub fn step(&self) -> Step {
        self.session.step
    }

    /// Read-only view of the session for the active screen.
    pub fn snapshot(&self) -> &Session {
        &self.session
    }

    /// Apply a completion event and advance one step.
    ///
    /// On error the session is left exactly as it was.
    #[tracing::instrument(skip(self, event), fields(step = ?self.session.step, event = event.name()))]
    pub fn apply(&mut self, event: StepEvent) -> BoothResult<&Session> {
        let current = self.session.step;
        let Some(next) = current.next() else {
            return Err(BoothError::validation(
                "wizard is finished; reset it to start a new strip",
            ));
        };
        if event.expected_step() != current {
            return Err(BoothError::validation(format!(
                "event {} is not accepted on step {:?}",
                event.name(),
                current
            )));
        }

        match event {
            StepEvent::Started => {}
            StepEvent::PhotosCaptured(photos) => {
                if photos.len() != PHOTOS_PER_STRIP {
                    tracing::warn!(count = photos.len(), "refusing to advance without three photos");
                    return Err(BoothError::incomplete(format!(
                        "need exactly {PHOTOS_PER_STRIP} photos, got {}",
                        photos.len()
                    )));
                }
                self.session.photos = photos;
            }
            StepEvent::NoteSubmitted(note) => {
                self.session.note = note;
            }
            StepEvent::Customized(choice) => {
                self.session.background_color = choice.background_color;
                self.session.frame_color = choice.frame_color;
                self.session.stickers = choice.stickers;
            }
        }

        self.session.step = next;
        tracing::debug!(step = ?next, "wizard advanced");
        Ok(&self.session)
    }

    /// Drop all collected data and return to [`Step::Start`].
    pub fn reset(&mut self) {
        tracing::debug!("wizard reset");
        self.session = Session::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/wizard.rs"]
mod tests;
