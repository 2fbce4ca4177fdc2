/// Convenience result type used across snapstrip.
pub type BoothResult<T> = Result<T, BoothError>;

/// Top-level error taxonomy used by the wizard, capture, and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum BoothError {
    /// The user (or platform) refused access to the camera.
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),

    /// No usable camera device was found.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// A step needed exactly three photos and got a different count.
    #[error("incomplete selection: {0}")]
    IncompleteSelection(String),

    /// An optional platform capability (such as sharing) is missing.
    #[error("unsupported capability: {0}")]
    UnsupportedCapability(String),

    /// Rasterizing the final strip failed.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid user-provided data or an out-of-order wizard event.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid configuration file contents.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// How an error must be surfaced to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Halts the current screen; no automatic retry.
    Fatal,
    /// Blocks the forward transition until the user corrects the input.
    Recoverable,
    /// Reported without blocking; the user may retry the action.
    Notice,
}

impl BoothError {
    /// Build a [`BoothError::PermissionDenied`] value.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Build a [`BoothError::DeviceUnavailable`] value.
    pub fn device_unavailable(msg: impl Into<String>) -> Self {
        Self::DeviceUnavailable(msg.into())
    }

    /// Build a [`BoothError::IncompleteSelection`] value.
    pub fn incomplete(msg: impl Into<String>) -> Self {
        Self::IncompleteSelection(msg.into())
    }

    /// Build a [`BoothError::UnsupportedCapability`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedCapability(msg.into())
    }

    /// Build a [`BoothError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`BoothError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BoothError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Propagation policy for this error.
    pub fn severity(&self) -> Severity {
        match self {
            Self::PermissionDenied(_) | Self::DeviceUnavailable(_) => Severity::Fatal,
            Self::IncompleteSelection(_) | Self::Validation(_) | Self::Config(_) => {
                Severity::Recoverable
            }
            Self::UnsupportedCapability(_) | Self::Render(_) | Self::Other(_) => Severity::Notice,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
