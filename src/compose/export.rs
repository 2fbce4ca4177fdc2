use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context as _;

use crate::foundation::core::encode_png_rgba8;
use crate::foundation::error::{BoothError, BoothResult};

/// File name used for both download and share.
pub const ARTIFACT_FILE_NAME: &str = "photostrip_high_quality.png";

/// Environment variable carrying the share title to a [`CommandShareTarget`] program.
pub const SHARE_TITLE_ENV: &str = "SNAPSTRIP_SHARE_TITLE";

/// The flattened strip, ready to be saved or shared.
///
/// Pixels are straight-alpha RGBA8; corners outside the rounded strip are transparent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed, row-major RGBA8.
    pub rgba8: Vec<u8>,
}

impl ExportArtifact {
    /// Fixed file name of the artifact.
    pub fn file_name(&self) -> &'static str {
        ARTIFACT_FILE_NAME
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.rgba8.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> BoothResult<Vec<u8>> {
        encode_png_rgba8(self.width, self.height, &self.rgba8)
    }

    /// Write the PNG as [`ARTIFACT_FILE_NAME`] inside `dir`, creating `dir` if needed.
    ///
    /// An existing file of the same name is replaced.
    #[tracing::instrument(skip(self), fields(width = self.width, height = self.height))]
    pub fn save_to_dir(&self, dir: &Path) -> BoothResult<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
        let path = dir.join(ARTIFACT_FILE_NAME);
        let png = self.encode_png()?;
        std::fs::write(&path, png).with_context(|| format!("write '{}'", path.display()))?;
        tracing::info!(path = %path.display(), "photostrip downloaded");
        Ok(path)
    }
}

/// Somewhere a finished strip can be shared to.
pub trait ShareTarget {
    /// Human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Whether the target can accept a share right now.
    fn is_available(&self) -> bool;

    /// Hand one named PNG file and a title to the target.
    fn share(&self, file_name: &str, png: &[u8], title: &str) -> BoothResult<()>;
}

/// Share `artifact` through `target`.
///
/// A missing or unavailable target yields [`BoothError::UnsupportedCapability`]; the
/// artifact itself is untouched, so the caller can still download it.
#[tracing::instrument(skip(artifact, target))]
pub fn share(
    artifact: &ExportArtifact,
    target: Option<&dyn ShareTarget>,
    title: &str,
) -> BoothResult<()> {
    let Some(target) = target.filter(|t| t.is_available()) else {
        let err = BoothError::unsupported("sharing is not supported on this device");
        tracing::warn!(error = %err, "share skipped");
        return Err(err);
    };
    let png = artifact.encode_png()?;
    target.share(artifact.file_name(), &png, title)?;
    tracing::info!(target = target.name(), "photostrip shared");
    Ok(())
}

/// Shares by copying the file into an outbox directory, next to a `.txt` holding the title.
#[derive(Clone, Debug)]
pub struct DirectoryShareTarget {
    dir: PathBuf,
}

impl DirectoryShareTarget {
    /// Outbox rooted at `dir`; the directory is created on first share.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Outbox directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ShareTarget for DirectoryShareTarget {
    fn name(&self) -> &str {
        "directory"
    }

    fn is_available(&self) -> bool {
        !self.dir.exists() || self.dir.is_dir()
    }

    fn share(&self, file_name: &str, png: &[u8], title: &str) -> BoothResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create share outbox '{}'", self.dir.display()))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, png).with_context(|| format!("write '{}'", path.display()))?;
        let title_path = path.with_extension("txt");
        std::fs::write(&title_path, title)
            .with_context(|| format!("write '{}'", title_path.display()))?;
        Ok(())
    }
}

/// Shares by running an external program with the PNG path as its last argument.
///
/// The title is passed through [`SHARE_TITLE_ENV`].
#[derive(Clone, Debug)]
pub struct CommandShareTarget {
    program: String,
    args: Vec<String>,
    check_arg: String,
    staging_dir: PathBuf,
}

impl CommandShareTarget {
    /// Target running `program`; availability is checked with `program --version`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            check_arg: "--version".to_string(),
            staging_dir: std::env::temp_dir().join("snapstrip-share"),
        }
    }

    /// Extra arguments placed before the file path.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Argument used for the availability check.
    pub fn with_check_arg(mut self, arg: impl Into<String>) -> Self {
        self.check_arg = arg.into();
        self
    }

    /// Where the PNG is written before the program runs.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }
}

impl ShareTarget for CommandShareTarget {
    fn name(&self) -> &str {
        &self.program
    }

    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg(&self.check_arg)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn share(&self, file_name: &str, png: &[u8], title: &str) -> BoothResult<()> {
        std::fs::create_dir_all(&self.staging_dir)
            .with_context(|| format!("create '{}'", self.staging_dir.display()))?;
        let path = self.staging_dir.join(file_name);
        std::fs::write(&path, png).with_context(|| format!("write '{}'", path.display()))?;

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&path)
            .env(SHARE_TITLE_ENV, title)
            .stdin(Stdio::null())
            .status()
            .with_context(|| format!("spawn share program '{}'", self.program))?;
        if !status.success() {
            return Err(BoothError::unsupported(format!(
                "share program '{}' exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/export.rs"]
mod tests;
