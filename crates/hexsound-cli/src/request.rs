//! Conversion requests.

use std::path::{Path, PathBuf};

use hexsound_backend_ffmpeg::raw_path_for;
use hexsound_encoder::ArrayFormat;

/// File name of the generated artifact.
pub const OUTPUT_FILE_NAME: &str = "sound.h";

/// Everything a single conversion needs, owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    /// Audio source to decode.
    pub input: PathBuf,
    /// Destination directory; `None` writes next to the source.
    pub dest_dir: Option<PathBuf>,
    /// Array rendering options.
    pub format: ArrayFormat,
    /// Keep the `.raw` intermediate after a successful conversion.
    pub keep_raw: bool,
}

impl ConversionRequest {
    /// Creates a request with default options.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            dest_dir: None,
            format: ArrayFormat::default(),
            keep_raw: true,
        }
    }

    /// Sets the destination directory.
    pub fn dest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dest_dir = Some(dir.into());
        self
    }

    /// Sets the array format.
    pub fn format(mut self, format: ArrayFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets whether the raw intermediate is kept.
    pub fn keep_raw(mut self, keep: bool) -> Self {
        self.keep_raw = keep;
        self
    }

    /// Path of the raw intermediate.
    pub fn raw_path(&self) -> PathBuf {
        raw_path_for(&self.input)
    }

    /// Path the artifact will be written to.
    pub fn output_path(&self) -> PathBuf {
        match self.dest_dir {
            Some(ref dir) => dir.join(OUTPUT_FILE_NAME),
            None => self.input.with_file_name(OUTPUT_FILE_NAME),
        }
    }

    /// Directory the artifact lands in.
    pub fn output_dir(&self) -> PathBuf {
        self.output_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}
