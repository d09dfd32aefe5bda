//! Encode command implementation
//!
//! Renders an existing raw PCM file without running the decoder.

use anyhow::{Context, Result};
use colored::Colorize;
use hexsound_backend_ffmpeg::duration_secs;
use hexsound_encoder::{encode_file, ArrayFormat};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::request::OUTPUT_FILE_NAME;

/// Default artifact path for a raw file: `sound.h` in the same directory.
pub fn default_output(raw_path: &Path) -> PathBuf {
    raw_path.with_file_name(OUTPUT_FILE_NAME)
}

/// Run the encode command
///
/// # Arguments
/// * `raw_path` - Headerless 8-bit PCM file
/// * `output` - Artifact path (default: `sound.h` next to the raw file)
/// * `format` - Array rendering options
pub fn run(raw_path: &Path, output: Option<&Path>, format: &ArrayFormat) -> Result<ExitCode> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(raw_path));

    let artifact = encode_file(raw_path, &output, format)
        .with_context(|| format!("Failed to encode {}", raw_path.display()))?;

    println!(
        "{} Wrote {} samples ({:.2} s) to {}",
        "SUCCESS".green().bold(),
        artifact.sample_count,
        duration_secs(artifact.sample_count),
        artifact.output_path.display()
    );

    Ok(ExitCode::SUCCESS)
}
