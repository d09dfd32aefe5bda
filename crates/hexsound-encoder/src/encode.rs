//! Byte buffer to source array rendering.

use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{EncodeResult, EncoderError};
use crate::format::{ArrayFormat, ROW_WIDTH};

/// A written array artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    /// Where the artifact was written.
    pub output_path: PathBuf,
    /// Number of bytes (samples) in the array.
    pub sample_count: usize,
    /// Size of the artifact text in bytes.
    pub bytes_written: usize,
}

/// Renders `data` as a source array.
///
/// Layout:
///
/// ```text
/// const uint8_t sound_audio[] PROGMEM = {
/// 0x00,0x01,0x02,0x03,0x04,0x05,0x06,0x07,0x08,0x09,0x0A,0x0B,0x0C,0x0D,0x0E,0x0F,
/// 0x10,
/// };
/// const unsigned int sound_audio_len = 17;
/// ```
///
/// Every row holds at most [`ROW_WIDTH`] literals and ends with a newline, so
/// an empty buffer goes straight from the opening line to `};`. The output
/// depends only on `data` and `format`.
pub fn encode_bytes(data: &[u8], format: &ArrayFormat) -> String {
    let rows = data.len().div_ceil(ROW_WIDTH);
    // "0xHH," per byte, one newline per row, plus the declarations.
    let mut out = String::with_capacity(data.len() * 5 + rows + 128);

    out.push_str(&format.opening_line());
    out.push('\n');

    for row in data.chunks(ROW_WIDTH) {
        for byte in row {
            let _ = write!(out, "0x{:02X},", byte);
        }
        out.push('\n');
    }

    out.push_str("};\n");
    out.push_str(&format.length_line(data.len()));
    out.push('\n');
    out
}

/// Encodes the raw file at `raw_path` into an artifact at `out_path`.
///
/// The raw file is read in full before anything is written. The text is
/// staged in a temporary file next to `out_path` and renamed into place, so
/// `out_path` either holds the complete artifact or is left as it was.
pub fn encode_file(
    raw_path: &Path,
    out_path: &Path,
    format: &ArrayFormat,
) -> EncodeResult<EncodedArtifact> {
    format.validate()?;

    let data = std::fs::read(raw_path).map_err(|e| EncoderError::ReadInput {
        path: raw_path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(raw = %raw_path.display(), samples = data.len(), "read raw buffer");

    let text = encode_bytes(&data, format);
    write_atomic(out_path, text.as_bytes())?;

    tracing::info!(
        output = %out_path.display(),
        samples = data.len(),
        "wrote array artifact"
    );

    Ok(EncodedArtifact {
        output_path: out_path.to_path_buf(),
        sample_count: data.len(),
        bytes_written: text.len(),
    })
}

fn write_atomic(out_path: &Path, contents: &[u8]) -> EncodeResult<()> {
    let write_err = |e: std::io::Error| EncoderError::WriteOutput {
        path: out_path.to_path_buf(),
        source: e,
    };

    let dir = match out_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".hexsound_")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    staged.write_all(contents).map_err(write_err)?;
    staged.flush().map_err(write_err)?;
    // Staged files are private (0600); give the artifact ordinary file permissions.
    if let Some(permissions) = artifact_permissions(out_path) {
        staged
            .as_file()
            .set_permissions(permissions)
            .map_err(write_err)?;
    }
    staged.persist(out_path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Permissions of the file being replaced, or the usual `rw-r--r--` for a new one.
fn artifact_permissions(out_path: &Path) -> Option<fs::Permissions> {
    match fs::metadata(out_path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => new_file_permissions(),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}
