//! ffmpeg subprocess decoder.
//!
//! The decoder is looked up only at an explicit override path or at
//! `<install dir>/ffmpeg/bin/ffmpeg[.exe]`, where the install dir defaults to
//! the directory of the running executable. The system PATH is never used
//! for decoding.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::decoder::{CancelToken, DecodedPcm, Decoder};
use crate::error::{DecodeResult, DecoderError};
use crate::pcm::{raw_path_for, CHANNELS, CODEC, SAMPLE_FORMAT, SAMPLE_RATE};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// File name of the decoder executable on this platform.
pub fn decoder_file_name() -> &'static str {
    if cfg!(windows) {
        "ffmpeg.exe"
    } else {
        "ffmpeg"
    }
}

/// Expected decoder location under an install directory.
pub fn install_relative_path(install_dir: &Path) -> PathBuf {
    install_dir
        .join("ffmpeg")
        .join("bin")
        .join(decoder_file_name())
}

/// Directory containing the running executable.
pub fn default_install_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()?
        .parent()
        .map(Path::to_path_buf)
}

/// Looks for an ffmpeg on the system PATH.
///
/// Only used for diagnostics; [`FfmpegDecoder`] never decodes with it.
pub fn find_on_path() -> Option<PathBuf> {
    which::which(decoder_file_name()).ok()
}

/// Configuration for the ffmpeg decoder.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Explicit decoder executable, checked before the install location.
    pub decoder_path: Option<PathBuf>,
    /// Install directory; `None` means the running executable's directory.
    pub install_dir: Option<PathBuf>,
    /// Upper bound on decoder run time; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Whether to capture the decoder's stderr for diagnostics.
    pub capture_output: bool,
    /// Cancellation flag polled while the decoder runs.
    pub cancel: CancelToken,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            decoder_path: None,
            install_dir: None,
            timeout: None,
            capture_output: true,
            cancel: CancelToken::new(),
        }
    }
}

impl DecoderConfig {
    /// Sets an explicit decoder executable.
    pub fn decoder_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.decoder_path = Some(path.into());
        self
    }

    /// Sets the install directory searched for `ffmpeg/bin/ffmpeg`.
    pub fn install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    /// Sets the timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Sets whether stderr is captured.
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    /// Shares a cancellation token with the decoder.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }
}

/// Decoder backed by an ffmpeg executable.
#[derive(Debug, Clone, Default)]
pub struct FfmpegDecoder {
    config: DecoderConfig,
}

impl FfmpegDecoder {
    /// Creates a decoder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder with the given configuration.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Locations checked for the decoder, in order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(ref path) = self.config.decoder_path {
            candidates.push(path.clone());
        }
        let install_dir = self.config.install_dir.clone().or_else(default_install_dir);
        if let Some(dir) = install_dir {
            candidates.push(install_relative_path(&dir));
        }
        candidates
    }

    /// The configured override path, if it is set but not a file.
    pub fn skipped_override(&self) -> Option<&Path> {
        self.config
            .decoder_path
            .as_deref()
            .filter(|path| !path.is_file())
    }

    /// Finds the decoder executable.
    pub fn locate(&self) -> DecodeResult<PathBuf> {
        if let Some(path) = self.skipped_override() {
            tracing::warn!(
                decoder = %path.display(),
                "configured decoder not found, falling back to the bundled location"
            );
        }
        let candidates = self.candidates();
        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => Ok(path.clone()),
            None => Err(DecoderError::DecoderNotFound {
                searched: candidates,
            }),
        }
    }

    /// Decodes `input` into `raw_path`.
    pub fn decode_to(&self, input: &Path, raw_path: &Path) -> DecodeResult<DecodedPcm> {
        let decoder_path = self.locate()?;
        let args = decode_args(input, raw_path);

        tracing::debug!(
            decoder = %decoder_path.display(),
            args = ?args,
            "spawning decoder"
        );

        let mut cmd = Command::new(&decoder_path);
        cmd.args(&args).stdin(Stdio::null()).stdout(Stdio::null());
        if self.config.capture_output {
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stderr(Stdio::null());
        }

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|e| DecoderError::SpawnFailed {
            path: decoder_path.clone(),
            source: e,
        })?;

        // ffmpeg logs progress to stderr; drain it concurrently so a full pipe
        // cannot stall the process.
        let stderr_reader = spawn_stderr_reader(&mut child);

        let status = wait_for_exit(child, self.config.timeout, &self.config.cancel)?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            return Err(DecoderError::process_failed(exit_code, stderr.trim_end()));
        }

        if !raw_path.is_file() {
            return Err(DecoderError::OutputMissing {
                path: raw_path.to_path_buf(),
            });
        }

        tracing::info!(
            raw = %raw_path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "decoded to raw pcm"
        );

        Ok(DecodedPcm {
            raw_path: raw_path.to_path_buf(),
            stderr,
        })
    }
}

impl Decoder for FfmpegDecoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn decode(&self, input: &Path) -> DecodeResult<DecodedPcm> {
        self.decode_to(input, &raw_path_for(input))
    }
}

/// Arguments for a fixed-format decode of `input` into `output`.
pub fn decode_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-i".into(), input.into()];
    args.extend(
        [
            "-f".to_string(),
            SAMPLE_FORMAT.to_string(),
            "-ar".to_string(),
            SAMPLE_RATE.to_string(),
            "-ac".to_string(),
            CHANNELS.to_string(),
            "-acodec".to_string(),
            CODEC.to_string(),
            "-y".to_string(),
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.push(output.into());
    args
}

fn spawn_stderr_reader(child: &mut Child) -> Option<JoinHandle<String>> {
    let mut stderr = child.stderr.take()?;
    Some(std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stderr.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }))
}

fn wait_for_exit(
    mut child: Child,
    timeout: Option<Duration>,
    cancel: &CancelToken,
) -> DecodeResult<ExitStatus> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if cancel.is_cancelled() {
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::warn!("decoder cancelled");
                    return Err(DecoderError::Cancelled);
                }
                if let Some(timeout) = timeout {
                    if start.elapsed() > timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(DecoderError::Timeout { timeout });
                    }
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Err(DecoderError::Io(e)),
        }
    }
}

/// Runs `<decoder> -version` and returns the reported version.
pub fn probe_version(decoder_path: &Path) -> Option<String> {
    let output = Command::new(decoder_path)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .ok()?;

    if output.status.success() {
        parse_version(&String::from_utf8_lossy(&output.stdout))
    } else {
        None
    }
}

fn parse_version(output: &str) -> Option<String> {
    // "ffmpeg version 6.1.1-3ubuntu5 Copyright (c) 2000-2023 ..."
    output
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("ffmpeg version "))
        .and_then(|rest| rest.split_whitespace().next())
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_args() {
        let args = decode_args(Path::new("in/chime.mp3"), Path::new("in/chime.raw"));
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-i",
                "in/chime.mp3",
                "-f",
                "u8",
                "-ar",
                "8000",
                "-ac",
                "1",
                "-acodec",
                "pcm_u8",
                "-y",
                "in/chime.raw",
            ]
        );
    }

    #[test]
    fn test_config_builder() {
        let token = CancelToken::new();
        let config = DecoderConfig::default()
            .decoder_path("/opt/ffmpeg")
            .install_dir("/opt/app")
            .timeout_secs(90)
            .capture_output(false)
            .cancel_token(token.clone());

        assert_eq!(config.decoder_path, Some(PathBuf::from("/opt/ffmpeg")));
        assert_eq!(config.install_dir, Some(PathBuf::from("/opt/app")));
        assert_eq!(config.timeout, Some(Duration::from_secs(90)));
        assert!(!config.capture_output);

        token.cancel();
        assert!(config.cancel.is_cancelled());
    }

    #[test]
    fn test_default_config_waits_indefinitely() {
        let config = DecoderConfig::default();
        assert_eq!(config.timeout, None);
        assert!(config.capture_output);
    }

    #[test]
    fn test_candidates_order() {
        let decoder = FfmpegDecoder::with_config(
            DecoderConfig::default()
                .decoder_path("/custom/ffmpeg")
                .install_dir("/opt/app"),
        );
        assert_eq!(
            decoder.candidates(),
            vec![
                PathBuf::from("/custom/ffmpeg"),
                install_relative_path(Path::new("/opt/app")),
            ]
        );
    }

    #[test]
    fn test_locate_missing_reports_searched_paths() {
        let dir = tempfile::tempdir().unwrap();
        let decoder =
            FfmpegDecoder::with_config(DecoderConfig::default().install_dir(dir.path()));

        match decoder.locate() {
            Err(DecoderError::DecoderNotFound { searched }) => {
                assert_eq!(searched, vec![install_relative_path(dir.path())]);
            }
            other => panic!("expected DecoderNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_install_relative() {
        let dir = tempfile::tempdir().unwrap();
        let expected = install_relative_path(dir.path());
        std::fs::create_dir_all(expected.parent().unwrap()).unwrap();
        std::fs::write(&expected, b"").unwrap();

        let decoder = FfmpegDecoder::with_config(
            DecoderConfig::default()
                .decoder_path(dir.path().join("missing-override"))
                .install_dir(dir.path()),
        );
        assert_eq!(decoder.locate().unwrap(), expected);
        assert_eq!(
            decoder.skipped_override(),
            Some(dir.path().join("missing-override").as_path())
        );
    }

    #[test]
    fn test_existing_override_is_not_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("my-ffmpeg");
        std::fs::write(&custom, b"").unwrap();

        let decoder = FfmpegDecoder::with_config(
            DecoderConfig::default()
                .decoder_path(&custom)
                .install_dir(dir.path()),
        );
        assert_eq!(decoder.skipped_override(), None);
        assert_eq!(decoder.locate().unwrap(), custom);

        assert_eq!(FfmpegDecoder::new().skipped_override(), None);
    }

    #[test]
    fn test_parse_version() {
        let out = "ffmpeg version 6.1.1-3ubuntu5 Copyright (c) 2000-2023 the FFmpeg developers\n";
        assert_eq!(parse_version(out).as_deref(), Some("6.1.1-3ubuntu5"));
        assert_eq!(parse_version("not ffmpeg\n"), None);
        assert_eq!(parse_version(""), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_for_exit_cancelled() {
        let child = Command::new("sh")
            .args(["-c", "sleep 5"])
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        let token = CancelToken::new();
        token.cancel();

        let err = wait_for_exit(child, None, &token).unwrap_err();
        assert!(matches!(err, DecoderError::Cancelled));
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_for_exit_timeout() {
        let child = Command::new("sh")
            .args(["-c", "sleep 5"])
            .stdout(Stdio::null())
            .spawn()
            .unwrap();

        let start = Instant::now();
        let err = wait_for_exit(child, Some(Duration::from_millis(100)), &CancelToken::new())
            .unwrap_err();
        match err {
            DecoderError::Timeout { timeout } => {
                assert_eq!(timeout, Duration::from_millis(100))
            }
            other => panic!("expected Timeout, got {:?}", other),
        }
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
