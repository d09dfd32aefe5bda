//! The decode capability consumed by the conversion pipeline.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::DecodeResult;

/// A raw PCM buffer produced by a [`Decoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPcm {
    /// Path of the headerless raw file.
    pub raw_path: PathBuf,
    /// Diagnostic output captured from the decoder, if any.
    pub stderr: String,
}

/// Decodes an audio source into fixed-format raw PCM.
///
/// Implementations write unsigned 8-bit mono samples at
/// [`SAMPLE_RATE`](crate::pcm::SAMPLE_RATE) to
/// [`raw_path_for(input)`](crate::pcm::raw_path_for). A returned error means
/// the raw file, if present, must not be trusted.
pub trait Decoder {
    /// Short backend name for reports.
    fn name(&self) -> &str;

    /// Decodes `input`, blocking until the raw file is complete.
    fn decode(&self, input: &Path) -> DecodeResult<DecodedPcm>;
}

/// Cooperative cancellation flag shared between a caller and a running decode.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());

        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn test_cancel_token_across_threads() {
        let token = CancelToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(token.is_cancelled());
    }
}
