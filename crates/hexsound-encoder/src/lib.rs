//! hexsound array encoder
//!
//! Renders an arbitrary byte buffer, typically headerless 8-bit PCM, as a C
//! source array with a length constant, ready to be compiled into firmware:
//!
//! ```text
//! const uint8_t sound_audio[] PROGMEM = {
//! 0x80,0x81,0x83,...
//! };
//! const unsigned int sound_audio_len = 12345;
//! ```
//!
//! Output is deterministic: the same bytes and [`ArrayFormat`] always produce
//! the same text. [`encode_file`] writes artifacts atomically and
//! [`parse_array`] reads them back for verification.
//!
//! # Example
//!
//! ```
//! use hexsound_encoder::{encode_bytes, parse_array, ArrayFormat};
//!
//! let text = encode_bytes(&[0x00, 0x7F, 0xFF], &ArrayFormat::default());
//! assert!(text.starts_with("const uint8_t sound_audio[] PROGMEM = {\n"));
//!
//! let parsed = parse_array(&text).unwrap();
//! assert_eq!(parsed.bytes, vec![0x00, 0x7F, 0xFF]);
//! ```

pub mod encode;
pub mod error;
pub mod format;
pub mod parse;

pub use encode::{encode_bytes, encode_file, EncodedArtifact};
pub use error::{EncodeResult, EncoderError};
pub use format::{ArrayFormat, DEFAULT_ARRAY_NAME, DEFAULT_PLACEMENT, ROW_WIDTH};
pub use parse::{parse_array, ParsedArray};
