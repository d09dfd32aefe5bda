//! Parsing generated arrays back into bytes.
//!
//! Accepts the layout produced by [`encode_bytes`](crate::encode_bytes) and
//! tolerates blank lines, surrounding whitespace, lowercase hex digits and
//! any number of literals per row, so artifacts produced by older tools can
//! be checked too.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{EncodeResult, EncoderError};
use crate::format::LENGTH_SUFFIX;

const OPENING_PATTERN: &str =
    r"^const\s+uint8_t\s+([A-Za-z_][A-Za-z0-9_]*)\s*\[\s*\]\s*(?:([A-Za-z_][A-Za-z0-9_]*)\s*)?=\s*\{$";
const LENGTH_PATTERN: &str =
    r"^const\s+unsigned\s+int\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*([0-9]+)\s*;$";
const LITERAL_PATTERN: &str = r"^0[xX]([0-9A-Fa-f]{2})$";

static OPENING_REGEX: OnceLock<Regex> = OnceLock::new();
static LENGTH_REGEX: OnceLock<Regex> = OnceLock::new();
static LITERAL_REGEX: OnceLock<Regex> = OnceLock::new();

fn opening_regex() -> &'static Regex {
    OPENING_REGEX.get_or_init(|| Regex::new(OPENING_PATTERN).expect("invalid regex pattern"))
}

fn length_regex() -> &'static Regex {
    LENGTH_REGEX.get_or_init(|| Regex::new(LENGTH_PATTERN).expect("invalid regex pattern"))
}

fn literal_regex() -> &'static Regex {
    LITERAL_REGEX.get_or_init(|| Regex::new(LITERAL_PATTERN).expect("invalid regex pattern"))
}

/// Contents recovered from an array artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArray {
    /// Array identifier from the opening line.
    pub array_name: String,
    /// Placement qualifier, if one was present.
    pub placement: Option<String>,
    /// The byte literals, in order.
    pub bytes: Vec<u8>,
    /// Value of the `<name>_len` constant.
    pub declared_len: usize,
}

impl ParsedArray {
    /// Returns true if the declared length matches the number of literals.
    pub fn is_consistent(&self) -> bool {
        self.declared_len == self.bytes.len()
    }
}

/// Parses an array artifact.
pub fn parse_array(text: &str) -> EncodeResult<ParsedArray> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (line_no, opening) = lines
        .next()
        .ok_or_else(|| EncoderError::malformed(1, "empty artifact"))?;
    let caps = opening_regex()
        .captures(opening)
        .ok_or_else(|| EncoderError::malformed(line_no, "expected array declaration"))?;
    let array_name = caps[1].to_string();
    let placement = caps.get(2).map(|m| m.as_str().to_string());

    let mut bytes = Vec::new();
    let mut closed = false;
    for (line_no, line) in lines.by_ref() {
        if line == "};" {
            closed = true;
            break;
        }
        for token in line.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let caps = literal_regex().captures(token).ok_or_else(|| {
                EncoderError::malformed(line_no, format!("bad byte literal '{}'", token))
            })?;
            let value = u8::from_str_radix(&caps[1], 16).map_err(|e| {
                EncoderError::malformed(line_no, format!("bad byte literal '{}': {}", token, e))
            })?;
            bytes.push(value);
        }
    }
    if !closed {
        return Err(EncoderError::malformed(
            text.lines().count().max(1),
            "missing closing '};'",
        ));
    }

    let (line_no, length_line) = lines
        .next()
        .ok_or_else(|| EncoderError::malformed(text.lines().count(), "missing length constant"))?;
    let caps = length_regex()
        .captures(length_line)
        .ok_or_else(|| EncoderError::malformed(line_no, "expected length constant"))?;

    let expected_name = format!("{}{}", array_name, LENGTH_SUFFIX);
    if caps[1] != expected_name {
        return Err(EncoderError::malformed(
            line_no,
            format!("length constant '{}' does not match '{}'", &caps[1], expected_name),
        ));
    }
    let declared_len = caps[2]
        .parse::<usize>()
        .map_err(|e| EncoderError::malformed(line_no, format!("bad length value: {}", e)))?;

    if let Some((line_no, _)) = lines.next() {
        return Err(EncoderError::malformed(
            line_no,
            "unexpected content after length constant",
        ));
    }

    Ok(ParsedArray {
        array_name,
        placement,
        bytes,
        declared_len,
    })
}
