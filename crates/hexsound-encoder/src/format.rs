//! Output-format options for generated arrays.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{EncodeResult, EncoderError};

/// Default array identifier.
pub const DEFAULT_ARRAY_NAME: &str = "sound_audio";

/// Default placement qualifier (AVR flash storage).
pub const DEFAULT_PLACEMENT: &str = "PROGMEM";

/// Number of byte literals per row.
pub const ROW_WIDTH: usize = 16;

/// C element type of the array.
pub const ELEMENT_TYPE: &str = "uint8_t";

/// C type of the length constant.
pub const LENGTH_TYPE: &str = "unsigned int";

/// Suffix appended to the array name for the length constant.
pub const LENGTH_SUFFIX: &str = "_len";

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();

fn identifier_regex() -> &'static Regex {
    IDENTIFIER_REGEX.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).expect("invalid regex pattern"))
}

/// Returns true if `s` is a valid C identifier.
pub fn is_identifier(s: &str) -> bool {
    identifier_regex().is_match(s)
}

/// How a byte buffer is rendered as a source array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayFormat {
    /// Identifier of the array; the length constant is `<name>_len`.
    pub array_name: String,
    /// Placement qualifier emitted after `[]`, or none.
    pub placement: Option<String>,
}

impl Default for ArrayFormat {
    fn default() -> Self {
        Self {
            array_name: DEFAULT_ARRAY_NAME.to_string(),
            placement: Some(DEFAULT_PLACEMENT.to_string()),
        }
    }
}

impl ArrayFormat {
    /// Creates a format with the given array name and the default placement.
    pub fn new(array_name: impl Into<String>) -> Self {
        Self {
            array_name: array_name.into(),
            ..Default::default()
        }
    }

    /// Sets the placement qualifier.
    pub fn placement(mut self, placement: impl Into<String>) -> Self {
        self.placement = Some(placement.into());
        self
    }

    /// Drops the placement qualifier.
    pub fn no_placement(mut self) -> Self {
        self.placement = None;
        self
    }

    /// Name of the length constant.
    pub fn length_name(&self) -> String {
        format!("{}{}", self.array_name, LENGTH_SUFFIX)
    }

    /// Checks that the array name and placement are C identifiers.
    pub fn validate(&self) -> EncodeResult<()> {
        if !is_identifier(&self.array_name) {
            return Err(EncoderError::InvalidArrayName {
                name: self.array_name.clone(),
            });
        }
        if let Some(ref placement) = self.placement {
            if !is_identifier(placement) {
                return Err(EncoderError::InvalidPlacement {
                    placement: placement.clone(),
                });
            }
        }
        Ok(())
    }

    /// The opening declaration line, without its newline.
    pub fn opening_line(&self) -> String {
        match self.placement {
            Some(ref placement) => format!(
                "const {} {}[] {} = {{",
                ELEMENT_TYPE, self.array_name, placement
            ),
            None => format!("const {} {}[] = {{", ELEMENT_TYPE, self.array_name),
        }
    }

    /// The trailing length declaration, without its newline.
    pub fn length_line(&self, len: usize) -> String {
        format!("const {} {} = {};", LENGTH_TYPE, self.length_name(), len)
    }
}
