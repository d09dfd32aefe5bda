//! CLI command implementations

pub mod convert;
pub mod doctor;
pub mod encode;
pub mod json_output;
pub mod verify;

use hexsound_encoder::ArrayFormat;

/// Builds an array format from the shared `--name`/`--placement` flags.
pub fn array_format(name: &str, placement: Option<&str>, no_placement: bool) -> ArrayFormat {
    let format = ArrayFormat::new(name);
    match (no_placement, placement) {
        (true, _) => format.no_placement(),
        (false, Some(placement)) => format.placement(placement),
        (false, None) => format,
    }
}
