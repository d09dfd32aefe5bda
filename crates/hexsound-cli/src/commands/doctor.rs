//! Doctor command implementation
//!
//! Checks that the bundled decoder is where conversions will look for it.

use anyhow::Result;
use colored::Colorize;
use hexsound_backend_ffmpeg::ffmpeg::find_on_path;
use hexsound_backend_ffmpeg::{probe_version, DecoderConfig, FfmpegDecoder, SAMPLE_RATE};
use std::io;
use std::path::Path;
use std::process::ExitCode;

use crate::request::OUTPUT_FILE_NAME;

/// Run the doctor command
///
/// Checks:
/// - Decoder location and version
/// - Destination directory can take the generated header, when one is given
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run(decoder_config: DecoderConfig, out_dir: Option<&Path>) -> Result<ExitCode> {
    println!("{}", "hexsound doctor".cyan().bold());
    println!("{}", "===============".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!(
        "  {} hexsound-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "  {} output format: u8 PCM, {} Hz, mono",
        "->".green(),
        SAMPLE_RATE
    );
    println!();

    println!("{}", "Decoder:".bold());
    let decoder = FfmpegDecoder::with_config(decoder_config);
    for candidate in decoder.candidates() {
        let marker = if candidate.is_file() {
            "ok".green()
        } else {
            "--".dimmed()
        };
        println!("  {} {}", marker, candidate.display());
    }

    if let Some(path) = decoder.skipped_override() {
        println!(
            "  {} --ffmpeg {} does not exist; conversions fall back to the bundled location",
            "!!".yellow(),
            path.display()
        );
    }

    match decoder.locate() {
        Ok(path) => match probe_version(&path) {
            Some(version) => println!("  {} ffmpeg {}", "ok".green(), version),
            None => {
                println!(
                    "  {} {} exists but did not report a version",
                    "!!".red(),
                    path.display()
                );
                all_ok = false;
            }
        },
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            match find_on_path() {
                Some(path) => println!(
                    "     {}",
                    format!(
                        "An ffmpeg exists on PATH at {}; pass --ffmpeg {} to use it.",
                        path.display(),
                        path.display()
                    )
                    .dimmed()
                ),
                None => println!(
                    "     {}",
                    "Place an ffmpeg build under ffmpeg/bin/ next to the hexsound executable."
                        .dimmed()
                ),
            }
            all_ok = false;
        }
    }
    println!();

    println!("{}", "Output:".bold());
    match out_dir {
        Some(dir) => match check_writable(dir) {
            Ok(()) => println!(
                "  {} {} is writable",
                "ok".green(),
                dir.display()
            ),
            Err(e) => {
                println!(
                    "  {} Cannot write {} to {}: {}",
                    "!!".red(),
                    OUTPUT_FILE_NAME,
                    dir.display(),
                    e
                );
                all_ok = false;
            }
        },
        None => println!(
            "  {} {} is written next to each input (pass --out-dir to check a destination)",
            "->".green(),
            OUTPUT_FILE_NAME
        ),
    }
    println!();

    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

/// Stages and discards a file in `dir` the same way the encoder stages
/// `sound.h` before renaming it into place.
pub fn check_writable(dir: &Path) -> io::Result<()> {
    let staged = tempfile::Builder::new()
        .prefix(".hexsound_")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    staged.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_check_writable_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        check_writable(dir.path()).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_check_writable_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_writable(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_run_fails_without_decoder() {
        let install = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let code = run(
            DecoderConfig::default().install_dir(install.path()),
            Some(out.path()),
        )
        .unwrap();
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::from(1)));
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_run_fails_on_unwritable_destination() {
        let install = tempfile::tempdir().unwrap();
        let code = run(
            DecoderConfig::default().install_dir(install.path()),
            Some(&install.path().join("absent")),
        )
        .unwrap();
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::from(1)));
    }
}
