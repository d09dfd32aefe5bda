//! Verify command implementation
//!
//! Parses a generated array and checks it against its length constant and,
//! optionally, the raw file it was made from.

use anyhow::{Context, Result};
use colored::Colorize;
use hexsound_encoder::parse_array;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{JsonError, VerifyOutput, VerifyResult};

/// Checks the artifact at `header_path`.
pub fn check(header_path: &Path, raw_path: Option<&Path>) -> Result<VerifyResult> {
    let text = fs::read_to_string(header_path)
        .with_context(|| format!("Failed to read artifact: {}", header_path.display()))?;
    let parsed = parse_array(&text)
        .with_context(|| format!("Failed to parse artifact: {}", header_path.display()))?;

    let raw_matches = match raw_path {
        Some(raw_path) => {
            let raw = fs::read(raw_path)
                .with_context(|| format!("Failed to read raw file: {}", raw_path.display()))?;
            Some(raw == parsed.bytes)
        }
        None => None,
    };

    Ok(VerifyResult {
        length_consistent: parsed.is_consistent(),
        literal_count: parsed.bytes.len(),
        declared_len: parsed.declared_len,
        array_name: parsed.array_name,
        placement: parsed.placement,
        raw_matches,
    })
}

/// Run the verify command
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 otherwise
pub fn run(header_path: &Path, raw_path: Option<&Path>, json_output: bool) -> Result<ExitCode> {
    if json_output {
        let output = match check(header_path, raw_path) {
            Ok(result) => VerifyOutput::from_result(result),
            Err(e) => VerifyOutput::failure(vec![JsonError::new("VERIFY_001", format!("{:#}", e))]),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(if output.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        });
    }

    let result = check(header_path, raw_path)?;

    println!("{} {}", "Artifact:".cyan().bold(), header_path.display());
    println!(
        "  {} array '{}'{}",
        "->".green(),
        result.array_name,
        result
            .placement
            .as_ref()
            .map(|p| format!(" ({})", p))
            .unwrap_or_default()
    );

    if result.length_consistent {
        println!(
            "  {} {} literals match {}_len",
            "ok".green(),
            result.literal_count,
            result.array_name
        );
    } else {
        println!(
            "  {} {} literals but {}_len = {}",
            "!!".red(),
            result.literal_count,
            result.array_name,
            result.declared_len
        );
    }

    match result.raw_matches {
        Some(true) => println!("  {} bytes match raw file", "ok".green()),
        Some(false) => println!("  {} bytes differ from raw file", "!!".red()),
        None => {}
    }

    if result.passed() {
        println!("{} Artifact is consistent", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{} Artifact check failed", "FAILED".red().bold());
        Ok(ExitCode::from(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexsound_encoder::{encode_bytes, ArrayFormat};

    #[test]
    fn test_check_matching_raw() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("sound.h");
        let raw = dir.path().join("clip.raw");
        let data: Vec<u8> = (0..40).collect();
        fs::write(&raw, &data).unwrap();
        fs::write(&header, encode_bytes(&data, &ArrayFormat::default())).unwrap();

        let result = check(&header, Some(&raw)).unwrap();
        assert!(result.passed());
        assert_eq!(result.literal_count, 40);
        assert_eq!(result.raw_matches, Some(true));
    }

    #[test]
    fn test_check_detects_raw_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("sound.h");
        let raw = dir.path().join("clip.raw");
        fs::write(&raw, [1u8, 2, 3]).unwrap();
        fs::write(&header, encode_bytes(&[1, 2, 4], &ArrayFormat::default())).unwrap();

        let result = check(&header, Some(&raw)).unwrap();
        assert!(result.length_consistent);
        assert_eq!(result.raw_matches, Some(false));
        assert!(!result.passed());
    }

    #[test]
    fn test_check_detects_bad_length() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("sound.h");
        fs::write(
            &header,
            "const uint8_t s[] = {\n0x01,0x02,\n};\nconst unsigned int s_len = 3;\n",
        )
        .unwrap();

        let result = check(&header, None).unwrap();
        assert!(!result.length_consistent);
        assert_eq!(run(&header, None, false).unwrap(), ExitCode::from(1));
    }

    #[test]
    fn test_check_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check(&dir.path().join("sound.h"), None).is_err());
        assert_eq!(
            run(&dir.path().join("sound.h"), None, true).unwrap(),
            ExitCode::from(1)
        );
    }
}
