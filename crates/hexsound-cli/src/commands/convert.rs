//! Convert command implementation
//!
//! Decodes an audio file with the bundled ffmpeg and writes `sound.h`.

use anyhow::Result;
use colored::Colorize;
use hexsound_backend_ffmpeg::{DecoderConfig, FfmpegDecoder};
use std::process::ExitCode;

use super::json_output::{ConvertOutput, JsonError};
use crate::pipeline::{convert, NoProgress, ProgressStage};
use crate::request::ConversionRequest;

/// Run the convert command
///
/// # Returns
/// Exit code: 0 success, 1 conversion failure
pub fn run(
    request: &ConversionRequest,
    decoder_config: DecoderConfig,
    json_output: bool,
) -> Result<ExitCode> {
    let decoder = FfmpegDecoder::with_config(decoder_config);
    if json_output {
        run_json(request, &decoder)
    } else {
        run_human(request, &decoder)
    }
}

fn run_human(request: &ConversionRequest, decoder: &FfmpegDecoder) -> Result<ExitCode> {
    println!("{} {}", "Converting:".cyan().bold(), request.input.display());
    println!(
        "{} {}",
        "Output:".cyan().bold(),
        request.output_path().display()
    );

    let mut progress = |stage: ProgressStage| {
        let label = match stage {
            ProgressStage::Decoding => "decoding".normal(),
            ProgressStage::Encoding => "encoding".normal(),
            ProgressStage::Done => "done".green(),
            ProgressStage::Reset => "failed".red(),
        };
        println!("  [{:>3}%] {}", stage.percent(), label);
    };

    let report = convert(request, decoder, &mut progress)?;

    println!(
        "{} Wrote {} samples ({:.2} s) as '{}' to {}",
        "SUCCESS".green().bold(),
        report.sample_count,
        report.duration_secs,
        report.array_name,
        report.output_path.display()
    );
    if let Some(ref raw) = report.raw_path {
        println!("{} {}", "Raw PCM:".dimmed(), raw.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn run_json(request: &ConversionRequest, decoder: &FfmpegDecoder) -> Result<ExitCode> {
    let (output, code) = match convert(request, decoder, &mut NoProgress) {
        Ok(report) => (ConvertOutput::success(report), ExitCode::SUCCESS),
        Err(err) => (
            ConvertOutput::failure(vec![JsonError::from(&err)]),
            ExitCode::from(1),
        ),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(code)
}
