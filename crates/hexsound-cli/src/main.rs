//! hexsound CLI - turns audio files into firmware byte tables
//!
//! `hexsound convert chime.mp3` decodes with the bundled ffmpeg to 8 kHz
//! unsigned 8-bit mono and writes the samples as a `PROGMEM` array in
//! `sound.h`.

use clap::{Parser, Subcommand};
use hexsound_backend_ffmpeg::DecoderConfig;
use hexsound_encoder::DEFAULT_ARRAY_NAME;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use hexsound_cli::commands;
use hexsound_cli::ConversionRequest;

/// hexsound - audio to firmware byte tables
#[derive(Parser)]
#[command(name = "hexsound")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log pipeline details to stderr (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an audio file and write it as a byte table (sound.h)
    Convert {
        /// Audio file to convert (anything the decoder understands)
        input: PathBuf,

        /// Destination directory (default: next to the input)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Array identifier; the length constant is <NAME>_len
        #[arg(short, long, default_value = DEFAULT_ARRAY_NAME)]
        name: String,

        /// Placement qualifier emitted after the array declarator
        #[arg(long, conflicts_with = "no_placement")]
        placement: Option<String>,

        /// Omit the placement qualifier
        #[arg(long)]
        no_placement: bool,

        /// Decoder executable (default: ffmpeg/bin/ffmpeg next to hexsound)
        #[arg(long)]
        ffmpeg: Option<PathBuf>,

        /// Kill the decoder after this many seconds (default: no limit)
        #[arg(long)]
        timeout: Option<u64>,

        /// Delete the .raw intermediate after a successful conversion
        #[arg(long)]
        discard_raw: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Write an existing raw 8-bit PCM file as a byte table
    Encode {
        /// Headerless raw PCM file
        raw: PathBuf,

        /// Output file (default: sound.h next to the raw file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Array identifier; the length constant is <NAME>_len
        #[arg(short, long, default_value = DEFAULT_ARRAY_NAME)]
        name: String,

        /// Placement qualifier emitted after the array declarator
        #[arg(long, conflicts_with = "no_placement")]
        placement: Option<String>,

        /// Omit the placement qualifier
        #[arg(long)]
        no_placement: bool,
    },

    /// Check a generated byte table against its length constant
    Verify {
        /// Generated header file
        header: PathBuf,

        /// Raw file the table should contain
        #[arg(long)]
        raw: Option<PathBuf>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Check where the decoder is expected and whether it works
    Doctor {
        /// Decoder executable to check instead of the bundled location
        #[arg(long)]
        ffmpeg: Option<PathBuf>,

        /// Destination directory to check for write access
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

/// A valid RUST_LOG replaces the level `--verbose` picks.
fn env_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    match rust_log.and_then(|directives| EnvFilter::try_new(directives).ok()) {
        Some(filter) => filter,
        None => {
            EnvFilter::new(if verbose { "info" } else { "warn" })
        }
    }
}

fn init_tracing(verbose: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(verbose, rust_log.as_deref()))
        .init();
}

fn decoder_config(ffmpeg: Option<PathBuf>, timeout: Option<u64>) -> DecoderConfig {
    let mut config = DecoderConfig::default();
    if let Some(path) = ffmpeg {
        config = config.decoder_path(path);
    }
    if let Some(secs) = timeout {
        config = config.timeout_secs(secs);
    }
    config
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            input,
            out_dir,
            name,
            placement,
            no_placement,
            ffmpeg,
            timeout,
            discard_raw,
            json,
        } => {
            let mut request = ConversionRequest::new(input)
                .format(commands::array_format(
                    &name,
                    placement.as_deref(),
                    no_placement,
                ))
                .keep_raw(!discard_raw);
            if let Some(dir) = out_dir {
                request = request.dest_dir(dir);
            }
            commands::convert::run(&request, decoder_config(ffmpeg, timeout), json)
        }
        Commands::Encode {
            raw,
            output,
            name,
            placement,
            no_placement,
        } => commands::encode::run(
            &raw,
            output.as_deref(),
            &commands::array_format(&name, placement.as_deref(), no_placement),
        ),
        Commands::Verify { header, raw, json } => {
            commands::verify::run(&header, raw.as_deref(), json)
        }
        Commands::Doctor { ffmpeg, out_dir } => {
            commands::doctor::run(decoder_config(ffmpeg, None), out_dir.as_deref())
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_convert_defaults() {
        let cli = Cli::try_parse_from(["hexsound", "convert", "chime.mp3"]).unwrap();
        match cli.command {
            Commands::Convert {
                input,
                out_dir,
                name,
                placement,
                no_placement,
                ffmpeg,
                timeout,
                discard_raw,
                json,
            } => {
                assert_eq!(input, PathBuf::from("chime.mp3"));
                assert_eq!(out_dir, None);
                assert_eq!(name, "sound_audio");
                assert_eq!(placement, None);
                assert!(!no_placement);
                assert_eq!(ffmpeg, None);
                assert_eq!(timeout, None);
                assert!(!discard_raw);
                assert!(!json);
            }
            _ => panic!("expected convert command"),
        }
    }

    #[test]
    fn test_cli_parses_convert_options() {
        let cli = Cli::try_parse_from([
            "hexsound",
            "-v",
            "convert",
            "chime.mp3",
            "--out-dir",
            "include",
            "--name",
            "chime",
            "--no-placement",
            "--ffmpeg",
            "/usr/bin/ffmpeg",
            "--timeout",
            "60",
            "--discard-raw",
            "--json",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Convert {
                out_dir,
                name,
                no_placement,
                ffmpeg,
                timeout,
                discard_raw,
                json,
                ..
            } => {
                assert_eq!(out_dir, Some(PathBuf::from("include")));
                assert_eq!(name, "chime");
                assert!(no_placement);
                assert_eq!(ffmpeg, Some(PathBuf::from("/usr/bin/ffmpeg")));
                assert_eq!(timeout, Some(60));
                assert!(discard_raw);
                assert!(json);
            }
            _ => panic!("expected convert command"),
        }
    }

    #[test]
    fn test_cli_rejects_conflicting_placement_flags() {
        let result = Cli::try_parse_from([
            "hexsound",
            "encode",
            "clip.raw",
            "--placement",
            "PROGMEM",
            "--no-placement",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_verify() {
        let cli =
            Cli::try_parse_from(["hexsound", "verify", "sound.h", "--raw", "clip.raw"]).unwrap();
        match cli.command {
            Commands::Verify { header, raw, json } => {
                assert_eq!(header, PathBuf::from("sound.h"));
                assert_eq!(raw, Some(PathBuf::from("clip.raw")));
                assert!(!json);
            }
            _ => panic!("expected verify command"),
        }
    }

    #[test]
    fn test_decoder_config_from_flags() {
        let config = decoder_config(Some(PathBuf::from("/opt/ffmpeg")), Some(5));
        assert_eq!(config.decoder_path, Some(PathBuf::from("/opt/ffmpeg")));
        assert_eq!(config.timeout, Some(std::time::Duration::from_secs(5)));

        let config = decoder_config(None, None);
        assert_eq!(config.decoder_path, None);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_cli_parses_doctor() {
        let cli = Cli::try_parse_from([
            "hexsound",
            "doctor",
            "--ffmpeg",
            "/opt/ffmpeg",
            "--out-dir",
            "build",
        ])
        .unwrap();
        match cli.command {
            Commands::Doctor { ffmpeg, out_dir } => {
                assert_eq!(ffmpeg, Some(PathBuf::from("/opt/ffmpeg")));
                assert_eq!(out_dir, Some(PathBuf::from("build")));
            }
            _ => panic!("expected doctor"),
        }
    }

    fn directives(filter: EnvFilter) -> String {
        filter.to_string().to_lowercase()
    }

    #[test]
    fn test_env_filter_verbose_level() {
        assert_eq!(directives(env_filter(false, None)), "warn");
        assert_eq!(directives(env_filter(true, None)), "info");
    }

    #[test]
    fn test_env_filter_rust_log_wins_over_verbose() {
        let filter = directives(env_filter(false, Some("debug")));
        assert!(filter.contains("debug"));
        assert!(!filter.contains("warn"));

        let filter = directives(env_filter(true, Some("hexsound_cli=trace")));
        assert!(filter.contains("hexsound_cli=trace"));
        assert!(!filter.contains("info"));
    }

    #[test]
    fn test_env_filter_ignores_malformed_rust_log() {
        assert_eq!(directives(env_filter(true, Some("hexsound_cli=loud"))), "info");
    }
}
