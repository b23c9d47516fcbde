/*!
    vidconvert: convert media files between containers and codecs.

    Without codec flags every stream is copied into the new container.
    Naming a codec (or passing geometry, rate control, or a trim window)
    switches the affected stream to a full re-encode.
*/

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use convert_engine::{probe, Converter};
use convert_types::{EncodeParameter, ProcessParameter, ProgressObserver};

#[derive(Parser, Debug)]
#[command(name = "vidconvert", version, about = "Convert media files between containers and codecs")]
struct Args {
    /// Source media file.
    input: PathBuf,

    /// Destination media file; its extension picks the container.
    output: Option<PathBuf>,

    /// Transcoder backend to use.
    #[arg(short = 't', long, default_value = "FFMPEG", value_name = "NAME")]
    transcoder: String,

    /// Video encoder name, or "copy" to pass the stream through.
    #[arg(short = 'v', long, value_name = "CODEC")]
    video_codec: Option<String>,

    /// Audio encoder name, or "copy" to pass the stream through.
    #[arg(short = 'a', long, value_name = "CODEC")]
    audio_codec: Option<String>,

    /// Quality-based rate control value; overrides bitrates.
    #[arg(short = 'q', long)]
    qscale: Option<i32>,

    /// Video bitrate, with an optional k/M/G suffix.
    #[arg(long = "bitrate:video", alias = "b:v", value_name = "RATE")]
    video_bitrate: Option<String>,

    /// Audio bitrate, with an optional k/M/G suffix.
    #[arg(long = "bitrate:audio", alias = "b:a", value_name = "RATE")]
    audio_bitrate: Option<String>,

    /// Output width in pixels; needs --height to take effect.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels; needs --width to take effect.
    #[arg(long)]
    height: Option<u32>,

    /// Output pixel format, e.g. yuv420p.
    #[arg(long, value_name = "FORMAT")]
    pixel_format: Option<String>,

    /// Encoder speed/quality preset, e.g. veryfast or medium.
    #[arg(long)]
    preset: Option<String>,

    /// Keep only material from this many seconds in.
    #[arg(long, value_name = "SECONDS")]
    start_time: Option<f64>,

    /// Keep only material up to this many seconds in.
    #[arg(long, value_name = "SECONDS")]
    end_time: Option<f64>,

    /// Print a JSON summary of the input and exit.
    #[arg(long)]
    info: bool,
}

/** Writes progress to stderr on a single rewritten line. */
struct ConsoleProgress;

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&self, percent: f64) {
        eprint!("\rprogress: {percent:5.1}%");
    }

    fn on_time_remaining(&self, seconds: f64) {
        eprint!("  about {seconds:.0}s left ");
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.info {
        return match probe(&args.input) {
            Ok(summary) => match serde_json::to_string_pretty(&summary) {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("failed to render summary: {e}");
                    ExitCode::FAILURE
                }
            },
            Err(e) => {
                eprintln!("failed to probe {}: {e}", args.input.display());
                ExitCode::FAILURE
            }
        };
    }

    let Some(output) = args.output.clone() else {
        eprintln!("error: an output path is required unless --info is given");
        return ExitCode::FAILURE;
    };

    let encode = match build_encode_parameter(&args) {
        Ok(param) => Arc::new(param),
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };
    let process = Arc::new(ProcessParameter::new());
    process.add_observer(Arc::new(ConsoleProgress));

    let mut converter = Converter::new(process, encode);
    if !converter.set_transcoder(&args.transcoder) {
        eprintln!("error: transcoder backend {} is not available", args.transcoder);
        return ExitCode::FAILURE;
    }

    let converted = converter.convert_format(&args.input, &output);
    eprintln!();
    if converted {
        println!("converted {} -> {}", args.input.display(), output.display());
        ExitCode::SUCCESS
    } else {
        eprintln!("conversion failed: {} -> {}", args.input.display(), output.display());
        ExitCode::FAILURE
    }
}

fn build_encode_parameter(args: &Args) -> Result<EncodeParameter, String> {
    let mut param = EncodeParameter::new();
    if let Some(codec) = requested_codec(&args.video_codec) {
        param.set_video_codec_name(codec);
    }
    if let Some(codec) = requested_codec(&args.audio_codec) {
        param.set_audio_codec_name(codec);
    }
    if let Some(qscale) = args.qscale {
        param.set_qscale(qscale);
    }
    if let Some(rate) = &args.video_bitrate {
        param.set_video_bit_rate(parse_bitrate(rate)?);
    }
    if let Some(rate) = &args.audio_bitrate {
        param.set_audio_bit_rate(parse_bitrate(rate)?);
    }
    if let Some(width) = args.width {
        param.set_width(width);
    }
    if let Some(height) = args.height {
        param.set_height(height);
    }
    if let Some(format) = &args.pixel_format {
        param.set_pixel_format(format.clone());
    }
    if let Some(preset) = &args.preset {
        param.set_preset(preset.clone());
    }
    if let Some(seconds) = args.start_time {
        param.set_start_time(seconds);
    }
    if let Some(seconds) = args.end_time {
        param.set_end_time(seconds);
    }
    Ok(param)
}

/** "copy" and the empty string both mean "do not re-encode". */
fn requested_codec(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("copy"))
}

/** Parses "128k", "6M", "1G", or a bare number of bits per second. */
fn parse_bitrate(value: &str) -> Result<i64, String> {
    let value = value.trim();
    let (digits, multiplier) = match value.chars().last() {
        Some('k' | 'K') => (&value[..value.len() - 1], 1_000i64),
        Some('m' | 'M') => (&value[..value.len() - 1], 1_000_000),
        Some('g' | 'G') => (&value[..value.len() - 1], 1_000_000_000),
        _ => (value, 1),
    };
    let number: i64 = digits
        .parse()
        .map_err(|_| format!("invalid bitrate {value:?}"))?;
    if number <= 0 {
        return Err(format!("bitrate must be positive, got {value:?}"));
    }
    Ok(number * multiplier)
}
