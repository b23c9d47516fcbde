/*!
    End-to-end conversion tests.

    These run real FFmpeg codecs, so they need a fixture: point the
    VIDCONVERT_TEST_MEDIA environment variable at a short mp4 with one
    video and one audio stream. Every test that needs the fixture skips
    quietly when the variable is unset or the file is missing.
*/

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use convert_engine::{probe, Converter};
use convert_types::{EncodeParameter, ProcessParameter, ProgressObserver};

fn fixture() -> Option<PathBuf> {
    std::env::var_os("VIDCONVERT_TEST_MEDIA")
        .map(PathBuf::from)
        .filter(|path| path.exists())
}

fn make_converter(param: EncodeParameter) -> (Converter, Arc<ProcessParameter>) {
    let process = Arc::new(ProcessParameter::new());
    let mut converter = Converter::new(process.clone(), Arc::new(param));
    assert!(converter.set_transcoder("FFMPEG"));
    (converter, process)
}

fn output_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}

#[test]
fn remux_preserves_both_streams() {
    let Some(input) = fixture() else { return };
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("remuxed.mkv");

    let (mut converter, _) = make_converter(EncodeParameter::new());
    assert!(converter.convert_format(&input, &output));
    assert!(output_size(&output) > 0);

    let source = probe(&input).unwrap();
    let result = probe(&output).unwrap();
    assert_eq!(source.has_video(), result.has_video());
    assert_eq!(source.has_audio(), result.has_audio());
    assert_eq!(source.video_codec, result.video_codec);
    assert_eq!(source.audio_codec, result.audio_codec);
}

#[test]
fn remux_round_trip_keeps_codecs() {
    let Some(input) = fixture() else { return };
    let dir = tempfile::tempdir().unwrap();
    let intermediate = dir.path().join("step.mkv");
    let back = dir.path().join("back.mp4");

    let (mut converter, _) = make_converter(EncodeParameter::new());
    assert!(converter.convert_format(&input, &intermediate));
    let (mut converter, _) = make_converter(EncodeParameter::new());
    assert!(converter.convert_format(&intermediate, &back));

    let source = probe(&input).unwrap();
    let result = probe(&back).unwrap();
    assert_eq!(source.video_codec, result.video_codec);
    assert_eq!(source.audio_codec, result.audio_codec);
}

#[test]
fn video_transcode_applies_codec_and_size() {
    let Some(input) = fixture() else { return };
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("encoded.mp4");

    let mut param = EncodeParameter::new();
    param.set_video_codec_name("libx264");
    param.set_video_bit_rate(400_000);
    param.set_width(320);
    param.set_height(180);
    param.set_preset("veryfast");

    let (mut converter, _) = make_converter(param);
    assert!(converter.convert_format(&input, &output));

    let result = probe(&output).unwrap();
    assert!(result.has_video());
    assert_eq!(result.video_codec, "h264");
    assert_eq!(result.width, 320);
    assert_eq!(result.height, 180);
}

#[test]
fn video_bit_rate_steers_output_size() {
    let Some(input) = fixture() else { return };
    let dir = tempfile::tempdir().unwrap();
    let starved = dir.path().join("starved.mp4");
    let generous = dir.path().join("generous.mp4");

    let mut low = EncodeParameter::new();
    low.set_video_codec_name("libx264");
    low.set_video_bit_rate(150_000);
    low.set_preset("veryfast");
    let (mut converter, _) = make_converter(low);
    assert!(converter.convert_format(&input, &starved));

    let mut high = EncodeParameter::new();
    high.set_video_codec_name("libx264");
    high.set_video_bit_rate(4_000_000);
    high.set_preset("veryfast");
    let (mut converter, _) = make_converter(high);
    assert!(converter.convert_format(&input, &generous));

    assert!(output_size(&starved) < output_size(&input));
    assert!(output_size(&generous) > output_size(&starved));
}

#[test]
fn audio_transcode_keeps_video_copied() {
    let Some(input) = fixture() else { return };
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("reaudio.mp4");

    let mut param = EncodeParameter::new();
    param.set_audio_codec_name("aac");
    param.set_audio_bit_rate(96_000);

    let (mut converter, _) = make_converter(param);
    assert!(converter.convert_format(&input, &output));

    let source = probe(&input).unwrap();
    let result = probe(&output).unwrap();
    assert_eq!(result.audio_codec, "aac");
    assert_eq!(source.video_codec, result.video_codec);
}

#[test]
fn audio_extraction_drops_video() {
    let Some(input) = fixture() else { return };
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("sound.aac");

    let mut param = EncodeParameter::new();
    param.set_audio_codec_name("aac");
    param.set_audio_bit_rate(128_000);

    let (mut converter, _) = make_converter(param);
    assert!(converter.convert_format(&input, &output));

    let result = probe(&output).unwrap();
    assert!(result.has_audio());
    assert!(!result.has_video());
}

#[test]
fn trim_in_copy_mode_shortens_output() {
    let Some(input) = fixture() else { return };
    let source = probe(&input).unwrap();
    if source.duration_seconds < 2.0 {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("cut.mp4");

    let mut param = EncodeParameter::new();
    param.set_start_time(0.0);
    param.set_end_time(1.0);

    let (mut converter, _) = make_converter(param);
    assert!(converter.convert_format(&input, &output));

    assert!(output_size(&output) < output_size(&input));
    let result = probe(&output).unwrap();
    // The cut lands on packet boundaries, so allow a frame of slack.
    assert!(result.duration_seconds < source.duration_seconds);
    assert!((result.duration_seconds - 1.0).abs() < 0.5);
}

#[test]
fn start_time_alone_drops_the_leading_seconds() {
    let Some(input) = fixture() else { return };
    let source = probe(&input).unwrap();
    if source.duration_seconds < 3.0 {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("tail.mp4");

    let mut param = EncodeParameter::new();
    param.set_start_time(1.0);

    let (mut converter, _) = make_converter(param);
    assert!(converter.convert_format(&input, &output));

    let result = probe(&output).unwrap();
    let expected = source.duration_seconds - 1.0;
    // The seek lands on the keyframe before the start point, so allow
    // a frame of slack on either side.
    assert!(result.duration_seconds < source.duration_seconds);
    assert!((result.duration_seconds - expected).abs() < 0.5);
}

#[test]
fn backward_trim_window_fails_without_output() {
    let Some(input) = fixture() else { return };
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.mp4");

    let mut param = EncodeParameter::new();
    param.set_start_time(2.0);
    param.set_end_time(1.0);

    let (mut converter, _) = make_converter(param);
    assert!(!converter.convert_format(&input, &output));
    // The window is rejected before the output file is created.
    assert!(!output.exists());
}

#[test]
fn progress_runs_forward_to_completion() {
    struct Recorder {
        seen: Mutex<Vec<f64>>,
        eta_seen: AtomicBool,
    }
    impl ProgressObserver for Recorder {
        fn on_progress(&self, percent: f64) {
            self.seen.lock().unwrap().push(percent);
        }
        fn on_time_remaining(&self, _seconds: f64) {
            self.eta_seen.store(true, Ordering::SeqCst);
        }
    }

    let Some(input) = fixture() else { return };
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("watched.mkv");

    let (mut converter, process) = make_converter(EncodeParameter::new());
    let recorder = Arc::new(Recorder {
        seen: Mutex::new(Vec::new()),
        eta_seen: AtomicBool::new(false),
    });
    process.add_observer(recorder.clone());

    assert!(converter.convert_format(&input, &output));

    let seen = recorder.seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(*seen.last().unwrap(), 100.0);
}

#[test]
fn unknown_codec_fails() {
    let Some(input) = fixture() else { return };
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.mp4");

    let mut param = EncodeParameter::new();
    param.set_video_codec_name("definitely-not-a-codec");

    let (mut converter, _) = make_converter(param);
    assert!(!converter.convert_format(&input, &output));
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.mp4");
    let (mut converter, _) = make_converter(EncodeParameter::new());
    assert!(!converter.convert_format(Path::new("/no/such/input.mp4"), &output));
    assert!(!output.exists());
}

#[test]
fn unwritable_output_fails() {
    let Some(input) = fixture() else { return };
    let (mut converter, _) = make_converter(EncodeParameter::new());
    assert!(!converter.convert_format(&input, Path::new("/no/such/dir/out.mp4")));
}
