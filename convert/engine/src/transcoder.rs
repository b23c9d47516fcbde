/*!
    The FFmpeg-backed conversion backend.

    One [FFmpegTranscoder::transcode] call walks the whole job: open and
    probe the input, decide copy or re-encode per stream, write the
    header, optionally seek to the trim start, pump packets until the
    input or the trim end runs out, then drain decoders, filters, and
    encoders before the trailer. Failures surface through the log; the
    caller only sees a boolean.
*/

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ffmpeg_next::{ffi, frame, media, picture, Dictionary, Packet, Rational, Rescale};
use ffmpeg_next::codec;
use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::ChannelLayout;
use tracing::{debug, error, warn};

use convert_types::{EncodeParameter, Error, ProcessParameter, Result};

use crate::filter::{self, FilterPipeline};
use crate::stream_context::{
    AudioDecoderState, AudioEncoderState, AudioMode, DecodeContext, EncodeContext,
    VideoDecoderState, VideoEncoderState, VideoMode,
};

/** A conversion backend: turns one input file into one output file. */
pub trait Transcode {
    /**
        Runs the conversion end to end. True only when the output was
        fully written, trailer included; any failure along the way is
        logged and reported as false. A partial output file may remain
        on disk after a failure.
    */
    fn transcode(&mut self, input: &Path, output: &Path) -> bool;
}

/** The in-process backend built on the FFmpeg libraries. */
pub struct FFmpegTranscoder {
    process: Arc<ProcessParameter>,
    encode: Arc<EncodeParameter>,
}

impl FFmpegTranscoder {
    pub fn new(process: Arc<ProcessParameter>, encode: Arc<EncodeParameter>) -> Self {
        Self { process, encode }
    }
}

impl Transcode for FFmpegTranscoder {
    fn transcode(&mut self, input: &Path, output: &Path) -> bool {
        match run_job(&self.encode, &self.process, input, output) {
            Ok(()) => true,
            Err(e) => {
                error!(
                    input = %input.display(),
                    output = %output.display(),
                    "conversion failed: {e}"
                );
                false
            }
        }
    }
}

fn run_job(
    param: &EncodeParameter,
    process: &ProcessParameter,
    input_path: &Path,
    output_path: &Path,
) -> Result<()> {
    validate_trim(param)?;

    let mut dec = DecodeContext::open(input_path)?;
    let total_us = dec.total_duration_us();
    if total_us == 0 {
        warn!(input = %input_path.display(), "input reports no duration, progress disabled");
    }

    let mut enc = EncodeContext::create(output_path)?;
    prepare_streams(param, &dec, &mut enc)?;
    if matches!(enc.video, VideoMode::Skip) && matches!(enc.audio, AudioMode::Skip) {
        return Err(Error::unsupported_format(
            "output container accepts neither stream of the input",
        ));
    }

    enc.output
        .write_header()
        .map_err(|e| Error::codec(format!("failed to write header: {e}")))?;
    // The muxer may have substituted its own stream time bases.
    refresh_output_time_bases(&mut enc);

    let start_time = param.start_time().filter(|seconds| *seconds > 0.0);
    if let Some(start) = start_time {
        let position = (start * f64::from(ffi::AV_TIME_BASE)) as i64;
        dec.input
            .seek(position, ..position)
            .map_err(|e| Error::codec(format!("failed to seek to {start}s: {e}")))?;
        dec.flush_decoders();
    }

    // Trim end and progress are judged on one reference stream.
    let reference_index = dec
        .video
        .as_ref()
        .map(|v| v.index)
        .or_else(|| dec.audio.as_ref().map(|a| a.index));
    let end_time = param.end_time();
    let mut progress = ProgressTracker::new(process, total_us);

    'packets: loop {
        let (stream_index, mut packet, in_time_base) = match dec.input.packets().next() {
            Some((stream, packet)) => (stream.index(), packet, stream.time_base()),
            None => break 'packets,
        };

        if let Some(pts) = packet.pts() {
            let seconds = pts_seconds(pts, in_time_base);
            // The seek above lands on a keyframe at or before the start,
            // so the window boundary still has to be enforced here.
            if start_time.is_some_and(|start| seconds < start) {
                continue 'packets;
            }
            if Some(stream_index) == reference_index {
                if end_time.is_some_and(|end| seconds >= end) {
                    break 'packets;
                }
                progress.update(pts, in_time_base);
            }
        }

        if let Some(vdec) = dec.video.as_mut() {
            if vdec.index == stream_index {
                match &mut enc.video {
                    VideoMode::Skip => {}
                    VideoMode::Copy {
                        out_index,
                        out_time_base,
                    } => write_copied_packet(
                        &mut packet,
                        *out_index,
                        in_time_base,
                        *out_time_base,
                        &mut enc.output,
                    )?,
                    VideoMode::Encode(state) => transcode_video_packet(
                        &packet,
                        vdec,
                        &mut dec.video_frame,
                        state,
                        &mut enc.output,
                    )?,
                }
                continue 'packets;
            }
        }
        if let Some(adec) = dec.audio.as_mut() {
            if adec.index == stream_index {
                match &mut enc.audio {
                    AudioMode::Skip => {}
                    AudioMode::Copy {
                        out_index,
                        out_time_base,
                    } => write_copied_packet(
                        &mut packet,
                        *out_index,
                        in_time_base,
                        *out_time_base,
                        &mut enc.output,
                    )?,
                    AudioMode::Encode(state) => transcode_audio_packet(
                        &packet,
                        adec,
                        &mut dec.audio_frame,
                        state,
                        &mut enc.output,
                    )?,
                }
            }
        }
    }

    if let (Some(vdec), VideoMode::Encode(state)) = (dec.video.as_mut(), &mut enc.video) {
        flush_video_pipeline(vdec, &mut dec.video_frame, state, &mut enc.output)?;
    }
    if let (Some(adec), AudioMode::Encode(state)) = (dec.audio.as_mut(), &mut enc.audio) {
        flush_audio_pipeline(adec, &mut dec.audio_frame, state, &mut enc.output)?;
    }

    process.set_progress(1, 1);
    enc.output
        .write_trailer()
        .map_err(|e| Error::codec(format!("failed to write trailer: {e}")))?;
    debug!(output = %output_path.display(), "conversion finished");
    Ok(())
}

/** Rejects trim windows whose end does not come after their start. */
fn validate_trim(param: &EncodeParameter) -> Result<()> {
    if let Some(end) = param.end_time() {
        let start = param.start_time().unwrap_or(0.0);
        if end <= start {
            return Err(Error::InvalidRange { start, end });
        }
    }
    Ok(())
}

/**
    Walks the input streams in order and decides, per elementary type,
    between packet copy and a full decode/filter/encode chain. Streams
    the output container cannot carry are dropped with a log line.
*/
fn prepare_streams(
    param: &EncodeParameter,
    dec: &DecodeContext,
    enc: &mut EncodeContext,
) -> Result<()> {
    let layout: Vec<(usize, media::Type, codec::Parameters)> = dec
        .input
        .streams()
        .map(|stream| (stream.index(), stream.parameters().medium(), stream.parameters()))
        .collect();

    for (index, medium, parameters) in layout {
        match medium {
            media::Type::Video => {
                let Some(vdec) = dec.video.as_ref().filter(|v| v.index == index) else {
                    continue;
                };
                if !enc.supports(media::Type::Video) {
                    debug!("output container carries no video, dropping stream {index}");
                    continue;
                }
                enc.video = match param.video_codec_name() {
                    None => VideoMode::Copy {
                        out_index: add_copied_stream(&mut enc.output, parameters, medium)?,
                        out_time_base: vdec.time_base,
                    },
                    Some(name) => VideoMode::Encode(Box::new(open_video_encoder(
                        param,
                        name,
                        vdec,
                        &mut enc.output,
                    )?)),
                };
            }
            media::Type::Audio => {
                let Some(adec) = dec.audio.as_ref().filter(|a| a.index == index) else {
                    continue;
                };
                if !enc.supports(media::Type::Audio) {
                    debug!("output container carries no audio, dropping stream {index}");
                    continue;
                }
                enc.audio = match param.audio_codec_name() {
                    None => AudioMode::Copy {
                        out_index: add_copied_stream(&mut enc.output, parameters, medium)?,
                        out_time_base: adec.time_base,
                    },
                    Some(name) => AudioMode::Encode(Box::new(open_audio_encoder(
                        param,
                        name,
                        adec,
                        &mut enc.output,
                    )?)),
                };
            }
            _ => {}
        }
    }
    Ok(())
}

/** Adds an output stream that mirrors the input stream's parameters. */
fn add_copied_stream(
    output: &mut Output,
    parameters: codec::Parameters,
    medium: media::Type,
) -> Result<usize> {
    let mut ost = output
        .add_stream(ffmpeg_next::encoder::find(codec::Id::None))
        .map_err(|e| Error::codec(format!("failed to add output stream: {e}")))?;
    ost.set_parameters(parameters);
    // Container-specific codec tags ("mp4a" and friends) do not survive
    // a change of container family, so copied audio gets a neutral tag.
    if medium == media::Type::Audio {
        unsafe {
            (*ost.parameters().as_mut_ptr()).codec_tag = 0;
        }
    }
    Ok(ost.index())
}

fn open_video_encoder(
    param: &EncodeParameter,
    name: &str,
    vdec: &VideoDecoderState,
    output: &mut Output,
) -> Result<VideoEncoderState> {
    let codec = ffmpeg_next::encoder::find_by_name(name)
        .ok_or_else(|| Error::unsupported_format(format!("video encoder {name} not found")))?;
    let mut encoder = codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()
        .map_err(|e| Error::codec(e.to_string()))?;

    let decoder = &vdec.decoder;
    encoder.set_width(param.width().unwrap_or_else(|| decoder.width()));
    encoder.set_height(param.height().unwrap_or_else(|| decoder.height()));
    encoder.set_aspect_ratio(decoder.aspect_ratio());

    // Pixel format: requested, else the source's, else the encoder's first.
    let pixel_format = if let Some(name) = param.pixel_format() {
        name.parse::<Pixel>()
            .map_err(|_| Error::unsupported_format(format!("unknown pixel format {name}")))?
    } else if decoder.format() != Pixel::None {
        decoder.format()
    } else {
        codec
            .video()
            .ok()
            .and_then(|video| video.formats().and_then(|mut formats| formats.next()))
            .unwrap_or(Pixel::YUV420P)
    };
    encoder.set_format(pixel_format);

    // Encoder clock follows the source frame rate.
    let frame_rate = if vdec.avg_frame_rate.numerator() > 0 {
        vdec.avg_frame_rate
    } else {
        Rational::new(25, 1)
    };
    encoder.set_frame_rate(Some(frame_rate));
    let time_base = Rational::new(frame_rate.denominator(), frame_rate.numerator());
    encoder.set_time_base(time_base);

    // Rate control: qscale wins, then the requested bitrate, then the
    // source bitrate, then whatever the encoder defaults to.
    let quality = param.qscale();
    if let Some(qscale) = quality {
        encoder.set_flags(codec::Flags::QSCALE);
        unsafe {
            (*encoder.as_mut_ptr()).global_quality = qscale * ffi::FF_QP2LAMBDA as i32;
        }
    } else {
        let bit_rate = param
            .video_bit_rate()
            .unwrap_or(decoder.bit_rate() as i64);
        if bit_rate > 0 {
            encoder.set_bit_rate(bit_rate as usize);
        }
    }

    let mut options = Dictionary::new();
    options.set("preset", param.preset().unwrap_or("medium"));
    match codec.id() {
        codec::Id::H264 => options.set("x264-params", "keyint=60:min-keyint=60:scenecut=0"),
        codec::Id::HEVC => options.set("x265-params", "keyint=60:min-keyint=60:scenecut=0"),
        _ => {}
    }

    let encoder = encoder
        .open_with(options)
        .map_err(|e| Error::codec(format!("failed to open video encoder {name}: {e}")))?;

    let mut ost = output
        .add_stream(codec)
        .map_err(|e| Error::codec(format!("failed to add video stream: {e}")))?;
    ost.set_time_base(time_base);
    unsafe {
        let stream = ost.as_mut_ptr();
        (*stream).r_frame_rate = frame_rate.into();
        (*stream).avg_frame_rate = frame_rate.into();
    }
    ost.set_parameters(&encoder);
    let out_index = ost.index();

    let filter = FilterPipeline::video(
        &vdec.decoder,
        vdec.time_base,
        &filter::video_description(param),
    )?;

    Ok(VideoEncoderState {
        out_index,
        time_base,
        out_time_base: time_base,
        encoder,
        filter,
        quality,
    })
}

fn open_audio_encoder(
    param: &EncodeParameter,
    name: &str,
    adec: &AudioDecoderState,
    output: &mut Output,
) -> Result<AudioEncoderState> {
    let codec = ffmpeg_next::encoder::find_by_name(name)
        .ok_or_else(|| Error::unsupported_format(format!("audio encoder {name} not found")))?;
    let mut encoder = codec::context::Context::new_with_codec(codec)
        .encoder()
        .audio()
        .map_err(|e| Error::codec(e.to_string()))?;

    let decoder = &adec.decoder;
    encoder.set_rate(decoder.rate() as i32);
    encoder.set_channel_layout(ChannelLayout::STEREO);
    let format = codec
        .audio()
        .ok()
        .and_then(|audio| audio.formats().and_then(|mut formats| formats.next()))
        .unwrap_or_else(|| decoder.format());
    encoder.set_format(format);
    let bit_rate = param
        .audio_bit_rate()
        .unwrap_or(decoder.bit_rate() as i64);
    if bit_rate > 0 {
        encoder.set_bit_rate(bit_rate as usize);
    }
    let time_base = Rational::new(1, decoder.rate() as i32);
    encoder.set_time_base(time_base);
    // The native AAC encoder sits behind the experimental gate.
    unsafe {
        (*encoder.as_mut_ptr()).strict_std_compliance = ffi::FF_COMPLIANCE_EXPERIMENTAL;
    }

    let encoder = encoder
        .open_as(codec)
        .map_err(|e| Error::codec(format!("failed to open audio encoder {name}: {e}")))?;

    let mut ost = output
        .add_stream(codec)
        .map_err(|e| Error::codec(format!("failed to add audio stream: {e}")))?;
    ost.set_time_base(time_base);
    ost.set_parameters(&encoder);
    let out_index = ost.index();

    let filter = FilterPipeline::audio(
        &adec.decoder,
        adec.time_base,
        &encoder,
        filter::AUDIO_PASSTHROUGH,
    )?;

    Ok(AudioEncoderState {
        out_index,
        time_base,
        out_time_base: time_base,
        encoder,
        filter,
    })
}

/** Re-reads output stream time bases after the header was written. */
fn refresh_output_time_bases(enc: &mut EncodeContext) {
    if let VideoMode::Copy { out_index, out_time_base } = &mut enc.video {
        if let Some(stream) = enc.output.stream(*out_index) {
            *out_time_base = stream.time_base();
        }
    }
    if let VideoMode::Encode(state) = &mut enc.video {
        if let Some(stream) = enc.output.stream(state.out_index) {
            state.out_time_base = stream.time_base();
        }
    }
    if let AudioMode::Copy { out_index, out_time_base } = &mut enc.audio {
        if let Some(stream) = enc.output.stream(*out_index) {
            *out_time_base = stream.time_base();
        }
    }
    if let AudioMode::Encode(state) = &mut enc.audio {
        if let Some(stream) = enc.output.stream(state.out_index) {
            state.out_time_base = stream.time_base();
        }
    }
}

fn write_copied_packet(
    packet: &mut Packet,
    out_index: usize,
    in_time_base: Rational,
    out_time_base: Rational,
    output: &mut Output,
) -> Result<()> {
    packet.set_stream(out_index);
    packet.set_position(-1);
    packet.rescale_ts(in_time_base, out_time_base);
    packet
        .write_interleaved(output)
        .map_err(|e| Error::codec(format!("failed to write copied packet: {e}")))
}

/** Maps one receive result to "got one" / "drained" / hard error. */
fn received(
    result: std::result::Result<(), ffmpeg_next::Error>,
    what: &str,
) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => Ok(false),
        Err(ffmpeg_next::Error::Eof) => Ok(false),
        Err(e) => Err(Error::codec(format!("{what}: {e}"))),
    }
}

fn transcode_video_packet(
    packet: &Packet,
    vdec: &mut VideoDecoderState,
    decoded: &mut frame::Video,
    state: &mut VideoEncoderState,
    output: &mut Output,
) -> Result<()> {
    vdec.decoder
        .send_packet(packet)
        .map_err(|e| Error::codec(format!("failed to send packet to video decoder: {e}")))?;
    while received(vdec.decoder.receive_frame(decoded), "video decoder")? {
        filter_and_encode_video(decoded, vdec.time_base, state, output)?;
    }
    Ok(())
}

fn filter_and_encode_video(
    decoded: &frame::Video,
    in_time_base: Rational,
    state: &mut VideoEncoderState,
    output: &mut Output,
) -> Result<()> {
    state.filter.push(decoded)?;
    drain_video_filter(in_time_base, state, output)
}

fn drain_video_filter(
    in_time_base: Rational,
    state: &mut VideoEncoderState,
    output: &mut Output,
) -> Result<()> {
    let mut filtered = frame::Video::empty();
    while state.filter.pull(&mut filtered)? {
        encode_video_frame(&mut filtered, in_time_base, state, output)?;
    }
    Ok(())
}

fn encode_video_frame(
    frame: &mut frame::Video,
    in_time_base: Rational,
    state: &mut VideoEncoderState,
    output: &mut Output,
) -> Result<()> {
    let rescaled_pts = frame.pts().map(|pts| pts.rescale(in_time_base, state.time_base));
    frame.set_pts(rescaled_pts);
    if let Some(qscale) = state.quality {
        // Frame-level quality must match the context, and the picture
        // type is cleared so the encoder makes its own keyframe calls.
        unsafe {
            (*frame.as_mut_ptr()).quality = qscale * ffi::FF_QP2LAMBDA as i32;
        }
        frame.set_kind(picture::Type::None);
    }
    state
        .encoder
        .send_frame(frame)
        .map_err(|e| Error::codec(format!("failed to send frame to video encoder: {e}")))?;
    write_encoded_video(state, output)
}

fn write_encoded_video(state: &mut VideoEncoderState, output: &mut Output) -> Result<()> {
    let mut encoded = Packet::empty();
    while received(state.encoder.receive_packet(&mut encoded), "video encoder")? {
        encoded.set_stream(state.out_index);
        encoded.rescale_ts(state.time_base, state.out_time_base);
        encoded
            .write_interleaved(output)
            .map_err(|e| Error::codec(format!("failed to write video packet: {e}")))?;
    }
    Ok(())
}

/** Decoder EOF, filter flush, then encoder EOF, draining each stage. */
fn flush_video_pipeline(
    vdec: &mut VideoDecoderState,
    decoded: &mut frame::Video,
    state: &mut VideoEncoderState,
    output: &mut Output,
) -> Result<()> {
    vdec.decoder
        .send_eof()
        .map_err(|e| Error::codec(format!("failed to flush video decoder: {e}")))?;
    while received(vdec.decoder.receive_frame(decoded), "video decoder")? {
        filter_and_encode_video(decoded, vdec.time_base, state, output)?;
    }

    state.filter.flush()?;
    drain_video_filter(vdec.time_base, state, output)?;

    state
        .encoder
        .send_eof()
        .map_err(|e| Error::codec(format!("failed to flush video encoder: {e}")))?;
    write_encoded_video(state, output)
}

fn transcode_audio_packet(
    packet: &Packet,
    adec: &mut AudioDecoderState,
    decoded: &mut frame::Audio,
    state: &mut AudioEncoderState,
    output: &mut Output,
) -> Result<()> {
    adec.decoder
        .send_packet(packet)
        .map_err(|e| Error::codec(format!("failed to send packet to audio decoder: {e}")))?;
    while received(adec.decoder.receive_frame(decoded), "audio decoder")? {
        filter_and_encode_audio(decoded, adec.time_base, state, output)?;
    }
    Ok(())
}

fn filter_and_encode_audio(
    decoded: &frame::Audio,
    in_time_base: Rational,
    state: &mut AudioEncoderState,
    output: &mut Output,
) -> Result<()> {
    state.filter.push(decoded)?;
    drain_audio_filter(in_time_base, state, output)
}

fn drain_audio_filter(
    in_time_base: Rational,
    state: &mut AudioEncoderState,
    output: &mut Output,
) -> Result<()> {
    let mut filtered = frame::Audio::empty();
    while state.filter.pull(&mut filtered)? {
        encode_audio_frame(&mut filtered, in_time_base, state, output)?;
    }
    Ok(())
}

fn encode_audio_frame(
    frame: &mut frame::Audio,
    in_time_base: Rational,
    state: &mut AudioEncoderState,
    output: &mut Output,
) -> Result<()> {
    let rescaled_pts = frame.pts().map(|pts| pts.rescale(in_time_base, state.time_base));
    frame.set_pts(rescaled_pts);
    state
        .encoder
        .send_frame(frame)
        .map_err(|e| Error::codec(format!("failed to send frame to audio encoder: {e}")))?;
    write_encoded_audio(state, output)
}

fn write_encoded_audio(state: &mut AudioEncoderState, output: &mut Output) -> Result<()> {
    let mut encoded = Packet::empty();
    while received(state.encoder.receive_packet(&mut encoded), "audio encoder")? {
        encoded.set_stream(state.out_index);
        encoded.rescale_ts(state.time_base, state.out_time_base);
        encoded
            .write_interleaved(output)
            .map_err(|e| Error::codec(format!("failed to write audio packet: {e}")))?;
    }
    Ok(())
}

fn flush_audio_pipeline(
    adec: &mut AudioDecoderState,
    decoded: &mut frame::Audio,
    state: &mut AudioEncoderState,
    output: &mut Output,
) -> Result<()> {
    adec.decoder
        .send_eof()
        .map_err(|e| Error::codec(format!("failed to flush audio decoder: {e}")))?;
    while received(adec.decoder.receive_frame(decoded), "audio decoder")? {
        filter_and_encode_audio(decoded, adec.time_base, state, output)?;
    }

    state.filter.flush()?;
    drain_audio_filter(adec.time_base, state, output)?;

    state
        .encoder
        .send_eof()
        .map_err(|e| Error::codec(format!("failed to flush audio encoder: {e}")))?;
    write_encoded_audio(state, output)
}

fn pts_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/** Rate-limits progress publication from the packet loop. */
struct ProgressTracker<'a> {
    process: &'a ProcessParameter,
    total_us: i64,
    /** High-water mark, so reordered B-frame timestamps cannot run it backward. */
    furthest_us: i64,
    started: Instant,
    last_published: Option<Instant>,
}

impl<'a> ProgressTracker<'a> {
    const PUBLISH_INTERVAL: Duration = Duration::from_millis(100);

    fn new(process: &'a ProcessParameter, total_us: i64) -> Self {
        Self {
            process,
            total_us,
            furthest_us: 0,
            started: Instant::now(),
            last_published: None,
        }
    }

    fn update(&mut self, pts: i64, time_base: Rational) {
        if self.total_us <= 0 {
            return;
        }
        let now = Instant::now();
        if self
            .last_published
            .is_some_and(|last| now.duration_since(last) < Self::PUBLISH_INTERVAL)
        {
            return;
        }
        let current_us = pts.rescale(time_base, Rational::new(1, 1_000_000));
        if current_us <= self.furthest_us {
            return;
        }
        self.furthest_us = current_us;
        self.last_published = Some(now);
        self.process.set_progress(current_us, self.total_us);

        let elapsed = now.duration_since(self.started).as_secs_f64();
        let remaining_us = (self.total_us - current_us).max(0);
        self.process
            .set_time_remaining(elapsed * remaining_us as f64 / current_us as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pts_converts_with_the_time_base() {
        assert_eq!(pts_seconds(90_000, Rational::new(1, 90_000)), 1.0);
        assert_eq!(pts_seconds(50, Rational::new(1, 25)), 2.0);
        assert_eq!(pts_seconds(0, Rational::new(1, 1_000)), 0.0);
    }

    #[test]
    fn trim_window_must_be_forward() {
        let mut param = EncodeParameter::new();
        param.set_start_time(2.0);
        param.set_end_time(1.0);
        assert!(matches!(
            validate_trim(&param),
            Err(Error::InvalidRange { start, end }) if start == 2.0 && end == 1.0
        ));
    }

    #[test]
    fn equal_bounds_are_rejected() {
        let mut param = EncodeParameter::new();
        param.set_start_time(3.0);
        param.set_end_time(3.0);
        assert!(validate_trim(&param).is_err());
    }

    #[test]
    fn end_without_start_counts_from_zero() {
        let mut param = EncodeParameter::new();
        param.set_end_time(5.0);
        assert!(validate_trim(&param).is_ok());
    }

    #[test]
    fn open_windows_are_fine() {
        let mut param = EncodeParameter::new();
        param.set_start_time(1.5);
        assert!(validate_trim(&param).is_ok());
        assert!(validate_trim(&EncodeParameter::new()).is_ok());
    }

    #[test]
    fn progress_tracker_is_throttled() {
        let process = ProcessParameter::new();
        let mut tracker = ProgressTracker::new(&process, 10_000_000);
        tracker.update(1_000_000, Rational::new(1, 1_000_000));
        let first = process.percent();
        tracker.update(2_000_000, Rational::new(1, 1_000_000));
        // The second update lands inside the publish interval.
        assert_eq!(process.percent(), first);
    }
}
