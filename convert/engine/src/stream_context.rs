/*!
    Per-file decode and encode state.

    [DecodeContext] owns the demuxer plus one opened decoder per selected
    stream; [EncodeContext] owns the muxer plus a per-type [VideoMode] /
    [AudioMode] that records whether packets are copied, re-encoded, or
    dropped. Both live exactly as long as one conversion.
*/

use std::io;
use std::path::Path;

use ffmpeg_next::format::stream::Stream;
use ffmpeg_next::{codec, decoder, ffi, format, frame, media, Rational, Rescale};

use convert_types::{Error, Result};

use crate::filter::FilterPipeline;

const MICROSECONDS: (i32, i32) = (1, 1_000_000);

/** The opened video decoder together with its source stream facts. */
pub struct VideoDecoderState {
    pub index: usize,
    pub time_base: Rational,
    pub avg_frame_rate: Rational,
    pub decoder: decoder::Video,
}

impl VideoDecoderState {
    fn from_stream(stream: &Stream) -> Result<Self> {
        let context = codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| Error::codec(e.to_string()))?;
        let decoder = context
            .decoder()
            .video()
            .map_err(|e| Error::codec(format!("failed to open video decoder: {e}")))?;
        Ok(Self {
            index: stream.index(),
            time_base: stream.time_base(),
            avg_frame_rate: stream.avg_frame_rate(),
            decoder,
        })
    }
}

/** The opened audio decoder together with its source stream facts. */
pub struct AudioDecoderState {
    pub index: usize,
    pub time_base: Rational,
    pub decoder: decoder::Audio,
}

impl AudioDecoderState {
    fn from_stream(stream: &Stream) -> Result<Self> {
        let context = codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| Error::codec(e.to_string()))?;
        let decoder = context
            .decoder()
            .audio()
            .map_err(|e| Error::codec(format!("failed to open audio decoder: {e}")))?;
        Ok(Self {
            index: stream.index(),
            time_base: stream.time_base(),
            decoder,
        })
    }
}

/** Demuxer plus the decoders for the best video and audio streams. */
pub struct DecodeContext {
    pub input: format::context::Input,
    pub video: Option<VideoDecoderState>,
    pub audio: Option<AudioDecoderState>,
    pub video_frame: frame::Video,
    pub audio_frame: frame::Audio,
}

impl DecodeContext {
    pub fn open(path: &Path) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;
        let input = format::input(&path).map_err(|e| {
            if e.to_string().contains("No such file") {
                Error::Io(io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
            } else {
                Error::invalid_data(format!("failed to open {}: {e}", path.display()))
            }
        })?;

        let video = match input.streams().best(media::Type::Video) {
            Some(stream) => Some(VideoDecoderState::from_stream(&stream)?),
            None => None,
        };
        let audio = match input.streams().best(media::Type::Audio) {
            Some(stream) => Some(AudioDecoderState::from_stream(&stream)?),
            None => None,
        };

        Ok(Self {
            input,
            video,
            audio,
            video_frame: frame::Video::empty(),
            audio_frame: frame::Audio::empty(),
        })
    }

    /** Drops buffered decoder state, e.g. after a seek. */
    pub fn flush_decoders(&mut self) {
        if let Some(video) = &mut self.video {
            video.decoder.flush();
        }
        if let Some(audio) = &mut self.audio {
            audio.decoder.flush();
        }
    }

    /**
        Total playing time in microseconds, or 0 when nothing in the
        file says. Falls back from the container figure to the longest
        per-stream duration, then to a frame-count estimate.
    */
    pub fn total_duration_us(&self) -> i64 {
        let micros = Rational::new(MICROSECONDS.0, MICROSECONDS.1);

        // Container duration is already in AV_TIME_BASE units.
        let container = self.input.duration();
        if container > 0 {
            return container;
        }

        let mut longest = 0i64;
        for stream in self.input.streams() {
            if stream.duration() > 0 {
                longest = longest.max(stream.duration().rescale(stream.time_base(), micros));
            }
        }
        if longest > 0 {
            return longest;
        }

        // Last resort: frame count over the average frame rate.
        for stream in self.input.streams() {
            let rate = stream.avg_frame_rate();
            if stream.frames() > 0 && rate.numerator() > 0 {
                let estimate = (stream.frames() * i64::from(rate.denominator()))
                    .rescale(rate, micros);
                longest = longest.max(estimate);
            }
        }
        longest
    }
}

/** How the output handles one elementary stream type. */
pub enum VideoMode {
    /** Packets pass through untouched, retimed to the output stream. */
    Copy {
        out_index: usize,
        out_time_base: Rational,
    },
    Encode(Box<VideoEncoderState>),
    /** The output container cannot carry this stream type. */
    Skip,
}

pub enum AudioMode {
    Copy {
        out_index: usize,
        out_time_base: Rational,
    },
    Encode(Box<AudioEncoderState>),
    Skip,
}

/** An opened video encoder, its filter chain, and its output stream. */
pub struct VideoEncoderState {
    pub out_index: usize,
    /** Time base the encoder was configured with. */
    pub time_base: Rational,
    /** Time base the muxer settled on; read back after the header. */
    pub out_time_base: Rational,
    pub encoder: ffmpeg_next::encoder::Video,
    pub filter: FilterPipeline,
    /** Per-frame quality value when qscale rate control is active. */
    pub quality: Option<i32>,
}

pub struct AudioEncoderState {
    pub out_index: usize,
    pub time_base: Rational,
    pub out_time_base: Rational,
    pub encoder: ffmpeg_next::encoder::Audio,
    pub filter: FilterPipeline,
}

/** Muxer plus the per-type stream handling decisions. */
pub struct EncodeContext {
    pub output: format::context::Output,
    pub video: VideoMode,
    pub audio: AudioMode,
}

impl EncodeContext {
    /** Allocates the muxer for `path`; stream modes start out as skip. */
    pub fn create(path: &Path) -> Result<Self> {
        let output = format::output(&path).map_err(|e| {
            Error::codec(format!("failed to create {}: {e}", path.display()))
        })?;
        Ok(Self {
            output,
            video: VideoMode::Skip,
            audio: AudioMode::Skip,
        })
    }

    /** Whether the chosen container format can carry `kind` streams. */
    pub fn supports(&self, kind: media::Type) -> bool {
        unsafe {
            let oformat = (*self.output.as_ptr()).oformat;
            if oformat.is_null() {
                return false;
            }
            let id = match kind {
                media::Type::Video => (*oformat).video_codec,
                media::Type::Audio => (*oformat).audio_codec,
                _ => return false,
            };
            id != ffi::AVCodecID::AV_CODEC_ID_NONE
        }
    }
}
