/*!
    Frame filtering between decoder and encoder.

    Every re-encoded stream runs through a libavfilter graph, even when
    the graph is just `null` / `anull`. That keeps the packet loop
    uniform and, on the audio side, lets the buffersink repackage frames
    to the fixed size encoders like AAC insist on.
*/

use ffmpeg_next::{codec, decoder, encoder, ffi, filter, frame, ChannelLayout, Rational};

use convert_types::{EncodeParameter, Error, Result};

/** Fallback graph that passes audio frames through untouched. */
pub const AUDIO_PASSTHROUGH: &str = "anull";

/**
    Builds the video filter description for `param`: a `format`
    conversion when a pixel format is requested, a `scale` step when
    both dimensions are, otherwise `null`.
*/
pub fn video_description(param: &EncodeParameter) -> String {
    let mut description = String::new();
    if let Some(format) = param.pixel_format() {
        description.push_str(&format!("format={format}"));
    }
    if let (Some(width), Some(height)) = (param.width(), param.height()) {
        if !description.is_empty() {
            description.push(',');
        }
        description.push_str(&format!("scale={width}:{height}"));
    }
    if description.is_empty() {
        description.push_str("null");
    }
    description
}

/** A parsed and validated filter graph with one input and one output. */
pub struct FilterPipeline {
    graph: filter::Graph,
}

impl FilterPipeline {
    /** Builds a video graph fed from `decoder`'s output geometry. */
    pub fn video(
        decoder: &decoder::Video,
        time_base: Rational,
        description: &str,
    ) -> Result<Self> {
        let pixel_format = decoder
            .format()
            .descriptor()
            .map(|d| d.name())
            .ok_or_else(|| Error::invalid_data("decoder reports no pixel format"))?;
        let mut aspect = decoder.aspect_ratio();
        if aspect.numerator() <= 0 {
            aspect = Rational::new(0, 1);
        }
        let args = format!(
            "video_size={}x{}:pix_fmt={}:time_base={}/{}:pixel_aspect={}/{}",
            decoder.width(),
            decoder.height(),
            pixel_format,
            time_base.numerator(),
            time_base.denominator(),
            aspect.numerator(),
            aspect.denominator(),
        );

        let mut graph = filter::Graph::new();
        graph
            .add(&lookup("buffer")?, "in", &args)
            .map_err(|e| Error::codec(format!("failed to create buffer source: {e}")))?;
        graph
            .add(&lookup("buffersink")?, "out", "")
            .map_err(|e| Error::codec(format!("failed to create buffer sink: {e}")))?;

        parse_and_validate(&mut graph, description)?;
        Ok(Self { graph })
    }

    /**
        Builds an audio graph fed from `decoder` and constrained to what
        the opened `encoder` accepts. When the encoder works on a fixed
        frame size the sink is pinned to it.
    */
    pub fn audio(
        decoder: &decoder::Audio,
        time_base: Rational,
        encoder: &encoder::Audio,
        description: &str,
    ) -> Result<Self> {
        let mut layout = decoder.channel_layout();
        if layout.bits() == 0 {
            layout = ChannelLayout::default(decoder.channels() as i32);
        }
        let args = format!(
            "time_base={}/{}:sample_rate={}:sample_fmt={}:channel_layout=0x{:x}",
            time_base.numerator(),
            time_base.denominator(),
            decoder.rate(),
            decoder.format().name(),
            layout.bits(),
        );

        let mut graph = filter::Graph::new();
        graph
            .add(&lookup("abuffer")?, "in", &args)
            .map_err(|e| Error::codec(format!("failed to create abuffer source: {e}")))?;
        graph
            .add(&lookup("abuffersink")?, "out", "")
            .map_err(|e| Error::codec(format!("failed to create abuffer sink: {e}")))?;

        {
            let mut sink = graph
                .get("out")
                .ok_or_else(|| Error::codec("abuffersink vanished from graph"))?;
            sink.set_sample_format(encoder.format());
            sink.set_channel_layout(encoder.channel_layout());
            sink.set_sample_rate(encoder.rate());
        }

        parse_and_validate(&mut graph, description)?;

        if let Some(codec) = encoder.codec() {
            let fixed_frames = !codec
                .capabilities()
                .contains(codec::capabilities::Capabilities::VARIABLE_FRAME_SIZE);
            if fixed_frames {
                if let Some(mut sink) = graph.get("out") {
                    sink.sink().set_frame_size(encoder.frame_size());
                }
            }
        }

        Ok(Self { graph })
    }

    /** Feeds one decoded frame into the graph. */
    pub fn push(&mut self, frame: &frame::Frame) -> Result<()> {
        self.source()?
            .source()
            .add(frame)
            .map_err(|e| Error::codec(format!("failed to feed filter graph: {e}")))
    }

    /** Signals end of stream to the graph so it drains buffered frames. */
    pub fn flush(&mut self) -> Result<()> {
        self.source()?
            .source()
            .flush()
            .map_err(|e| Error::codec(format!("failed to flush filter graph: {e}")))
    }

    /** Pulls one filtered frame; false once the graph has none ready. */
    pub fn pull(&mut self, frame: &mut frame::Frame) -> Result<bool> {
        let mut sink = self
            .graph
            .get("out")
            .ok_or_else(|| Error::codec("filter graph has no sink"))?;
        match sink.sink().frame(frame) {
            Ok(()) => Ok(true),
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => Ok(false),
            Err(ffmpeg_next::Error::Eof) => Ok(false),
            Err(e) => Err(Error::codec(format!("failed to pull filtered frame: {e}"))),
        }
    }

    fn source(&mut self) -> Result<filter::Context> {
        self.graph
            .get("in")
            .ok_or_else(|| Error::codec("filter graph has no source"))
    }
}

fn lookup(name: &str) -> Result<filter::Filter> {
    filter::find(name).ok_or_else(|| Error::codec(format!("filter {name} not available")))
}

fn parse_and_validate(graph: &mut filter::Graph, description: &str) -> Result<()> {
    graph
        .output("in", 0)
        .and_then(|parser| parser.input("out", 0))
        .and_then(|parser| parser.parse(description))
        .map_err(|e| Error::codec(format!("failed to parse filter graph {description:?}: {e}")))?;
    graph
        .validate()
        .map_err(|e| Error::codec(format!("invalid filter graph {description:?}: {e}")))
}
