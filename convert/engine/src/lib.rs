/*!
    The conversion engine.

    One [Converter] drives one job: it holds the selected [Transcode]
    backend and hands it an input and output path. The bundled backend,
    [FFmpegTranscoder], links the FFmpeg libraries directly and decides
    per stream between packet copy and a decode, filter, encode chain.
    [probe] answers the lighter question of what a file contains.
*/

mod converter;
mod filter;
mod probe;
mod stream_context;
mod transcoder;

pub use converter::Converter;
pub use filter::FilterPipeline;
pub use probe::probe;
pub use transcoder::{FFmpegTranscoder, Transcode};
