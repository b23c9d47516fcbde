/*!
    The conversion facade frontends talk to.

    A [Converter] pairs the job description with a named [Transcode]
    backend. Only the library-linked FFmpeg backend is compiled into
    this build; the other historical backend names are still recognized
    so callers get a clear answer instead of a typo-shaped one.
*/

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use convert_types::{EncodeParameter, ProcessParameter};

use crate::transcoder::{FFmpegTranscoder, Transcode};

/** Backend names accepted by [Converter::set_transcoder]. */
pub const BACKEND_FFMPEG: &str = "FFMPEG";

pub struct Converter {
    process: Arc<ProcessParameter>,
    encode: Arc<EncodeParameter>,
    transcoder: Option<Box<dyn Transcode>>,
}

impl Converter {
    /** Creates a converter with the FFmpeg backend preselected. */
    pub fn new(process: Arc<ProcessParameter>, encode: Arc<EncodeParameter>) -> Self {
        let transcoder: Box<dyn Transcode> =
            Box::new(FFmpegTranscoder::new(process.clone(), encode.clone()));
        Self {
            process,
            encode,
            transcoder: Some(transcoder),
        }
    }

    /**
        Selects a backend by name, case-insensitively. Returns false and
        clears the selection when the name is unknown or names a backend
        this build does not carry.
    */
    pub fn set_transcoder(&mut self, name: &str) -> bool {
        match name.to_ascii_uppercase().as_str() {
            BACKEND_FFMPEG => {
                self.transcoder = Some(Box::new(FFmpegTranscoder::new(
                    self.process.clone(),
                    self.encode.clone(),
                )));
                true
            }
            "FFTOOL" | "BMF" => {
                warn!("transcoder backend {name} is not part of this build");
                self.transcoder = None;
                false
            }
            _ => {
                warn!("unknown transcoder backend {name}");
                self.transcoder = None;
                false
            }
        }
    }

    /** Runs the conversion with the selected backend. */
    pub fn convert_format(&mut self, input: &Path, output: &Path) -> bool {
        let Some(transcoder) = self.transcoder.as_mut() else {
            error!("no transcoder backend selected");
            return false;
        };
        info!(input = %input.display(), output = %output.display(), "starting conversion");
        transcoder.transcode(input, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> Converter {
        Converter::new(
            Arc::new(ProcessParameter::new()),
            Arc::new(EncodeParameter::new()),
        )
    }

    #[test]
    fn ffmpeg_backend_is_selectable() {
        let mut converter = converter();
        assert!(converter.set_transcoder("FFMPEG"));
        assert!(converter.set_transcoder("ffmpeg"));
    }

    #[test]
    fn known_but_absent_backends_are_refused() {
        let mut converter = converter();
        assert!(!converter.set_transcoder("FFTOOL"));
        assert!(!converter.set_transcoder("BMF"));
    }

    #[test]
    fn unknown_backends_are_refused() {
        let mut converter = converter();
        assert!(!converter.set_transcoder("GSTREAMER"));
    }

    #[test]
    fn refused_backend_blocks_conversion() {
        let mut converter = converter();
        assert!(!converter.set_transcoder("BMF"));
        assert!(!converter.convert_format(Path::new("a.mp4"), Path::new("b.mp4")));
    }
}
