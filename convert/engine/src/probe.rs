/*!
    Quick inspection of a media file without converting it.
*/

use std::path::Path;

use ffmpeg_next::{codec, ffi, format, media};

use convert_types::{Error, MediaSummary, Result};

/** Gathers a [MediaSummary] for the best video and audio streams. */
pub fn probe<P: AsRef<Path>>(path: P) -> Result<MediaSummary> {
    ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;
    let path = path.as_ref();
    let input = format::input(&path)
        .map_err(|e| Error::invalid_data(format!("failed to open {}: {e}", path.display())))?;

    let mut summary = MediaSummary::default();
    if input.duration() > 0 {
        summary.duration_seconds = input.duration() as f64 / f64::from(ffi::AV_TIME_BASE);
    }

    if let Some(stream) = input.streams().best(media::Type::Video) {
        summary.video_index = stream.index() as i32;
        summary.video_codec = codec_name(stream.parameters().id());
        let rate = if stream.avg_frame_rate().numerator() != 0 {
            stream.avg_frame_rate()
        } else {
            stream.rate()
        };
        if rate.numerator() != 0 {
            summary.frame_rate = f64::from(rate);
        }
        if let Ok(context) = codec::context::Context::from_parameters(stream.parameters()) {
            if let Ok(video) = context.decoder().video() {
                summary.width = video.width();
                summary.height = video.height();
                summary.video_bit_rate = video.bit_rate() as i64;
                summary.color_space = format!("{:?}", video.color_space()).to_ascii_lowercase();
            }
        }
    }

    if let Some(stream) = input.streams().best(media::Type::Audio) {
        summary.audio_index = stream.index() as i32;
        summary.audio_codec = codec_name(stream.parameters().id());
        if let Ok(context) = codec::context::Context::from_parameters(stream.parameters()) {
            if let Ok(audio) = context.decoder().audio() {
                summary.channels = audio.channels();
                summary.sample_rate = audio.rate();
                summary.sample_format = audio.format().name().to_string();
                summary.audio_bit_rate = audio.bit_rate() as i64;
            }
        }
    }

    Ok(summary)
}

fn codec_name(id: codec::Id) -> String {
    match ffmpeg_next::decoder::find(id) {
        Some(codec) => codec.name().to_string(),
        None => format!("{id:?}").to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error() {
        assert!(probe("/definitely/not/here.mp4").is_err());
    }

    #[test]
    fn known_ids_resolve_to_names() {
        ffmpeg_next::init().ok();
        assert_eq!(codec_name(codec::Id::H264), "h264");
        assert_eq!(codec_name(codec::Id::AAC), "aac");
    }
}
