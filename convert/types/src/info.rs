/*!
    Probe results.
*/

use serde::Serialize;

/** What a quick probe learned about a media file. */
#[derive(Clone, Debug, Serialize)]
pub struct MediaSummary {
    pub duration_seconds: f64,

    /** Index of the best video stream, or -1 when there is none. */
    pub video_index: i32,
    pub video_codec: String,
    pub width: u32,
    pub height: u32,
    pub color_space: String,
    pub frame_rate: f64,
    pub video_bit_rate: i64,

    /** Index of the best audio stream, or -1 when there is none. */
    pub audio_index: i32,
    pub audio_codec: String,
    pub channels: u16,
    pub sample_rate: u32,
    pub sample_format: String,
    pub audio_bit_rate: i64,
}

impl Default for MediaSummary {
    fn default() -> Self {
        Self {
            duration_seconds: 0.0,
            video_index: -1,
            video_codec: String::new(),
            width: 0,
            height: 0,
            color_space: String::new(),
            frame_rate: 0.0,
            video_bit_rate: 0,
            audio_index: -1,
            audio_codec: String::new(),
            channels: 0,
            sample_rate: 0,
            sample_format: String::new(),
            audio_bit_rate: 0,
        }
    }
}

impl MediaSummary {
    pub fn has_video(&self) -> bool {
        self.video_index >= 0
    }

    pub fn has_audio(&self) -> bool {
        self.audio_index >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_streams() {
        let summary = MediaSummary::default();
        assert!(!summary.has_video());
        assert!(!summary.has_audio());
    }

    #[test]
    fn stream_presence_follows_indexes() {
        let summary = MediaSummary {
            video_index: 0,
            audio_index: 1,
            ..MediaSummary::default()
        };
        assert!(summary.has_video());
        assert!(summary.has_audio());
    }
}
