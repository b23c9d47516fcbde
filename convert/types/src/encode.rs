/*!
    Target settings for a conversion job.

    [EncodeParameter] starts out empty, which means "copy every stream
    into the new container". Each setter only records a value when it is
    meaningful (non-empty name, positive size or rate), so callers can
    pipe user input straight through without pre-filtering it.
*/

/** The requested output: codecs, geometry, rate control, trim window. */
#[derive(Clone, Debug, Default)]
pub struct EncodeParameter {
    available: bool,
    video_codec: Option<String>,
    audio_codec: Option<String>,
    video_bit_rate: Option<i64>,
    audio_bit_rate: Option<i64>,
    qscale: Option<i32>,
    width: Option<u32>,
    height: Option<u32>,
    pixel_format: Option<String>,
    preset: Option<String>,
    start_time: Option<f64>,
    end_time: Option<f64>,
}

impl EncodeParameter {
    pub fn new() -> Self {
        Self::default()
    }

    /** True once any setting has been accepted. */
    pub fn available(&self) -> bool {
        self.available
    }

    /** Encoder name for the video stream; `None` means stream copy. */
    pub fn video_codec_name(&self) -> Option<&str> {
        self.video_codec.as_deref()
    }

    pub fn set_video_codec_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        self.video_codec = Some(name);
        self.available = true;
    }

    /** Encoder name for the audio stream; `None` means stream copy. */
    pub fn audio_codec_name(&self) -> Option<&str> {
        self.audio_codec.as_deref()
    }

    pub fn set_audio_codec_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            return;
        }
        self.audio_codec = Some(name);
        self.available = true;
    }

    pub fn video_bit_rate(&self) -> Option<i64> {
        self.video_bit_rate
    }

    pub fn set_video_bit_rate(&mut self, bit_rate: i64) {
        if bit_rate <= 0 {
            return;
        }
        self.video_bit_rate = Some(bit_rate);
        self.available = true;
    }

    pub fn audio_bit_rate(&self) -> Option<i64> {
        self.audio_bit_rate
    }

    pub fn set_audio_bit_rate(&mut self, bit_rate: i64) {
        if bit_rate <= 0 {
            return;
        }
        self.audio_bit_rate = Some(bit_rate);
        self.available = true;
    }

    /** Quality-based rate control; overrides any bitrate when set. */
    pub fn qscale(&self) -> Option<i32> {
        self.qscale
    }

    pub fn set_qscale(&mut self, qscale: i32) {
        if qscale < 0 {
            return;
        }
        self.qscale = Some(qscale);
        self.available = true;
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn set_width(&mut self, width: u32) {
        if width == 0 {
            return;
        }
        self.width = Some(width);
        self.available = true;
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn set_height(&mut self, height: u32) {
        if height == 0 {
            return;
        }
        self.height = Some(height);
        self.available = true;
    }

    pub fn pixel_format(&self) -> Option<&str> {
        self.pixel_format.as_deref()
    }

    pub fn set_pixel_format(&mut self, format: impl Into<String>) {
        let format = format.into();
        if format.is_empty() {
            return;
        }
        self.pixel_format = Some(format);
        self.available = true;
    }

    /** Encoder speed/quality preset, e.g. "medium" or "veryfast". */
    pub fn preset(&self) -> Option<&str> {
        self.preset.as_deref()
    }

    pub fn set_preset(&mut self, preset: impl Into<String>) {
        let preset = preset.into();
        if preset.is_empty() {
            return;
        }
        self.preset = Some(preset);
        self.available = true;
    }

    /** Trim window start in seconds from the beginning of the input. */
    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn set_start_time(&mut self, seconds: f64) {
        if seconds < 0.0 {
            return;
        }
        self.start_time = Some(seconds);
        self.available = true;
    }

    /** Trim window end in seconds; must lie after the start to be usable. */
    pub fn end_time(&self) -> Option<f64> {
        self.end_time
    }

    pub fn set_end_time(&mut self, seconds: f64) {
        if seconds <= 0.0 {
            return;
        }
        self.end_time = Some(seconds);
        self.available = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_full_copy() {
        let param = EncodeParameter::new();
        assert!(!param.available());
        assert!(param.video_codec_name().is_none());
        assert!(param.audio_codec_name().is_none());
    }

    #[test]
    fn empty_codec_name_is_ignored() {
        let mut param = EncodeParameter::new();
        param.set_video_codec_name("");
        assert!(!param.available());
        assert!(param.video_codec_name().is_none());

        param.set_video_codec_name("libx264");
        assert!(param.available());
        assert_eq!(param.video_codec_name(), Some("libx264"));
    }

    #[test]
    fn meaningless_numbers_are_ignored() {
        let mut param = EncodeParameter::new();
        param.set_video_bit_rate(0);
        param.set_audio_bit_rate(-128_000);
        param.set_width(0);
        param.set_height(0);
        param.set_qscale(-3);
        param.set_start_time(-1.0);
        param.set_end_time(0.0);
        assert!(!param.available());
    }

    #[test]
    fn start_time_zero_is_accepted() {
        let mut param = EncodeParameter::new();
        param.set_start_time(0.0);
        assert_eq!(param.start_time(), Some(0.0));
        assert!(param.available());
    }

    #[test]
    fn settings_are_recorded() {
        let mut param = EncodeParameter::new();
        param.set_audio_codec_name("aac");
        param.set_audio_bit_rate(128_000);
        param.set_width(1280);
        param.set_height(720);
        param.set_pixel_format("yuv420p");
        param.set_preset("veryfast");
        param.set_qscale(5);
        assert_eq!(param.audio_codec_name(), Some("aac"));
        assert_eq!(param.audio_bit_rate(), Some(128_000));
        assert_eq!(param.width(), Some(1280));
        assert_eq!(param.height(), Some(720));
        assert_eq!(param.pixel_format(), Some("yuv420p"));
        assert_eq!(param.preset(), Some("veryfast"));
        assert_eq!(param.qscale(), Some(5));
    }
}
