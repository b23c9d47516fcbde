/*!
    Error type shared by every crate in the workspace.
*/

use std::io;

/** Workspace-wide result alias. */
pub type Result<T> = std::result::Result<T, Error>;

/** Anything that can go wrong while probing or converting media. */
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /** Codec, container, or filter failure reported by FFmpeg. */
    #[error("codec error: {0}")]
    Codec(String),

    /** The request names a codec or container we cannot produce. */
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /** The input is damaged or not actually media. */
    #[error("invalid data: {0}")]
    InvalidData(String),

    /** Trim window where the end does not come after the start. */
    #[error("invalid trim range: end {end}s does not come after start {start}s")]
    InvalidRange { start: f64, end: f64 },
}

impl Error {
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = Error::codec("encoder refused frame");
        assert_eq!(err.to_string(), "codec error: encoder refused frame");
    }

    #[test]
    fn invalid_range_names_both_bounds() {
        let err = Error::InvalidRange {
            start: 4.0,
            end: 2.5,
        };
        let text = err.to_string();
        assert!(text.contains("4s"));
        assert!(text.contains("2.5s"));
    }

    #[test]
    fn io_errors_convert() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
