// MIT License
// Error taxonomy

use std::fmt;

/// Why a candidate frame was rejected by the codec.
///
/// Frame-level errors are always recovered locally: the offending frame is
/// dropped, a diagnostic is reported, and the stream continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The candidate is shorter than the 3-char command + 2-char checksum.
    TooShort,
    /// The trailing two characters did not match the computed checksum.
    ChecksumMismatch { found: String },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::TooShort => write!(f, "Too short"),
            FrameError::ChecksumMismatch { found } => {
                write!(f, "Invalid checksum: {}", found)
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// All errors that can occur in the envisalink-tpi library.
#[derive(Debug, thiserror::Error)]
pub enum EvlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed")]
    Disconnected,

    #[error("Channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, EvlError>;
