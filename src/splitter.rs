// MIT License
// Wire stream to frame stream

use crate::error::FrameError;
use crate::protocol::{decode_frame, Frame, FRAME_TERMINATOR};

/// Splits raw socket reads into validated frames.
///
/// TCP delivers arbitrary chunk boundaries, so a read can end mid-frame; the
/// unterminated tail is carried into the next call. Frames that fail
/// validation are dropped and reported through the callback, never
/// propagated as errors.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    carry: String,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of raw socket data, returning every complete valid frame.
    ///
    /// `on_invalid` receives the rejected candidate text and the reason.
    pub fn push(
        &mut self,
        chunk: &str,
        mut on_invalid: impl FnMut(&str, &FrameError),
    ) -> Vec<Frame> {
        self.carry.push_str(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.carry.find(FRAME_TERMINATOR) {
            let rest = self.carry.split_off(pos + FRAME_TERMINATOR.len());
            let candidate = std::mem::replace(&mut self.carry, rest);
            let candidate = &candidate[..pos];
            if candidate.is_empty() {
                continue;
            }
            match decode_frame(candidate) {
                Ok(frame) => frames.push(frame),
                Err(e) => on_invalid(candidate, &e),
            }
        }
        frames
    }

    /// Discard any carried partial frame. Called on reconnect, since a new
    /// connection never continues the previous byte stream.
    pub fn reset(&mut self) {
        self.carry.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encode_frame;

    fn push_ok(splitter: &mut FrameSplitter, chunk: &str) -> Vec<Frame> {
        splitter.push(chunk, |text, err| {
            panic!("unexpected invalid frame {:?}: {}", text, err)
        })
    }

    #[test]
    fn test_single_frame() {
        let mut splitter = FrameSplitter::new();
        let frames = push_ok(&mut splitter, "6543D2\r\n");
        assert_eq!(frames, vec![Frame::new("654", "3")]);
    }

    #[test]
    fn test_multiple_frames_one_chunk() {
        let mut splitter = FrameSplitter::new();
        let chunk = format!("{}{}", encode_frame("650", "1"), encode_frame("651", "2"));
        let frames = push_ok(&mut splitter, &chunk);
        assert_eq!(
            frames,
            vec![Frame::new("650", "1"), Frame::new("651", "2")]
        );
    }

    #[test]
    fn test_partial_frame_carried() {
        let mut splitter = FrameSplitter::new();
        assert!(push_ok(&mut splitter, "6543").is_empty());
        let frames = push_ok(&mut splitter, "D2\r\n");
        assert_eq!(frames, vec![Frame::new("654", "3")]);
    }

    #[test]
    fn test_carry_spans_terminator() {
        let mut splitter = FrameSplitter::new();
        assert!(push_ok(&mut splitter, "6543D2\r").is_empty());
        let frames = push_ok(&mut splitter, "\n");
        assert_eq!(frames, vec![Frame::new("654", "3")]);
    }

    #[test]
    fn test_invalid_frame_reported_and_dropped() {
        let mut splitter = FrameSplitter::new();
        let mut rejected = Vec::new();
        let frames = splitter.push("6543FF\r\n6543D2\r\n", |text, err| {
            rejected.push((text.to_string(), err.clone()));
        });
        assert_eq!(frames, vec![Frame::new("654", "3")]);
        assert_eq!(
            rejected,
            vec![(
                "6543FF".to_string(),
                FrameError::ChecksumMismatch {
                    found: "FF".to_string()
                }
            )]
        );
    }

    #[test]
    fn test_short_fragment_reported() {
        let mut splitter = FrameSplitter::new();
        let mut rejected = Vec::new();
        let frames = splitter.push("ab\r\n", |text, err| {
            rejected.push((text.to_string(), err.clone()));
        });
        assert!(frames.is_empty());
        assert_eq!(rejected, vec![("ab".to_string(), FrameError::TooShort)]);
    }

    #[test]
    fn test_empty_segments_ignored() {
        let mut splitter = FrameSplitter::new();
        let frames = push_ok(&mut splitter, "\r\n\r\n6543D2\r\n\r\n");
        assert_eq!(frames, vec![Frame::new("654", "3")]);
    }

    #[test]
    fn test_reset_discards_carry() {
        let mut splitter = FrameSplitter::new();
        assert!(push_ok(&mut splitter, "6543").is_empty());
        splitter.reset();
        let frames = push_ok(&mut splitter, "6543D2\r\n");
        assert_eq!(frames, vec![Frame::new("654", "3")]);
    }
}
