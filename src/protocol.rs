// MIT License
// TPI wire framing

//! Frame codec for the Envisalink TPI text protocol.
//!
//! Every frame on the wire is `CCCDDD...DDDKK<CR><LF>`: a 3-digit command
//! code, command-specific data (possibly empty) and a 2-character checksum,
//! terminated by CRLF. All data is sent as ASCII.

use crate::error::FrameError;

/// CRLF terminator closing every wire frame.
pub const FRAME_TERMINATOR: &str = "\r\n";

/// One checksum-validated command+data unit.
///
/// Ephemeral: produced by [`decode_frame`] and consumed by the dispatcher
/// chain; nothing in the library retains frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 3-character command code, e.g. `"505"`.
    pub command: String,
    /// Command-specific data; empty when the command carries none.
    pub data: String,
}

impl Frame {
    pub fn new(command: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            data: data.into(),
        }
    }
}

/// Compute the TPI checksum of a payload.
///
/// Sum of all character codes, truncated to 8 bits, formatted as 2-digit
/// uppercase hex.
pub fn checksum(payload: &str) -> String {
    checksum_of(payload.as_bytes())
}

fn checksum_of(payload: &[u8]) -> String {
    let sum: u32 = payload.iter().map(|&b| u32::from(b)).sum();
    format!("{:02X}", sum & 0xFF)
}

/// Serialize a command and data into a complete wire frame.
pub fn encode_frame(command: &str, data: &str) -> String {
    let mut out = String::with_capacity(command.len() + data.len() + 4);
    out.push_str(command);
    out.push_str(data);
    out.push_str(&checksum(&out));
    out.push_str(FRAME_TERMINATOR);
    out
}

/// Decode a candidate frame (terminator already stripped).
///
/// Fails with [`FrameError::TooShort`] below the 5-character minimum and
/// [`FrameError::ChecksumMismatch`] when the trailing two characters do not
/// match the checksum of the preceding payload.
pub fn decode_frame(text: &str) -> Result<Frame, FrameError> {
    let bytes = text.as_bytes();
    if bytes.len() < 5 {
        return Err(FrameError::TooShort);
    }

    let (payload, trailer) = bytes.split_at(bytes.len() - 2);
    let found = String::from_utf8_lossy(trailer).into_owned();
    if checksum_of(payload) != found {
        return Err(FrameError::ChecksumMismatch { found });
    }

    let (command, data) = payload.split_at(3);
    Ok(Frame {
        command: String::from_utf8_lossy(command).into_owned(),
        data: String::from_utf8_lossy(data).into_owned(),
    })
}

/// Decode an 8-bit hex field into per-bit booleans, bit 0 first (LSB).
///
/// Used by the keypad LED handler. Unparsable input yields all bits clear.
pub fn decode_bits(data: &str) -> [bool; 8] {
    let value = u8::from_str_radix(data, 16).unwrap_or(0);
    std::array::from_fn(|i| value & (1 << i) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_known_values() {
        assert_eq!(checksum("6543"), "D2");
        assert_eq!(checksum("000"), "90");
        assert_eq!(checksum("6200000"), "58");
    }

    #[test]
    fn test_checksum_zero_padded() {
        // Sum that truncates to a single hex digit must be zero-padded
        assert_eq!(checksum("\x01\x02").len(), 2);
    }

    #[test]
    fn test_encode_frame() {
        assert_eq!(encode_frame("654", "3"), "6543D2\r\n");
        assert_eq!(encode_frame("000", ""), "00090\r\n");
    }

    #[test]
    fn test_decode_frame_ok() {
        let frame = decode_frame("6543D2").unwrap();
        assert_eq!(frame.command, "654");
        assert_eq!(frame.data, "3");
    }

    #[test]
    fn test_decode_frame_empty_data() {
        let frame = decode_frame("00090").unwrap();
        assert_eq!(frame.command, "000");
        assert_eq!(frame.data, "");
    }

    #[test]
    fn test_decode_frame_too_short() {
        assert_eq!(decode_frame("00"), Err(FrameError::TooShort));
        assert_eq!(decode_frame(""), Err(FrameError::TooShort));
    }

    #[test]
    fn test_decode_frame_bad_checksum() {
        assert_eq!(
            decode_frame("6543D3"),
            Err(FrameError::ChecksumMismatch {
                found: "D3".to_string()
            })
        );
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let wire = encode_frame("505", "3");
        let frame = decode_frame(wire.trim_end()).unwrap();
        assert_eq!(frame, Frame::new("505", "3"));
    }

    #[test]
    fn test_decode_bits() {
        assert_eq!(decode_bits("FF"), [true; 8]);
        assert_eq!(decode_bits("00"), [false; 8]);
        assert_eq!(
            decode_bits("5A"),
            [false, true, false, true, true, false, true, false]
        );
    }

    #[test]
    fn test_decode_bits_invalid_hex() {
        assert_eq!(decode_bits("zz"), [false; 8]);
        assert_eq!(decode_bits(""), [false; 8]);
    }

    #[test]
    fn test_frame_error_display() {
        assert_eq!(FrameError::TooShort.to_string(), "Too short");
        assert_eq!(
            FrameError::ChecksumMismatch {
                found: "D3".to_string()
            }
            .to_string(),
            "Invalid checksum: D3"
        );
    }
}
