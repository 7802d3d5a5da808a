//! Binary codec for the phone mouse wire frame.
//!
//! Wire format:
//! ```text
//! [buttons:1][dx:2][dy:2]
//! ```
//! Total frame size: 5 bytes.  `dx` and `dy` are big-endian two's-complement
//! signed 16-bit integers.  Bit 0 of `buttons` is the left button, bit 1 the
//! right button; the remaining bits are ignored.
//!
//! # No framing marker
//!
//! The protocol has neither a checksum nor a start-of-frame marker, so every
//! 5-byte pattern is a valid frame.  The reader never buffers a short read to
//! complete it later: a dropped byte shifts every following frame boundary
//! until the peer reconnects.

use thiserror::Error;

/// Number of bytes in one wire frame.
pub const FRAME_LEN: usize = 5;

/// Errors that can occur while interpreting raw bytes as a frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer than [`FRAME_LEN`] bytes were supplied.
    #[error("truncated frame: need {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },
}

/// The button byte of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonMask(pub u8);

impl ButtonMask {
    pub const LEFT: u8 = 0b0000_0001;
    pub const RIGHT: u8 = 0b0000_0010;

    /// Returns `true` if the left-button bit is set.
    pub fn left(self) -> bool {
        self.0 & Self::LEFT != 0
    }

    /// Returns `true` if the right-button bit is set.
    pub fn right(self) -> bool {
        self.0 & Self::RIGHT != 0
    }
}

/// One decoded button/motion sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    pub buttons: ButtonMask,
    pub dx: i16,
    pub dy: i16,
}

impl Frame {
    /// Decodes a complete frame.
    ///
    /// Total over all inputs: any 5 bytes form a valid frame.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use phonemouse_core::Frame;
    ///
    /// let frame = Frame::decode(&[0b0000_0011, 0x00, 0x0A, 0xFF, 0xF6]);
    /// assert_eq!(frame.buttons.0, 3);
    /// assert_eq!(frame.dx, 10);
    /// assert_eq!(frame.dy, -10);
    /// ```
    pub fn decode(bytes: &[u8; FRAME_LEN]) -> Self {
        Self {
            buttons: ButtonMask(bytes[0]),
            dx: i16::from_be_bytes([bytes[1], bytes[2]]),
            dy: i16::from_be_bytes([bytes[3], bytes[4]]),
        }
    }

    /// Decodes a frame from the start of `bytes`.
    ///
    /// Bytes past the first [`FRAME_LEN`] are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Truncated`] when `bytes` is shorter than a frame.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FrameError> {
        let head: &[u8; FRAME_LEN] = bytes
            .get(..FRAME_LEN)
            .and_then(|b| b.try_into().ok())
            .ok_or(FrameError::Truncated {
                needed: FRAME_LEN,
                available: bytes.len(),
            })?;
        Ok(Self::decode(head))
    }

    /// Encodes the frame the way the phone app puts it on the wire.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let [dx_hi, dx_lo] = self.dx.to_be_bytes();
        let [dy_hi, dy_lo] = self.dy.to_be_bytes();
        [self.buttons.0, dx_hi, dx_lo, dy_hi, dy_lo]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
