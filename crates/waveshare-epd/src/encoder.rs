//! RGB to bit-plane conversion
//!
//! Panels take two 1-bit planes: a black/white plane and a red plane. Every
//! group of 8 RGB pixels (24 bytes) becomes one byte in each plane, first pixel
//! in the most significant bit. That order matches the RAM fill direction of
//! every supported model; flipping it mirrors each 8-pixel column group.
//!
//! | Pixel | Black plane bit | Red plane bit |
//! |-------|-----------------|---------------|
//! | white (`FF FF FF`) | 1 | 1 |
//! | black (`00 00 00`) | 0 | 1 |
//! | anything else      | 1 | 0 |

use alloc::vec::Vec;

use crate::error::BufferError;

/// Bytes per RGB pixel
pub const BYTES_PER_PIXEL: usize = 3;

/// Pixels packed into one plane byte
pub const PIXELS_PER_BYTE: usize = 8;

/// Raw bytes consumed per plane byte
pub const WINDOW_BYTES: usize = BYTES_PER_PIXEL * PIXELS_PER_BYTE;

/// Colors a tri-color panel can show
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    /// Both planes 1
    White,
    /// Black plane 0
    Black,
    /// Red plane 0
    Red,
}

impl Color {
    /// Classify one RGB sample. Only pure white and pure black are exact;
    /// every other value is red.
    pub fn classify(rgb: [u8; 3]) -> Self {
        match rgb {
            [0xFF, 0xFF, 0xFF] => Color::White,
            [0x00, 0x00, 0x00] => Color::Black,
            _ => Color::Red,
        }
    }

    /// Bit this color sets in the black plane
    pub fn black_bit(self) -> u8 {
        match self {
            Color::Black => 0,
            Color::White | Color::Red => 1,
        }
    }

    /// Bit this color sets in the red plane
    pub fn red_bit(self) -> u8 {
        match self {
            Color::Red => 0,
            Color::White | Color::Black => 1,
        }
    }

    /// Black plane byte for 8 pixels of this color
    pub fn black_byte(self) -> u8 {
        if self.black_bit() == 1 { 0xFF } else { 0x00 }
    }

    /// Red plane byte for 8 pixels of this color
    pub fn red_byte(self) -> u8 {
        if self.red_bit() == 1 { 0xFF } else { 0x00 }
    }
}

/// The two planes produced for one image
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitPlanes {
    /// Black/white plane, sent to BW RAM
    pub black: Vec<u8>,
    /// Red plane, sent to RED RAM
    pub red: Vec<u8>,
}

impl BitPlanes {
    /// Bytes per plane
    pub fn len(&self) -> usize {
        self.black.len()
    }

    /// True when no pixels were encoded
    pub fn is_empty(&self) -> bool {
        self.black.is_empty()
    }
}

/// Encode one 8-pixel window into its (black, red) plane bytes
///
/// `window` must hold exactly [`WINDOW_BYTES`] bytes.
pub fn encode_window(window: &[u8]) -> (u8, u8) {
    debug_assert_eq!(window.len(), WINDOW_BYTES);
    let mut black = 0u8;
    let mut red = 0u8;

    for (i, pixel) in window.chunks_exact(BYTES_PER_PIXEL).enumerate() {
        let color = Color::classify([pixel[0], pixel[1], pixel[2]]);
        let shift = 7 - i;
        black |= color.black_bit() << shift;
        red |= color.red_bit() << shift;
    }

    (black, red)
}

/// Encode an RGB buffer into black and red planes
///
/// # Errors
///
/// Returns [`BufferError::Misaligned`] if `pixels.len()` is not a multiple of
/// [`WINDOW_BYTES`]. Nothing is truncated.
pub fn encode(pixels: &[u8]) -> Result<BitPlanes, BufferError> {
    if pixels.len() % WINDOW_BYTES != 0 {
        return Err(BufferError::Misaligned { len: pixels.len() });
    }

    let bytes = pixels.len() / WINDOW_BYTES;
    let mut planes = BitPlanes {
        black: Vec::with_capacity(bytes),
        red: Vec::with_capacity(bytes),
    };

    for window in pixels.chunks_exact(WINDOW_BYTES) {
        let (black, red) = encode_window(window);
        planes.black.push(black);
        planes.red.push(red);
    }

    Ok(planes)
}
