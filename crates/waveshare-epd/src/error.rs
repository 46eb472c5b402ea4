//! Error types for the driver
//!
//! ## Error Types
//!
//! - [`UnsupportedModel`] - A model identifier the registry doesn't know
//! - [`BufferError`] - Pixel or plane buffers the panel can't take
//! - [`BuilderError`] - Invalid session configuration
//! - [`Error`] - Runtime errors during panel operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//!
//! Nothing here is retried. A failed transfer aborts the operation it was part
//! of, and the error goes straight back to the caller.
//!
//! ## Example
//!
//! ```
//! use waveshare_epd::{Model, UnsupportedModel};
//!
//! let result = "waveshare_9in7".parse::<Model>();
//! assert!(matches!(result, Err(UnsupportedModel(_))));
//! ```

use alloc::string::String;
use core::time::Duration;

use crate::interface::{BusyError, DisplayInterface};
use crate::panel::PanelState;

/// Errors that can occur when driving a panel
///
/// Generic over the interface type to preserve the specific error type.
pub enum Error<I: DisplayInterface> {
    /// Interface error (SPI/GPIO)
    ///
    /// Wraps the underlying hardware error from the [`DisplayInterface`] implementation.
    Interface(I::Error),
    /// BUSY stayed high past the interface's bound
    BusyTimeout {
        /// The bound that was exceeded
        timeout: Duration,
    },
    /// The pixel or plane buffer was rejected before anything was sent
    InvalidBuffer(BufferError),
    /// Operation called in a state where it isn't valid
    ///
    /// For example `show_image` before `power_on`, or anything after `power_off`.
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// State the panel was in
        state: PanelState,
    },
}

impl<I: DisplayInterface> From<BusyError<I::Error>> for Error<I> {
    fn from(err: BusyError<I::Error>) -> Self {
        match err {
            BusyError::Timeout(timeout) => Error::BusyTimeout { timeout },
            BusyError::Interface(e) => Error::Interface(e),
        }
    }
}

impl<I: DisplayInterface> From<BufferError> for Error<I> {
    fn from(err: BufferError) -> Self {
        Error::InvalidBuffer(err)
    }
}

impl<I: DisplayInterface> core::fmt::Debug for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Interface(e) => f.debug_tuple("Interface").field(e).finish(),
            Error::BusyTimeout { timeout } => f
                .debug_struct("BusyTimeout")
                .field("timeout", timeout)
                .finish(),
            Error::InvalidBuffer(e) => f.debug_tuple("InvalidBuffer").field(e).finish(),
            Error::InvalidState { operation, state } => f
                .debug_struct("InvalidState")
                .field("operation", operation)
                .field("state", state)
                .finish(),
        }
    }
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Interface(e) => write!(f, "Interface error: {e:?}"),
            Error::BusyTimeout { timeout } => {
                write!(f, "Panel still busy after {} ms", timeout.as_millis())
            }
            Error::InvalidBuffer(e) => write!(f, "Invalid buffer: {e}"),
            Error::InvalidState { operation, state } => {
                write!(f, "Cannot {operation} while panel is {state:?}")
            }
        }
    }
}

impl<I: DisplayInterface> core::error::Error for Error<I> {}

/// Buffers rejected before transmission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// Pixel buffer length is not a whole number of 8-pixel windows (24 bytes)
    Misaligned {
        /// Length provided, in bytes
        len: usize,
    },
    /// More plane bytes than the panel has RAM for
    TooLarge {
        /// Plane bytes provided
        len: usize,
        /// Plane bytes in one full frame
        max: usize,
    },
    /// Black and red planes differ in length
    PlaneMismatch {
        /// Black plane length
        black: usize,
        /// Red plane length
        red: usize,
    },
}

impl core::fmt::Display for BufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BufferError::Misaligned { len } => write!(
                f,
                "{len} bytes is not a multiple of 24 (8 RGB pixels)"
            ),
            BufferError::TooLarge { len, max } => {
                write!(f, "{len} plane bytes exceed the {max} byte frame")
            }
            BufferError::PlaneMismatch { black, red } => {
                write!(f, "black plane is {black} bytes but red plane is {red}")
            }
        }
    }
}

impl core::error::Error for BufferError {}

/// Requested model identifier is not in the registry
///
/// There is no fallback model: the caller has to name a supported panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsupportedModel(pub String);

impl core::fmt::Display for UnsupportedModel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Unsupported panel model: {}", self.0)
    }
}

impl core::error::Error for UnsupportedModel {}

/// Errors that can occur when building a session configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// No panel model was given
    MissingModel,
    /// Header position that isn't a GPIO
    InvalidPin(u8),
    /// Two control lines on the same pin
    DuplicatePin(u8),
    /// Chunk size of zero bytes
    ZeroChunkSize,
    /// SPI clock of zero Hz
    ZeroClock,
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BuilderError::MissingModel => write!(f, "Panel model is required"),
            BuilderError::InvalidPin(pin) => write!(f, "Pin {pin} is not a GPIO"),
            BuilderError::DuplicatePin(pin) => {
                write!(f, "Pin {pin} is assigned to more than one line")
            }
            BuilderError::ZeroChunkSize => write!(f, "Chunk size must be at least 1 byte"),
            BuilderError::ZeroClock => write!(f, "SPI clock must be non-zero"),
        }
    }
}

impl core::error::Error for BuilderError {}
