//! Session configuration types and builder

use core::time::Duration;

pub use crate::error::BuilderError;
use crate::interface::DEFAULT_BUSY_TIMEOUT;
use crate::models::Model;
use crate::panel::DEFAULT_CHUNK_SIZE;

/// Default SPI clock
pub const DEFAULT_SPI_CLOCK_HZ: u32 = 2_000_000;

/// Panel dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
}

impl Dimensions {
    /// Pixel count
    pub fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes in one bit plane for a full frame
    pub fn plane_size(&self) -> usize {
        self.pixels() / 8
    }

    /// Bytes in an RGB pixel buffer covering the full frame
    pub fn pixel_buffer_size(&self) -> usize {
        self.pixels() * 3
    }
}

/// How pin numbers in a [`PinAssignment`] are interpreted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PinNumbering {
    /// Physical position on the 40-pin header
    #[default]
    Board,
    /// Broadcom GPIO numbers
    Bcm,
}

/// Control lines wired to the panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinAssignment {
    /// Chip select (active low)
    pub cs: u8,
    /// Reset (active low)
    pub rst: u8,
    /// Data/command (low = command)
    pub dc: u8,
    /// Busy (high = busy)
    pub busy: u8,
}

impl Default for PinAssignment {
    /// Waveshare HAT wiring in board numbering
    fn default() -> Self {
        Self {
            cs: 24,
            rst: 11,
            dc: 22,
            busy: 18,
        }
    }
}

impl PinAssignment {
    /// Convert to BCM numbers
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidPin` for a header position that isn't a
    /// GPIO (power, ground, out of range).
    pub fn to_bcm(self, numbering: PinNumbering) -> Result<Self, BuilderError> {
        match numbering {
            PinNumbering::Bcm => Ok(self),
            PinNumbering::Board => Ok(Self {
                cs: board_to_bcm(self.cs).ok_or(BuilderError::InvalidPin(self.cs))?,
                rst: board_to_bcm(self.rst).ok_or(BuilderError::InvalidPin(self.rst))?,
                dc: board_to_bcm(self.dc).ok_or(BuilderError::InvalidPin(self.dc))?,
                busy: board_to_bcm(self.busy).ok_or(BuilderError::InvalidPin(self.busy))?,
            }),
        }
    }

    fn first_duplicate(&self) -> Option<u8> {
        let pins = [self.cs, self.rst, self.dc, self.busy];
        pins.iter()
            .enumerate()
            .find(|(i, pin)| pins[i + 1..].contains(pin))
            .map(|(_, pin)| *pin)
    }
}

/// BCM number of a 40-pin header position, `None` for power and ground
pub fn board_to_bcm(pin: u8) -> Option<u8> {
    let bcm = match pin {
        3 => 2,
        5 => 3,
        7 => 4,
        8 => 14,
        10 => 15,
        11 => 17,
        12 => 18,
        13 => 27,
        15 => 22,
        16 => 23,
        18 => 24,
        19 => 10,
        21 => 9,
        22 => 25,
        23 => 11,
        24 => 8,
        26 => 7,
        27 => 0,
        28 => 1,
        29 => 5,
        31 => 6,
        32 => 12,
        33 => 13,
        35 => 19,
        36 => 16,
        37 => 26,
        38 => 20,
        40 => 21,
        _ => return None,
    };
    Some(bcm)
}

/// Everything needed to open a session
///
/// Use `Builder` to create a SessionConfig.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Panel model
    pub model: Model,
    /// Control lines
    pub pins: PinAssignment,
    /// Numbering scheme of `pins`
    pub numbering: PinNumbering,
    /// SPI bus (`/dev/spidev<bus>.<cs>`)
    pub spi_bus: u8,
    /// SPI chip-select index of the device node
    pub spi_chip_select: u8,
    /// SPI clock in Hz
    pub spi_clock_hz: u32,
    /// Bound for busy waits, `None` to wait forever
    pub busy_timeout: Option<Duration>,
    /// Bytes per data frame when streaming planes
    pub chunk_size: usize,
}

impl SessionConfig {
    /// Control lines in BCM numbering
    pub fn bcm_pins(&self) -> Result<PinAssignment, BuilderError> {
        self.pins.to_bcm(self.numbering)
    }

    /// spidev node this configuration talks to
    pub fn spi_device(&self) -> SpiDevicePath {
        SpiDevicePath {
            bus: self.spi_bus,
            chip_select: self.spi_chip_select,
        }
    }
}

/// `/dev/spidevB.C` rendered on demand
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpiDevicePath {
    /// Bus number
    pub bus: u8,
    /// Chip select number
    pub chip_select: u8,
}

impl core::fmt::Display for SpiDevicePath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "/dev/spidev{}.{}", self.bus, self.chip_select)
    }
}

/// Builder for constructing a session configuration
///
/// # Example
///
/// ```
/// use waveshare_epd::{Builder, Model, PinNumbering};
///
/// let config = Builder::new()
///     .model(Model::Waveshare7in5bHd)
///     .numbering(PinNumbering::Board)
///     .build()
///     .expect("valid configuration");
/// assert_eq!(config.spi_clock_hz, 2_000_000);
/// ```
pub struct Builder {
    /// Panel model (required)
    model: Option<Model>,
    pins: PinAssignment,
    numbering: PinNumbering,
    spi_bus: u8,
    spi_chip_select: u8,
    spi_clock_hz: u32,
    busy_timeout: Option<Duration>,
    chunk_size: usize,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            model: None,
            pins: PinAssignment::default(),
            numbering: PinNumbering::Board,
            // /dev/spidev0.0
            spi_bus: 0,
            spi_chip_select: 0,
            spi_clock_hz: DEFAULT_SPI_CLOCK_HZ,
            busy_timeout: Some(DEFAULT_BUSY_TIMEOUT),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the panel model (required)
    pub fn model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the control lines
    pub fn pins(mut self, pins: PinAssignment) -> Self {
        self.pins = pins;
        self
    }

    /// Set how pin numbers are interpreted
    pub fn numbering(mut self, numbering: PinNumbering) -> Self {
        self.numbering = numbering;
        self
    }

    /// Set the spidev bus and chip select
    pub fn spi_device(mut self, bus: u8, chip_select: u8) -> Self {
        self.spi_bus = bus;
        self.spi_chip_select = chip_select;
        self
    }

    /// Set the SPI clock
    pub fn spi_clock_hz(mut self, hz: u32) -> Self {
        self.spi_clock_hz = hz;
        self
    }

    /// Set the busy wait bound
    pub fn busy_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Set the data frame size for plane transfers
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - `BuilderError::MissingModel` if no model was set
    /// - `BuilderError::InvalidPin` if a board pin isn't a GPIO
    /// - `BuilderError::DuplicatePin` if two lines share a pin
    /// - `BuilderError::ZeroClock` / `BuilderError::ZeroChunkSize`
    pub fn build(self) -> Result<SessionConfig, BuilderError> {
        let model = self.model.ok_or(BuilderError::MissingModel)?;
        self.pins.to_bcm(self.numbering)?;
        if let Some(pin) = self.pins.first_duplicate() {
            return Err(BuilderError::DuplicatePin(pin));
        }
        if self.spi_clock_hz == 0 {
            return Err(BuilderError::ZeroClock);
        }
        if self.chunk_size == 0 {
            return Err(BuilderError::ZeroChunkSize);
        }

        Ok(SessionConfig {
            model,
            pins: self.pins,
            numbering: self.numbering,
            spi_bus: self.spi_bus,
            spi_chip_select: self.spi_chip_select,
            spi_clock_hz: self.spi_clock_hz,
            busy_timeout: self.busy_timeout,
            chunk_size: self.chunk_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_waveshare_hat() {
        let config = Builder::new()
            .model(Model::Waveshare7in5bHd)
            .build()
            .unwrap();
        assert_eq!(config.numbering, PinNumbering::Board);
        assert_eq!(config.spi_clock_hz, 2_000_000);
        assert_eq!(config.spi_device().to_string(), "/dev/spidev0.0");
        assert_eq!(config.chunk_size, 2048);
        assert_eq!(config.busy_timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            config.bcm_pins().unwrap(),
            PinAssignment {
                cs: 8,
                rst: 17,
                dc: 25,
                busy: 24
            }
        );
    }

    #[test]
    fn model_is_required() {
        assert_eq!(Builder::new().build(), Err(BuilderError::MissingModel));
    }

    #[test]
    fn power_pins_are_rejected() {
        let pins = PinAssignment {
            cs: 24,
            rst: 11,
            dc: 22,
            busy: 2, // 5V
        };
        let result = Builder::new()
            .model(Model::Waveshare2in7bV2)
            .pins(pins)
            .build();
        assert_eq!(result, Err(BuilderError::InvalidPin(2)));
    }

    #[test]
    fn bcm_numbers_pass_through() {
        let pins = PinAssignment {
            cs: 8,
            rst: 17,
            dc: 25,
            busy: 24,
        };
        let config = Builder::new()
            .model(Model::Waveshare2in7bV2)
            .numbering(PinNumbering::Bcm)
            .pins(pins)
            .build()
            .unwrap();
        assert_eq!(config.bcm_pins().unwrap(), pins);
    }

    #[test]
    fn shared_pins_are_rejected() {
        let pins = PinAssignment {
            cs: 24,
            rst: 11,
            dc: 11,
            busy: 18,
        };
        let result = Builder::new()
            .model(Model::Waveshare7in5bHd)
            .pins(pins)
            .build();
        assert_eq!(result, Err(BuilderError::DuplicatePin(11)));
    }

    #[test]
    fn zero_values_are_rejected() {
        let builder = || Builder::new().model(Model::Waveshare7in5bHd);
        assert_eq!(
            builder().spi_clock_hz(0).build(),
            Err(BuilderError::ZeroClock)
        );
        assert_eq!(
            builder().chunk_size(0).build(),
            Err(BuilderError::ZeroChunkSize)
        );
    }

    #[test]
    fn header_has_28_gpios() {
        let gpios = (1..=40).filter_map(board_to_bcm).count();
        assert_eq!(gpios, 28);
        assert_eq!(board_to_bcm(0), None);
        assert_eq!(board_to_bcm(41), None);
    }

    #[test]
    fn frame_sizes() {
        let dims = Model::Waveshare7in5bHd.dimensions();
        assert_eq!(dims.plane_size(), 58_080);
        assert_eq!(dims.pixel_buffer_size(), 880 * 528 * 3);
    }
}
