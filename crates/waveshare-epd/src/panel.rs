//! Panel state machine
//!
//! [`Panel`] replays a [`PanelModel`]'s register tables through a
//! [`DisplayInterface`] and tracks where the controller is in its lifecycle:
//!
//! ```text
//! Uninitialized --power_on--> PoweredOn --power_off--> PoweredOff
//!                              |     ^
//!                   show_image |     | done
//!                              v     |
//!                             Displaying
//! ```
//!
//! Anything called out of order fails with [`Error::InvalidState`] before a
//! single byte goes over the bus.

use core::marker::PhantomData;

use crate::command::{WRITE_RAM_BW, WRITE_RAM_RED};
use crate::config::Dimensions;
use crate::encoder;
use crate::error::{BufferError, Error};
use crate::interface::DisplayInterface;
use crate::models::{PanelModel, Step, dimensions_of};

/// Bytes per data frame when streaming a plane
pub const DEFAULT_CHUNK_SIZE: usize = 2048;

/// Lifecycle of a panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelState {
    /// Constructed, controller not configured yet
    Uninitialized,
    /// Configured and ready for images
    PoweredOn,
    /// An image transfer or refresh is in progress
    Displaying,
    /// In deep sleep; terminal
    PoweredOff,
}

/// The operations every supported panel offers
pub trait Epd {
    /// Transport the panel drives
    type Interface: DisplayInterface;

    /// Reset and configure the controller
    fn power_on(&mut self) -> Result<(), Error<Self::Interface>>;

    /// Encode an RGB buffer and display it
    fn show_image(&mut self, pixels: &[u8]) -> Result<(), Error<Self::Interface>>;

    /// Display already encoded planes
    fn show_image_buffer(&mut self, black: &[u8], red: &[u8])
    -> Result<(), Error<Self::Interface>>;

    /// Put the controller into deep sleep
    fn power_off(&mut self) -> Result<(), Error<Self::Interface>>;

    /// Current lifecycle state
    fn state(&self) -> PanelState;

    /// Panel geometry
    fn dimensions(&self) -> Dimensions;
}

/// Driver for one physical panel of model `M`
///
/// Owns its interface exclusively; there is one `Panel` per bus and pin set.
pub struct Panel<I, M> {
    /// Hardware interface
    interface: I,
    state: PanelState,
    chunk_size: usize,
    _model: PhantomData<M>,
}

impl<I, M> Panel<I, M>
where
    I: DisplayInterface,
    M: PanelModel,
{
    /// Create a new Panel; the controller is untouched until [`power_on`](Self::power_on)
    pub fn new(interface: I) -> Self {
        Self {
            interface,
            state: PanelState::Uninitialized,
            chunk_size: DEFAULT_CHUNK_SIZE,
            _model: PhantomData,
        }
    }

    /// Set the data frame size used while streaming planes (minimum 1)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.set_chunk_size(chunk_size);
        self
    }

    /// See [`with_chunk_size`](Self::with_chunk_size)
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size.max(1);
    }

    /// Current lifecycle state
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Panel geometry
    pub fn dimensions(&self) -> Dimensions {
        dimensions_of::<M>()
    }

    /// Reset the controller, configure it and load the LUT
    ///
    /// On failure the panel stays [`PanelState::Uninitialized`]; a retry starts
    /// over with a hardware reset.
    pub fn power_on(&mut self) -> Result<(), Error<I>> {
        self.expect_state("power on", PanelState::Uninitialized)?;
        log::info!("Powering on {}...", M::MODEL);

        self.run(M::POWER_ON)?;
        self.run(M::RAM_ADDRESS)?;

        self.state = PanelState::PoweredOn;
        log::info!("Powered on");
        Ok(())
    }

    /// Encode `pixels` (RGB, 3 bytes per pixel) and display them
    ///
    /// # Errors
    ///
    /// State and buffer problems are reported before anything is sent:
    /// [`Error::InvalidState`] unless powered on, [`Error::InvalidBuffer`] if
    /// the length isn't a multiple of 24 or exceeds one frame.
    pub fn show_image(&mut self, pixels: &[u8]) -> Result<(), Error<I>> {
        self.expect_state("show an image", PanelState::PoweredOn)?;
        let planes = encoder::encode(pixels)?;
        self.check_planes(&planes.black, &planes.red)?;
        self.display(&planes.black, &planes.red)
    }

    /// Display pre-encoded black and red planes
    ///
    /// Both planes must be the same length and no longer than one frame.
    pub fn show_image_buffer(&mut self, black: &[u8], red: &[u8]) -> Result<(), Error<I>> {
        self.expect_state("show an image", PanelState::PoweredOn)?;
        self.check_planes(black, red)?;
        self.display(black, red)
    }

    /// Enter deep sleep; the panel can't be used afterwards
    pub fn power_off(&mut self) -> Result<(), Error<I>> {
        self.expect_state("power off", PanelState::PoweredOn)?;
        log::info!("Powering down...");

        self.run(M::POWER_OFF)?;

        self.state = PanelState::PoweredOff;
        log::info!("Powered down");
        Ok(())
    }

    /// Borrow the interface
    pub fn interface(&self) -> &I {
        &self.interface
    }

    pub(crate) fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Hand back the interface
    pub fn into_interface(self) -> I {
        self.interface
    }

    fn expect_state(&self, operation: &'static str, expected: PanelState) -> Result<(), Error<I>> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn check_planes(&self, black: &[u8], red: &[u8]) -> Result<(), BufferError> {
        if black.len() != red.len() {
            return Err(BufferError::PlaneMismatch {
                black: black.len(),
                red: red.len(),
            });
        }
        if black.len() > M::FRAME_BYTES {
            return Err(BufferError::TooLarge {
                len: black.len(),
                max: M::FRAME_BYTES,
            });
        }
        Ok(())
    }

    fn display(&mut self, black: &[u8], red: &[u8]) -> Result<(), Error<I>> {
        log::info!("Showing image ({} bytes per plane)...", black.len());
        self.state = PanelState::Displaying;
        let result = self.transfer_and_refresh(black, red);
        // A failed transfer leaves RAM contents undefined, but the controller
        // is still configured and the next image rewrites everything
        self.state = PanelState::PoweredOn;
        if result.is_ok() {
            log::info!("Image shown");
        }
        result
    }

    fn transfer_and_refresh(&mut self, black: &[u8], red: &[u8]) -> Result<(), Error<I>> {
        // Counters may have advanced during a previous write
        self.run(M::RAM_ADDRESS)?;

        self.write_plane(WRITE_RAM_BW, black)?;
        self.write_plane(WRITE_RAM_RED, red)?;

        self.run(M::REFRESH)
    }

    fn write_plane(&mut self, command: u8, plane: &[u8]) -> Result<(), Error<I>> {
        self.send_command(command)?;
        for chunk in plane.chunks(self.chunk_size) {
            self.send_data(chunk)?;
        }
        Ok(())
    }

    fn run(&mut self, steps: &[Step]) -> Result<(), Error<I>> {
        for step in steps {
            match *step {
                Step::Reset => self.interface.reset().map_err(Error::Interface)?,
                Step::Command(command) => self.send_command(command)?,
                Step::Data(data) => self.send_data(data)?,
                Step::WaitBusy => self.interface.wait_for_panel()?,
                Step::DelayMs(ms) => self.interface.delay_ms(ms),
            }
        }
        Ok(())
    }

    /// Send a command to the display controller
    fn send_command(&mut self, command: u8) -> Result<(), Error<I>> {
        log::debug!("cmd 0x{command:02X}");
        self.interface.send_command(command).map_err(Error::Interface)
    }

    /// Send data to the display controller
    fn send_data(&mut self, data: &[u8]) -> Result<(), Error<I>> {
        self.interface.send_data(data).map_err(Error::Interface)
    }
}

impl<I, M> Epd for Panel<I, M>
where
    I: DisplayInterface,
    M: PanelModel,
{
    type Interface = I;

    fn power_on(&mut self) -> Result<(), Error<I>> {
        Panel::power_on(self)
    }

    fn show_image(&mut self, pixels: &[u8]) -> Result<(), Error<I>> {
        Panel::show_image(self, pixels)
    }

    fn show_image_buffer(&mut self, black: &[u8], red: &[u8]) -> Result<(), Error<I>> {
        Panel::show_image_buffer(self, black, red)
    }

    fn power_off(&mut self) -> Result<(), Error<I>> {
        Panel::power_off(self)
    }

    fn state(&self) -> PanelState {
        Panel::state(self)
    }

    fn dimensions(&self) -> Dimensions {
        Panel::dimensions(self)
    }
}
