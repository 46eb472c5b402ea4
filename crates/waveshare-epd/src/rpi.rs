//! Raspberry Pi backend on top of rppal
//!
//! Opens the GPIO lines and the spidev node described by a [`SessionConfig`]
//! and hands them to the generic [`Interface`].
//!
//! ```no_run
//! use waveshare_epd::{Builder, Epd, Model, rpi};
//!
//! let config = Builder::new().model(Model::Waveshare2in7bV2).build()?;
//! let pixels = vec![0xFF; Model::Waveshare2in7bV2.dimensions().pixel_buffer_size()];
//!
//! rpi::start(&config, |panel| {
//!     panel.power_on()?;
//!     panel.show_image(&pixels)?;
//!     panel.power_off()
//! })??;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::hal::Delay;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use thiserror::Error;

use crate::config::SessionConfig;
use crate::error::BuilderError;
use crate::interface::Interface;
use crate::models::AnyPanel;
use crate::session::Session;

/// [`Interface`] over rppal SPI and GPIO
pub type RpiInterface = Interface<Spi, OutputPin, OutputPin, OutputPin, InputPin, Delay>;

/// Errors raised while opening the hardware
#[derive(Debug, Error)]
pub enum RpiError {
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),
    #[error("SPI error: {0}")]
    Spi(#[from] rppal::spi::Error),
    #[error("Invalid pin configuration: {0}")]
    InvalidPin(#[from] BuilderError),
    #[error("No such SPI device: /dev/spidev{bus}.{chip_select}")]
    UnsupportedBus { bus: u8, chip_select: u8 },
}

fn spi_bus(bus: u8) -> Option<Bus> {
    Some(match bus {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        2 => Bus::Spi2,
        3 => Bus::Spi3,
        4 => Bus::Spi4,
        5 => Bus::Spi5,
        6 => Bus::Spi6,
        _ => return None,
    })
}

fn slave_select(chip_select: u8) -> Option<SlaveSelect> {
    Some(match chip_select {
        0 => SlaveSelect::Ss0,
        1 => SlaveSelect::Ss1,
        2 => SlaveSelect::Ss2,
        _ => return None,
    })
}

/// Configure GPIO and SPI and build the interface
///
/// # Errors
///
/// Fails if a pin can't be claimed, the spidev node can't be opened, or the
/// configuration names a bus rppal doesn't know.
pub fn connect(config: &SessionConfig) -> Result<RpiInterface, RpiError> {
    let pins = config.bcm_pins()?;
    let unsupported = || RpiError::UnsupportedBus {
        bus: config.spi_bus,
        chip_select: config.spi_chip_select,
    };
    let bus = spi_bus(config.spi_bus).ok_or_else(unsupported)?;
    let ss = slave_select(config.spi_chip_select).ok_or_else(unsupported)?;

    log::info!(
        "GPIO (BCM): CS={} RST={} DC={} BUSY={}",
        pins.cs,
        pins.rst,
        pins.dc,
        pins.busy
    );
    let gpio = Gpio::new()?;
    let cs = gpio.get(pins.cs)?.into_output_high();
    let rst = gpio.get(pins.rst)?.into_output_high();
    let dc = gpio.get(pins.dc)?.into_output_low();
    let busy = gpio.get(pins.busy)?.into_input();

    log::info!(
        "SPI: {} at {} Hz, mode 0",
        config.spi_device(),
        config.spi_clock_hz
    );
    let spi = Spi::new(bus, ss, config.spi_clock_hz, Mode::Mode0)?;

    Ok(Interface::new(spi, cs, dc, rst, busy, Delay::new()).with_busy_timeout(config.busy_timeout))
}

/// Open a session for the configured model
///
/// # Errors
///
/// See [`connect`].
pub fn open(config: &SessionConfig) -> Result<Session<RpiInterface>, RpiError> {
    let interface = connect(config)?;
    let mut session = Session::open(config.model, interface);
    session.set_chunk_size(config.chunk_size);
    Ok(session)
}

/// Run `f` against the configured panel, releasing the hardware afterwards
///
/// The outer `Result` reports setup failures; `f`'s own result comes back
/// unchanged inside it.
pub fn start<R, F>(config: &SessionConfig, f: F) -> Result<R, RpiError>
where
    F: FnOnce(&mut AnyPanel<RpiInterface>) -> R,
{
    let mut session = open(config)?;
    Ok(f(&mut session))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spidev_numbers_map_to_rppal() {
        assert_eq!(spi_bus(0), Some(Bus::Spi0));
        assert_eq!(spi_bus(6), Some(Bus::Spi6));
        assert_eq!(spi_bus(7), None);
        assert_eq!(slave_select(0), Some(SlaveSelect::Ss0));
        assert_eq!(slave_select(3), None);
    }
}
