//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`Interface`] struct
//! for talking to a Waveshare panel controller over SPI.
//!
//! ## Hardware Requirements
//!
//! The supported panels need:
//! - SPI bus (MOSI + SCK)
//! - 4 GPIO pins:
//!   - **CS**: Chip select (output, active low, driven by this crate)
//!   - **DC**: Data/Command select (output)
//!   - **RST**: Reset (output, active low)
//!   - **BUSY**: Busy status (input, active high)
//!
//! Chip select is toggled here rather than by the SPI peripheral so that every
//! command or data frame is bracketed exactly: CS goes low before the frame and
//! back high right after it, even when the transfer fails.
//!
//! ## Example
//!
//! ```rust,ignore
//! use core::time::Duration;
//! use waveshare_epd::{DisplayInterface, Interface};
//!
//! let mut interface = Interface::new(spi_bus, cs_pin, dc_pin, rst_pin, busy_pin, delay)
//!     .with_busy_timeout(Some(Duration::from_secs(10)));
//!
//! interface.reset()?;
//! interface.send_command(0x12)?; // Soft reset
//! interface.wait_for_panel()?;
//! ```

use core::fmt::Debug;
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiBus;

/// How long RST is held high before the reset pulse
pub const RESET_HOLD_MS: u32 = 200;

/// Width of the low reset pulse
pub const RESET_PULSE_MS: u32 = 4;

/// Default bound for [`DisplayInterface::wait_for_panel`]
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(30);

const BUSY_POLL_INTERVAL_MS: u32 = 1;

/// Trait for the transport between host and panel controller
///
/// The panel state machine only talks to hardware through this trait, which
/// keeps register sequences testable against a recording mock.
///
/// ## Implementing
///
/// For most cases, use the provided [`Interface`] struct. Implement this trait
/// yourself when the hardware needs something it can't express (an I/O
/// expander for the control lines, for instance).
pub trait DisplayInterface {
    /// Error type for interface operations
    type Error: Debug;

    /// Send a command byte to the controller
    ///
    /// The implementation must:
    /// 1. Assert CS (low)
    /// 2. Set DC low (command mode)
    /// 3. Send exactly one byte over SPI
    /// 4. Release CS (high)
    fn send_command(&mut self, command: u8) -> Result<(), Self::Error>;

    /// Send data bytes to the controller
    ///
    /// Same framing as [`send_command`](Self::send_command) with DC high. The
    /// whole slice goes out as one SPI transaction.
    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Perform hardware reset
    ///
    /// RST high for [`RESET_HOLD_MS`], low for [`RESET_PULSE_MS`], then high again.
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// Block until BUSY reads low
    ///
    /// Returns immediately if the panel is already idle.
    ///
    /// # Errors
    ///
    /// Returns [`BusyError::Timeout`] if BUSY stays high past the configured bound.
    fn wait_for_panel(&mut self) -> Result<(), BusyError<Self::Error>>;

    /// Blocking delay between steps
    fn delay_ms(&mut self, ms: u32);
}

/// Releasing a transport at the end of a session
///
/// [`Session`](crate::Session) calls this exactly once, right before the
/// transport is dropped.
pub trait Release {
    /// Return the lines to an idle state
    fn release(&mut self);
}

/// Errors that can occur at the interface level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InterfaceError::Spi(e) => write!(f, "SPI error: {e:?}"),
            InterfaceError::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Outcome of a failed busy wait
#[derive(Debug)]
pub enum BusyError<E> {
    /// BUSY was still high after the given bound
    Timeout(Duration),
    /// Reading the BUSY line failed
    Interface(E),
}

/// Hardware interface implementation
///
/// Implements [`DisplayInterface`] for embedded-hal v1.0 SPI and GPIO traits.
///
/// ## Type Parameters
///
/// * `SPI` - SPI bus implementing [`SpiBus`] (chip select is handled by `CS`)
/// * `CS` - Chip select pin implementing [`OutputPin`]
/// * `DC` - Data/Command pin implementing [`OutputPin`]
/// * `RST` - Reset pin implementing [`OutputPin`]
/// * `BUSY` - Busy pin implementing [`InputPin`]
/// * `D` - Delay provider implementing [`DelayNs`]
pub struct Interface<SPI, CS, DC, RST, BUSY, D> {
    /// SPI bus for communication
    spi: SPI,
    /// Chip select pin (active low)
    cs: CS,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Reset pin (active low)
    rst: RST,
    /// Busy pin (active high)
    busy: BUSY,
    delay: D,
    /// `None` waits forever
    busy_timeout: Option<Duration>,
}

impl<SPI, CS, DC, RST, BUSY, D> Interface<SPI, CS, DC, RST, BUSY, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    /// Create a new Interface with the default busy timeout
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// use waveshare_epd::Interface;
    ///
    /// let interface = Interface::new(spi, cs, dc, rst, busy, delay);
    /// ```
    pub fn new(spi: SPI, cs: CS, dc: DC, rst: RST, busy: BUSY, delay: D) -> Self {
        Self {
            spi,
            cs,
            dc,
            rst,
            busy,
            delay,
            busy_timeout: Some(DEFAULT_BUSY_TIMEOUT),
        }
    }

    /// Set the bound for [`DisplayInterface::wait_for_panel`]
    pub fn with_busy_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Currently configured busy timeout
    pub fn busy_timeout(&self) -> Option<Duration> {
        self.busy_timeout
    }
}

impl<SPI, CS, DC, RST, BUSY, D, PinErr> Interface<SPI, CS, DC, RST, BUSY, D>
where
    SPI: SpiBus,
    CS: OutputPin<Error = PinErr>,
    DC: OutputPin<Error = PinErr>,
{
    fn frame(
        &mut self,
        data_mode: bool,
        bytes: &[u8],
    ) -> Result<(), InterfaceError<SPI::Error, PinErr>> {
        self.cs.set_low().map_err(InterfaceError::Pin)?;
        let sent = self.write_frame(data_mode, bytes);
        // CS must come back up even when the write failed
        let released = self.cs.set_high().map_err(InterfaceError::Pin);
        sent.and(released)
    }

    fn write_frame(
        &mut self,
        data_mode: bool,
        bytes: &[u8],
    ) -> Result<(), InterfaceError<SPI::Error, PinErr>> {
        if data_mode {
            self.dc.set_high().map_err(InterfaceError::Pin)?;
        } else {
            self.dc.set_low().map_err(InterfaceError::Pin)?;
        }
        self.spi.write(bytes).map_err(InterfaceError::Spi)?;
        self.spi.flush().map_err(InterfaceError::Spi)
    }
}

impl<SPI, CS, DC, RST, BUSY, D, PinErr> DisplayInterface for Interface<SPI, CS, DC, RST, BUSY, D>
where
    SPI: SpiBus,
    CS: OutputPin<Error = PinErr>,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    BUSY: InputPin<Error = PinErr>,
    D: DelayNs,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn send_command(&mut self, command: u8) -> Result<(), Self::Error> {
        self.frame(false, &[command])
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if data.is_empty() {
            return Ok(());
        }
        log::trace!("data {} bytes", data.len());
        self.frame(true, data)
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.rst.set_high().map_err(InterfaceError::Pin)?;
        self.delay.delay_ms(RESET_HOLD_MS);
        self.rst.set_low().map_err(InterfaceError::Pin)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        self.rst.set_high().map_err(InterfaceError::Pin)?;
        Ok(())
    }

    fn wait_for_panel(&mut self) -> Result<(), BusyError<Self::Error>> {
        log::debug!("Waiting for panel...");
        let limit = self
            .busy_timeout
            .map(|t| t.as_millis().div_ceil(BUSY_POLL_INTERVAL_MS as u128));
        let mut polls: u128 = 0;

        loop {
            match self.busy.is_high() {
                Ok(false) => {
                    log::debug!("Panel is idle after ~{polls}ms");
                    return Ok(());
                }
                Ok(true) => {
                    if let (Some(limit), Some(timeout)) = (limit, self.busy_timeout) {
                        if polls >= limit {
                            log::error!("BUSY still high after {timeout:?}");
                            return Err(BusyError::Timeout(timeout));
                        }
                    }
                    self.delay.delay_ms(BUSY_POLL_INTERVAL_MS);
                    polls += 1;
                }
                Err(e) => return Err(BusyError::Interface(InterfaceError::Pin(e))),
            }
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

impl<SPI, CS, DC, RST, BUSY, D> Release for Interface<SPI, CS, DC, RST, BUSY, D>
where
    CS: OutputPin,
{
    fn release(&mut self) {
        // Leave the controller deselected; the pins themselves are freed on drop
        if self.cs.set_high().is_err() {
            log::warn!("Could not deassert CS while releasing the interface");
        }
        log::debug!("Interface released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Wire {
        Cs(bool),
        Dc(bool),
        Rst(bool),
        Spi(Vec<u8>),
        Delay(u32),
    }

    type Log = Rc<RefCell<Vec<Wire>>>;

    struct Spi {
        log: Log,
        fail: bool,
    }

    #[derive(Debug)]
    struct SpiFault;

    impl embedded_hal::spi::Error for SpiFault {
        fn kind(&self) -> embedded_hal::spi::ErrorKind {
            embedded_hal::spi::ErrorKind::Other
        }
    }

    impl embedded_hal::spi::ErrorType for Spi {
        type Error = SpiFault;
    }

    impl SpiBus for Spi {
        fn read(&mut self, _words: &mut [u8]) -> Result<(), SpiFault> {
            Ok(())
        }
        fn write(&mut self, words: &[u8]) -> Result<(), SpiFault> {
            if self.fail {
                return Err(SpiFault);
            }
            self.log.borrow_mut().push(Wire::Spi(words.to_vec()));
            Ok(())
        }
        fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), SpiFault> {
            Ok(())
        }
        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), SpiFault> {
            Ok(())
        }
        fn flush(&mut self) -> Result<(), SpiFault> {
            Ok(())
        }
    }

    struct Pin {
        log: Log,
        wrap: fn(bool) -> Wire,
    }

    impl embedded_hal::digital::ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push((self.wrap)(false));
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.log.borrow_mut().push((self.wrap)(true));
            Ok(())
        }
    }

    /// Reads high for the first `busy_polls` reads, then low.
    struct Busy {
        busy_polls: u32,
    }

    impl embedded_hal::digital::ErrorType for Busy {
        type Error = Infallible;
    }

    impl InputPin for Busy {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            if self.busy_polls == 0 {
                return Ok(false);
            }
            self.busy_polls -= 1;
            Ok(true)
        }
        fn is_low(&mut self) -> Result<bool, Infallible> {
            self.is_high().map(|high| !high)
        }
    }

    struct Delay {
        log: Log,
    }

    impl DelayNs for Delay {
        fn delay_ns(&mut self, _ns: u32) {}
        fn delay_ms(&mut self, ms: u32) {
            self.log.borrow_mut().push(Wire::Delay(ms));
        }
    }

    fn interface(
        busy_polls: u32,
        fail_spi: bool,
    ) -> (Interface<Spi, Pin, Pin, Pin, Busy, Delay>, Log) {
        let log: Log = Rc::default();
        let interface = Interface::new(
            Spi {
                log: log.clone(),
                fail: fail_spi,
            },
            Pin {
                log: log.clone(),
                wrap: Wire::Cs,
            },
            Pin {
                log: log.clone(),
                wrap: Wire::Dc,
            },
            Pin {
                log: log.clone(),
                wrap: Wire::Rst,
            },
            Busy { busy_polls },
            Delay { log: log.clone() },
        );
        (interface, log)
    }

    #[test]
    fn command_is_framed_by_chip_select() {
        let (mut interface, log) = interface(0, false);
        interface.send_command(0x12).unwrap();
        assert_eq!(
            *log.borrow(),
            [
                Wire::Cs(false),
                Wire::Dc(false),
                Wire::Spi(vec![0x12]),
                Wire::Cs(true)
            ]
        );
    }

    #[test]
    fn data_goes_out_as_one_transaction() {
        let (mut interface, log) = interface(0, false);
        interface.send_data(&[0xAF, 0x02, 0x01]).unwrap();
        assert_eq!(
            *log.borrow(),
            [
                Wire::Cs(false),
                Wire::Dc(true),
                Wire::Spi(vec![0xAF, 0x02, 0x01]),
                Wire::Cs(true)
            ]
        );
    }

    #[test]
    fn empty_data_is_not_transferred() {
        let (mut interface, log) = interface(0, false);
        interface.send_data(&[]).unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn chip_select_released_after_failed_write() {
        let (mut interface, log) = interface(0, true);
        let result = interface.send_command(0x10);
        assert!(matches!(result, Err(InterfaceError::Spi(SpiFault))));
        assert_eq!(log.borrow().last(), Some(&Wire::Cs(true)));
    }

    #[test]
    fn reset_pulses_low_for_four_ms() {
        let (mut interface, log) = interface(0, false);
        interface.reset().unwrap();
        assert_eq!(
            *log.borrow(),
            [
                Wire::Rst(true),
                Wire::Delay(200),
                Wire::Rst(false),
                Wire::Delay(4),
                Wire::Rst(true)
            ]
        );
    }

    #[test]
    fn wait_returns_immediately_when_idle() {
        let (mut interface, log) = interface(0, false);
        interface.wait_for_panel().unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn wait_polls_until_busy_clears() {
        let (mut interface, log) = interface(3, false);
        interface.wait_for_panel().unwrap();
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn wait_times_out_when_busy_sticks() {
        let (interface, _log) = interface(u32::MAX, false);
        let mut interface = interface.with_busy_timeout(Some(Duration::from_millis(5)));
        let result = interface.wait_for_panel();
        assert!(matches!(result, Err(BusyError::Timeout(t)) if t == Duration::from_millis(5)));
    }

    #[test]
    fn unbounded_wait_outlasts_default_timeout() {
        let (interface, _log) = interface(40_000, false);
        let mut interface = interface.with_busy_timeout(None);
        assert!(interface.wait_for_panel().is_ok());
    }

    #[test]
    fn release_deselects_controller() {
        let (mut interface, log) = interface(0, false);
        interface.release();
        assert_eq!(*log.borrow(), [Wire::Cs(true)]);
    }

    static RECORDS: std::sync::Mutex<Vec<(std::thread::ThreadId, String)>> =
        std::sync::Mutex::new(Vec::new());

    struct Capture;

    impl log::Log for Capture {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }
        fn log(&self, record: &log::Record) {
            if let Ok(mut records) = RECORDS.lock() {
                records.push((std::thread::current().id(), record.args().to_string()));
            }
        }
        fn flush(&self) {}
    }

    fn capture_logs() {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(|| {
            let _ = log::set_logger(&Capture);
            log::set_max_level(log::LevelFilter::Trace);
        });
    }

    #[test]
    fn each_command_is_logged_once() {
        use crate::models::Epd2in7bV2;
        use crate::panel::Panel;

        capture_logs();
        let (interface, _) = interface(0, false);
        let mut panel: Panel<_, Epd2in7bV2> = Panel::new(interface);
        panel.power_on().unwrap();

        let me = std::thread::current().id();
        let soft_resets = RECORDS
            .lock()
            .unwrap()
            .iter()
            .filter(|(thread, message)| *thread == me && message == "cmd 0x12")
            .count();
        assert_eq!(soft_resets, 1);
    }
}
