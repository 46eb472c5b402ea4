//! Recording interface for tests and dry runs
//!
//! [`MockInterface`] implements [`DisplayInterface`] without hardware. It keeps
//! a log of every frame, reset, wait and delay, and can be told to fail. Take a
//! [`Probe`] before moving the mock into a panel to inspect it afterwards.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use crate::interface::{BusyError, DEFAULT_BUSY_TIMEOUT, DisplayInterface, Release};
use crate::models::Step;

/// Something the mock was asked to do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Hardware reset pulse
    Reset,
    /// Command frame
    Command(u8),
    /// Data frame
    Data(Vec<u8>),
    /// Busy wait that completed
    WaitBusy,
    /// Delay in milliseconds
    Delay(u32),
}

impl From<Step> for Event {
    fn from(step: Step) -> Self {
        match step {
            Step::Reset => Event::Reset,
            Step::Command(command) => Event::Command(command),
            Step::Data(data) => Event::Data(data.to_vec()),
            Step::WaitBusy => Event::WaitBusy,
            Step::DelayMs(ms) => Event::Delay(ms),
        }
    }
}

/// Injected transfer failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockError;

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "injected transfer failure")
    }
}

impl core::error::Error for MockError {}

#[derive(Debug, Default)]
struct Shared {
    events: RefCell<Vec<Event>>,
    /// Transfers allowed before the next one fails
    fail_after: Cell<Option<usize>>,
    busy_stuck: Cell<bool>,
    releases: Cell<usize>,
}

/// Interface that records instead of driving hardware
#[derive(Debug, Default)]
pub struct MockInterface {
    shared: Rc<Shared>,
}

/// Handle for inspecting and steering a [`MockInterface`] after it was moved
#[derive(Clone, Debug)]
pub struct Probe {
    shared: Rc<Shared>,
}

impl MockInterface {
    /// Create a mock that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle sharing this mock's log
    pub fn probe(&self) -> Probe {
        Probe {
            shared: self.shared.clone(),
        }
    }

    fn transfer(&mut self, event: Event) -> Result<(), MockError> {
        if let Some(remaining) = self.shared.fail_after.get() {
            if remaining == 0 {
                self.shared.fail_after.set(None);
                return Err(MockError);
            }
            self.shared.fail_after.set(Some(remaining - 1));
        }
        self.shared.events.borrow_mut().push(event);
        Ok(())
    }
}

impl Probe {
    /// Everything recorded so far
    pub fn events(&self) -> Vec<Event> {
        self.shared.events.borrow().clone()
    }

    /// Command and data frames recorded so far
    pub fn transfers(&self) -> usize {
        self.shared
            .events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Command(_) | Event::Data(_)))
            .count()
    }

    /// Forget recorded events
    pub fn clear(&self) {
        self.shared.events.borrow_mut().clear();
    }

    /// Let `count` more frames through, then fail one
    pub fn fail_after(&self, count: usize) {
        self.shared.fail_after.set(Some(count));
    }

    /// Make every busy wait time out
    pub fn stick_busy(&self) {
        self.shared.busy_stuck.set(true);
    }

    /// How many times the interface was released
    pub fn releases(&self) -> usize {
        self.shared.releases.get()
    }
}

impl DisplayInterface for MockInterface {
    type Error = MockError;

    fn send_command(&mut self, command: u8) -> Result<(), MockError> {
        self.transfer(Event::Command(command))
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), MockError> {
        if data.is_empty() {
            return Ok(());
        }
        self.transfer(Event::Data(data.to_vec()))
    }

    fn reset(&mut self) -> Result<(), MockError> {
        self.shared.events.borrow_mut().push(Event::Reset);
        Ok(())
    }

    fn wait_for_panel(&mut self) -> Result<(), BusyError<MockError>> {
        if self.shared.busy_stuck.get() {
            return Err(BusyError::Timeout(DEFAULT_BUSY_TIMEOUT));
        }
        self.shared.events.borrow_mut().push(Event::WaitBusy);
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.shared.events.borrow_mut().push(Event::Delay(ms));
    }
}

impl Release for MockInterface {
    fn release(&mut self) {
        self.shared.releases.set(self.shared.releases.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    #[test]
    fn failure_is_one_shot() {
        let mut mock = MockInterface::new();
        let probe = mock.probe();
        probe.fail_after(1);

        assert!(mock.send_command(0x12).is_ok());
        assert_eq!(mock.send_data(&[0x01]), Err(MockError));
        assert!(mock.send_data(&[0x01]).is_ok());
        assert_eq!(probe.transfers(), 2);
    }

    #[test]
    fn stuck_busy_times_out() {
        let mut mock = MockInterface::new();
        mock.probe().stick_busy();
        assert!(matches!(
            mock.wait_for_panel(),
            Err(BusyError::Timeout(t)) if t == Duration::from_secs(30)
        ));
    }
}
