//! Scoped ownership of a panel and its transport
//!
//! A [`Session`] binds one interface to one [`AnyPanel`] and releases the
//! interface exactly once when it goes away: after a normal return, an early
//! `?`, or a panic unwinding through the caller.
//!
//! ```
//! use waveshare_epd::mock::MockInterface;
//! use waveshare_epd::{Epd, Model, session};
//!
//! let mock = MockInterface::new();
//! let probe = mock.probe();
//!
//! let result = session::start(Model::Waveshare2in7bV2, mock, |panel| {
//!     panel.power_on()?;
//!     panel.power_off()
//! });
//! assert!(result.is_ok());
//! assert_eq!(probe.releases(), 1);
//! ```

use core::ops::{Deref, DerefMut};

use crate::error::UnsupportedModel;
use crate::interface::{DisplayInterface, Release};
use crate::models::{AnyPanel, Model};
use crate::panel::{Epd, PanelState};

/// A panel bound to its interface for the lifetime of this value
pub struct Session<I>
where
    I: DisplayInterface + Release,
{
    panel: AnyPanel<I>,
}

impl<I> Session<I>
where
    I: DisplayInterface + Release,
{
    /// Bind `interface` to a panel of `model`
    ///
    /// Nothing is sent until the caller powers the panel on.
    pub fn open(model: Model, interface: I) -> Self {
        log::debug!("Opening session for {model}");
        Self {
            panel: model.connect(interface),
        }
    }

    /// Like [`open`](Self::open), looking the model up by identifier
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedModel`] for an unknown identifier. The interface is
    /// released before returning.
    pub fn open_id(id: &str, mut interface: I) -> Result<Self, UnsupportedModel> {
        match id.parse::<Model>() {
            Ok(model) => Ok(Self::open(model, interface)),
            Err(e) => {
                interface.release();
                Err(e)
            }
        }
    }

    /// Tear down now instead of at end of scope
    pub fn close(self) {}
}

impl<I> Deref for Session<I>
where
    I: DisplayInterface + Release,
{
    type Target = AnyPanel<I>;

    fn deref(&self) -> &AnyPanel<I> {
        &self.panel
    }
}

impl<I> DerefMut for Session<I>
where
    I: DisplayInterface + Release,
{
    fn deref_mut(&mut self) -> &mut AnyPanel<I> {
        &mut self.panel
    }
}

impl<I> Drop for Session<I>
where
    I: DisplayInterface + Release,
{
    fn drop(&mut self) {
        let model = self.panel.model();
        match self.panel.state() {
            PanelState::PoweredOn | PanelState::Displaying => {
                log::warn!("{model} released while still powered on");
            }
            _ => log::debug!("Releasing {model}"),
        }
        self.panel.interface_mut().release();
    }
}

/// Run `f` against a fresh panel and release the interface afterwards
///
/// Returns whatever `f` returns. Teardown has already happened by then,
/// whether `f` succeeded, failed or panicked.
pub fn start<I, R, F>(model: Model, interface: I, f: F) -> R
where
    I: DisplayInterface + Release,
    F: FnOnce(&mut AnyPanel<I>) -> R,
{
    let mut session = Session::open(model, interface);
    f(&mut session)
}
