//! Driver for Waveshare tri-color (black/white/red) e-paper panels, for use
//! with embedded-hal v1.0
//!
//! ## Layers
//!
//! - [`interface`] frames commands and data on SPI with CS, DC, RST and BUSY
//! - [`encoder`] turns RGB pixels into the controller's black and red planes
//! - [`models`] holds each panel's register sequences and the model registry
//! - [`panel`] is the state machine replaying those sequences
//! - [`session`] owns a panel and releases its interface exactly once
//! - [`rpi`] (feature `rpi`) opens the hardware on a Raspberry Pi
//!
//! ## Example
//!
//! ```
//! use waveshare_epd::mock::MockInterface;
//! use waveshare_epd::{Epd, Model, Session};
//!
//! let mut session = Session::open("waveshare_7in5b_hd".parse::<Model>()?, MockInterface::new());
//! session.power_on()?;
//! session.show_image(&[0xFF; 24])?;
//! session.power_off()?;
//! # Ok::<(), Box<dyn core::error::Error>>(())
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod command;
pub mod config;
pub mod encoder;
pub mod error;
#[cfg(feature = "graphics")]
#[cfg_attr(docsrs, doc(cfg(feature = "graphics")))]
pub mod graphics;
pub mod interface;
pub mod mock;
pub mod models;
pub mod panel;
#[cfg(feature = "rpi")]
#[cfg_attr(docsrs, doc(cfg(feature = "rpi")))]
pub mod rpi;
pub mod session;

pub use config::{Builder, Dimensions, PinAssignment, PinNumbering, SessionConfig};
pub use encoder::{BitPlanes, Color};
pub use error::{BufferError, BuilderError, Error, UnsupportedModel};
#[cfg(feature = "graphics")]
pub use graphics::Canvas;
pub use interface::{BusyError, DisplayInterface, Interface, InterfaceError, Release};
pub use models::{AnyPanel, Model, PanelModel};
pub use panel::{Epd, Panel, PanelState};
pub use session::Session;
