//! Supported panels and their register sequences
//!
//! Each panel is a zero-sized type implementing [`PanelModel`], which carries
//! the model's geometry and its constant [`Step`] tables. The tables are plain
//! data, so a sequence can be checked without hardware by replaying it into a
//! mock interface.
//!
//! [`Model`] is the registry: it names every supported panel, parses the
//! identifiers used on the command line and in configuration, and builds the
//! matching [`AnyPanel`].
//!
//! ## Adding a panel
//!
//! 1. Add a module with a unit struct implementing [`PanelModel`]
//! 2. Add a variant to [`Model`] and [`AnyPanel`]
//! 3. Extend the matches below

mod epd2in7b_v2;
mod epd7in5b_hd;

pub use epd2in7b_v2::Epd2in7bV2;
pub use epd7in5b_hd::Epd7in5bHd;

use core::str::FromStr;

use crate::config::Dimensions;
use crate::error::{Error, UnsupportedModel};
use crate::interface::DisplayInterface;
use crate::panel::{Epd, Panel, PanelState};

/// One entry of a register sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Hardware reset pulse on RST
    Reset,
    /// Command frame
    Command(u8),
    /// Data frame belonging to the preceding command
    Data(&'static [u8]),
    /// Block until BUSY is released
    WaitBusy,
    /// Fixed settle time
    DelayMs(u32),
}

/// Geometry and register tables of one panel model
pub trait PanelModel {
    /// Registry entry for this model
    const MODEL: Model;
    /// Width in pixels (source outputs)
    const WIDTH: u16;
    /// Height in pixels (gate outputs)
    const HEIGHT: u16;
    /// Bytes per plane for a full frame
    const FRAME_BYTES: usize = Self::WIDTH as usize * Self::HEIGHT as usize / 8;

    /// Reset, controller configuration and LUT load
    const POWER_ON: &'static [Step];
    /// RAM X/Y address counters back to the origin
    const RAM_ADDRESS: &'static [Step];
    /// Display update after both RAMs are written
    const REFRESH: &'static [Step];
    /// Deep sleep
    const POWER_OFF: &'static [Step];
}

/// Supported panel models
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Model {
    /// Waveshare 7.5" HD (B), see [`Epd7in5bHd`]
    Waveshare7in5bHd,
    /// Waveshare 2.7" (B) V2, see [`Epd2in7bV2`]
    Waveshare2in7bV2,
}

impl Model {
    /// Every supported model
    pub const ALL: [Model; 2] = [Model::Waveshare7in5bHd, Model::Waveshare2in7bV2];

    /// Registry identifier
    pub fn id(self) -> &'static str {
        match self {
            Model::Waveshare7in5bHd => "waveshare_7in5b_hd",
            Model::Waveshare2in7bV2 => "waveshare_2in7b_v2",
        }
    }

    /// Panel geometry
    pub fn dimensions(self) -> Dimensions {
        match self {
            Model::Waveshare7in5bHd => dimensions_of::<Epd7in5bHd>(),
            Model::Waveshare2in7bV2 => dimensions_of::<Epd2in7bV2>(),
        }
    }

    /// Build the state machine for this model around `interface`
    pub fn connect<I: DisplayInterface>(self, interface: I) -> AnyPanel<I> {
        match self {
            Model::Waveshare7in5bHd => AnyPanel::Waveshare7in5bHd(Panel::new(interface)),
            Model::Waveshare2in7bV2 => AnyPanel::Waveshare2in7bV2(Panel::new(interface)),
        }
    }
}

impl FromStr for Model {
    type Err = UnsupportedModel;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|model| model.id() == id)
            .ok_or_else(|| UnsupportedModel(id.into()))
    }
}

impl core::fmt::Display for Model {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.id())
    }
}

pub(crate) fn dimensions_of<M: PanelModel>() -> Dimensions {
    Dimensions {
        width: M::WIDTH,
        height: M::HEIGHT,
    }
}

/// A panel of any supported model
///
/// The model set is closed, so this is an enum over the concrete
/// [`Panel`] types rather than a trait object.
pub enum AnyPanel<I: DisplayInterface> {
    /// 7.5" HD (B)
    Waveshare7in5bHd(Panel<I, Epd7in5bHd>),
    /// 2.7" (B) V2
    Waveshare2in7bV2(Panel<I, Epd2in7bV2>),
}

macro_rules! each_panel {
    ($self:expr, $panel:ident => $body:expr) => {
        match $self {
            AnyPanel::Waveshare7in5bHd($panel) => $body,
            AnyPanel::Waveshare2in7bV2($panel) => $body,
        }
    };
}

impl<I: DisplayInterface> AnyPanel<I> {
    /// Which model this is
    pub fn model(&self) -> Model {
        match self {
            AnyPanel::Waveshare7in5bHd(_) => Model::Waveshare7in5bHd,
            AnyPanel::Waveshare2in7bV2(_) => Model::Waveshare2in7bV2,
        }
    }

    /// Change how many bytes go into each data frame while streaming planes
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        each_panel!(self, panel => panel.set_chunk_size(chunk_size))
    }

    /// Hand back the interface
    pub fn into_interface(self) -> I {
        each_panel!(self, panel => panel.into_interface())
    }

    /// Borrow the interface
    pub fn interface(&self) -> &I {
        each_panel!(self, panel => panel.interface())
    }

    pub(crate) fn interface_mut(&mut self) -> &mut I {
        each_panel!(self, panel => panel.interface_mut())
    }
}

impl<I: DisplayInterface> Epd for AnyPanel<I> {
    type Interface = I;

    fn power_on(&mut self) -> Result<(), Error<I>> {
        each_panel!(self, panel => panel.power_on())
    }

    fn show_image(&mut self, pixels: &[u8]) -> Result<(), Error<I>> {
        each_panel!(self, panel => panel.show_image(pixels))
    }

    fn show_image_buffer(&mut self, black: &[u8], red: &[u8]) -> Result<(), Error<I>> {
        each_panel!(self, panel => panel.show_image_buffer(black, red))
    }

    fn power_off(&mut self) -> Result<(), Error<I>> {
        each_panel!(self, panel => panel.power_off())
    }

    fn state(&self) -> PanelState {
        each_panel!(self, panel => panel.state())
    }

    fn dimensions(&self) -> Dimensions {
        self.model().dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::*;

    #[test]
    fn ids_round_trip() {
        for model in Model::ALL {
            assert_eq!(model.id().parse::<Model>(), Ok(model));
            assert_eq!(model.to_string(), model.id());
        }
    }

    #[test]
    fn unknown_id_has_no_fallback() {
        for id in ["", "waveshare_7in5b", "WAVESHARE_7IN5B_HD", "waveshare_2in7b_v3"] {
            assert_eq!(id.parse::<Model>(), Err(UnsupportedModel(id.into())));
        }
    }

    #[test]
    fn dimensions_are_byte_aligned() {
        for model in Model::ALL {
            let dims = model.dimensions();
            assert_eq!(dims.width % 8, 0, "{model}");
        }
        assert_eq!(Epd7in5bHd::FRAME_BYTES, 880 * 528 / 8);
        assert_eq!(Epd2in7bV2::FRAME_BYTES, 176 * 264 / 8);
    }

    fn border(steps: &[Step]) -> Option<Step> {
        steps
            .windows(2)
            .find(|w| w[0] == Step::Command(BORDER_WAVEFORM))
            .map(|w| w[1])
    }

    fn has_soft_start(steps: &[Step]) -> bool {
        steps.contains(&Step::Command(BOOSTER_SOFT_START))
    }

    #[test]
    fn revisions_differ_in_border_and_soft_start() {
        assert_eq!(border(Epd7in5bHd::POWER_ON), Some(Step::Data(&[0x01])));
        assert_eq!(border(Epd2in7bV2::POWER_ON), Some(Step::Data(&[0x05])));
        assert!(has_soft_start(Epd7in5bHd::POWER_ON));
        assert!(!has_soft_start(Epd2in7bV2::POWER_ON));
    }

    fn check_power_on(steps: &[Step]) {
        assert_eq!(steps[0], Step::Reset);
        assert_eq!(steps[1], Step::Command(SOFT_RESET));
        assert_eq!(steps[2], Step::WaitBusy);
        // LUT load is executed and waited on last
        assert_eq!(
            steps[steps.len() - 4..],
            [
                Step::Command(DISPLAY_UPDATE_CTRL2),
                Step::Data(&[SEQUENCE_LOAD_LUT]),
                Step::Command(MASTER_ACTIVATION),
                Step::WaitBusy,
            ]
        );
    }

    #[test]
    fn power_on_tables_share_framing() {
        check_power_on(Epd7in5bHd::POWER_ON);
        check_power_on(Epd2in7bV2::POWER_ON);
    }

    #[test]
    fn every_data_step_follows_a_command() {
        for steps in [
            Epd7in5bHd::POWER_ON,
            Epd7in5bHd::RAM_ADDRESS,
            Epd7in5bHd::REFRESH,
            Epd7in5bHd::POWER_OFF,
            Epd2in7bV2::POWER_ON,
            Epd2in7bV2::RAM_ADDRESS,
            Epd2in7bV2::REFRESH,
            Epd2in7bV2::POWER_OFF,
        ] {
            for pair in steps.windows(2) {
                if let Step::Data(_) = pair[1] {
                    assert!(matches!(pair[0], Step::Command(_)), "{pair:?}");
                }
            }
        }
    }
}
