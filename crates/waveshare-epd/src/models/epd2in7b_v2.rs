//! Waveshare 2.7" (B) V2, 176×264 black/white/red
//!
//! Same controller family as the 7.5" HD (B). The differences that matter:
//! no booster soft-start block, border waveform 0x05, and X addresses counted
//! in bytes (one byte each) instead of pixels.

use crate::command::*;
use crate::models::{Model, PanelModel, Step};

/// Waveshare 2.7" (B) V2
#[derive(Clone, Copy, Debug, Default)]
pub struct Epd2in7bV2;

impl PanelModel for Epd2in7bV2 {
    const MODEL: Model = Model::Waveshare2in7bV2;
    const WIDTH: u16 = 176;
    const HEIGHT: u16 = 264;

    const POWER_ON: &'static [Step] = &[
        Step::Reset,
        Step::Command(SOFT_RESET),
        Step::WaitBusy,
        // 0x107 + 1 = 264 gates
        Step::Command(DRIVER_OUTPUT_CONTROL),
        Step::Data(&[0x07, 0x01, 0x00]),
        Step::Command(DATA_ENTRY_MODE),
        Step::Data(&[DATA_ENTRY_X_INC_Y_INC]),
        // X 0x00..=0x15 in bytes (176 / 8 - 1)
        Step::Command(SET_RAM_X_RANGE),
        Step::Data(&[0x00, 0x15]),
        Step::Command(SET_RAM_Y_RANGE),
        Step::Data(&[0x00, 0x00, 0x07, 0x01]),
        Step::Command(BORDER_WAVEFORM),
        Step::Data(&[0x05]),
        Step::Command(TEMP_SENSOR_CONTROL),
        Step::Data(&[INTERNAL_TEMP_SENSOR]),
        Step::Command(DISPLAY_UPDATE_CTRL2),
        Step::Data(&[SEQUENCE_LOAD_LUT]),
        Step::Command(MASTER_ACTIVATION),
        Step::WaitBusy,
    ];

    const RAM_ADDRESS: &'static [Step] = &[
        Step::Command(SET_RAM_X_COUNTER),
        Step::Data(&[0x00]),
        Step::Command(SET_RAM_Y_COUNTER),
        Step::Data(&[0x00, 0x00]),
    ];

    const REFRESH: &'static [Step] = &[
        Step::Command(DISPLAY_UPDATE_CTRL2),
        Step::Data(&[SEQUENCE_DISPLAY]),
        Step::Command(MASTER_ACTIVATION),
        Step::DelayMs(200),
        Step::WaitBusy,
    ];

    const POWER_OFF: &'static [Step] = &[
        Step::Command(DEEP_SLEEP),
        Step::Data(&[DEEP_SLEEP_MODE_1]),
    ];
}
