//! Waveshare 7.5" HD (B), 880×528 black/white/red

use crate::command::*;
use crate::models::{Model, PanelModel, Step};

/// Waveshare 7.5" HD (B)
#[derive(Clone, Copy, Debug, Default)]
pub struct Epd7in5bHd;

impl PanelModel for Epd7in5bHd {
    const MODEL: Model = Model::Waveshare7in5bHd;
    const WIDTH: u16 = 880;
    const HEIGHT: u16 = 528;

    const POWER_ON: &'static [Step] = &[
        Step::Reset,
        Step::Command(SOFT_RESET),
        Step::WaitBusy,
        Step::Command(BOOSTER_SOFT_START),
        Step::Data(&[0xAE, 0xC7, 0xC3, 0xC0, 0x40]),
        // 0x2AF gates, scanning backwards
        Step::Command(DRIVER_OUTPUT_CONTROL),
        Step::Data(&[0xAF, 0x02, 0x01]),
        Step::Command(DATA_ENTRY_MODE),
        Step::Data(&[DATA_ENTRY_X_INC_Y_DEC]),
        // X 0x000..=0x36F in pixels, little-endian
        Step::Command(SET_RAM_X_RANGE),
        Step::Data(&[0x00, 0x00, 0x6F, 0x03]),
        // Y 0x2A7 down to 0x000
        Step::Command(SET_RAM_Y_RANGE),
        Step::Data(&[0xA7, 0x02, 0x00, 0x00]),
        Step::Command(BORDER_WAVEFORM),
        Step::Data(&[0x01]),
        Step::Command(TEMP_SENSOR_CONTROL),
        Step::Data(&[INTERNAL_TEMP_SENSOR]),
        Step::Command(DISPLAY_UPDATE_CTRL2),
        Step::Data(&[SEQUENCE_LOAD_LUT]),
        Step::Command(MASTER_ACTIVATION),
        Step::WaitBusy,
    ];

    const RAM_ADDRESS: &'static [Step] = &[
        Step::Command(SET_RAM_X_COUNTER),
        Step::Data(&[0x00, 0x00]),
        Step::Command(SET_RAM_Y_COUNTER),
        Step::Data(&[0xAF, 0x02]),
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
