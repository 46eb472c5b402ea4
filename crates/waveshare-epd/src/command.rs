//! SSD16xx-family command definitions shared by the supported Waveshare panels

// Initialization and reset
pub const SOFT_RESET: u8 = 0x12; // Reset device parameters to default
pub const BOOSTER_SOFT_START: u8 = 0x0C; // Booster soft-start control
pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01; // Gate count and scan direction
pub const BORDER_WAVEFORM: u8 = 0x3C; // Border waveform control
pub const TEMP_SENSOR_CONTROL: u8 = 0x18; // Temperature sensor selection

// RAM and buffer management
pub const DATA_ENTRY_MODE: u8 = 0x11; // Data entry mode
pub const SET_RAM_X_RANGE: u8 = 0x44; // Set RAM X address start/end
pub const SET_RAM_Y_RANGE: u8 = 0x45; // Set RAM Y address start/end
pub const SET_RAM_X_COUNTER: u8 = 0x4E; // Set RAM X address counter
pub const SET_RAM_Y_COUNTER: u8 = 0x4F; // Set RAM Y address counter
pub const WRITE_RAM_BW: u8 = 0x24; // Write to BW RAM
pub const WRITE_RAM_RED: u8 = 0x26; // Write to RED RAM

// Display update and refresh
pub const DISPLAY_UPDATE_CTRL2: u8 = 0x22; // Load update sequence
pub const MASTER_ACTIVATION: u8 = 0x20; // Execute loaded sequence

// Power management
pub const DEEP_SLEEP: u8 = 0x10; // Deep sleep

// Register values
pub const INTERNAL_TEMP_SENSOR: u8 = 0x80;
pub const SEQUENCE_LOAD_LUT: u8 = 0xB1; // Clock on, load temperature and LUT
pub const SEQUENCE_DISPLAY: u8 = 0xC7; // Clock and analog on, display, power down
pub const DEEP_SLEEP_MODE_1: u8 = 0x01; // Retain RAM
pub const DATA_ENTRY_X_INC_Y_DEC: u8 = 0x01;
pub const DATA_ENTRY_X_INC_Y_INC: u8 = 0x03;
