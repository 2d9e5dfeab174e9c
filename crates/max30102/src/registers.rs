use super::errors::MAX30102RegisterError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// 7-bit bus address of the part.
pub const ADDR: u8 = 0x57;
/// Content of [`Register::PART_ID`].
pub const EXPECTED_PART_ID: u8 = 0x15;
/// Number of bytes one red + IR sample occupies in the FIFO.
pub const FIFO_SAMPLE_BYTES: usize = 6;
/// Samples are 18 bits wide, left in the low bits of each 24-bit word.
pub const SAMPLE_MASK: u32 = 0x03_FFFF;

impl From<Register> for u8 {
    fn from(val: Register) -> Self {
        val as u8
    }
}

/// Register addresses
#[allow(non_camel_case_types)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Interrupt Status 1
    INT_STATUS_1 = 0x00,
    /// Interrupt Status 2
    INT_STATUS_2 = 0x01,
    /// Interrupt Enable 1
    INT_ENABLE_1 = 0x02,
    /// Interrupt Enable 2
    INT_ENABLE_2 = 0x03,
    /// FIFO Write Pointer
    FIFO_WR_PTR = 0x04,
    /// FIFO Overflow Counter
    FIFO_OVF_CNT = 0x05,
    /// FIFO Read Pointer
    FIFO_RD_PTR = 0x06,
    /// FIFO Data (burst readable, the pointer does not auto-increment)
    FIFO_DATA = 0x07,
    /// FIFO Configuration
    FIFO_CONFIG = 0x08,
    /// Mode Configuration
    MODE_CONFIG = 0x09,
    /// SpO2 Configuration
    SPO2_CONFIG = 0x0A,
    /// LED1 (red) Pulse Amplitude
    LED1_PA = 0x0C,
    /// LED2 (IR) Pulse Amplitude
    LED2_PA = 0x0D,
    /// Multi-LED Mode Control, slots 1 and 2
    MULTI_LED_CTRL_1 = 0x11,
    /// Multi-LED Mode Control, slots 3 and 4
    MULTI_LED_CTRL_2 = 0x12,
    /// Die Temperature Integer
    TEMP_INT = 0x1F,
    /// Die Temperature Fraction
    TEMP_FRAC = 0x20,
    /// Die Temperature Config
    TEMP_CONFIG = 0x21,
    /// Revision ID
    REV_ID = 0xFE,
    /// Part ID (Read-Only)
    PART_ID = 0xFF,
}

/// Configuration enums
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleAverage {
    None,
    _2,
    #[default]
    _4,
    _8,
    _16,
    _32,
}

impl SampleAverage {
    pub const fn samples(&self) -> u8 {
        match self {
            SampleAverage::None => 1,
            SampleAverage::_2 => 2,
            SampleAverage::_4 => 4,
            SampleAverage::_8 => 8,
            SampleAverage::_16 => 16,
            SampleAverage::_32 => 32,
        }
    }
}

#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedMode {
    /// Red LED only
    HeartRate,
    /// Red and IR LEDs
    #[default]
    SpO2,
    /// Slot sequence from the multi-LED control registers
    MultiLed,
}

#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcRange {
    _2048nA,
    #[default]
    _4096nA,
    _8192nA,
    _16384nA,
}

#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleRate {
    Sps50,
    #[default]
    Sps100,
    Sps200,
    Sps400,
    Sps800,
    Sps1000,
    Sps1600,
    Sps3200,
}

impl SampleRate {
    pub const fn hz(&self) -> u16 {
        match self {
            SampleRate::Sps50 => 50,
            SampleRate::Sps100 => 100,
            SampleRate::Sps200 => 200,
            SampleRate::Sps400 => 400,
            SampleRate::Sps800 => 800,
            SampleRate::Sps1000 => 1000,
            SampleRate::Sps1600 => 1600,
            SampleRate::Sps3200 => 3200,
        }
    }
}

#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseWidth {
    _69us,
    _118us,
    _215us,
    #[default]
    _411us,
}

impl PulseWidth {
    pub const fn resolution_bits(&self) -> u8 {
        match self {
            PulseWidth::_69us => 15,
            PulseWidth::_118us => 16,
            PulseWidth::_215us => 17,
            PulseWidth::_411us => 18,
        }
    }
}

/// LED drive current in mA for a pulse amplitude register code.
pub fn led_current_ma(code: u8) -> f32 {
    code as f32 * 0.2
}

bitflags! {
    /// MODE_CONFIG
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ModeConfig: u8 {
        const SHDN  = 0b1000_0000;
        const RESET = 0b0100_0000;
        const MODE2 = 0b0000_0100;
        const MODE1 = 0b0000_0010;
        const MODE0 = 0b0000_0001;

        const MODE = Self::MODE2.bits() | Self::MODE1.bits() | Self::MODE0.bits();
    }
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self::from_bits_retain(0x00)
    }
}

impl ModeConfig {
    pub const fn reset(&self) -> bool {
        self.contains(Self::RESET)
    }

    pub const fn with_reset(self, reset: bool) -> Self {
        let reg = self.difference(Self::RESET);
        match reset {
            false => reg,
            true => reg.union(Self::RESET),
        }
    }

    pub const fn shdn(&self) -> bool {
        self.contains(Self::SHDN)
    }

    pub const fn with_shdn(self, shdn: bool) -> Self {
        let reg = self.difference(Self::SHDN);
        match shdn {
            false => reg,
            true => reg.union(Self::SHDN),
        }
    }

    pub const fn mode(&self) -> Result<LedMode, MAX30102RegisterError> {
        let mode = match self.intersection(Self::MODE).bits() {
            0b010 => LedMode::HeartRate,
            0b011 => LedMode::SpO2,
            0b111 => LedMode::MultiLed,
            e => return Err(MAX30102RegisterError::InvalidLedMode(e)),
        };
        Ok(mode)
    }

    pub const fn with_mode(self, mode: LedMode) -> Self {
        let reg = self.difference(Self::MODE);
        match mode {
            LedMode::HeartRate => reg.union(Self::MODE1),
            LedMode::SpO2 => reg.union(Self::MODE1).union(Self::MODE0),
            LedMode::MultiLed => reg.union(Self::MODE),
        }
    }
}

bitflags! {
    /// FIFO_CONFIG
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct FifoConfig: u8 {
        const SMP_AVE2         = 0b1000_0000;
        const SMP_AVE1         = 0b0100_0000;
        const SMP_AVE0         = 0b0010_0000;
        const FIFO_ROLLOVER_EN = 0b0001_0000;
        const FIFO_A_FULL3     = 0b0000_1000;
        const FIFO_A_FULL2     = 0b0000_0100;
        const FIFO_A_FULL1     = 0b0000_0010;
        const FIFO_A_FULL0     = 0b0000_0001;

        const SMP_AVE = Self::SMP_AVE2.bits() | Self::SMP_AVE1.bits() | Self::SMP_AVE0.bits();
        const FIFO_A_FULL = Self::FIFO_A_FULL3.bits()
            | Self::FIFO_A_FULL2.bits()
            | Self::FIFO_A_FULL1.bits()
            | Self::FIFO_A_FULL0.bits();
    }
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self::from_bits_retain(0x00)
    }
}

impl FifoConfig {
    pub const fn sample_average(&self) -> SampleAverage {
        match self.intersection(Self::SMP_AVE).bits() >> 5 {
            0b000 => SampleAverage::None,
            0b001 => SampleAverage::_2,
            0b010 => SampleAverage::_4,
            0b011 => SampleAverage::_8,
            0b100 => SampleAverage::_16,
            _ => SampleAverage::_32,
        }
    }

    pub const fn with_sample_average(self, average: SampleAverage) -> Self {
        let reg = self.difference(Self::SMP_AVE);
        let code: u8 = match average {
            SampleAverage::None => 0b000,
            SampleAverage::_2 => 0b001,
            SampleAverage::_4 => 0b010,
            SampleAverage::_8 => 0b011,
            SampleAverage::_16 => 0b100,
            SampleAverage::_32 => 0b101,
        };
        Self::from_bits_retain(reg.bits() | (code << 5))
    }

    pub const fn rollover(&self) -> bool {
        self.contains(Self::FIFO_ROLLOVER_EN)
    }

    pub const fn with_rollover(self, en: bool) -> Self {
        let reg = self.difference(Self::FIFO_ROLLOVER_EN);
        match en {
            false => reg,
            true => reg.union(Self::FIFO_ROLLOVER_EN),
        }
    }

    pub const fn almost_full(&self) -> u8 {
        self.intersection(Self::FIFO_A_FULL).bits()
    }

    /// Number of free FIFO slots that raises the almost-full interrupt.
    pub const fn with_almost_full(self, free_slots: u8) -> Self {
        let reg = self.difference(Self::FIFO_A_FULL);
        Self::from_bits_retain(reg.bits() | (free_slots & 0x0F))
    }
}

bitflags! {
    /// SPO2_CONFIG
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct SpO2Config: u8 {
        const ADC_RGE1 = 0b0100_0000;
        const ADC_RGE0 = 0b0010_0000;
        const SR2      = 0b0001_0000;
        const SR1      = 0b0000_1000;
        const SR0      = 0b0000_0100;
        const LED_PW1  = 0b0000_0010;
        const LED_PW0  = 0b0000_0001;

        const ADC_RGE = Self::ADC_RGE1.bits() | Self::ADC_RGE0.bits();
        const SR = Self::SR2.bits() | Self::SR1.bits() | Self::SR0.bits();
        const LED_PW = Self::LED_PW1.bits() | Self::LED_PW0.bits();
    }
}

impl Default for SpO2Config {
    fn default() -> Self {
        Self::from_bits_retain(0x00)
    }
}

impl SpO2Config {
    pub const fn adc_range(&self) -> AdcRange {
        match self.intersection(Self::ADC_RGE).bits() >> 5 {
            0b00 => AdcRange::_2048nA,
            0b01 => AdcRange::_4096nA,
            0b10 => AdcRange::_8192nA,
            _ => AdcRange::_16384nA,
        }
    }

    pub const fn with_adc_range(self, range: AdcRange) -> Self {
        let reg = self.difference(Self::ADC_RGE);
        match range {
            AdcRange::_2048nA => reg,
            AdcRange::_4096nA => reg.union(Self::ADC_RGE0),
            AdcRange::_8192nA => reg.union(Self::ADC_RGE1),
            AdcRange::_16384nA => reg.union(Self::ADC_RGE),
        }
    }

    pub const fn sample_rate(&self) -> SampleRate {
        match self.intersection(Self::SR).bits() >> 2 {
            0b000 => SampleRate::Sps50,
            0b001 => SampleRate::Sps100,
            0b010 => SampleRate::Sps200,
            0b011 => SampleRate::Sps400,
            0b100 => SampleRate::Sps800,
            0b101 => SampleRate::Sps1000,
            0b110 => SampleRate::Sps1600,
            _ => SampleRate::Sps3200,
        }
    }

    pub const fn with_sample_rate(self, rate: SampleRate) -> Self {
        let reg = self.difference(Self::SR);
        let code: u8 = match rate {
            SampleRate::Sps50 => 0b000,
            SampleRate::Sps100 => 0b001,
            SampleRate::Sps200 => 0b010,
            SampleRate::Sps400 => 0b011,
            SampleRate::Sps800 => 0b100,
            SampleRate::Sps1000 => 0b101,
            SampleRate::Sps1600 => 0b110,
            SampleRate::Sps3200 => 0b111,
        };
        Self::from_bits_retain(reg.bits() | (code << 2))
    }

    pub const fn pulse_width(&self) -> PulseWidth {
        match self.intersection(Self::LED_PW).bits() {
            0b00 => PulseWidth::_69us,
            0b01 => PulseWidth::_118us,
            0b10 => PulseWidth::_215us,
            _ => PulseWidth::_411us,
        }
    }

    pub const fn with_pulse_width(self, width: PulseWidth) -> Self {
        let reg = self.difference(Self::LED_PW);
        match width {
            PulseWidth::_69us => reg,
            PulseWidth::_118us => reg.union(Self::LED_PW0),
            PulseWidth::_215us => reg.union(Self::LED_PW1),
            PulseWidth::_411us => reg.union(Self::LED_PW),
        }
    }
}

bitflags! {
    /// TEMP_CONFIG
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct TempConfig: u8 {
        /// Starts a conversion, self-clears when it is done.
        const TEMP_EN = 0b0000_0001;
    }
}
