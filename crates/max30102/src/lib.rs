#![cfg_attr(not(test), no_std)]
//! Driver for the MAX30102 pulse oximetry and heart-rate sensor, talking over
//! a two-wire bus generated in software from two GPIO lines.

#[macro_use]
mod fmt;

pub mod bitbang;
pub mod errors;
pub mod registers;
pub mod sample;

pub use crate::bitbang::{Ack, BusLines, OpenDrainLines, SoftI2c};
pub use crate::errors::{Error, MAX30102RegisterError, NackPhase};
pub use crate::registers::*;
pub use crate::sample::{Sample, SampleBuffer, SAMPLE_BUFFER_CAPACITY};

use byteorder::{BigEndian, ByteOrder};
use embedded_hal::delay::DelayNs;
use serde::{Deserialize, Serialize};

/// Settle time after power-up before the first transaction.
pub const POWER_UP_DELAY_MS: u32 = 100;
/// Reads of the mode register while waiting for the reset bit to clear.
pub const RESET_POLL_LIMIT: u32 = 1000;
pub const RESET_POLL_INTERVAL_MS: u32 = 1;
/// Reads of the temperature config while a conversion is pending.
pub const TEMP_POLL_LIMIT: u32 = 100;
pub const TEMP_POLL_INTERVAL_MS: u32 = 1;

/// Progress through device bring-up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    Uninitialized,
    IdentityChecked,
    Reset,
    Configured,
    /// Configured and at least one sample has been drained from the FIFO.
    Streaming,
}

/// Register codes written during configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub sample_average: SampleAverage,
    /// Overwrite the oldest samples when the FIFO is full.
    pub rollover: bool,
    /// Free FIFO slots left when the almost-full flag is raised.
    pub almost_full: u8,
    pub led_mode: LedMode,
    pub adc_range: AdcRange,
    pub sample_rate: SampleRate,
    pub pulse_width: PulseWidth,
    /// LED1 pulse amplitude code, 0.2 mA per LSB
    pub red_current: u8,
    /// LED2 pulse amplitude code, 0.2 mA per LSB
    pub ir_current: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            sample_average: SampleAverage::_4,
            rollover: true,
            almost_full: 0x0F,
            led_mode: LedMode::SpO2,
            adc_range: AdcRange::_4096nA,
            sample_rate: SampleRate::Sps100,
            pulse_width: PulseWidth::_411us,
            red_current: 0x3F,
            ir_current: 0x3F,
        }
    }
}

impl DeviceConfig {
    pub const fn fifo_config(&self) -> FifoConfig {
        FifoConfig::from_bits_retain(0)
            .with_sample_average(self.sample_average)
            .with_rollover(self.rollover)
            .with_almost_full(self.almost_full)
    }

    pub const fn mode_config(&self) -> ModeConfig {
        ModeConfig::from_bits_retain(0).with_mode(self.led_mode)
    }

    pub const fn spo2_config(&self) -> SpO2Config {
        SpO2Config::from_bits_retain(0)
            .with_adc_range(self.adc_range)
            .with_sample_rate(self.sample_rate)
            .with_pulse_width(self.pulse_width)
    }
}

pub struct Max30102<L, D> {
    bus: SoftI2c<L, D>,
    state: DeviceState,
    config: DeviceConfig,
}

impl<E, L, D> Max30102<L, D>
where
    L: BusLines<Error = E>,
    D: DelayNs,
{
    /// Side-effect-free constructor; the lines are not touched before
    /// [`init`](Self::init).
    pub fn new(lines: L, delay: D) -> Self {
        Self {
            bus: SoftI2c::new(lines, delay),
            state: DeviceState::Uninitialized,
            config: DeviceConfig::default(),
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Configuration last written by [`configure`](Self::configure).
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Release both lines, wait for the part to power up, then identify,
    /// reset and configure it.
    pub fn init(&mut self, config: &DeviceConfig) -> Result<(), Error<E>> {
        self.bus.idle().map_err(Error::Pin)?;
        self.bus.delay_ms(POWER_UP_DELAY_MS);

        self.check_identity()?;
        self.reset()?;
        self.configure(config)?;

        info!("MAX30102 initialized");
        Ok(())
    }

    /// Brackets `phases` with start and stop. The stop is issued even when a
    /// phase fails so the lines return to rest.
    fn transaction<T>(
        &mut self,
        phases: impl FnOnce(&mut SoftI2c<L, D>) -> Result<T, Error<E>>,
    ) -> Result<T, Error<E>> {
        if let Err(e) = self.bus.start() {
            let _ = self.bus.stop();
            return Err(Error::Pin(e));
        }
        let result = phases(&mut self.bus);
        let stopped = self.bus.stop().map_err(Error::Pin);
        let value = result?;
        stopped?;
        Ok(value)
    }

    fn send(
        bus: &mut SoftI2c<L, D>,
        byte: u8,
        phase: NackPhase,
    ) -> Result<(), Error<E>> {
        match bus.send_byte(byte).map_err(Error::Pin)? {
            Ack::Ack => Ok(()),
            Ack::Nack => Err(Error::Nack(phase)),
        }
    }

    pub fn write_register(
        &mut self,
        reg: Register,
        val: u8,
    ) -> Result<(), Error<E>> {
        self.transaction(|bus| {
            Self::send(bus, ADDR << 1, NackPhase::Address)?;
            Self::send(bus, reg.into(), NackPhase::Register)?;
            Self::send(bus, val, NackPhase::Data)
        })
    }

    /// Repeated-start read of `buffer.len()` consecutive bytes starting at
    /// `reg`. Every byte but the last is acknowledged.
    pub fn read_burst(
        &mut self,
        reg: Register,
        buffer: &mut [u8],
    ) -> Result<(), Error<E>> {
        if buffer.is_empty() {
            return Ok(());
        }

        self.transaction(|bus| {
            Self::send(bus, ADDR << 1, NackPhase::Address)?;
            Self::send(bus, reg.into(), NackPhase::Register)?;
            bus.start().map_err(Error::Pin)?;
            Self::send(bus, (ADDR << 1) | 0x01, NackPhase::ReadAddress)?;

            let last = buffer.len() - 1;
            for (i, byte) in buffer.iter_mut().enumerate() {
                let ack = if i == last { Ack::Nack } else { Ack::Ack };
                *byte = bus.recv_byte(ack).map_err(Error::Pin)?;
            }
            Ok(())
        })
    }

    pub fn read_register(&mut self, reg: Register) -> Result<u8, Error<E>> {
        let mut buffer = [0];
        self.read_burst(reg, &mut buffer)?;
        Ok(buffer[0])
    }

    pub fn modify_register<F>(
        &mut self,
        reg: Register,
        f: F,
    ) -> Result<(), Error<E>>
    where
        F: FnOnce(u8) -> u8,
    {
        let value = self.read_register(reg)?;

        self.write_register(reg, f(value))
    }

    pub fn part_id(&mut self) -> Result<u8, Error<E>> {
        self.read_register(Register::PART_ID)
    }

    pub fn revision_id(&mut self) -> Result<u8, Error<E>> {
        self.read_register(Register::REV_ID)
    }

    /// Confirms the part answers with the expected ID. A mismatch is not
    /// retried.
    pub fn check_identity(&mut self) -> Result<(), Error<E>> {
        let id = self.part_id()?;
        if id != EXPECTED_PART_ID {
            error!("MAX30102: part ID mismatch ({=u8:#x})", id);
            return Err(Error::IdentityMismatch(id));
        }

        debug!("MAX30102: part ID {=u8:#x}", id);
        self.state = DeviceState::IdentityChecked;
        Ok(())
    }

    /// Soft reset, then poll the mode register until the reset bit clears.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.write_register(
            Register::MODE_CONFIG,
            ModeConfig::default().with_reset(true).bits(),
        )?;

        for _ in 0..RESET_POLL_LIMIT {
            self.bus.delay_ms(RESET_POLL_INTERVAL_MS);
            let mode = ModeConfig::from_bits_retain(
                self.read_register(Register::MODE_CONFIG)?,
            );
            if !mode.reset() {
                debug!("MAX30102: reset complete");
                self.state = DeviceState::Reset;
                return Ok(());
            }
        }

        error!("MAX30102: reset timed out");
        Err(Error::ResetTimeout)
    }

    /// Programs interrupts, FIFO, mode, acquisition and LED registers, then
    /// empties the FIFO. Sampling starts as soon as the mode is written.
    pub fn configure(&mut self, config: &DeviceConfig) -> Result<(), Error<E>> {
        self.write_register(Register::INT_ENABLE_1, 0x00)?;
        self.write_register(Register::INT_ENABLE_2, 0x00)?;
        self.write_register(
            Register::FIFO_CONFIG,
            config.fifo_config().bits(),
        )?;
        self.write_register(
            Register::MODE_CONFIG,
            config.mode_config().bits(),
        )?;
        self.write_register(
            Register::SPO2_CONFIG,
            config.spo2_config().bits(),
        )?;
        self.write_register(Register::LED1_PA, config.red_current)?;
        self.write_register(Register::LED2_PA, config.ir_current)?;
        self.clear_fifo()?;

        debug!(
            "MAX30102: configured for {=u16} Hz, {=u8} bit",
            config.sample_rate.hz(),
            config.pulse_width.resolution_bits()
        );
        self.config = *config;
        self.state = DeviceState::Configured;
        Ok(())
    }

    /// Zero the FIFO write pointer, overflow counter and read pointer.
    pub fn clear_fifo(&mut self) -> Result<(), Error<E>> {
        self.write_register(Register::FIFO_WR_PTR, 0x00)?;
        self.write_register(Register::FIFO_OVF_CNT, 0x00)?;
        self.write_register(Register::FIFO_RD_PTR, 0x00)
    }

    /// Operating mode currently held by the mode register.
    pub fn led_mode(&mut self) -> Result<LedMode, Error<E>> {
        let mode = ModeConfig::from_bits_retain(
            self.read_register(Register::MODE_CONFIG)?,
        );
        Ok(mode.mode()?)
    }

    /// Enter (`true`) or leave power-save mode. Register contents survive.
    pub fn shutdown(&mut self, shdn: bool) -> Result<(), Error<E>> {
        self.modify_register(Register::MODE_CONFIG, |reg_value| {
            ModeConfig::from_bits_retain(reg_value).with_shdn(shdn).bits()
        })
    }

    /// One-shot die temperature conversion, in degrees Celsius.
    pub fn read_die_temperature(&mut self) -> Result<f32, Error<E>> {
        self.write_register(Register::TEMP_CONFIG, TempConfig::TEMP_EN.bits())?;

        let mut done = false;
        for _ in 0..TEMP_POLL_LIMIT {
            self.bus.delay_ms(TEMP_POLL_INTERVAL_MS);
            let config = TempConfig::from_bits_retain(
                self.read_register(Register::TEMP_CONFIG)?,
            );
            if !config.contains(TempConfig::TEMP_EN) {
                done = true;
                break;
            }
        }
        if !done {
            return Err(Error::TemperatureTimeout);
        }

        let integer = self.read_register(Register::TEMP_INT)? as i8;
        let fraction = self.read_register(Register::TEMP_FRAC)? & 0x0F;
        Ok(integer as f32 + fraction as f32 * 0.0625)
    }

    /// Pops one red + IR pair from the FIFO.
    pub fn read_sample(&mut self) -> Result<Sample, Error<E>> {
        let mut raw = [0u8; FIFO_SAMPLE_BYTES];
        self.read_burst(Register::FIFO_DATA, &mut raw)?;

        if self.state == DeviceState::Configured {
            self.state = DeviceState::Streaming;
        }

        Ok(Sample {
            red: BigEndian::read_u24(&raw[0..3]) & SAMPLE_MASK,
            ir: BigEndian::read_u24(&raw[3..6]) & SAMPLE_MASK,
        })
    }

    /// Refills `buffer` with up to `max_samples` samples, clamped to the
    /// buffer capacity. Stops at the first failed read and returns how many
    /// samples were stored.
    pub fn read_batch(
        &mut self,
        buffer: &mut SampleBuffer,
        max_samples: usize,
    ) -> usize {
        buffer.clear();
        let wanted = max_samples.min(SAMPLE_BUFFER_CAPACITY);

        while buffer.len() < wanted {
            match self.read_sample() {
                Ok(sample) => {
                    if buffer.push(sample).is_err() {
                        break;
                    }
                }
                Err(_) => {
                    warn!(
                        "MAX30102: FIFO read failed after {=usize} samples",
                        buffer.len()
                    );
                    break;
                }
            }
        }

        trace!("MAX30102: read {=usize} samples", buffer.len());
        buffer.len()
    }

    pub fn release(self) -> (L, D) {
        self.bus.release()
    }
}
