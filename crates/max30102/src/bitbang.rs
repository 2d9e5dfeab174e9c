//! Two-wire transport driven entirely from GPIO.
//!
//! Both lines are open drain: writing "high" releases the line and lets the
//! pull-up raise it, writing "low" drives it to ground. At rest, between
//! transactions, both lines are released. All timing is blocking; nothing here
//! yields, and every wait is a fixed number of microseconds.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Quarter of a bit period, used around every data change.
pub const T_QUARTER_US: u32 = 2;
/// Half of a bit period, used for the high phase of the clock and for the
/// start/stop setup and hold times.
pub const T_HALF_US: u32 = 4;

/// Logical access to the data (SDA) and clock (SCL) lines.
pub trait BusLines {
    type Error;

    /// Release (`true`) or drive low (`false`) the data line.
    fn set_sda(&mut self, high: bool) -> Result<(), Self::Error>;
    /// Release (`true`) or drive low (`false`) the clock line.
    fn set_scl(&mut self, high: bool) -> Result<(), Self::Error>;
    /// Sample the data line as seen on the wire.
    fn sda_is_high(&mut self) -> Result<bool, Self::Error>;
}

/// [`BusLines`] over a pair of embedded-hal pins configured as open drain.
pub struct OpenDrainLines<SDA, SCL> {
    sda: SDA,
    scl: SCL,
}

impl<SDA, SCL> OpenDrainLines<SDA, SCL>
where
    SDA: OutputPin + InputPin,
    SCL: OutputPin<Error = <SDA as ErrorType>::Error>,
{
    pub fn new(sda: SDA, scl: SCL) -> Self {
        Self { sda, scl }
    }

    pub fn release(self) -> (SDA, SCL) {
        (self.sda, self.scl)
    }
}

impl<SDA, SCL> BusLines for OpenDrainLines<SDA, SCL>
where
    SDA: OutputPin + InputPin,
    SCL: OutputPin<Error = <SDA as ErrorType>::Error>,
{
    type Error = <SDA as ErrorType>::Error;

    fn set_sda(&mut self, high: bool) -> Result<(), Self::Error> {
        match high {
            true => self.sda.set_high(),
            false => self.sda.set_low(),
        }
    }

    fn set_scl(&mut self, high: bool) -> Result<(), Self::Error> {
        match high {
            true => self.scl.set_high(),
            false => self.scl.set_low(),
        }
    }

    fn sda_is_high(&mut self) -> Result<bool, Self::Error> {
        self.sda.is_high()
    }
}

/// Acknowledgment bit of the ninth clock.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ack {
    /// Receiver held the data line low.
    Ack,
    /// Data line stayed released.
    Nack,
}

impl Ack {
    pub const fn is_ack(&self) -> bool {
        matches!(self, Ack::Ack)
    }

    /// Level of the data line that encodes this bit.
    const fn line_level(&self) -> bool {
        match self {
            Ack::Ack => false,
            Ack::Nack => true,
        }
    }

    const fn from_line_level(high: bool) -> Self {
        match high {
            true => Ack::Nack,
            false => Ack::Ack,
        }
    }
}

/// Bus controller implemented in software on top of [`BusLines`].
pub struct SoftI2c<L, D> {
    lines: L,
    delay: D,
}

impl<L, D> SoftI2c<L, D>
where
    L: BusLines,
    D: DelayNs,
{
    /// Takes ownership of the lines without driving them.
    pub fn new(lines: L, delay: D) -> Self {
        Self { lines, delay }
    }

    /// Release both lines, the bus rest state.
    pub fn idle(&mut self) -> Result<(), L::Error> {
        self.lines.set_sda(true)?;
        self.lines.set_scl(true)
    }

    /// Start (or repeated start) condition: data falls while clock is high.
    pub fn start(&mut self) -> Result<(), L::Error> {
        self.lines.set_sda(true)?;
        self.lines.set_scl(true)?;
        self.delay.delay_us(T_HALF_US);
        self.lines.set_sda(false)?;
        self.delay.delay_us(T_HALF_US);
        self.lines.set_scl(false)
    }

    /// Stop condition: data rises while clock is high. Leaves both lines
    /// released.
    pub fn stop(&mut self) -> Result<(), L::Error> {
        self.lines.set_sda(false)?;
        self.lines.set_scl(true)?;
        self.delay.delay_us(T_HALF_US);
        self.lines.set_sda(true)?;
        self.delay.delay_us(T_HALF_US);
        Ok(())
    }

    /// Shift one byte out, MSB first, and return the receiver's
    /// acknowledgment.
    pub fn send_byte(&mut self, byte: u8) -> Result<Ack, L::Error> {
        for bit in (0..8).rev() {
            self.lines.set_scl(false)?;
            self.delay.delay_us(T_QUARTER_US);
            self.lines.set_sda(byte & (1 << bit) != 0)?;
            self.delay.delay_us(T_QUARTER_US);
            self.lines.set_scl(true)?;
            self.delay.delay_us(T_HALF_US);
        }

        // Release the data line and clock in the receiver's answer
        self.lines.set_scl(false)?;
        self.delay.delay_us(T_QUARTER_US);
        self.lines.set_sda(true)?;
        self.delay.delay_us(T_QUARTER_US);
        self.lines.set_scl(true)?;
        self.delay.delay_us(T_QUARTER_US);
        let ack = Ack::from_line_level(self.lines.sda_is_high()?);
        self.delay.delay_us(T_QUARTER_US);
        self.lines.set_scl(false)?;

        Ok(ack)
    }

    /// Shift one byte in, MSB first, then answer with `ack`: [`Ack::Ack`] to
    /// ask for another byte, [`Ack::Nack`] after the last one.
    pub fn recv_byte(&mut self, ack: Ack) -> Result<u8, L::Error> {
        let mut byte = 0u8;
        self.lines.set_sda(true)?;

        for _ in 0..8 {
            byte <<= 1;
            self.lines.set_scl(false)?;
            self.delay.delay_us(T_HALF_US);
            self.lines.set_scl(true)?;
            self.delay.delay_us(T_QUARTER_US);
            if self.lines.sda_is_high()? {
                byte |= 0x01;
            }
            self.delay.delay_us(T_QUARTER_US);
        }

        self.lines.set_scl(false)?;
        self.delay.delay_us(T_QUARTER_US);
        self.lines.set_sda(ack.line_level())?;
        self.delay.delay_us(T_QUARTER_US);
        self.lines.set_scl(true)?;
        self.delay.delay_us(T_HALF_US);
        self.lines.set_scl(false)?;

        Ok(byte)
    }

    /// Blocking wait on the bus timer, for callers that pace transactions.
    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    pub fn release(self) -> (L, D) {
        (self.lines, self.delay)
    }
}
