/// Byte position at which the target refused a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NackPhase {
    /// Device address with the write bit.
    Address,
    /// Register pointer byte.
    Register,
    /// Register value of a write.
    Data,
    /// Device address with the read bit, after the repeated start.
    ReadAddress,
}

impl core::fmt::Display for NackPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NackPhase::Address => write!(f, "address"),
            NackPhase::Register => write!(f, "register"),
            NackPhase::Data => write!(f, "data"),
            NackPhase::ReadAddress => write!(f, "read address"),
        }
    }
}

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<PinE> {
    /// Driving or sampling one of the bus lines failed.
    Pin(PinE),
    /// The target answered with a negative acknowledgment.
    Nack(NackPhase),
    /// The part ID register did not hold the expected constant.
    IdentityMismatch(u8),
    /// The reset bit did not self-clear within the polling budget.
    ResetTimeout,
    /// The die temperature conversion did not complete.
    TemperatureTimeout,
    RegisterError(MAX30102RegisterError),
}

impl<E: core::fmt::Display> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Pin(err) => write!(f, "Bus line error: {}", err),
            Error::Nack(phase) => {
                write!(f, "Negative acknowledgment on {} byte", phase)
            }
            Error::IdentityMismatch(id) => {
                write!(f, "Unexpected part ID: {:#04x}", id)
            }
            Error::ResetTimeout => write!(f, "Soft reset did not complete"),
            Error::TemperatureTimeout => {
                write!(f, "Temperature conversion did not complete")
            }
            Error::RegisterError(value) => {
                write!(f, "Register Error: {}", value)
            }
        }
    }
}

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MAX30102RegisterError {
    InvalidLedMode(u8),
}

impl core::fmt::Display for MAX30102RegisterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MAX30102RegisterError::InvalidLedMode(value) => {
                write!(f, "Invalid LED mode value: {}", value)
            }
        }
    }
}

impl<PinE> From<MAX30102RegisterError> for Error<PinE> {
    fn from(e: MAX30102RegisterError) -> Self {
        Error::RegisterError(e)
    }
}
