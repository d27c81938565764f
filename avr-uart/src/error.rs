use core::fmt;

use atmega_usart_pac::device;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Channel index beyond the USARTs present on the chip.
    InvalidChannel { index: usize, count: usize },

    /// No baud table row for this clock and baud rate.
    UnsupportedBaudRate { clock_hz: u32, baud_rate: u32 },

    /// Initialization needs exactly one configuration per channel.
    ConfigCount { expected: usize, actual: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidChannel { index, count } => {
                write!(f, "channel {index} out of range, chip has {count}")
            },
            Error::UnsupportedBaudRate { clock_hz, baud_rate } => {
                write!(f, "no baud table entry for {baud_rate} baud at {clock_hz} Hz")
            },
            Error::ConfigCount { expected, actual } => {
                write!(f, "expected {expected} channel configurations, got {actual}")
            },
        }
    }
}

impl core::error::Error for Error {}

impl From<device::Error> for Error {
    fn from(e: device::Error) -> Self {
        match e {}
    }
}

pub type Result<T> = core::result::Result<T, Error>;
