use atmega_usart_pac::register::ParityMode;

/// Default system clock, the 16 MHz crystal of an Arduino Uno class board.
pub const F_CPU: u32 = 16_000_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DataLength {
    Eight,
    Nine,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for ParityMode {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => ParityMode::Disabled,
            Parity::Odd  => ParityMode::Odd,
            Parity::Even => ParityMode::Even,
        }
    }
}

/// Per-channel interrupt enables in UCSRnB.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// RX Complete, RXCIEn
    Receive,
    /// TX Complete, TXCIEn
    Transmit,
    /// Data Register Empty, UDRIEn
    DataEmpty,
}

/// How `is_data_present` and `is_transmit_complete` read RXCn and TXCn.
///
/// The datasheet sets RXCn while unread data sits in the receive buffer and
/// TXCn once a frame has been shifted out. `Inverted` reports ready while
/// the flag is *clear*, which is how this driver has always behaved. Which
/// one is right for a given part has to be checked against its datasheet
/// before relying on either.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagPolarity {
    Inverted,
    Datasheet,
}

impl FlagPolarity {
    pub(crate) fn is_ready(&self, flag: u8) -> bool {
        match self {
            FlagPolarity::Inverted  => flag == 0,
            FlagPolarity::Datasheet => flag != 0,
        }
    }
}

impl Default for FlagPolarity {
    fn default() -> Self {
        FlagPolarity::Inverted
    }
}

/// Configuration of one USART channel, as handed to `UartDriver::initialize`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Receiver and transmitter on.
    pub enabled: bool,
    pub data_length: DataLength,
    pub parity: Parity,
    /// Enables this channel's receive complete interrupt. Global interrupts
    /// are left alone.
    pub interrupt_enabled: bool,
    pub baud_rate: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            data_length: DataLength::Eight,
            parity: Parity::None,
            interrupt_enabled: false,
            baud_rate: 9600,
        }
    }
}
