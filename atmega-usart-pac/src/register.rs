#![allow(non_snake_case)]
#![allow(non_camel_case_types)]
#![allow(clippy::upper_case_acronyms)]

use modular_bitfield_msb::prelude::*;

///////////////////////////////////////////////////////////////////////
// Status

/// AVR Status Register (SREG) - 0x5f (I/O 0x3f)
///
/// * I: Global Interrupt Enable
///   The Global Interrupt Enable bit must be set for the interrupts to be
///   enabled. The individual interrupt enable control is then performed in
///   separate control registers. If the Global Interrupt Enable Register is
///   cleared, none of the interrupts are enabled independent of the
///   individual interrupt enable settings. The I-bit is cleared by hardware
///   after an interrupt has occurred, and is set by the RETI instruction.
/// * T: Bit Copy Storage
/// * H: Half Carry Flag
/// * S: Sign Bit, S = N ⊕ V
/// * V: Two's Complement Overflow Flag
/// * N: Negative Flag
/// * Z: Zero Flag
/// * C: Carry Flag
///
#[bitfield(bits=8)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SREG {
    pub I: B1,
    pub T: B1,
    pub H: B1,
    pub S: B1,
    pub V: B1,
    pub N: B1,
    pub Z: B1,
    pub C: B1,
}

///////////////////////////////////////////////////////////////////////
// USART

/// USART Control and Status Register A (UCSRnA) - base + 0
///
/// * RXC: USART Receive Complete
///   This flag bit is set when there are unread data in the receive buffer
///   and cleared when the receive buffer is empty.
/// * TXC: USART Transmit Complete
///   This flag bit is set when the entire frame in the Transmit Shift
///   Register has been shifted out and there are no new data currently
///   present in the transmit buffer (UDRn). The TXCn Flag bit is
///   automatically cleared when a transmit complete interrupt is executed,
///   or it can be cleared by writing a one to its bit location.
/// * UDRE: USART Data Register Empty
///   If UDREn is one, the buffer is empty, and therefore ready to be written.
/// * FE: Frame Error
/// * DOR: Data OverRun
/// * UPE: USART Parity Error
///   _NOTE_: Always set FE, DOR and UPE to zero when writing to UCSRnA.
/// * U2X: Double the USART Transmission Speed
///   Writing this bit to one will reduce the divisor of the baud rate
///   divider from 16 to 8 effectively doubling the transfer rate for
///   asynchronous communication.
/// * MPCM: Multi-processor Communication Mode
///
#[bitfield(bits=8)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UCSRnA {
    pub RXC: B1,
    pub TXC: B1,
    pub UDRE: B1,
    pub FE: B1,
    pub DOR: B1,
    pub UPE: B1,
    pub U2X: B1,
    pub MPCM: B1,
}

impl UCSRnA {
    /// Clear the bits that must not be written back as read: TXC is
    /// write-one-to-clear, FE/DOR/UPE must be written as zero.
    pub fn without_flags(self) -> Self {
        self
            .with_TXC(0)
            .with_FE(0)
            .with_DOR(0)
            .with_UPE(0)
    }
}

impl Default for UCSRnA {
    fn default() -> Self {
        UCSRnA::from(0b0010_0000)
    }
}

/// USART Control and Status Register B (UCSRnB) - base + 1
///
/// * RXCIE: RX Complete Interrupt Enable
/// * TXCIE: TX Complete Interrupt Enable
/// * UDRIE: USART Data Register Empty Interrupt Enable
/// * RXEN: Receiver Enable
/// * TXEN: Transmitter Enable
/// * UCSZ2: Character Size
///   The UCSZn2 bits combined with the UCSZn1:0 bit in UCSRnC sets the
///   number of data bits (Character Size) in a frame the Receiver and
///   Transmitter use.
/// * RXB8: Receive Data Bit 8 (ninth data bit, 9-bit frames only)
/// * TXB8: Transmit Data Bit 8 (ninth data bit, 9-bit frames only)
///
#[bitfield(bits=8)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UCSRnB {
    pub RXCIE: B1,
    pub TXCIE: B1,
    pub UDRIE: B1,
    pub RXEN: B1,
    pub TXEN: B1,
    pub UCSZ2: B1,
    pub RXB8: B1,
    pub TXB8: B1,
}

#[derive(Copy, Clone, BitfieldSpecifier, Debug, PartialEq, Eq)]
#[bits=2]
pub enum UsartMode {
    Asynchronous = 0b00,
    Synchronous = 0b01,
    Reserved = 0b10,
    MasterSpi = 0b11,
}

#[derive(Copy, Clone, BitfieldSpecifier, Debug, PartialEq, Eq)]
#[bits=2]
pub enum ParityMode {
    Disabled = 0b00,
    Reserved = 0b01,
    Even = 0b10,
    Odd = 0b11,
}

/// USART Control and Status Register C (UCSRnC) - base + 2
///
/// * UMSEL: USART Mode Select
/// * UPM: Parity Mode
///   | UPMn1 | UPMn0 | Parity Mode |
///   |-------|-------|-------------|
///   |   0   |   0   | Disabled |
///   |   0   |   1   | Reserved |
///   |   1   |   0   | Enabled, Even Parity |
///   |   1   |   1   | Enabled, Odd Parity |
/// * USBS: Stop Bit Select (0 = 1-bit, 1 = 2-bit)
/// * UCSZ: Character Size, UCSZn1:0
///   | UCSZn2 | UCSZn1 | UCSZn0 | Character Size |
///   |--------|--------|--------|----------------|
///   |   0    |   1    |   1    | 8-bit |
///   |   1    |   1    |   1    | 9-bit |
/// * UCPOL: Clock Polarity (synchronous mode only)
///
#[bitfield(bits=8)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UCSRnC {
    pub UMSEL: UsartMode,
    pub UPM: ParityMode,
    pub USBS: B1,
    pub UCSZ: B2,
    pub UCPOL: B1,
}

impl Default for UCSRnC {
    fn default() -> Self {
        UCSRnC::from(0b0000_0110)
    }
}

/// USART Baud Rate Register High (UBRRnH) - base + 5
///
/// Bits 11:8 of the 12-bit baud rate divisor. Writing UBRRnL triggers an
/// immediate update of the baud rate prescaler, so UBRRnH is written first.
///
#[bitfield(bits=8)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UBRRnH {
    #[skip] __: B4,
    pub UBRR: B4,
}

/// USART Baud Rate Register Low (UBRRnL) - base + 4
///
#[bitfield(bits=8)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UBRRnL {
    pub UBRR: B8,
}

/// USART I/O Data Register (UDRn) - base + 6
///
/// The USART Transmit Data Buffer Register and USART Receive Data Buffer
/// Registers share the same I/O address. Reading returns the contents of
/// the Receive Data Buffer Register (RXB); writing loads the Transmit Data
/// Buffer Register (TXB).
///
#[bitfield(bits=8)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UDRn {
    pub DATA: B8,
}
