use crate::error::{Error, Result};

/// Largest value UBRRn can hold (12 bits).
pub const UBRR_MAX: u16 = 0x0fff;

/// One row of the baud rate table: the UBRRn value and U2Xn setting that
/// produce `baud_rate` from a system clock of `clock_hz`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BaudTableEntry {
    pub clock_hz: u32,
    pub baud_rate: u32,
    pub divisor: u8,
    pub oversampling: bool,
}

impl BaudTableEntry {
    pub const fn new(clock_hz: u32, baud_rate: u32, divisor: u8, oversampling: bool) -> Self {
        Self {
            clock_hz,
            baud_rate,
            divisor,
            oversampling,
        }
    }

    pub fn setting(&self) -> BaudSetting {
        BaudSetting {
            divisor: self.divisor as u16,
            oversampling: self.oversampling,
        }
    }
}

const DISABLED: bool = false;
const ENABLED: bool = true;

/// UART register values for common system clock frequencies and baud rates.
///
/// Supporting another clock or baud rate means adding a row here.
pub const BAUD_TABLE: &[BaudTableEntry] = &[
    //                  Clock (Hz)  Baud    UBRRn  Double speed
    BaudTableEntry::new( 1_000_000,   2400,  25,   DISABLED),
    BaudTableEntry::new( 1_000_000,   4800,  12,   DISABLED),
    BaudTableEntry::new( 1_000_000,   9600,  12,   ENABLED ),
    BaudTableEntry::new( 1_000_000,  14400,   8,   ENABLED ),

    BaudTableEntry::new(16_000_000,   9600, 103,   DISABLED),
    BaudTableEntry::new(16_000_000,  19200,  51,   DISABLED),
    BaudTableEntry::new(16_000_000,  38400,  25,   DISABLED),
    BaudTableEntry::new(16_000_000,  57600,  34,   ENABLED ),
    BaudTableEntry::new(16_000_000, 115200,  16,   ENABLED ),
];

/// What ends up in UBRRn and U2Xn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BaudSetting {
    pub divisor: u16,
    pub oversampling: bool,
}

impl BaudSetting {
    /// `((clock / (k * baud)) - 1) / 2` with k = 4 in double speed mode and
    /// k = 8 otherwise. The halving of a doubled quotient rounds to nearest
    /// where the datasheet's `clock / (16 * baud) - 1` would truncate.
    pub fn from_formula(clock_hz: u32, baud_rate: u32, oversampling: bool) -> Option<Self> {
        let k: u32 = if oversampling { 4 } else { 8 };
        let quotient = clock_hz.checked_div(k.checked_mul(baud_rate)?)?;
        let divisor = quotient.checked_sub(1)? / 2;
        if divisor > UBRR_MAX as u32 {
            return None;
        }

        Some(Self {
            divisor: divisor as u16,
            oversampling,
        })
    }

    pub fn high(&self) -> u8 {
        (self.divisor >> 8) as u8
    }

    pub fn low(&self) -> u8 {
        self.divisor as u8
    }

    /// Baud rate the hardware actually produces with this setting.
    pub fn actual_baud_rate(&self, clock_hz: u32) -> u32 {
        let samples: u32 = if self.oversampling { 8 } else { 16 };
        clock_hz / (samples * (self.divisor as u32 + 1))
    }

    /// Deviation of the produced rate from `baud_rate`, in tenths of a percent.
    pub fn error_permille(&self, clock_hz: u32, baud_rate: u32) -> i32 {
        let actual = self.actual_baud_rate(clock_hz) as i64;
        let wanted = baud_rate as i64;
        ((actual - wanted) * 1000 / wanted) as i32
    }
}

/// Find the register setting for `baud_rate` at `clock_hz`.
///
/// The table is scanned in order and the first matching row wins.
pub fn resolve_divisor(table: &[BaudTableEntry], clock_hz: u32, baud_rate: u32) -> Result<BaudSetting> {
    let entry = table.iter()
        .find(|e| e.clock_hz == clock_hz && e.baud_rate == baud_rate)
        .ok_or(Error::UnsupportedBaudRate { clock_hz, baud_rate })?;

    let setting = entry.setting();
    log::trace!("baud: {baud_rate} @ {clock_hz} Hz -> UBRR={} U2X={}", setting.divisor, setting.oversampling);
    Ok(setting)
}
