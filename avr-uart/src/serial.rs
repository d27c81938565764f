use core::fmt;

use atmega_usart_pac::device::DeviceAccess;
use embedded_hal::blocking;
use embedded_hal::serial;

use crate::driver::UartDriver;
use crate::error::{Error, Result};

/// One channel of a `UartDriver`, for code written against embedded-hal.
///
/// The non-blocking `Read`/`Write` move raw bytes. `fmt::Write` goes through
/// `put_char`, so it blocks per byte and sends LF as CR.
pub struct Serial<'a, A>
where A: DeviceAccess
{
    driver: &'a UartDriver<A>,
    channel: usize,
    written: bool,
}

impl<A> UartDriver<A>
where A: DeviceAccess
{
    pub fn serial(&self, channel: usize) -> Result<Serial<'_, A>> {
        self.channel(channel)?;
        Ok(Serial {
            driver: self,
            channel,
            written: false,
        })
    }
}

impl<A> Serial<'_, A>
where A: DeviceAccess
{
    pub fn channel(&self) -> usize {
        self.channel
    }
}

impl<A> serial::Read<u8> for Serial<'_, A>
where A: DeviceAccess
{
    type Error = Error;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        if !self.driver.is_data_present(self.channel)? {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.driver.get_char(self.channel)?)
    }
}

impl<A> serial::Write<u8> for Serial<'_, A>
where A: DeviceAccess
{
    type Error = Error;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        let channel = self.driver.channel(self.channel)?;
        if channel.ucsra().read().map_err(Error::from)?.UDRE() == 0 {
            return Err(nb::Error::WouldBlock);
        }
        channel.ucsra().modify(|m| m.without_flags().with_TXC(1)).map_err(Error::from)?;
        channel.txb().write(|w| w.with_DATA(word)).map_err(Error::from)?;
        self.written = true;
        Ok(())
    }

    /// Done once the last byte written through this handle has left the
    /// shift register. TXCn never rises on an idle transmitter, so a handle
    /// that has not written anything is flushed already.
    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        let channel = self.driver.channel(self.channel)?;
        if !self.written {
            return Ok(());
        }
        if channel.ucsra().read().map_err(Error::from)?.TXC() == 0 {
            return Err(nb::Error::WouldBlock);
        }
        Ok(())
    }
}

impl<A> blocking::serial::write::Default<u8> for Serial<'_, A>
where A: DeviceAccess
{}

impl<A> fmt::Write for Serial<'_, A>
where A: DeviceAccess
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            self.driver.put_char(self.channel, b).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::fmt::Write as _;

    use atmega_usart_pac::device::{Chip, Device};
    use embedded_hal::blocking::serial::Write as _;
    use embedded_hal::serial::{Read as _, Write as _};

    use super::*;
    use crate::config::{FlagPolarity, F_CPU};
    use crate::testing::{RecordingAccess, TransmitLine};

    const UCSR1A: usize = 0x0c8;
    const UDR1: usize = 0x0ce;

    fn driver(access: &RecordingAccess) -> UartDriver<&RecordingAccess> {
        UartDriver::new(Device::new(access, Chip::ATmega2560), F_CPU)
            .with_flag_polarity(FlagPolarity::Datasheet)
    }

    #[test]
    fn read_would_block_until_data() {
        let access = RecordingAccess::new();
        let uart = driver(&access);
        let mut serial = uart.serial(1).unwrap();

        assert_eq!(serial.read(), Err(nb::Error::WouldBlock));

        access.set(UDR1, 0x7e);
        access.set(UCSR1A, 0x80);
        assert_eq!(serial.read(), Ok(0x7e));
    }

    #[test]
    fn read_follows_flag_polarity() {
        let access = RecordingAccess::new();
        let uart = UartDriver::new(Device::new(&access, Chip::ATmega2560), F_CPU);
        let mut serial = uart.serial(1).unwrap();

        access.set(UDR1, 0x31);
        access.set(UCSR1A, 0x80);
        assert_eq!(serial.read(), Err(nb::Error::WouldBlock));

        access.set(UCSR1A, 0x00);
        assert_eq!(serial.read(), Ok(0x31));
    }

    #[test]
    fn write_waits_for_empty_data_register() {
        let access = RecordingAccess::new();
        let uart = driver(&access);
        let mut serial = uart.serial(1).unwrap();

        assert_eq!(serial.write(b'a'), Err(nb::Error::WouldBlock));
        assert!(access.writes().is_empty());

        access.set(UCSR1A, 0x20);
        assert_eq!(serial.write(0x0a), Ok(()));
        assert_eq!(access.get(UDR1), 0x0a);
    }

    fn line_driver(line: &TransmitLine) -> UartDriver<&TransmitLine> {
        UartDriver::new(Device::new(line, Chip::ATmega2560), F_CPU)
            .with_flag_polarity(FlagPolarity::Datasheet)
    }

    #[test]
    fn flush_waits_for_transmit_complete() {
        let line = TransmitLine::new(UCSR1A, 3);
        let uart = line_driver(&line);
        let mut serial = uart.serial(1).unwrap();

        assert_eq!(serial.flush(), Ok(()));

        serial.write(b'a').unwrap();
        assert_eq!(serial.flush(), Err(nb::Error::WouldBlock));
        nb::block!(serial.flush()).unwrap();
        assert_eq!(line.sent(), b"a");
    }

    #[test]
    fn flush_ignores_stale_transmit_complete() {
        let line = TransmitLine::new(UCSR1A, 4);
        let uart = line_driver(&line);
        let mut serial = uart.serial(1).unwrap();

        serial.bwrite_all(b"x").unwrap();
        serial.bflush().unwrap();

        serial.write(b'y').unwrap();
        assert_eq!(serial.flush(), Err(nb::Error::WouldBlock));
        serial.bflush().unwrap();
        assert_eq!(line.sent(), b"xy");
    }

    #[test]
    fn blocking_write_all() {
        let line = TransmitLine::new(UCSR1A, 5);
        let uart = line_driver(&line);
        let mut serial = uart.serial(1).unwrap();

        serial.bwrite_all(b"abcdef").unwrap();
        serial.bflush().unwrap();

        assert_eq!(line.sent(), b"abcdef");
        assert!(line.dropped().is_empty());
    }

    #[test]
    fn fmt_write_translates_line_feed() {
        let line = TransmitLine::new(UCSR1A, 2);
        let uart = line_driver(&line);
        let mut serial = uart.serial(1).unwrap();

        write!(serial, "hi {}\n", 7).unwrap();

        assert_eq!(line.sent(), b"hi 7\r");
        assert!(line.dropped().is_empty());
    }

    #[test]
    fn serial_rejects_bad_channel() {
        let access = RecordingAccess::new();
        let uart = driver(&access);
        assert_eq!(uart.serial(4).err(), Some(Error::InvalidChannel { index: 4, count: 4 }));
        assert_eq!(uart.serial(3).map(|s| s.channel()).ok(), Some(3));
    }
}
