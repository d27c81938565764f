use std::cell::{Cell, RefCell};

use atmega_usart_pac::device::{Chip, DeviceAccess, RegisterAddress, RegisterValue, Result};
use atmega_usart_pac::memory::MemoryAccess;
use atmega_usart_pac::register::UCSRnA;

const UCSRA_OFFSET: usize = 0;
const UDR_OFFSET: usize = 6;

/// USART register file with just enough hardware behaviour for the driver
/// to run on the host.
///
/// * Writing UDRn while UDREn is set buffers the byte and clears UDREn.
///   Writing it while UDREn is clear loses the byte, which is counted.
/// * The next read of UCSRn A "sends" the buffered byte: it is recorded and
///   TXCn and UDREn go high. The byte is not readable back through UDRn.
/// * Writing a one to TXCn clears it; RXCn, UDREn and the error flags are
///   read-only.
/// * Reading UDRn clears RXCn.
/// * With loopback on, every sent byte lands in the receive buffer.
pub struct SimulatedUsart {
    chip: Chip,
    memory: MemoryAccess,
    buffered: RefCell<Vec<Option<u8>>>,
    transmitted: RefCell<Vec<Vec<u8>>>,
    dropped: RefCell<Vec<usize>>,
    loopback: Cell<bool>,
}

impl SimulatedUsart {
    pub fn new(chip: Chip) -> Result<Self> {
        let memory = MemoryAccess::new();
        memory.load_reset_values(chip)?;

        let count = chip.usart_count();
        Ok(Self {
            chip,
            memory,
            buffered: RefCell::new(vec![None; count]),
            transmitted: RefCell::new(vec![Vec::new(); count]),
            dropped: RefCell::new(vec![0; count]),
            loopback: Cell::new(false),
        })
    }

    pub fn set_loopback(&self, enable: bool) {
        self.loopback.set(enable);
    }

    pub fn transmitted(&self, channel: usize) -> Vec<u8> {
        self.transmitted.borrow()[channel].clone()
    }

    /// Bytes written to UDRn of `channel` while the buffer was still full.
    pub fn dropped(&self, channel: usize) -> usize {
        self.dropped.borrow()[channel]
    }

    /// Put `byte` in the receive buffer of `channel` as if it came off the line.
    pub fn receive(&self, channel: usize, byte: u8) {
        let base = self.chip.usart_base(channel);
        self.memory.set(base + UDR_OFFSET, byte);
        self.update_ucsra(base, |v| v.with_RXC(1));
    }

    fn locate(&self, address: usize) -> Option<(usize, usize, usize)> {
        (0..self.chip.usart_count())
            .map(|index| (index, self.chip.usart_base(index)))
            .find(|&(_, base)| (base..base + 8).contains(&address))
            .map(|(index, base)| (index, base, address - base))
    }

    fn update_ucsra<F>(&self, base: usize, f: F)
    where
        F: FnOnce(UCSRnA) -> UCSRnA,
    {
        let value = UCSRnA::from(self.memory.get(base + UCSRA_OFFSET));
        self.memory.set(base + UCSRA_OFFSET, f(value).into());
    }

    fn shift_out(&self, index: usize, base: usize) {
        let byte = match self.buffered.borrow_mut()[index].take() {
            Some(byte) => byte,
            None => return,
        };

        log::trace!("sim: usart{index} tx {byte:02x}");
        self.transmitted.borrow_mut()[index].push(byte);
        self.update_ucsra(base, |v| v.with_TXC(1).with_UDRE(1));
        if self.loopback.get() {
            self.receive(index, byte);
        }
    }
}

impl DeviceAccess for SimulatedUsart {
    fn read(&self, address: RegisterAddress) -> Result<RegisterValue> {
        match self.locate(address as usize) {
            Some((index, base, UCSRA_OFFSET)) => self.shift_out(index, base),
            Some((_, base, UDR_OFFSET)) => {
                let value = self.memory.read(address)?;
                self.update_ucsra(base, |v| v.with_RXC(0));
                return Ok(value);
            },
            _ => {},
        }
        self.memory.read(address)
    }

    fn write(&self, address: RegisterAddress, value: RegisterValue) -> Result<()> {
        match self.locate(address as usize) {
            Some((index, base, UDR_OFFSET)) => {
                let ucsra = UCSRnA::from(self.memory.get(base + UCSRA_OFFSET));
                if ucsra.UDRE() == 0 {
                    log::warn!("sim: usart{index} lost {value:02x}, data register full");
                    self.dropped.borrow_mut()[index] += 1;
                } else {
                    self.buffered.borrow_mut()[index] = Some(value);
                    self.update_ucsra(base, |v| v.with_UDRE(0));
                }
                Ok(())
            },
            Some((_, base, UCSRA_OFFSET)) => {
                let written = UCSRnA::from(value);
                self.update_ucsra(base, |v| {
                    let v = v
                        .with_U2X(written.U2X())
                        .with_MPCM(written.MPCM());
                    if written.TXC() != 0 { v.with_TXC(0) } else { v }
                });
                Ok(())
            },
            _ => self.memory.write(address, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use atmega_usart_pac::device::Device;
    use avr_uart::{ChannelConfig, UartDriver, F_CPU};

    use super::*;

    #[test]
    fn starts_from_reset_values() {
        let sim = SimulatedUsart::new(Chip::ATmega328P).unwrap();
        assert_eq!(sim.read(0x0c0).unwrap(), 0x20);
        assert_eq!(sim.read(0x0c2).unwrap(), 0x06);
    }

    #[test]
    fn transmit_sets_flags_and_records() {
        let sim = SimulatedUsart::new(Chip::ATmega2560).unwrap();
        sim.write(0x0ce, b'Q').unwrap();
        assert!(sim.transmitted(1).is_empty());

        assert_eq!(sim.read(0x0c8).unwrap(), 0x60);
        assert_eq!(sim.transmitted(1), vec![b'Q']);
        assert!(sim.transmitted(0).is_empty());
        assert_eq!(sim.read(0x0ce).unwrap(), 0x00);
    }

    #[test]
    fn write_while_data_register_full_is_lost() {
        let sim = SimulatedUsart::new(Chip::ATmega328P).unwrap();
        sim.write(0x0c6, b'a').unwrap();
        sim.write(0x0c6, b'b').unwrap();
        assert_eq!(sim.dropped(0), 1);

        sim.read(0x0c0).unwrap();
        sim.write(0x0c6, b'c').unwrap();
        sim.read(0x0c0).unwrap();
        assert_eq!(sim.transmitted(0), b"ac");
        assert_eq!(sim.dropped(0), 1);
    }

    #[test]
    fn txc_stays_set_until_cleared() {
        let sim = SimulatedUsart::new(Chip::ATmega328P).unwrap();
        sim.write(0x0c6, b'a').unwrap();
        assert_eq!(sim.read(0x0c0).unwrap(), 0x60);

        sim.write(0x0c0, 0x20).unwrap();
        sim.write(0x0c6, b'b').unwrap();
        assert_eq!(sim.memory.get(0x0c0), 0x40);
        assert_eq!(sim.read(0x0c0).unwrap(), 0x60);
    }

    #[test]
    fn txc_is_write_one_to_clear() {
        let sim = SimulatedUsart::new(Chip::ATmega328P).unwrap();
        sim.write(0x0c6, 0).unwrap();
        assert_eq!(sim.read(0x0c0).unwrap(), 0x60);

        sim.write(0x0c0, 0x02).unwrap();
        assert_eq!(sim.read(0x0c0).unwrap(), 0x62);

        sim.write(0x0c0, 0x40).unwrap();
        assert_eq!(sim.read(0x0c0).unwrap(), 0x20);
    }

    #[test]
    fn status_flags_are_read_only() {
        let sim = SimulatedUsart::new(Chip::ATmega328P).unwrap();
        sim.write(0x0c0, 0x00).unwrap();
        assert_eq!(sim.read(0x0c0).unwrap(), 0x20);
    }

    #[test]
    fn receive_and_read_clears_rxc() {
        let sim = SimulatedUsart::new(Chip::ATmega328P).unwrap();
        sim.receive(0, 0x42);
        assert_eq!(sim.read(0x0c0).unwrap(), 0xa0);
        assert_eq!(sim.read(0x0c6).unwrap(), 0x42);
        assert_eq!(sim.read(0x0c0).unwrap(), 0x20);
    }

    #[test]
    fn driver_runs_against_simulation() {
        let sim = SimulatedUsart::new(Chip::ATmega328P).unwrap();
        sim.set_loopback(true);
        let uart = UartDriver::new(Device::new(&sim, Chip::ATmega328P), F_CPU);
        uart.initialize(&[ChannelConfig { baud_rate: 115200, ..ChannelConfig::default() }]).unwrap();

        for &b in b"hello, world\n" {
            uart.put_char(0, b).unwrap();
            assert_eq!(uart.get_char(0), Ok(if b == b'\n' { b'\r' } else { b }));
        }
        assert_eq!(sim.transmitted(0), b"hello, world\r");
        assert_eq!(sim.dropped(0), 0);
        assert_eq!(sim.read(0x0c4).unwrap(), 16);
        assert_eq!(sim.read(0x0c0).unwrap() & 0x02, 0x02);
    }
}
