use std::cell::{Cell, RefCell};

use atmega_usart_pac::device::{DeviceAccess, RegisterAddress, RegisterValue, Result};
use atmega_usart_pac::memory::MemoryAccess;

/// In-memory register file that also keeps every write, in order.
pub(crate) struct RecordingAccess {
    pub memory: MemoryAccess,
    writes: RefCell<Vec<(RegisterAddress, RegisterValue)>>,
}

impl RecordingAccess {
    pub fn new() -> Self {
        Self {
            memory: MemoryAccess::new(),
            writes: RefCell::new(Vec::new()),
        }
    }

    pub fn get(&self, address: usize) -> u8 {
        self.memory.get(address)
    }

    /// Preload a register without recording it as a write.
    pub fn set(&self, address: usize, value: u8) {
        self.memory.set(address, value);
    }

    pub fn writes(&self) -> Vec<(RegisterAddress, RegisterValue)> {
        self.writes.borrow().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.borrow_mut().clear();
    }
}

impl DeviceAccess for RecordingAccess {
    fn read(&self, address: RegisterAddress) -> Result<RegisterValue> {
        self.memory.read(address)
    }

    fn write(&self, address: RegisterAddress, value: RegisterValue) -> Result<()> {
        self.writes.borrow_mut().push((address, value));
        self.memory.write(address, value)
    }
}

const UCSRA_OFFSET: usize = 0;
const UDR_OFFSET: usize = 6;
const UDRE: u8 = 0x20;
const TXC: u8 = 0x40;

/// One USART transmitter, clocked by reads of its UCSRnA.
///
/// UDRn is a one byte buffer in front of a shift register that takes
/// `frame_ticks` reads to send a byte. A write to UDRn while UDREn is clear
/// is lost, the way the hardware loses it. TXCn rises when the shift register
/// runs empty with nothing buffered and stays up until a one is written to
/// it.
pub(crate) struct TransmitLine {
    pub memory: MemoryAccess,
    base: usize,
    frame_ticks: u32,
    buffer: Cell<Option<u8>>,
    shift: Cell<Option<(u8, u32)>>,
    sent: RefCell<Vec<u8>>,
    dropped: RefCell<Vec<u8>>,
}

impl TransmitLine {
    pub fn new(base: usize, frame_ticks: u32) -> Self {
        let memory = MemoryAccess::new();
        memory.set(base + UCSRA_OFFSET, UDRE);
        Self {
            memory,
            base,
            frame_ticks,
            buffer: Cell::new(None),
            shift: Cell::new(None),
            sent: RefCell::new(Vec::new()),
            dropped: RefCell::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<u8> {
        self.sent.borrow().clone()
    }

    pub fn dropped(&self) -> Vec<u8> {
        self.dropped.borrow().clone()
    }

    fn ucsra(&self) -> u8 {
        self.memory.get(self.base + UCSRA_OFFSET)
    }

    fn set_ucsra(&self, value: u8) {
        self.memory.set(self.base + UCSRA_OFFSET, value);
    }

    fn tick(&self) {
        let mut finished = false;
        match self.shift.get() {
            Some((byte, 1)) => {
                self.sent.borrow_mut().push(byte);
                self.shift.set(None);
                finished = true;
            },
            Some((byte, n)) => self.shift.set(Some((byte, n - 1))),
            None => {},
        }

        if self.shift.get().is_none() {
            if let Some(byte) = self.buffer.take() {
                self.shift.set(Some((byte, self.frame_ticks)));
                self.set_ucsra(self.ucsra() | UDRE);
            } else if finished {
                self.set_ucsra(self.ucsra() | TXC);
            }
        }
    }
}

impl DeviceAccess for TransmitLine {
    fn read(&self, address: RegisterAddress) -> Result<RegisterValue> {
        if address as usize == self.base + UCSRA_OFFSET {
            self.tick();
        }
        self.memory.read(address)
    }

    fn write(&self, address: RegisterAddress, value: RegisterValue) -> Result<()> {
        let address = address as usize;
        if address == self.base + UDR_OFFSET {
            if self.ucsra() & UDRE == 0 {
                self.dropped.borrow_mut().push(value);
            } else {
                self.buffer.set(Some(value));
                self.set_ucsra(self.ucsra() & !UDRE);
            }
            Ok(())
        } else if address == self.base + UCSRA_OFFSET {
            // U2X and MPCM are writable, TXC is write-one-to-clear.
            let mut next = (self.ucsra() & !0x03) | (value & 0x03);
            if value & TXC != 0 {
                next &= !TXC;
            }
            self.set_ucsra(next);
            Ok(())
        } else {
            self.memory.write(address as RegisterAddress, value)
        }
    }
}
