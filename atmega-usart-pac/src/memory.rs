use core::cell::Cell;

use crate::device::{Chip, Device, DeviceAccess, RegisterAddress, RegisterValue, Result, DATA_SPACE_SIZE};
use crate::register::*;

/// Plain memory standing in for the data space.
///
/// Reads return whatever was last written; none of the hardware side effects
/// (write-one-to-clear flags, shared UDRn buffers) are modelled.
pub struct MemoryAccess {
    bytes: [Cell<u8>; DATA_SPACE_SIZE],
}

impl MemoryAccess {
    pub fn new() -> Self {
        Self {
            bytes: core::array::from_fn(|_| Cell::new(0)),
        }
    }

    pub fn get(&self, address: usize) -> u8 {
        self.bytes[address].get()
    }

    pub fn set(&self, address: usize, value: u8) {
        self.bytes[address].set(value);
    }

    /// Put the USART registers of `chip` in their power-on state.
    pub fn load_reset_values(&self, chip: Chip) -> Result<()> {
        let device = Device::new(self, chip);
        for channel in device.channels() {
            channel.ucsra().write(|_| UCSRnA::default())?;
            channel.ucsrb().write(|_| UCSRnB::new())?;
            channel.ucsrc().write(|_| UCSRnC::default())?;
            channel.ubrrh().write(|_| UBRRnH::new())?;
            channel.ubrrl().write(|_| UBRRnL::new())?;
            channel.udr().write(|_| UDRn::new())?;
        }
        device.sreg().write(|_| SREG::new())
    }
}

impl Default for MemoryAccess {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceAccess for MemoryAccess {
    fn read(&self, address: RegisterAddress) -> Result<RegisterValue> {
        Ok(self.get(address as usize))
    }

    fn write(&self, address: RegisterAddress, value: RegisterValue) -> Result<()> {
        self.set(address as usize, value);
        Ok(())
    }
}
