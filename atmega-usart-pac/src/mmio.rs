use crate::device::{DeviceAccess, RegisterAddress, RegisterValue, Result};

/// Direct access to the data space of the running part.
#[derive(Copy, Clone)]
pub struct MmioAccess {
    p: usize,
}

impl MmioAccess {
    /// # Safety
    ///
    /// `p` must be the start of the data space (zero on AVR), and the caller
    /// must be the only one driving the registers reached through it.
    pub unsafe fn new(p: usize) -> Self {
        Self {
            p,
        }
    }
}

impl DeviceAccess for MmioAccess {
    fn read(&self, address: RegisterAddress) -> Result<RegisterValue> {
        unsafe {
            let p = (self.p + address as usize) as *const u8;
            Ok(p.read_volatile())
        }
    }

    fn write(&self, address: RegisterAddress, value: RegisterValue) -> Result<()> {
        unsafe {
            let p = (self.p + address as usize) as *mut u8;
            p.write_volatile(value);
            Ok(())
        }
    }
}
