#![allow(non_snake_case)]

use core::marker::PhantomData;

use crate::register::*;

pub type RegisterAddress = u16;
pub type RegisterValue = u8;

/// Memory-mapped register access has no failure path, so there is nothing
/// to put in here.
#[derive(Debug)]
pub enum Error {
}

pub type Result<T> = core::result::Result<T, Error>;

pub trait RegisterBus {
    fn register_read(&self, address: RegisterAddress) -> Result<RegisterValue>;
    fn register_write(&self, address: RegisterAddress, value: RegisterValue) -> Result<()>;
}

pub struct Access<'a, D, T>
where D: RegisterBus,
{
    device: &'a D,
    address: usize,
    t: PhantomData<T>,
}

impl<'a, D, T> Access<'a, D, T>
where D: RegisterBus,
{
    fn new(device: &'a D, address: usize) -> Self {
        Self {
            device,
            address,
            t: PhantomData,
        }
    }

    pub fn address(&self) -> usize {
        self.address
    }
}

impl<D, T> Access<'_, D, T>
where D: RegisterBus,
      T: From<u8>,
{
    fn get_typed(&self, address: usize) -> Result<T> {
        assert!(address < DATA_SPACE_SIZE);
        Ok(T::from(self.device.register_read(address as RegisterAddress)?))
    }

    pub fn read(&self) -> Result<T> {
        self.get_typed(self.address)
    }
}

impl<D, T> Access<'_, D, T>
where D: RegisterBus,
      T: From<u8> + Into<u8>,
{
    fn set_typed(&self, address: usize, value: T) -> Result<()> {
        assert!(address < DATA_SPACE_SIZE);
        self.device.register_write(address as RegisterAddress, value.into())
    }

    pub fn write<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(T) -> T,
    {
        let value = T::from(0);
        let new_value = f(value);
        self.set_typed(self.address, new_value)
    }

    pub fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(T) -> T,
    {
        let value = self.read()?;
        let new_value = f(value);
        self.set_typed(self.address, new_value)
    }
}

///////////////////////////////////////////////////////////////////////
// Chip

/// Size of the data space covered by register addresses: the 64 I/O
/// registers plus the extended I/O space, 0x0000..0x0200.
pub const DATA_SPACE_SIZE: usize = 0x200;

const SREG_ADDRESS: usize = 0x5f;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Chip {
    /// ATmega48A/PA/88A/PA/168A/PA/328/P: USART0 only.
    ATmega328P,

    /// ATmega640/1280/1281/2560/2561: USART0..USART3.
    ATmega2560,
}

impl Chip {
    fn usart_bases(&self) -> &'static [usize] {
        const ATMEGA328P: [usize; 1] = [0x0c0];
        const ATMEGA2560: [usize; 4] = [0x0c0, 0x0c8, 0x0d0, 0x130];

        match self {
            Chip::ATmega328P => &ATMEGA328P,
            Chip::ATmega2560 => &ATMEGA2560,
        }
    }

    pub fn usart_count(&self) -> usize {
        self.usart_bases().len()
    }

    pub fn usart_base(&self, index: usize) -> usize {
        let bases = self.usart_bases();
        assert!(index < bases.len());
        bases[index]
    }
}

///////////////////////////////////////////////////////////////////////
// Channel

pub struct Channel<'a, D>
where D: RegisterBus,
{
    device: &'a D,
    index: usize,
    base: usize,
}

impl<'a, D> Channel<'a, D>
where D: RegisterBus,
{
    fn new(device: &'a D, chip: Chip, index: usize) -> Self {
        Self {
            device,
            index,
            base: chip.usart_base(index),
        }
    }

    fn access<T>(&self, offset: usize) -> Access<'_, D, T> {
        Access::new(self.device, Addressing::usart(self.base, offset))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn ucsra(&self) -> Access<D, UCSRnA> { self.access(0x0) }
    pub fn ucsrb(&self) -> Access<D, UCSRnB> { self.access(0x1) }
    pub fn ucsrc(&self) -> Access<D, UCSRnC> { self.access(0x2) }
    pub fn ubrrl(&self) -> Access<D, UBRRnL> { self.access(0x4) }
    pub fn ubrrh(&self) -> Access<D, UBRRnH> { self.access(0x5) }
    pub fn udr  (&self) -> Access<D, UDRn>   { self.access(0x6) }

    /// Receive Data Buffer, read side of UDRn.
    pub fn rxb  (&self) -> Access<D, UDRn>   { self.udr() }

    /// Transmit Data Buffer, write side of UDRn.
    pub fn txb  (&self) -> Access<D, UDRn>   { self.udr() }
}

pub struct Channels<'a, D>
where D: RegisterBus,
{
    device: &'a D,
    chip: Chip,
    n: usize,
}

impl<'a, D> Channels<'a, D>
where D: RegisterBus,
{
    fn new(device: &'a D, chip: Chip) -> Self {
        Self {
            device,
            chip,
            n: 0,
        }
    }
}

impl<'a, D> Iterator for Channels<'a, D>
where D: RegisterBus,
{
    type Item = Channel<'a, D>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.n < self.chip.usart_count() {
            let result = Channel::new(self.device, self.chip, self.n);
            self.n += 1;
            Some(result)
        } else {
            None
        }
    }
}

///////////////////////////////////////////////////////////////////////
// Device

pub trait DeviceAccess {
    fn read(&self, address: RegisterAddress) -> Result<RegisterValue>;
    fn write(&self, address: RegisterAddress, value: RegisterValue) -> Result<()>;
}

impl<A> DeviceAccess for &A
where A: DeviceAccess + ?Sized
{
    fn read(&self, address: RegisterAddress) -> Result<RegisterValue> {
        (**self).read(address)
    }

    fn write(&self, address: RegisterAddress, value: RegisterValue) -> Result<()> {
        (**self).write(address, value)
    }
}

/// AVR USART register interface
///
/// Abstracts the USART blocks and the status register of one chip, as seen
/// through its data space.
///
pub struct Device<A>
where A: DeviceAccess
{
    access: A,
    chip: Chip,
}

impl<A> Device<A>
where A: DeviceAccess
{
    pub fn new(access: A, chip: Chip) -> Self {
        Self {
            access,
            chip,
        }
    }

    pub fn chip(&self) -> Chip {
        self.chip
    }

    pub fn usart_count(&self) -> usize {
        self.chip.usart_count()
    }

    pub fn channels(&self) -> Channels<Self> {
        Channels::new(self, self.chip)
    }

    // Per-Channel

    pub fn channel(&self, index: usize) -> Channel<Self> {
        Channel::new(self, self.chip, index)
    }

    // CPU Core

    pub fn sreg(&self) -> Access<Self, SREG> { Access::new(self, Addressing::global(SREG_ADDRESS)) }
}

impl<A> RegisterBus for Device<A>
where A: DeviceAccess {
    fn register_read(&self, address: RegisterAddress) -> Result<RegisterValue> {
        self.access.read(address)
    }

    fn register_write(&self, address: RegisterAddress, value: RegisterValue) -> Result<()> {
        self.access.write(address, value)
    }
}

/// AVR data space addressing abstraction
///
struct Addressing {}

impl Addressing {
    fn global(offset: usize) -> usize {
        assert!(offset < DATA_SPACE_SIZE);
        offset
    }

    /// USART registers of the form base + offset, 0 <= offset < 8
    fn usart(base: usize, offset: usize) -> usize {
        assert!(offset < 8);
        Self::global(base + offset)
    }
}
