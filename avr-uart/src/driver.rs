use atmega_usart_pac::device::{Channel, Device, DeviceAccess};

use crate::baud::{resolve_divisor, BaudSetting, BaudTableEntry, BAUD_TABLE};
use crate::config::{ChannelConfig, DataLength, FlagPolarity, Interrupt, Parity};
use crate::error::{Error, Result};

const LF: u8 = 0x0a;
const CR: u8 = 0x0d;

/// Polled driver for the USART channels of one chip.
///
/// Every operation is a short run of register reads and writes; nothing is
/// kept in software apart from the clock, the baud table and the flag
/// polarity. The driver assumes it is the only one touching these
/// registers.
pub struct UartDriver<A>
where A: DeviceAccess
{
    device: Device<A>,
    clock_hz: u32,
    baud_table: &'static [BaudTableEntry],
    polarity: FlagPolarity,
}

impl<A> UartDriver<A>
where A: DeviceAccess
{
    pub fn new(device: Device<A>, clock_hz: u32) -> Self {
        Self {
            device,
            clock_hz,
            baud_table: BAUD_TABLE,
            polarity: FlagPolarity::default(),
        }
    }

    pub fn with_baud_table(mut self, baud_table: &'static [BaudTableEntry]) -> Self {
        self.baud_table = baud_table;
        self
    }

    pub fn with_flag_polarity(mut self, polarity: FlagPolarity) -> Self {
        self.polarity = polarity;
        self
    }

    pub fn device(&self) -> &Device<A> {
        &self.device
    }

    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    pub fn flag_polarity(&self) -> FlagPolarity {
        self.polarity
    }

    pub fn channel_count(&self) -> usize {
        self.device.usart_count()
    }

    pub(crate) fn channel(&self, index: usize) -> Result<Channel<'_, Device<A>>> {
        let count = self.channel_count();
        if index < count {
            Ok(self.device.channel(index))
        } else {
            Err(Error::InvalidChannel { index, count })
        }
    }

    fn resolve(&self, baud_rate: u32) -> Result<BaudSetting> {
        resolve_divisor(self.baud_table, self.clock_hz, baud_rate)
    }

    fn write_baud(&self, channel: &Channel<Device<A>>, setting: BaudSetting) -> Result<()> {
        channel.ucsra().modify(|m| m
            .without_flags()
            .with_U2X(setting.oversampling as u8)
        )?;

        // UBRRnL last, writing it updates the prescaler.
        channel.ubrrh().write(|w| w.with_UBRR(setting.high()))?;
        channel.ubrrl().write(|w| w.with_UBRR(setting.low()))?;
        Ok(())
    }

    fn configure_channel(&self, channel: &Channel<Device<A>>, config: &ChannelConfig) -> Result<()> {
        let setting = self.resolve(config.baud_rate)?;

        let enable = config.enabled as u8;
        channel.ucsrb().modify(|m| m
            .with_RXEN(enable)
            .with_TXEN(enable)
        )?;

        match config.data_length {
            DataLength::Eight => {
                channel.ucsrc().modify(|m| m.with_UCSZ(0b11))?;
                channel.ucsrb().modify(|m| m.with_UCSZ2(0))?;
            },
            DataLength::Nine => {
                channel.ucsrc().modify(|m| m.with_UCSZ(0b11))?;
                channel.ucsrb().modify(|m| m.with_UCSZ2(1))?;
            },
        }

        if config.interrupt_enabled {
            channel.ucsrb().modify(|m| m.with_RXCIE(1))?;
        }

        self.write_baud(channel, setting)?;

        log::debug!("usart{}: enabled={} {:?} rxcie={} baud={} UBRR={} U2X={}",
            channel.index(), config.enabled, config.data_length, config.interrupt_enabled,
            config.baud_rate, setting.divisor, setting.oversampling,
        );
        Ok(())
    }

    /// Configure every channel, `configs[i]` going to USARTi.
    ///
    /// All baud rates are checked before the first register write, so an
    /// unsupported rate leaves the hardware as it was. Parity is not applied
    /// here, see `set_parity`.
    pub fn initialize(&self, configs: &[ChannelConfig]) -> Result<()> {
        let expected = self.channel_count();
        if configs.len() != expected {
            return Err(Error::ConfigCount { expected, actual: configs.len() });
        }

        for config in configs {
            self.resolve(config.baud_rate)?;
        }

        if self.polarity == FlagPolarity::Inverted {
            log::warn!("usart: RXC/TXC read as ready-when-clear, unconfirmed against the datasheet");
        }

        for (channel, config) in self.device.channels().zip(configs) {
            self.configure_channel(&channel, config)?;
        }

        Ok(())
    }

    fn apply_parity(&self, channel: usize, parity: Parity) -> Result<()> {
        let channel = self.channel(channel)?;
        channel.ucsrc().modify(|m| m.with_UPM(parity.into()))?;
        Ok(())
    }

    pub fn set_parity(&self, channel: usize, config: &ChannelConfig) -> Result<()> {
        self.apply_parity(channel, config.parity)
    }

    pub fn change_parity(&self, channel: usize, parity: Parity) -> Result<()> {
        self.apply_parity(channel, parity)
    }

    pub fn set_baud_rate(&self, channel: usize, config: &ChannelConfig) -> Result<()> {
        let channel = self.channel(channel)?;
        let setting = self.resolve(config.baud_rate)?;
        self.write_baud(&channel, setting)
    }

    /// Like `set_baud_rate`, but parks the generator at UBRR=0, U2X=0 first.
    /// The line sees that rate briefly, so only call this while idle.
    pub fn change_baud_rate(&self, channel: usize, baud_rate: u32) -> Result<()> {
        let channel = self.channel(channel)?;
        let setting = self.resolve(baud_rate)?;

        channel.ubrrh().write(|w| w.with_UBRR(0))?;
        channel.ubrrl().write(|w| w.with_UBRR(0))?;
        channel.ucsra().modify(|m| m.without_flags().with_U2X(0))?;

        log::debug!("usart{}: baud -> {baud_rate}", channel.index());
        self.write_baud(&channel, setting)
    }

    /// Whatever is in the receive buffer; does not wait for RXCn.
    pub fn get_char(&self, channel: usize) -> Result<u8> {
        let channel = self.channel(channel)?;
        Ok(channel.rxb().read()?.DATA())
    }

    pub fn is_data_present(&self, channel: usize) -> Result<bool> {
        let channel = self.channel(channel)?;
        Ok(self.polarity.is_ready(channel.ucsra().read()?.RXC()))
    }

    /// Send one byte and spin until TXCn of the same channel is set. LF goes
    /// out as CR.
    ///
    /// There is no timeout: a transmitter that never completes never returns.
    pub fn put_char(&self, channel: usize, byte: u8) -> Result<()> {
        let channel = self.channel(channel)?;
        let byte = if byte == LF { CR } else { byte };

        // TXCn stays set from the previous frame until a one is written to it.
        channel.ucsra().modify(|m| m.without_flags().with_TXC(1))?;
        while channel.ucsra().read()?.UDRE() == 0 {}

        channel.txb().write(|w| w.with_DATA(byte))?;
        while channel.ucsra().read()?.TXC() == 0 {}
        Ok(())
    }

    pub fn is_transmit_complete(&self, channel: usize) -> Result<bool> {
        let channel = self.channel(channel)?;
        Ok(self.polarity.is_ready(channel.ucsra().read()?.TXC()))
    }

    fn set_interrupt(&self, channel: usize, interrupt: Interrupt, value: u8) -> Result<()> {
        let channel = self.channel(channel)?;
        channel.ucsrb().modify(|m| match interrupt {
            Interrupt::Receive   => m.with_RXCIE(value),
            Interrupt::Transmit  => m.with_TXCIE(value),
            Interrupt::DataEmpty => m.with_UDRIE(value),
        })?;
        Ok(())
    }

    pub fn interrupt_trigger(&self, channel: usize, interrupt: Interrupt) -> Result<()> {
        self.set_interrupt(channel, interrupt, 1)
    }

    pub fn interrupt_clear(&self, channel: usize, interrupt: Interrupt) -> Result<()> {
        self.set_interrupt(channel, interrupt, 0)
    }

    // Global Interrupt Enable (SREG.I)

    pub fn enable_global_interrupts(&self) -> Result<()> {
        self.device.sreg().modify(|m| m.with_I(1))?;
        Ok(())
    }

    pub fn disable_global_interrupts(&self) -> Result<()> {
        self.device.sreg().modify(|m| m.with_I(0))?;
        Ok(())
    }

    pub fn global_interrupts_enabled(&self) -> Result<bool> {
        Ok(self.device.sreg().read()?.I() != 0)
    }

    /// Run `f` with SREG.I cleared, then put I back the way it was, whether or
    /// not `f` failed.
    pub fn interrupt_free<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Self) -> Result<R>,
    {
        let saved = self.device.sreg().read()?.I();
        self.device.sreg().modify(|m| m.with_I(0))?;
        let result = f(self);
        self.device.sreg().modify(|m| m.with_I(saved))?;
        result
    }
}
