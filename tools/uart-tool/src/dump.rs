use atmega_usart_pac::device::{Channel, Device, DeviceAccess};
use console::{style, Color};

use crate::error::Result;

pub fn registers_dump<A: DeviceAccess>(device: &Device<A>, clock_hz: u32) -> Result<()> {
    registers_dump_global(device)?;

    for channel in device.channels() {
        registers_dump_channel(&channel, clock_hz)?;
    }

    Ok(())
}

pub fn registers_dump_global<A: DeviceAccess>(device: &Device<A>) -> Result<()> {
    println!("Device\t{:?}, {} USART(s)", device.chip(), device.usart_count());
    println!("Global\t{:?}", device.sreg().read()?);

    Ok(())
}

pub fn registers_dump_channel<A: DeviceAccess>(channel: &Channel<Device<A>>, clock_hz: u32) -> Result<()> {
    let color = |v| if v != 0 { Color::Green } else { Color::Black };

    let ucsra = channel.ucsra().read()?;
    let ucsrb = channel.ucsrb().read()?;
    let ucsrc = channel.ucsrc().read()?;
    let ubrrh = channel.ubrrh().read()?;
    let ubrrl = channel.ubrrl().read()?;

    print!("USART{}", channel.index());
    println!("\t{:?}", ucsra);
    println!("\t{:?}", ucsrb);
    println!("\t{:?}", ucsrc);
    println!("\t{:?}", ubrrh);
    println!("\t{:?}", ubrrl);

    println!("\t[{}][{}][{}][{}] [{}][{}][{}][{}][{}]",
        style("RXC").fg(color(ucsra.RXC())),
        style("TXC").fg(color(ucsra.TXC())),
        style("UDRE").fg(color(ucsra.UDRE())),
        style("U2X").fg(color(ucsra.U2X())),
        style("RXEN").fg(color(ucsrb.RXEN())),
        style("TXEN").fg(color(ucsrb.TXEN())),
        style("RXCIE").fg(color(ucsrb.RXCIE())),
        style("TXCIE").fg(color(ucsrb.TXCIE())),
        style("UDRIE").fg(color(ucsrb.UDRIE())),
    );

    let divisor = ((ubrrh.UBRR() as u32) << 8) | ubrrl.UBRR() as u32;
    let samples = if ucsra.U2X() != 0 { 8 } else { 16 };
    let data_bits = if ucsrb.UCSZ2() != 0 { 9 } else { 5 + ucsrc.UCSZ() as u32 };
    println!("\tUBRR={divisor} -> {} baud @ {clock_hz} Hz, {data_bits} data bits, parity {:?}",
        clock_hz / (samples * (divisor + 1)),
        ucsrc.UPM(),
    );

    Ok(())
}
