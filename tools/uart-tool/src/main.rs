use clap::{Parser, Subcommand, Args, ArgEnum};

use atmega_usart_pac::device::{Chip, Device};
use avr_uart::{ChannelConfig, DataLength, FlagPolarity, Parity, UartDriver, F_CPU};

use crate::dump::registers_dump;
use crate::error::Result;
use crate::sim::SimulatedUsart;
use crate::table::{print_baud_table, print_resolve};

mod dump;
mod error;
mod logger;
mod sim;
mod table;

#[derive(Parser)]
#[clap(author, version, about="AVR USART driver on a simulated register file", long_about=None)]
pub(crate) struct Cli {
    /// Log more, repeat for more detail
    #[clap(short, long, parse(from_occurrences), global=true)]
    pub verbose: u64,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(ArgEnum, Copy, Clone)]
pub(crate) enum ChipArg {
    Atmega328p,
    Atmega2560,
}

impl From<ChipArg> for Chip {
    fn from(chip: ChipArg) -> Self {
        match chip {
            ChipArg::Atmega328p => Chip::ATmega328P,
            ChipArg::Atmega2560 => Chip::ATmega2560,
        }
    }
}

#[derive(ArgEnum, Copy, Clone)]
pub(crate) enum DataLengthArg {
    Eight,
    Nine,
}

#[derive(ArgEnum, Copy, Clone)]
pub(crate) enum ParityArg {
    None,
    Odd,
    Even,
}

#[derive(Args)]
pub(crate) struct TargetArgs {
    #[clap(long, arg_enum, default_value="atmega328p")]
    pub chip: ChipArg,

    /// System clock in Hz
    #[clap(long, default_value_t=F_CPU)]
    pub clock: u32,

    /// Read RXC/TXC as ready-when-set
    #[clap(long)]
    pub datasheet_polarity: bool,
}

#[derive(Args)]
pub(crate) struct TableArgs {
    /// Only rows for this clock
    #[clap(long)]
    pub clock: Option<u32>,
}

#[derive(Args)]
pub(crate) struct ResolveArgs {
    #[clap(long)]
    pub baud: u32,

    #[clap(long, default_value_t=F_CPU)]
    pub clock: u32,
}

#[derive(Args)]
pub(crate) struct ConfigureArgs {
    #[clap(flatten)]
    pub target: TargetArgs,

    #[clap(long)]
    pub baud: u32,

    #[clap(long, arg_enum, default_value="eight")]
    pub data_length: DataLengthArg,

    #[clap(long, arg_enum, default_value="none")]
    pub parity: ParityArg,

    /// Leave receiver and transmitter off
    #[clap(long)]
    pub disabled: bool,

    /// Enable the receive complete interrupt of every channel
    #[clap(long)]
    pub interrupts: bool,

    /// Also set SREG.I
    #[clap(long)]
    pub global_interrupts: bool,
}

#[derive(Args)]
pub(crate) struct SendArgs {
    #[clap(flatten)]
    pub target: TargetArgs,

    #[clap(long, default_value_t=0)]
    pub channel: usize,

    #[clap(long, default_value_t=9600)]
    pub baud: u32,

    /// Append a line feed
    #[clap(long)]
    pub newline: bool,

    /// Feed transmitted bytes back into the receiver and read them
    #[clap(long)]
    pub loopback: bool,

    pub text: String,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List the baud rate table
    #[clap(name="table")]
    Table(TableArgs),

    /// Look up the register setting for a baud rate
    #[clap(name="resolve")]
    Resolve(ResolveArgs),

    /// Initialize every channel and dump the registers
    #[clap(name="configure")]
    Configure(ConfigureArgs),

    /// Initialize and transmit text
    #[clap(name="send")]
    Send(SendArgs),
}

fn driver<'a>(target: &TargetArgs, sim: &'a SimulatedUsart) -> UartDriver<&'a SimulatedUsart> {
    let polarity = if target.datasheet_polarity {
        FlagPolarity::Datasheet
    } else {
        FlagPolarity::Inverted
    };

    UartDriver::new(Device::new(sim, target.chip.into()), target.clock)
        .with_flag_polarity(polarity)
}

fn configure(a: ConfigureArgs) -> Result<()> {
    let sim = SimulatedUsart::new(a.target.chip.into())?;
    let uart = driver(&a.target, &sim);

    let config = ChannelConfig {
        enabled: !a.disabled,
        data_length: match a.data_length {
            DataLengthArg::Eight => DataLength::Eight,
            DataLengthArg::Nine  => DataLength::Nine,
        },
        parity: match a.parity {
            ParityArg::None => Parity::None,
            ParityArg::Odd  => Parity::Odd,
            ParityArg::Even => Parity::Even,
        },
        interrupt_enabled: a.interrupts,
        baud_rate: a.baud,
    };

    let configs = vec![config; uart.channel_count()];
    uart.initialize(&configs)?;
    for channel in 0..uart.channel_count() {
        uart.set_parity(channel, &config)?;
    }
    if a.global_interrupts {
        uart.enable_global_interrupts()?;
    }

    registers_dump(uart.device(), uart.clock_hz())
}

fn send(a: SendArgs) -> Result<()> {
    let sim = SimulatedUsart::new(a.target.chip.into())?;
    sim.set_loopback(a.loopback);
    let uart = driver(&a.target, &sim);

    let config = ChannelConfig {
        baud_rate: a.baud,
        ..ChannelConfig::default()
    };
    uart.initialize(&vec![config; uart.channel_count()])?;

    let count = uart.channel_count();
    if a.channel >= count {
        return Err(avr_uart::Error::InvalidChannel { index: a.channel, count }.into());
    }

    let mut bytes = a.text.into_bytes();
    if a.newline {
        bytes.push(b'\n');
    }

    let mut echoed = Vec::with_capacity(bytes.len());
    for b in bytes {
        uart.put_char(a.channel, b)?;
        if a.loopback {
            echoed.push(uart.get_char(a.channel)?);
        }
    }

    print!("USART{} tx:", a.channel);
    for b in sim.transmitted(a.channel) {
        print!(" {b:02x}");
    }
    println!();

    let dropped = sim.dropped(a.channel);
    if dropped > 0 {
        println!("USART{} lost {dropped} byte(s) written while UDR was full", a.channel);
    }

    if a.loopback {
        print!("USART{} rx:", a.channel);
        for b in echoed {
            print!(" {b:02x}");
        }
        println!();
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    logger::init(args.verbose)?;

    match args.command {
        Commands::Table(a) => {
            print_baud_table(a.clock);
        },
        Commands::Resolve(a) => {
            print_resolve(a.clock, a.baud)?;
        },
        Commands::Configure(a) => {
            configure(a)?;
        },
        Commands::Send(a) => {
            send(a)?;
        },
    }

    Ok(())
}
