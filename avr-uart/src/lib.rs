//! Polled USART driver for ATmega parts.
//!
//! Baud rates come from a static table of known-good register values, frame
//! format and parity go straight into the UCSRn registers, and bytes move one
//! at a time through UDRn.

#![cfg_attr(not(test), no_std)]

pub use atmega_usart_pac as pac;

pub mod baud;
pub mod config;
pub mod driver;
pub mod error;
pub mod serial;

#[cfg(test)]
mod testing;

pub use baud::{resolve_divisor, BaudSetting, BaudTableEntry, BAUD_TABLE};
pub use config::{ChannelConfig, DataLength, FlagPolarity, Interrupt, Parity, F_CPU};
pub use driver::UartDriver;
pub use error::{Error, Result};
pub use serial::Serial;
