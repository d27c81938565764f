//! Register definitions and data space addressing for the USART blocks of
//! ATmega parts.

#![cfg_attr(not(test), no_std)]

pub mod device;
pub mod memory;
pub mod mmio;
pub mod register;
