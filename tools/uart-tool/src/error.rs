use atmega_usart_pac::device;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Uart(#[from] avr_uart::Error),
    #[error("logger")]
    Logger(#[from] log::SetLoggerError),
}

impl From<device::Error> for ToolError {
    fn from(e: device::Error) -> Self {
        match e {}
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
