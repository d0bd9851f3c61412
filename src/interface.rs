use embedded_hal::spi::{Operation, SpiDevice};

use crate::mod_params::RadioError::{self, SPI};
use crate::registers::Register;

// Every register or burst access is one SpiDevice transaction, so chip
// select is asserted and released per operation, on every exit path. The
// driver never holds the bus across logically related operations.
pub(crate) struct SpiInterface<SPI, IV> {
    pub(crate) spi: SPI,
    pub(crate) iv: IV,
}

impl<SPI, IV> SpiInterface<SPI, IV>
where
    SPI: SpiDevice<u8>,
{
    pub fn new(spi: SPI, iv: IV) -> Self {
        Self { spi, iv }
    }

    pub fn read_register(&mut self, register: Register) -> Result<u8, RadioError> {
        let mut read_buffer = [0x00u8];
        self.spi
            .transaction(&mut [
                Operation::Write(&[register.read_addr()]),
                Operation::Read(&mut read_buffer),
            ])
            .map_err(|_| SPI)?;
        trace!("read: {:02x} -> {:02x}", register.read_addr(), read_buffer[0]);
        Ok(read_buffer[0])
    }

    pub fn write_register(&mut self, register: Register, value: u8) -> Result<(), RadioError> {
        trace!("write: {:02x} <- {:02x}", register.read_addr(), value);
        self.spi.write(&[register.write_addr(), value]).map_err(|_| SPI)
    }

    pub fn read_buffer(&mut self, register: Register, buf: &mut [u8]) -> Result<(), RadioError> {
        self.spi
            .transaction(&mut [Operation::Write(&[register.read_addr()]), Operation::Read(buf)])
            .map_err(|_| SPI)?;
        trace!("read_buf: {:02x}, len = {}", register.read_addr(), buf.len());
        Ok(())
    }

    pub fn write_buffer(&mut self, register: Register, buf: &[u8]) -> Result<(), RadioError> {
        trace!("write_buf: {:02x}, len = {}", register.read_addr(), buf.len());
        self.spi
            .transaction(&mut [Operation::Write(&[register.write_addr()]), Operation::Write(buf)])
            .map_err(|_| SPI)
    }
}
