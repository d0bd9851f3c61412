use embedded_hal::delay::DelayNs;

use crate::mod_params::RadioError;

/// Functions implemented for an embedded framework for an MCU/LoRa board
/// combination to allow this crate to control the pins around the Sx127x.
///
/// The SPI bus itself is covered by [`embedded_hal::spi::SpiDevice`]; this
/// trait covers everything else: the reset line, the two DIO lines the
/// driver polls, and the RF switch in front of the antenna.
pub trait InterfaceVariant {
    /// Pulse the hardware reset line
    fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), RadioError>;
    /// Sample the DIO0 interrupt line
    fn dio0_asserted(&mut self) -> Result<bool, RadioError>;
    /// Sample the DIO1 interrupt line
    fn dio1_asserted(&mut self) -> Result<bool, RadioError>;
    /// Route the RF switch for receive operations
    fn enable_rf_switch_rx(&mut self) -> Result<(), RadioError>;
    /// Route the RF switch for send operations
    fn enable_rf_switch_tx(&mut self) -> Result<(), RadioError>;
    /// Disconnect the RF switch
    fn disable_rf_switch(&mut self) -> Result<(), RadioError>;
}
