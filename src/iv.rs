use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::mod_params::RadioError;
use crate::mod_params::RadioError::*;
use crate::mod_traits::InterfaceVariant;

/// Base for the InterfaceVariant implementation for Sx127x boards wired
/// to plain GPIOs.
///
/// The RF switch pins are optional: boards with a hard-wired antenna
/// path pass `None` and the switch calls become no-ops.
pub struct GenericSx127xInterfaceVariant<CTRL, IN> {
    reset: CTRL,
    dio0: IN,
    dio1: IN,
    rf_switch_rx: Option<CTRL>,
    rf_switch_tx: Option<CTRL>,
}

impl<CTRL, IN> GenericSx127xInterfaceVariant<CTRL, IN>
where
    CTRL: OutputPin,
    IN: InputPin,
{
    /// Create an InterfaceVariant instance for an MCU/Sx127x combination
    pub fn new(
        reset: CTRL,
        dio0: IN,
        dio1: IN,
        rf_switch_rx: Option<CTRL>,
        rf_switch_tx: Option<CTRL>,
    ) -> Result<Self, RadioError> {
        Ok(Self {
            reset,
            dio0,
            dio1,
            rf_switch_rx,
            rf_switch_tx,
        })
    }
}

impl<CTRL, IN> InterfaceVariant for GenericSx127xInterfaceVariant<CTRL, IN>
where
    CTRL: OutputPin,
    IN: InputPin,
{
    fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), RadioError> {
        delay.delay_ms(10);
        self.reset.set_low().map_err(|_| Reset)?;
        delay.delay_ms(10);
        self.reset.set_high().map_err(|_| Reset)?;
        delay.delay_ms(10);
        Ok(())
    }

    fn dio0_asserted(&mut self) -> Result<bool, RadioError> {
        self.dio0.is_high().map_err(|_| Dio)
    }

    fn dio1_asserted(&mut self) -> Result<bool, RadioError> {
        self.dio1.is_high().map_err(|_| Dio)
    }

    fn enable_rf_switch_rx(&mut self) -> Result<(), RadioError> {
        match &mut self.rf_switch_tx {
            Some(pin) => pin.set_low().map_err(|_| RfSwitchTx)?,
            None => (),
        };
        match &mut self.rf_switch_rx {
            Some(pin) => pin.set_high().map_err(|_| RfSwitchRx),
            None => Ok(()),
        }
    }

    fn enable_rf_switch_tx(&mut self) -> Result<(), RadioError> {
        match &mut self.rf_switch_rx {
            Some(pin) => pin.set_low().map_err(|_| RfSwitchRx)?,
            None => (),
        };
        match &mut self.rf_switch_tx {
            Some(pin) => pin.set_high().map_err(|_| RfSwitchTx),
            None => Ok(()),
        }
    }

    fn disable_rf_switch(&mut self) -> Result<(), RadioError> {
        match &mut self.rf_switch_rx {
            Some(pin) => pin.set_low().map_err(|_| RfSwitchRx)?,
            None => (),
        };
        match &mut self.rf_switch_tx {
            Some(pin) => pin.set_low().map_err(|_| RfSwitchTx),
            None => Ok(()),
        }
    }
}
