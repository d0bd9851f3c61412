use embedded_hal::spi::SpiDevice;

use crate::mod_params::*;
use crate::mod_traits::InterfaceVariant;
use crate::registers::*;
use crate::Sx127x;

// Section 4.1.1.6: low data rate optimization is mandated once the
// symbol period exceeds 16 ms.
const LDRO_THRESHOLD_MS: f32 = 16.0;

// RegDetectionThreshold values; SF6 trades reduced sensitivity against
// false detections.
const DETECTION_THRESHOLD_SF6: u8 = 0x0c;
const DETECTION_THRESHOLD: u8 = 0x0a;

pub(crate) fn symbol_period_ms(bandwidth: Bandwidth, spreading_factor: SpreadingFactor) -> f32 {
    let chips = 1u32 << u32::from(spreading_factor);
    chips as f32 * 1000.0 / u32::from(bandwidth) as f32
}

impl<SPI, IV> Sx127x<SPI, IV>
where
    SPI: SpiDevice<u8>,
    IV: InterfaceVariant,
{
    /// Configure the whole modem in one call.
    pub fn configure(
        &mut self,
        bandwidth: Bandwidth,
        spreading_factor: SpreadingFactor,
        coding_rate: CodingRate,
        implicit_header: bool,
        rx_payload_crc: bool,
        agc_auto: bool,
    ) -> Result<(), RadioError> {
        self.set_bandwidth(bandwidth)?;
        self.set_spreading_factor(spreading_factor)?;
        self.set_coding_rate(coding_rate)?;
        self.set_implicit_header(implicit_header)?;
        self.set_rx_payload_crc(rx_payload_crc)?;
        self.set_agc_auto(agc_auto)
    }

    /// The configured channel bandwidth, if the register code maps to one.
    pub fn bandwidth(&self) -> Option<Bandwidth> {
        let code = self.shadow.bandwidth_code(self.variant)?;
        self.variant.bandwidth_from_value(code)
    }

    /// Set the channel bandwidth.
    ///
    /// No-op unless LoRa mode is enabled: the register is shared with the
    /// FSK modem and must not be corrupted. Recomputes and rewrites the
    /// low-data-rate-optimization flag.
    pub fn set_bandwidth(&mut self, bandwidth: Bandwidth) -> Result<(), RadioError> {
        if !self.lora_enabled() || self.variant == ChipVariant::Unknown {
            return Ok(());
        }
        let code = self.variant.bandwidth_value(bandwidth)?;
        if let Some((reg, val)) = self.shadow.set_bandwidth_code(self.variant, code) {
            self.write_register(reg, val)?;
        }
        self.update_low_data_rate_optimize()
    }

    /// The configured spreading factor.
    pub fn spreading_factor(&self) -> Option<SpreadingFactor> {
        spreading_factor_from_value(self.shadow.spreading_factor_bits())
    }

    /// Set the spreading factor.
    ///
    /// No-op unless LoRa mode is enabled. Retunes the detection threshold
    /// and trigger-peak count (SF6 needs both relaxed) and recomputes the
    /// low-data-rate-optimization flag.
    pub fn set_spreading_factor(&mut self, spreading_factor: SpreadingFactor) -> Result<(), RadioError> {
        if !self.lora_enabled() {
            return Ok(());
        }

        // false detections vs missed detections tradeoff
        let peaks = match spreading_factor {
            SpreadingFactor::_6 => 3,
            SpreadingFactor::_7 => 4,
            _ => 5,
        };
        let (reg, val) = self.shadow.set_trig_peaks(peaks);
        self.write_register(reg, val)?;

        let threshold = if spreading_factor == SpreadingFactor::_6 {
            DETECTION_THRESHOLD_SF6
        } else {
            DETECTION_THRESHOLD
        };
        self.write_register(Register::RegDetectionThreshold, threshold)?;

        // spreading factor field is shared between both layouts
        let (reg, val) = self.shadow.set_spreading_factor_bits(u32::from(spreading_factor) as u8);
        self.write_register(reg, val)?;

        self.update_low_data_rate_optimize()
    }

    /// The configured coding rate.
    pub fn coding_rate(&self) -> Option<CodingRate> {
        let code = self.shadow.coding_rate_code(self.variant)?;
        coding_rate_from_value(code)
    }

    /// Set the coding rate. No-op unless LoRa mode is enabled.
    pub fn set_coding_rate(&mut self, coding_rate: CodingRate) -> Result<(), RadioError> {
        if !self.lora_enabled() {
            return Ok(());
        }
        if let Some((reg, val)) = self.shadow.set_coding_rate_code(self.variant, coding_rate_value(coding_rate)) {
            self.write_register(reg, val)?;
        }
        Ok(())
    }

    /// Whether implicit (fixed length) header mode is selected.
    pub fn implicit_header(&self) -> bool {
        self.shadow.implicit_header(self.variant).unwrap_or_default()
    }

    /// Select implicit (fixed length) or explicit header mode.
    pub fn set_implicit_header(&mut self, implicit: bool) -> Result<(), RadioError> {
        if let Some((reg, val)) = self.shadow.set_implicit_header(self.variant, implicit) {
            self.write_register(reg, val)?;
        }
        Ok(())
    }

    /// Whether payload CRC checking on receive is enabled.
    pub fn rx_payload_crc(&self) -> bool {
        self.shadow.rx_payload_crc(self.variant).unwrap_or_default()
    }

    /// Enable payload CRC generation/checking.
    pub fn set_rx_payload_crc(&mut self, on: bool) -> Result<(), RadioError> {
        if let Some((reg, val)) = self.shadow.set_rx_payload_crc(self.variant, on) {
            self.write_register(reg, val)?;
        }
        Ok(())
    }

    /// Whether automatic gain control is enabled.
    pub fn agc_auto(&self) -> bool {
        self.shadow.agc_auto(self.variant).unwrap_or_default()
    }

    /// Enable automatic gain control.
    pub fn set_agc_auto(&mut self, on: bool) -> Result<(), RadioError> {
        if let Some((reg, val)) = self.shadow.set_agc_auto(self.variant, on) {
            self.write_register(reg, val)?;
        }
        Ok(())
    }

    /// Whether the low-data-rate-optimization flag is currently set.
    pub fn low_data_rate_optimize(&self) -> bool {
        self.shadow.low_data_rate_optimize(self.variant).unwrap_or_default()
    }

    // Derived, never set independently: the flag must track the symbol
    // period whenever bandwidth or spreading factor changes.
    fn update_low_data_rate_optimize(&mut self) -> Result<(), RadioError> {
        let (Some(bandwidth), Some(spreading_factor)) = (self.bandwidth(), self.spreading_factor()) else {
            return Ok(());
        };
        let ldro = symbol_period_ms(bandwidth, spreading_factor) > LDRO_THRESHOLD_MS;
        debug!("ldro = {}", ldro);
        if let Some((reg, val)) = self.shadow.set_low_data_rate_optimize(self.variant, ldro) {
            self.write_register(reg, val)?;
        }
        Ok(())
    }
}
