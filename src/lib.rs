#![no_std]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
//!
//! ## Feature flags
#![doc = document_features::document_features!()]

#[cfg(test)]
extern crate std;

mod fmt;

/// The register bus between an embedded framework/MCU combination and the chip
pub(crate) mod interface;
/// InterfaceVariant implementations using `embedded-hal`.
pub mod iv;
/// Parameters used across the crate to support various use cases
pub mod mod_params;
/// Traits implemented externally to support control of the board pins
pub mod mod_traits;
/// Register map, bit-field views and the silicon variant abstraction
pub mod registers;
/// Frequency synthesizer conversions and band classification
pub mod synth;

mod engine;
mod modem;

#[cfg(test)]
mod test;

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

use interface::SpiInterface;
use mod_params::*;
use mod_traits::InterfaceVariant;
use registers::*;
use synth::FrequencyBand;

pub use engine::MAX_HOP_CHANNELS;
pub use mod_params::{Bandwidth, CodingRate, PacketStatus, RadioError, ServiceAction, SpreadingFactor};
pub use registers::{ChipVariant, OpMode};

/// Configuration for Sx127x-based boards
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// Whether `service()` polls for the ValidHeader IRQ flag while
    /// receiving and clears it as soon as it latches. Useful to observe
    /// reception starting before the packet completes.
    pub poll_valid_header: bool,
}

/// Driver for an Sx127x radio in LoRa mode.
///
/// All hardware access goes through the [`SpiDevice`] and
/// [`InterfaceVariant`] seams; the driver itself owns only the register
/// shadow and session state, and is driven by repeated
/// [`service`](Self::service) polls.
pub struct Sx127x<SPI, IV> {
    intf: SpiInterface<SPI, IV>,
    config: Config,
    variant: ChipVariant,
    shadow: RegisterShadow,
    band: FrequencyBand,
    hop_table: [u32; MAX_HOP_CHANNELS],
    hop_channels: usize,
    hop_period: u8,
    rx_buffer: [u8; engine::RX_BUFFER_SIZE],
    rx_len: u8,
    rx_status: PacketStatus,
}

impl<SPI, IV> Sx127x<SPI, IV>
where
    SPI: SpiDevice<u8>,
    IV: InterfaceVariant,
{
    /// Create an instance of the driver for the given board seams.
    ///
    /// No bus traffic happens here; call [`init`](Self::init) before
    /// anything else.
    pub fn new(spi: SPI, iv: IV, config: Config) -> Self {
        Self {
            intf: SpiInterface::new(spi, iv),
            config,
            variant: ChipVariant::Unknown,
            shadow: RegisterShadow::default(),
            band: FrequencyBand::Low,
            hop_table: [0; MAX_HOP_CHANNELS],
            hop_channels: 0,
            hop_period: 0,
            rx_buffer: [0; engine::RX_BUFFER_SIZE],
            rx_len: 0,
            rx_status: PacketStatus::default(),
        }
    }

    // Utility functions
    pub(crate) fn write_register(&mut self, register: Register, value: u8) -> Result<(), RadioError> {
        self.intf.write_register(register, value)
    }

    pub(crate) fn read_register(&mut self, register: Register) -> Result<u8, RadioError> {
        self.intf.read_register(register)
    }

    /// Reset the chip, load the register shadow and probe the silicon
    /// variant. Must complete before any other operation; the detected
    /// variant is final for the session.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), RadioError> {
        self.intf.iv.reset(delay)?;

        self.shadow.op_mode = self.read_register(Register::RegOpMode)?;
        self.variant = self.detect_variant()?;
        debug!("chip variant = {}", self.variant);

        self.shadow.pa_config = self.read_register(Register::RegPaConfig)?;
        self.shadow.dio_mapping1 = self.read_register(Register::RegDioMapping1)?;
        self.shadow.modem_config1 = self.read_register(Register::RegModemConfig1)?;
        self.shadow.modem_config2 = self.read_register(Register::RegModemConfig2)?;
        self.shadow.detection_optimize = self.read_register(Register::RegDetectionOptimize)?;
        if self.variant == ChipVariant::Sx1276 {
            self.shadow.modem_config3 = self.read_register(Register::RegModemConfig3)?;
        }

        if self.variant == ChipVariant::Sx1272 {
            // Boosted output is the only path this chip uses; preselect it.
            let (reg, val) = self.shadow.set_pa_select(true);
            self.write_register(reg, val)?;
        }

        Ok(())
    }

    // The chip family has no part-number register. The sx1276 carries a
    // low-frequency-mode bit the sx1272 lacks; a write the hardware
    // silently ignores identifies the older layout.
    fn detect_variant(&mut self) -> Result<ChipVariant, RadioError> {
        if self.shadow.op_mode & OPMODE_LOW_FREQUENCY_MODE_ON != 0 {
            return Ok(ChipVariant::Sx1276);
        }
        self.shadow.op_mode |= OPMODE_LOW_FREQUENCY_MODE_ON;
        self.write_register(Register::RegOpMode, self.shadow.op_mode)?;
        self.shadow.op_mode = self.read_register(Register::RegOpMode)?;
        if self.shadow.op_mode & OPMODE_LOW_FREQUENCY_MODE_ON != 0 {
            Ok(ChipVariant::Sx1276)
        } else {
            Ok(ChipVariant::Sx1272)
        }
    }

    /// The silicon variant detected at [`init`](Self::init).
    pub fn variant(&self) -> ChipVariant {
        self.variant
    }

    /// Write the 3-bit mode field, preserving the other RegOpMode flags.
    pub fn set_opmode(&mut self, mode: OpMode) -> Result<(), RadioError> {
        let (reg, val) = self.shadow.set_mode(mode);
        self.write_register(reg, val)
    }

    /// The current operating mode, per the register shadow.
    pub fn opmode(&self) -> Option<OpMode> {
        OpMode::from_bits(self.shadow.mode_bits())
    }

    /// Whether LoRa (long range) mode is enabled.
    pub fn lora_enabled(&self) -> bool {
        self.shadow.long_range_mode()
    }

    /// Switch the chip from the legacy FSK modem to LoRa mode.
    ///
    /// The LongRangeMode bit is writable only while in Sleep, so the chip
    /// is forced to Sleep first. Afterwards DIO0 is mapped to RxDone and
    /// the chip is left in Standby.
    pub fn enable_lora(&mut self) -> Result<(), RadioError> {
        self.set_opmode(OpMode::Sleep)?;

        let (reg, val) = self.shadow.set_long_range_mode(true);
        self.write_register(reg, val)?;

        let (reg, val) = self.shadow.set_dio0_mapping(Dio0Mapping::RxDone);
        self.write_register(reg, val)?;

        self.set_opmode(OpMode::Standby)
    }

    /// Set the carrier frequency in Hz. Also reclassifies the frequency
    /// band used for PA path selection at the next TX start.
    pub fn set_frequency(&mut self, frequency_in_hz: u32) -> Result<(), RadioError> {
        self.program_frequency(frequency_in_hz)
    }

    pub(crate) fn program_frequency(&mut self, frequency_in_hz: u32) -> Result<(), RadioError> {
        debug!("channel = {}", frequency_in_hz);
        let frf = synth::freq_to_pll_step(frequency_in_hz);
        let bytes = [
            ((frf & 0x00ff0000) >> 16) as u8,
            ((frf & 0x0000ff00) >> 8) as u8,
            (frf & 0x000000ff) as u8,
        ];
        self.intf.write_buffer(Register::RegFrfMsb, &bytes)?;
        self.band = FrequencyBand::of(frequency_in_hz);
        Ok(())
    }

    /// Read the carrier frequency back from the synthesizer registers,
    /// in Hz. Reclassifies the frequency band as a side effect.
    pub fn frequency(&mut self) -> Result<u32, RadioError> {
        let mut bytes = [0u8; 3];
        self.intf.read_buffer(Register::RegFrfMsb, &mut bytes)?;
        let frf = ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32;
        let frequency_in_hz = synth::pll_step_to_freq(frf);
        self.band = FrequencyBand::of(frequency_in_hz);
        Ok(frequency_in_hz)
    }

    /// The band classification of the most recently programmed carrier.
    pub fn frequency_band(&self) -> FrequencyBand {
        self.band
    }

    /// Live (non-packet) RSSI in dBm.
    pub fn read_rssi(&mut self) -> Result<i16, RadioError> {
        let raw = self.read_register(Register::RegRssiValue)?;
        Ok(raw as i16 + self.variant.rssi_offset())
    }

    /// The payload and status captured at the latest RX completion.
    ///
    /// Contents are stale between [`ServiceAction::PacketReady`] reports
    /// and are overwritten by the next completion.
    pub fn last_rx_packet(&self) -> (&[u8], PacketStatus) {
        (&self.rx_buffer[..self.rx_len as usize], self.rx_status)
    }
}
