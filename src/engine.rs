use embedded_hal::spi::SpiDevice;

use crate::mod_params::*;
use crate::mod_traits::InterfaceVariant;
use crate::registers::*;
use crate::Sx127x;

/// Maximum number of entries in the frequency hopping table.
pub const MAX_HOP_CHANNELS: usize = 64;

// Full FIFO depth; RegRxNbBytes can report any value up to it.
pub(crate) const RX_BUFFER_SIZE: usize = 256;

impl<SPI, IV> Sx127x<SPI, IV>
where
    SPI: SpiDevice<u8>,
    IV: InterfaceVariant,
{
    /// Install a frequency hopping table and hop period.
    ///
    /// A `hop_period` of zero disables hopping regardless of the table.
    /// When hopping is active DIO1 is remapped to FhssChangeChannel so
    /// [`service`](Self::service) can reprogram the synthesizer at each
    /// hop boundary.
    pub fn set_hop_table(&mut self, frequencies_in_hz: &[u32], hop_period: u8) -> Result<(), RadioError> {
        if frequencies_in_hz.len() > MAX_HOP_CHANNELS {
            return Err(RadioError::HopTableExceeded(frequencies_in_hz.len()));
        }
        self.hop_table[..frequencies_in_hz.len()].copy_from_slice(frequencies_in_hz);
        self.hop_channels = frequencies_in_hz.len();
        self.hop_period = hop_period;
        self.write_register(Register::RegHopPeriod, hop_period)?;

        if self.hopping_active() {
            let (reg, val) = self.shadow.set_dio1_mapping(Dio1Mapping::FhssChangeChannel);
            self.write_register(reg, val)?;
        }
        Ok(())
    }

    fn hopping_active(&self) -> bool {
        self.hop_period > 0 && self.hop_channels > 0
    }

    /// The hop-table frequency for a channel index, if the index is in range.
    pub fn hop_frequency(&self, channel: u8) -> Option<u32> {
        let index = channel as usize;
        if index < self.hop_channels {
            Some(self.hop_table[index])
        } else {
            None
        }
    }

    // The boost path is mandatory on the sx1272 module; the sx1276 module
    // routes the high band through PA_BOOST and the low band through RFO.
    // Re-evaluated at every TX start since the carrier may have moved.
    fn select_pa_path(&mut self) -> Result<(), RadioError> {
        let boost = match self.variant {
            ChipVariant::Sx1272 => true,
            ChipVariant::Sx1276 => self.band.is_high(),
            ChipVariant::Unknown => return Ok(()),
        };
        if self.shadow.pa_select() != boost {
            let (reg, val) = self.shadow.set_pa_select(boost);
            self.write_register(reg, val)?;
        }
        Ok(())
    }

    /// Load a payload into the FIFO and start transmitting it.
    ///
    /// Completion is observed through [`service`](Self::service), never
    /// awaited here. Payloads beyond the length register's range (255
    /// bytes) are rejected.
    pub fn start_tx(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        if !self.lora_enabled() {
            return Ok(());
        }
        if payload.len() > 255 {
            return Err(RadioError::PayloadSizeUnexpected(payload.len()));
        }
        debug!("TX start, {} bytes", payload.len());

        self.select_pa_path()?;

        if self.shadow.dio0_mapping() != Dio0Mapping::TxDone {
            let (reg, val) = self.shadow.set_dio0_mapping(Dio0Mapping::TxDone);
            self.write_register(reg, val)?;
        }

        let tx_base = self.read_register(Register::RegFifoTxBaseAddr)?;
        self.write_register(Register::RegFifoAddrPtr, tx_base)?;
        self.intf.write_buffer(Register::RegFifo, payload)?;
        self.write_register(Register::RegPayloadLength, payload.len() as u8)?;

        if self.hopping_active() {
            self.program_frequency(self.hop_table[0])?;
        }

        self.intf.iv.enable_rf_switch_tx()?;
        self.set_opmode(OpMode::Tx)
    }

    /// Enter continuous receive.
    ///
    /// No-op unless LoRa mode is enabled. Remaps DIO0 to RxDone, rewinds
    /// the FIFO to the RX base and engages the RX antenna path before
    /// switching modes.
    pub fn start_rx(&mut self) -> Result<(), RadioError> {
        if !self.lora_enabled() {
            return Ok(());
        }

        if self.shadow.dio0_mapping() != Dio0Mapping::RxDone {
            let (reg, val) = self.shadow.set_dio0_mapping(Dio0Mapping::RxDone);
            self.write_register(reg, val)?;
        }

        let rx_base = self.read_register(Register::RegFifoRxBaseAddr)?;
        self.write_register(Register::RegFifoAddrPtr, rx_base)?;

        if self.hopping_active() {
            self.program_frequency(self.hop_table[0])?;
        }

        self.intf.iv.enable_rf_switch_rx()?;
        self.set_opmode(OpMode::Rx)
    }

    /// Poll the interrupt lines once and complete whatever finished.
    ///
    /// Intended to be called from the application loop at whatever rate
    /// the latency budget allows. At most one action is reported per
    /// call. The FHSS hop request on DIO1 is handled here as well, before
    /// the DIO0 dispatch, since a hop can interleave with a packet in
    /// flight.
    pub fn service(&mut self) -> Result<ServiceAction, RadioError> {
        if self.config.poll_valid_header && self.opmode() == Some(OpMode::Rx) {
            let flags = self.read_register(Register::RegIrqFlags)?;
            if IrqMask::ValidHeader.is_set_in(flags) {
                debug!("RX preamble/header seen");
                self.write_register(Register::RegIrqFlags, IrqMask::ValidHeader.value())?;
            }
        }

        if self.shadow.dio1_mapping() == Dio1Mapping::FhssChangeChannel && self.intf.iv.dio1_asserted()? {
            self.hop()?;
        }

        if !self.intf.iv.dio0_asserted()? {
            return Ok(ServiceAction::None);
        }

        match self.shadow.dio0_mapping() {
            Dio0Mapping::RxDone => {
                self.finish_rx()?;
                Ok(ServiceAction::PacketReady)
            }
            Dio0Mapping::TxDone => {
                self.intf.iv.enable_rf_switch_rx()?;
                self.write_register(Register::RegIrqFlags, IrqMask::TxDone.value())?;
                Ok(ServiceAction::TransmitComplete)
            }
            // DIO0 asserted for an event this driver never configures.
            // Deliberately no FIFO or flag access: the chip state is not
            // what the shadow believes it is.
            _ => Ok(ServiceAction::ProtocolError),
        }
    }

    // Mid-packet hop request: the modem has frozen the next channel index
    // in RegHopChannel and stalls until the flag is cleared.
    fn hop(&mut self) -> Result<(), RadioError> {
        let channel = self.read_register(Register::RegHopChannel)? & HOP_CHANNEL_MASK;
        trace!("hop to channel {}", channel);
        if let Some(frequency) = self.hop_frequency(channel) {
            self.program_frequency(frequency)?;
        }
        self.write_register(Register::RegIrqFlags, IrqMask::FhssChangeChannel.value())
    }

    // Drain a completed packet out of the FIFO along with its status.
    //
    // The flags are snapshotted and written back as a block. An IRQ
    // latching between the read and the write-back is lost; with the
    // packet already complete the only candidates are flags for the next
    // packet, which the chip re-raises at its own completion.
    fn finish_rx(&mut self) -> Result<(), RadioError> {
        let flags = self.read_register(Register::RegIrqFlags)?;
        if IrqMask::FhssChangeChannel.is_set_in(flags) {
            let channel = self.read_register(Register::RegHopChannel)? & HOP_CHANNEL_MASK;
            if let Some(frequency) = self.hop_frequency(channel) {
                self.program_frequency(frequency)?;
            }
        }
        self.write_register(Register::RegIrqFlags, flags)?;

        let modem_stat = self.read_register(Register::RegModemStat)?;
        let snr = self.read_register(Register::RegPktSnrValue)?;
        let rssi = self.read_register(Register::RegPktRssiValue)?;
        self.rx_status = PacketStatus {
            rssi: rssi as i16 + self.variant.rssi_offset(),
            snr: (snr as i8 as i16) / 4,
            coding_rate: modem_stat >> 5,
            crc_error: IrqMask::PayloadCrcError.is_set_in(flags),
        };

        self.rx_len = self.read_register(Register::RegRxNbBytes)?;
        let current = self.read_register(Register::RegFifoRxCurrentAddr)?;
        self.write_register(Register::RegFifoAddrPtr, current)?;
        let len = self.rx_len as usize;
        let buffer = &mut self.rx_buffer[..len];
        self.intf.read_buffer(Register::RegFifo, buffer)?;

        debug!(
            "RX done, {} bytes, rssi {} snr {}",
            self.rx_len, self.rx_status.rssi, self.rx_status.snr
        );
        Ok(())
    }
}
