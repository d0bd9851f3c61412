/// Errors types reported during LoRa physical layer processing
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum RadioError {
    SPI,
    Reset,
    RfSwitchRx,
    RfSwitchTx,
    Dio,
    PayloadSizeUnexpected(usize),
    UnavailableBandwidth,
    HopTableExceeded(usize),
}

/// Channel width.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Bandwidth {
    _7KHz,
    _10KHz,
    _15KHz,
    _20KHz,
    _31KHz,
    _41KHz,
    _62KHz,
    _125KHz,
    _250KHz,
    _500KHz,
}

impl From<Bandwidth> for u32 {
    fn from(value: Bandwidth) -> Self {
        match value {
            Bandwidth::_7KHz => 7810u32,
            Bandwidth::_10KHz => 10420u32,
            Bandwidth::_15KHz => 15630u32,
            Bandwidth::_20KHz => 20830u32,
            Bandwidth::_31KHz => 31250u32,
            Bandwidth::_41KHz => 41670u32,
            Bandwidth::_62KHz => 62500u32,
            Bandwidth::_125KHz => 125000u32,
            Bandwidth::_250KHz => 250000u32,
            Bandwidth::_500KHz => 500000u32,
        }
    }
}

/// Controls the chirp rate. Lower values are slower bandwidth, but more robust.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SpreadingFactor {
    _6,
    _7,
    _8,
    _9,
    _10,
    _11,
    _12,
}

impl From<SpreadingFactor> for u32 {
    fn from(sf: SpreadingFactor) -> Self {
        match sf {
            SpreadingFactor::_6 => 6,
            SpreadingFactor::_7 => 7,
            SpreadingFactor::_8 => 8,
            SpreadingFactor::_9 => 9,
            SpreadingFactor::_10 => 10,
            SpreadingFactor::_11 => 11,
            SpreadingFactor::_12 => 12,
        }
    }
}

/// Controls the forward error correction. Higher values are more robust, but reduces the ratio
/// of actual data in transmissions.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CodingRate {
    _4_5,
    _4_6,
    _4_7,
    _4_8,
}

/// Completed action reported by a single [`service`](crate::Sx127x::service) poll.
///
/// At most one action completes per poll; `None` means the poll observed
/// nothing of interest.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    /// Nothing to report.
    None,
    /// A packet has been received and drained from the FIFO.
    PacketReady,
    /// The in-flight transmission finished. The driver does not
    /// auto-transition to standby; the caller decides what runs next.
    TransmitComplete,
    /// DIO0 is asserted but its mapping register holds a value this
    /// driver does not drive. A configuration fault, not a transient
    /// failure; re-issuing `start_rx`/`start_tx` restores a known mapping.
    ProtocolError,
}

/// Status for a received packet, captured at RX completion.
///
/// Stale between completions; refreshed each time [`service`](crate::Sx127x::service)
/// returns [`ServiceAction::PacketReady`].
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketStatus {
    /// RSSI in dBm. The raw register value plus the variant offset; no
    /// SNR compensation below the noise floor is applied.
    pub rssi: i16,
    /// SNR in dB (the chip reports quarter-dB steps).
    pub snr: i16,
    /// Coding rate the modem actually used for this packet, as the raw
    /// modem-status code (1 = 4/5 .. 4 = 4/8).
    pub coding_rate: u8,
    /// Whether the payload CRC check failed. CRC handling is left to the
    /// caller; a packet with a bad CRC is still delivered.
    pub crc_error: bool,
}
