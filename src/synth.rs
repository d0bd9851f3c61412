//! Pure conversions between carrier frequency and the 24-bit PLL word,
//! plus the high/low band classification derived from the carrier.

// Frequency synthesizer step is FXOSC / 2^19 (~61.035 Hz with the 32 MHz
// reference crystal). The conversions are exact integer arithmetic so the
// round trip stays within one step for any u32 frequency.
const FXOSC_IN_HZ: u64 = 32_000_000;
const PLL_STEP_SHIFT: u32 = 19;

// Boundary between the chip's low and high frequency ports.
const RF_MID_BAND_THRESH: u32 = 525_000_000;

pub(crate) fn freq_to_pll_step(freq_in_hz: u32) -> u32 {
    (((freq_in_hz as u64) << PLL_STEP_SHIFT) / FXOSC_IN_HZ) as u32
}

pub(crate) fn pll_step_to_freq(pll_step: u32) -> u32 {
    (((pll_step as u64) * FXOSC_IN_HZ) >> PLL_STEP_SHIFT) as u32
}

/// High/low classification of the carrier frequency.
///
/// Recomputed whenever the carrier changes; drives the PA output path at
/// TX start. High means at or above 525 MHz.
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyBand {
    /// Below 525 MHz.
    Low,
    /// At or above 525 MHz.
    High,
}

impl FrequencyBand {
    pub(crate) fn of(frequency_in_hz: u32) -> Self {
        if frequency_in_hz >= RF_MID_BAND_THRESH {
            FrequencyBand::High
        } else {
            FrequencyBand::Low
        }
    }

    pub(crate) fn is_high(self) -> bool {
        self == FrequencyBand::High
    }
}
