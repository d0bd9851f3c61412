
use self::fixtures::*;
use crate::mod_params::*;
use crate::{synth, ChipVariant, Config, OpMode, Sx127x};

fn sx1276() -> (Sx127x<SimSpi, SimPins>, Board) {
    let (mut radio, board) = board(true, Config::default());
    radio.init(&mut SimDelay).unwrap();
    (radio, board)
}

fn sx1272() -> (Sx127x<SimSpi, SimPins>, Board) {
    let (mut radio, board) = board(false, Config::default());
    radio.init(&mut SimDelay).unwrap();
    (radio, board)
}

fn lora_sx1276() -> (Sx127x<SimSpi, SimPins>, Board) {
    let (mut radio, board) = sx1276();
    radio.enable_lora().unwrap();
    (radio, board)
}

fn lora_sx1272() -> (Sx127x<SimSpi, SimPins>, Board) {
    let (mut radio, board) = sx1272();
    radio.enable_lora().unwrap();
    (radio, board)
}

fn frf_regs(board: &Board) -> u32 {
    let chip = board.chip.borrow();
    ((chip.regs[0x06] as u32) << 16) | ((chip.regs[0x07] as u32) << 8) | chip.regs[0x08] as u32
}

#[test]
fn detects_sx1276_when_probe_bit_persists() {
    let (radio, _board) = sx1276();
    assert_eq!(radio.variant(), ChipVariant::Sx1276);
}

#[test]
fn detects_sx1276_without_probing_when_bit_already_set() {
    let (mut radio, board) = board(true, Config::default());
    board.chip.borrow_mut().regs[0x01] = 0x08;
    radio.init(&mut SimDelay).unwrap();
    assert_eq!(radio.variant(), ChipVariant::Sx1276);
    // no probe write was needed
    assert!(board.chip.borrow().writes_to(0x01).is_empty());
}

#[test]
fn detects_sx1272_when_probe_bit_is_ignored() {
    let (radio, board) = sx1272();
    assert_eq!(radio.variant(), ChipVariant::Sx1272);
    // the boost path is preselected for this module at init
    assert_eq!(board.chip.borrow().regs[0x09] & 0x80, 0x80);
}

#[test]
fn enable_lora_sleeps_before_touching_long_range_mode() {
    let (mut radio, board) = sx1272();
    board.chip.borrow_mut().writes.clear();

    radio.enable_lora().unwrap();
    assert!(radio.lora_enabled());
    assert_eq!(radio.opmode(), Some(OpMode::Standby));

    // sleep, then LongRangeMode while asleep, then standby
    let op_mode_writes = board.chip.borrow().writes_to(0x01);
    assert_eq!(op_mode_writes, [0x00, 0x80, 0x81]);
}

#[test]
fn modem_setters_are_inert_until_lora_is_enabled() {
    let (mut radio, board) = sx1276();
    radio.set_bandwidth(Bandwidth::_125KHz).unwrap();
    radio.set_spreading_factor(SpreadingFactor::_12).unwrap();
    radio.set_coding_rate(CodingRate::_4_8).unwrap();
    radio.start_rx().unwrap();

    let chip = board.chip.borrow();
    assert!(chip.writes_to(0x1d).is_empty());
    assert!(chip.writes_to(0x1e).is_empty());
    assert!(chip.writes_to(0x31).is_empty());
    assert_eq!(board.rf_switch.get(), RfSwitch::Off);
    assert_eq!(radio.opmode(), Some(OpMode::Sleep));
}

#[test]
fn sx1272_rejects_narrow_bandwidths() {
    let (mut radio, _board) = lora_sx1272();
    assert_eq!(radio.set_bandwidth(Bandwidth::_62KHz), Err(RadioError::UnavailableBandwidth));
    assert_eq!(radio.set_bandwidth(Bandwidth::_7KHz), Err(RadioError::UnavailableBandwidth));
    radio.set_bandwidth(Bandwidth::_500KHz).unwrap();
    assert_eq!(radio.bandwidth(), Some(Bandwidth::_500KHz));
}

#[test]
fn ldro_follows_symbol_period_on_sx1276() {
    let (mut radio, board) = lora_sx1276();
    radio.set_bandwidth(Bandwidth::_125KHz).unwrap();

    radio.set_spreading_factor(SpreadingFactor::_12).unwrap();
    assert!(radio.low_data_rate_optimize());
    assert_eq!(board.chip.borrow().regs[0x26] & 0x08, 0x08);

    radio.set_spreading_factor(SpreadingFactor::_10).unwrap();
    assert!(!radio.low_data_rate_optimize());
    assert_eq!(board.chip.borrow().regs[0x26] & 0x08, 0x00);

    // 16.384 ms symbol period, just over the threshold
    radio.set_spreading_factor(SpreadingFactor::_11).unwrap();
    assert!(radio.low_data_rate_optimize());
}

#[test]
fn ldro_lands_in_modem_config1_on_sx1272() {
    let (mut radio, board) = lora_sx1272();
    radio.set_bandwidth(Bandwidth::_125KHz).unwrap();
    radio.set_spreading_factor(SpreadingFactor::_12).unwrap();
    assert!(radio.low_data_rate_optimize());
    assert_eq!(board.chip.borrow().regs[0x1d] & 0x01, 0x01);

    radio.set_bandwidth(Bandwidth::_500KHz).unwrap();
    assert!(!radio.low_data_rate_optimize());
    assert_eq!(board.chip.borrow().regs[0x1d] & 0x01, 0x00);
}

#[test]
fn spreading_factor_retunes_detection_registers() {
    let (mut radio, board) = lora_sx1276();

    radio.set_spreading_factor(SpreadingFactor::_6).unwrap();
    {
        let chip = board.chip.borrow();
        assert_eq!(chip.regs[0x31] & 0x07, 3);
        assert_eq!(chip.regs[0x37], 0x0c);
        assert_eq!(chip.regs[0x1e] >> 4, 6);
    }

    radio.set_spreading_factor(SpreadingFactor::_7).unwrap();
    {
        let chip = board.chip.borrow();
        assert_eq!(chip.regs[0x31] & 0x07, 4);
        assert_eq!(chip.regs[0x37], 0x0a);
    }

    radio.set_spreading_factor(SpreadingFactor::_9).unwrap();
    {
        let chip = board.chip.borrow();
        assert_eq!(chip.regs[0x31] & 0x07, 5);
        assert_eq!(chip.regs[0x37], 0x0a);
    }
}

#[test]
fn frequency_round_trips_and_classifies_band() {
    let (mut radio, _board) = sx1276();
    radio.set_frequency(868_000_000).unwrap();
    assert!(radio.frequency_band().is_high());
    let back = radio.frequency().unwrap();
    assert!(868_000_000 - back < 62);

    radio.set_frequency(434_000_000).unwrap();
    assert_eq!(radio.frequency_band(), synth::FrequencyBand::Low);
}

#[test]
fn start_tx_loads_fifo_and_selects_boost_in_high_band() {
    let (mut radio, board) = lora_sx1276();
    radio.set_frequency(868_000_000).unwrap();
    board.chip.borrow_mut().regs[0x0e] = 0x80;

    radio.start_tx(b"hello").unwrap();

    let chip = board.chip.borrow();
    assert_eq!(chip.regs[0x09] & 0x80, 0x80);
    assert_eq!(chip.regs[0x40] >> 6, 0b01); // DIO0 = TxDone
    assert_eq!(chip.regs[0x0d], 0x80); // FIFO pointer at TX base
    assert_eq!(chip.fifo_written, b"hello".to_vec());
    assert_eq!(chip.regs[0x22], 5);
    assert_eq!(board.rf_switch.get(), RfSwitch::Tx);
    assert_eq!(radio.opmode(), Some(OpMode::Tx));
}

#[test]
fn sx1276_uses_rfo_pin_below_the_mid_band() {
    let (mut radio, board) = lora_sx1276();
    radio.set_frequency(434_000_000).unwrap();
    radio.start_tx(b"x").unwrap();
    assert_eq!(board.chip.borrow().regs[0x09] & 0x80, 0x00);
}

#[test]
fn sx1272_always_transmits_through_boost() {
    let (mut radio, board) = lora_sx1272();
    radio.set_frequency(434_000_000).unwrap();
    radio.start_tx(b"x").unwrap();
    assert_eq!(board.chip.borrow().regs[0x09] & 0x80, 0x80);
}

#[test]
fn start_tx_rejects_oversized_payloads() {
    let (mut radio, _board) = lora_sx1276();
    let payload = [0u8; 256];
    assert_eq!(radio.start_tx(&payload), Err(RadioError::PayloadSizeUnexpected(256)));
}

#[test]
fn transmit_completion_reported_exactly_once() {
    let (mut radio, board) = lora_sx1276();
    radio.set_frequency(868_000_000).unwrap();
    radio.start_tx(b"ping").unwrap();
    assert_eq!(radio.service().unwrap(), ServiceAction::None);

    board.chip.borrow_mut().regs[0x12] |= 0x08; // TxDone latches
    assert_eq!(radio.service().unwrap(), ServiceAction::TransmitComplete);
    assert_eq!(board.rf_switch.get(), RfSwitch::Rx);
    assert_eq!(board.chip.borrow().regs[0x12] & 0x08, 0x00);

    assert_eq!(radio.service().unwrap(), ServiceAction::None);
    assert_eq!(board.chip.borrow().fifo_reads, 0);
}

#[test]
fn start_rx_rewinds_fifo_and_engages_rx_path() {
    let (mut radio, board) = lora_sx1276();
    board.chip.borrow_mut().regs[0x0f] = 0x10;

    radio.start_rx().unwrap();

    let chip = board.chip.borrow();
    assert_eq!(chip.regs[0x0d], 0x10);
    assert_eq!(chip.regs[0x40] >> 6, 0b00); // DIO0 = RxDone
    assert_eq!(board.rf_switch.get(), RfSwitch::Rx);
    assert_eq!(radio.opmode(), Some(OpMode::Rx));
}

#[test]
fn received_packet_is_drained_with_status() {
    let (mut radio, board) = lora_sx1276();
    radio.start_rx().unwrap();
    {
        let mut chip = board.chip.borrow_mut();
        chip.regs[0x12] |= 0x40; // RxDone
        chip.regs[0x13] = 4;
        chip.regs[0x10] = 0x25;
        chip.regs[0x18] = 0x20; // coding rate 1 in the status bits
        chip.regs[0x19] = 0xfc; // -4 quarter-dB
        chip.regs[0x1a] = 80;
        chip.fifo.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
    }

    assert_eq!(radio.service().unwrap(), ServiceAction::PacketReady);

    let (payload, status) = radio.last_rx_packet();
    assert_eq!(payload, &[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(status.rssi, 80 - 137);
    assert_eq!(status.snr, -1);
    assert_eq!(status.coding_rate, 1);
    assert!(!status.crc_error);

    let chip = board.chip.borrow();
    assert_eq!(chip.regs[0x12], 0x00);
    assert_eq!(chip.regs[0x0d], 0x25); // FIFO pointer moved to the packet
    assert_eq!(chip.fifo_reads, 4);
}

#[test]
fn crc_failures_are_reported_not_dropped() {
    let (mut radio, board) = lora_sx1272();
    radio.start_rx().unwrap();
    {
        let mut chip = board.chip.borrow_mut();
        chip.regs[0x12] |= 0x60; // RxDone + PayloadCrcError
        chip.regs[0x13] = 1;
        chip.regs[0x1a] = 80;
        chip.fifo.extend_from_slice(&[0x55]);
    }

    assert_eq!(radio.service().unwrap(), ServiceAction::PacketReady);
    let (payload, status) = radio.last_rx_packet();
    assert_eq!(payload, &[0x55]);
    assert!(status.crc_error);
    assert_eq!(status.rssi, 80 - 125);
    assert_eq!(board.chip.borrow().regs[0x12], 0x00);
}

#[test]
fn hop_request_reprograms_the_synthesizer() {
    let (mut radio, board) = lora_sx1276();
    let hops = [868_100_000, 868_300_000, 868_500_000];
    radio.set_hop_table(&hops, 5).unwrap();
    {
        let chip = board.chip.borrow();
        assert_eq!(chip.regs[0x24], 5);
        assert_eq!((chip.regs[0x40] >> 4) & 0b11, 0b01); // DIO1 = FhssChangeChannel
    }

    {
        let mut chip = board.chip.borrow_mut();
        chip.regs[0x12] |= 0x02;
        chip.regs[0x1c] = 0x41; // channel 1 with unrelated status bits set
    }
    assert_eq!(radio.service().unwrap(), ServiceAction::None);
    assert_eq!(frf_regs(&board), synth::freq_to_pll_step(868_300_000));
    assert_eq!(board.chip.borrow().regs[0x12] & 0x02, 0x00);

    // out-of-table index clears the request without touching the carrier
    {
        let mut chip = board.chip.borrow_mut();
        chip.regs[0x12] |= 0x02;
        chip.regs[0x1c] = 10;
    }
    assert_eq!(radio.service().unwrap(), ServiceAction::None);
    assert_eq!(frf_regs(&board), synth::freq_to_pll_step(868_300_000));
    assert_eq!(board.chip.borrow().regs[0x12] & 0x02, 0x00);
}

#[test]
fn rx_completion_applies_a_pending_hop() {
    let (mut radio, board) = lora_sx1276();
    let hops = [868_100_000, 868_300_000, 868_500_000];
    radio.set_hop_table(&hops, 5).unwrap();
    radio.start_rx().unwrap();
    assert_eq!(frf_regs(&board), synth::freq_to_pll_step(868_100_000));

    {
        let mut chip = board.chip.borrow_mut();
        chip.regs[0x12] |= 0x42; // RxDone with a hop latched alongside
        chip.regs[0x13] = 1;
        chip.regs[0x1c] = 2;
        chip.fifo.extend_from_slice(&[0x07]);
    }
    assert_eq!(radio.service().unwrap(), ServiceAction::PacketReady);
    assert_eq!(frf_regs(&board), synth::freq_to_pll_step(868_500_000));
    assert_eq!(board.chip.borrow().regs[0x12], 0x00);
}

#[test]
fn hop_table_larger_than_capacity_is_rejected() {
    let (mut radio, _board) = lora_sx1276();
    let hops = [868_000_000u32; 65];
    assert_eq!(radio.set_hop_table(&hops, 1), Err(RadioError::HopTableExceeded(65)));
}

#[test]
fn unrecognized_dio0_mapping_is_a_protocol_error() {
    let (mut radio, board) = board(true, Config::default());
    board.chip.borrow_mut().regs[0x40] = 0xc0;
    radio.init(&mut SimDelay).unwrap();
    {
        let mut chip = board.chip.borrow_mut();
        chip.force_dio0 = Some(true);
        chip.regs[0x12] = 0x40;
    }

    assert_eq!(radio.service().unwrap(), ServiceAction::ProtocolError);

    // no FIFO or flag access while the configuration is suspect
    let chip = board.chip.borrow();
    assert_eq!(chip.fifo_reads, 0);
    assert_eq!(chip.regs[0x12], 0x40);
}

#[test]
fn valid_header_poll_clears_only_that_flag() {
    let (mut radio, board) = board(true, Config { poll_valid_header: true });
    radio.init(&mut SimDelay).unwrap();
    radio.enable_lora().unwrap();

    // not receiving yet: the flag is left alone
    board.chip.borrow_mut().regs[0x12] = 0x10;
    assert_eq!(radio.service().unwrap(), ServiceAction::None);
    assert_eq!(board.chip.borrow().regs[0x12], 0x10);

    radio.start_rx().unwrap();
    board.chip.borrow_mut().regs[0x12] = 0x14; // ValidHeader + CadDone
    assert_eq!(radio.service().unwrap(), ServiceAction::None);
    assert_eq!(board.chip.borrow().regs[0x12], 0x04);
}

#[test]
fn live_rssi_uses_the_variant_offset() {
    let (mut radio, board) = sx1276();
    board.chip.borrow_mut().regs[0x1b] = 90;
    assert_eq!(radio.read_rssi().unwrap(), 90 - 137);

    let (mut radio, board) = sx1272();
    board.chip.borrow_mut().regs[0x1b] = 90;
    assert_eq!(radio.read_rssi().unwrap(), 90 - 125);
}
