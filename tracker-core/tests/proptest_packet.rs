//! Arbitrary-input round-tripping of the short packet codec, in the style
//! of `ublox`'s `fuzz_*.rs` integration tests: generate a GPS fix across
//! its whole valid domain and check every recoverable field survives the
//! frame's quantisation.

use proptest::prelude::*;
use tracker_core::gps::{FixType, GpsLogEntry};
use tracker_core::packet::{build_short_packet, decode_short_packet, FrameFlags};

fn arb_fix_type() -> impl Strategy<Value = FixType> {
    prop_oneof![
        Just(FixType::NoFix),
        Just(FixType::Fix2D),
        Just(FixType::Fix3D),
    ]
}

prop_compose! {
    fn arb_fix()(
        longitude in -180.0f64..180.0,
        latitude in -90.0f64..90.0,
        height_msl_mm in 0i32..254_000,
        ground_speed_mm_s in 0u32..50_000,
        fix_type in arb_fix_type(),
        battery_voltage_mv in 2_700u32..4_200,
        heading_deg in 0.0f64..360.0,
        tx_counter in 0u32..=0xFF,
    ) -> (GpsLogEntry, u32) {
        (
            GpsLogEntry {
                longitude,
                latitude,
                height_msl_mm,
                ground_speed_mm_s,
                fix_type,
                h_acc_mm: 1_000,
                hdop_scaled: 100,
                battery_voltage_mv,
                heading_deg,
                scheduled_for_unix: 1_700_000_000,
                acquired_at_unix: 1_700_000_000,
            },
            tx_counter,
        )
    }
}

proptest! {
    #[test]
    fn short_packet_round_trips_any_valid_fix((fix, tx_counter) in arb_fix()) {
        let bytes = build_short_packet(&fix, FrameFlags::empty(), tx_counter);
        let decoded = decode_short_packet(&bytes).expect("always a valid crc");

        prop_assert!((decoded.latitude_deg - fix.latitude).abs() < 1e-3);
        prop_assert!((decoded.longitude_deg - fix.longitude).abs() < 1e-3);
        prop_assert_eq!(decoded.tx_counter, tx_counter);
        match fix.fix_type {
            FixType::Fix3D => prop_assert!(decoded.altitude_m.is_some()),
            _ => prop_assert_eq!(decoded.altitude_m, None),
        }
    }

    #[test]
    fn short_packet_crc_always_validates_an_honest_frame(
        (fix, tx_counter) in arb_fix(),
        flag_bits in 0u8..8,
    ) {
        let flags = FrameFlags::from_bits_truncate(flag_bits);
        let bytes = build_short_packet(&fix, flags, tx_counter);
        prop_assert!(decode_short_packet(&bytes).is_ok());
    }
}
