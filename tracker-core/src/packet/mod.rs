//! Uplink frame encoding and the transmit depth pile (spec §4.2, §4.3).

mod builder;
mod depth_pile;

pub use builder::{
    build_certification_packet, build_doppler_packet, build_long_packet, build_short_packet,
    decode_short_packet, decode_timestamp, DecodedShortPacket, DeltaTimeLocationTag, FrameFlags,
    DOPPLER_PACKET_BITS, DOPPLER_PACKET_BYTES, LONG_PACKET_BITS, LONG_PACKET_BYTES,
    SHORT_PACKET_BITS, SHORT_PACKET_BYTES,
};
pub use depth_pile::{DepthPile, BURST_COUNTER_INFINITE, DEFAULT_MAX_SIZE};
