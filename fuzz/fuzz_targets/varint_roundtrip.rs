#![no_main]

use libfuzzer_sys::fuzz_target;
use pbf_wire::varint::{decode_varint, decode_zigzag, encode_varint, encode_zigzag, MAX_VARINT_BYTES};

// Fuzz target: varint and zigzag encode->decode roundtrip.
//
// Input format:
//   bytes 0..8: little-endian u64 value
fuzz_target!(|data: &[u8]| {
    let Some(bytes) = data.get(..8) else {
        return;
    };
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    let value = u64::from_le_bytes(raw);

    let mut buf = [0u8; MAX_VARINT_BYTES];
    let written = encode_varint(value, &mut buf);
    let (decoded, consumed) = decode_varint(&buf[..written]).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(consumed, written);

    let signed = value as i64;
    assert_eq!(decode_zigzag(encode_zigzag(signed)), signed);
});
