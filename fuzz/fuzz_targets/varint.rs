#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: varint decoding.
//
// Catches bugs in:
// - Overlong encodings (more than 10 bytes)
// - Truncated continuation bytes
// - Shift overflow on the tenth byte
fuzz_target!(|data: &[u8]| {
    if let Ok((value, consumed)) = pbf_wire::varint::decode_varint(data) {
        assert!(consumed >= 1 && consumed <= data.len());
        let _ = pbf_wire::varint::decode_zigzag(value);
    }
});
