#![no_main]

use libfuzzer_sys::fuzz_target;
use pbf_wire::FieldReader;

// Fuzz target: protobuf field walking.
//
// Walks every field of an arbitrary message and tries each accessor.
// Catches bugs in:
// - Length-delimited fields running past the buffer
// - Unknown or reserved wire types
// - Packed arrays with a truncated final varint
fuzz_target!(|data: &[u8]| {
    let mut reader = FieldReader::new(data);
    while let Ok(Some(field)) = reader.next_field() {
        let _ = field.as_u64();
        let _ = field.as_sint();
        let _ = field.as_bool();
        let _ = field.as_bytes();
        let _ = field.packed_u64();
        let _ = field.packed_sint();
        assert!(reader.position() <= data.len());
    }
});
