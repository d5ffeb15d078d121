#![no_main]

use libfuzzer_sys::fuzz_target;
use pbf_decoder::Compression;
use pbf_types::Blob;

// Fuzz target: blob parsing and decompression.
//
// Catches bugs in:
// - raw_size values that disagree with the compressed stream
// - Corrupt zlib / lz4 / zstd payloads
// - Allocation from an attacker-controlled raw_size (capped at 1 MiB here)
fuzz_target!(|data: &[u8]| {
    let Ok(blob) = Blob::decode(data) else {
        return;
    };
    let declared = blob.raw_size;
    if let Ok((bytes, compression)) = pbf_decoder::decompress(blob, 1 << 20) {
        if compression != Compression::None {
            assert_eq!(Some(bytes.len()), declared.map(|n| n as usize));
        }
    }
});
