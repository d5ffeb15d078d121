#![no_main]

use libfuzzer_sys::fuzz_target;
use pbf_decoder::{DecoderConfig, PbfReader};

// Fuzz target: full stream read.
//
// Catches bugs in:
// - Length prefixes pointing past the end of input
// - Blob headers with absurd data_size values
// - Readers that fail to terminate after an error
fuzz_target!(|data: &[u8]| {
    let config = DecoderConfig::default()
        .with_max_header_size(1 << 12)
        .with_max_blob_size(1 << 20);
    let reader = PbfReader::new(data, config);
    let mut frames = 0usize;
    for _block in reader {
        frames += 1;
        assert!(frames <= data.len());
    }
});
