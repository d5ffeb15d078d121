#![no_main]

use libfuzzer_sys::fuzz_target;
use pbf_decoder::{BlockDecoder, DecoderConfig};
use pbf_types::osmformat::PrimitiveBlock;
use pbf_types::Entity;

// Fuzz target: primitive block decoding into entities.
//
// Catches bugs in:
// - Delta accumulators overflowing
// - Dense columns of mismatched lengths
// - Tag cursors and string indices out of range
//
// When a block decodes, sink mode and collected mode must agree.
fuzz_target!(|data: &[u8]| {
    let Ok(block) = PrimitiveBlock::decode(data) else {
        return;
    };
    let config = DecoderConfig::default();
    let decoder = BlockDecoder::new(&block, &config);
    let collected = decoder.decode();

    let mut pushed: Vec<Entity> = Vec::new();
    let streamed = decoder.decode_into(&mut pushed);

    match (collected, streamed) {
        (Ok(entities), Ok(counts)) => {
            assert_eq!(entities.len(), counts.total());
            assert_eq!(entities.len(), pushed.len());
        }
        (Err(_), Err(_)) => {}
        _ => panic!("sink and collected modes disagree"),
    }

    let _ = BlockDecoder::new(&block, &config.clone().with_metadata(false)).decode();
});
