#![no_main]

use libfuzzer_sys::fuzz_target;

use colstream::reader::StreamReader;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must either parse or fail with an error, never panic.
    if let Ok(reader) = StreamReader::new(data) {
        // Bound iteration so a crafted stream of tiny batches terminates.
        for batch in reader.take(64) {
            if batch.is_err() {
                break;
            }
        }
    }
});
