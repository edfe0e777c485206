#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Malformed assets become plan errors; parsing must never panic
        let _ = toml::from_str::<assetplan::Config>(content);
    }
});
