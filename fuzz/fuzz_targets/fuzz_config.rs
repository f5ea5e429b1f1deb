//! Fuzz target for config.json parsing and validation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use scrub_config::{validate_config, ProjscrubConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<ProjscrubConfig>(data) {
        let _ = validate_config(&config);
    }
});
