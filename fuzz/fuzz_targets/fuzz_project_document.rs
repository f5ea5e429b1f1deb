//! Fuzz target for project document parsing.
//!
//! Project files are read from arbitrary directories, so parsing must
//! reject malformed input without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use scrub_common::ProjectDocument;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(doc) = ProjectDocument::from_json(text) {
            let _ = doc.bookmark_count();
            let _ = doc.to_json();
        }
    }
});
