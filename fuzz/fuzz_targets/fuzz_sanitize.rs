//! Fuzz target for the sanitizer.
//!
//! Builds a project from arbitrary metadata and checks that no denylisted
//! key survives a default sanitize pass and Analysis ends up empty.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scrub_common::{
    BookmarkRecord, JsonProject, Namespace, Project, ProjectDocument, TracingMonitor,
};
use scrub_redact::{sanitize, SanitizePolicy};

#[derive(Arbitrary, Debug)]
struct Input {
    executable_path: String,
    executable_format: String,
    program_info: Vec<(String, String)>,
    user_properties: Vec<(String, String)>,
    analysis: Vec<(String, bool)>,
    bookmarks: Vec<(String, u64)>,
}

fuzz_target!(|input: Input| {
    let mut doc = ProjectDocument::default();
    doc.executable_path = input.executable_path;
    doc.executable_format = input.executable_format;
    for (key, value) in input.program_info {
        doc.set_option(Namespace::ProgramInformation, key, value.into());
    }
    for (key, value) in input.user_properties {
        doc.set_option(Namespace::UserProperties, key, value.into());
    }
    for (key, value) in input.analysis {
        doc.set_option(Namespace::Analysis, key, value.into());
    }
    for (category, id) in input.bookmarks {
        doc.add_bookmark(
            category,
            BookmarkRecord {
                id,
                address: "0x0".to_string(),
                comment: String::new(),
            },
        );
    }

    let mut project = JsonProject::with_document("fuzz.json", doc);
    sanitize(&mut project, Some(&TracingMonitor));

    let policy = SanitizePolicy::default();
    let doc = project.document();
    assert!(project.executable_path().is_empty());
    assert!(project.executable_format().is_empty());
    for key in policy.program_info_denylist() {
        assert!(doc.option(Namespace::ProgramInformation, key).is_none());
    }
    for key in policy.user_property_denylist() {
        assert!(doc.option(Namespace::UserProperties, key).is_none());
    }
    assert!(doc.namespace(Namespace::Analysis).map_or(true, |o| o.is_empty()));
    assert_eq!(doc.bookmark_count(), 0);
});
