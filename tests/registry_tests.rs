//! Extractor registry tests: pattern families, declared-order tie-breaks,
//! and the unknown fallback.

use sharecrawl::engine::registry::{Expansion, TimeoutClass, class_for_mime, entry_for_mime};
use sharecrawl::types::DocClass;

#[test]
fn test_archive_pattern_family() {
    for mime in [
        "application/zip",
        "application/x-rar-compressed",
        "application/x-tar",
        "application/gzip",
        "application/x-7z-compressed",
        "application/x-msi",
        "application/java-archive",
        "application/vnd.ms-cab-compressed",
    ] {
        assert_eq!(class_for_mime(mime), DocClass::Archive, "{mime}");
    }
}

#[test]
fn test_office_families_beat_the_zip_and_ole_catchalls() {
    assert_eq!(class_for_mime("application/msword"), DocClass::Word);
    assert_eq!(
        class_for_mime(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        ),
        DocClass::Word
    );
    assert_eq!(class_for_mime("application/vnd.ms-excel"), DocClass::Excel);
    assert_eq!(
        class_for_mime("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        DocClass::Excel
    );
    assert_eq!(
        class_for_mime("application/vnd.openxmlformats-officedocument.presentationml.presentation"),
        DocClass::Powerpoint
    );
    assert_eq!(class_for_mime("application/vnd.visio"), DocClass::Visio);
    assert_eq!(
        class_for_mime("application/vnd.oasis.opendocument.text"),
        DocClass::Visio
    );
}

#[test]
fn test_html_matches_before_generic_text() {
    assert_eq!(class_for_mime("text/html"), DocClass::Html);
    assert_eq!(class_for_mime("application/xhtml+xml"), DocClass::Html);
    assert_eq!(class_for_mime("text/plain"), DocClass::Text);
    assert_eq!(class_for_mime("text/csv"), DocClass::Text);
}

#[test]
fn test_bare_ole_storage_is_thumbsdb() {
    // Real office OLE files carry msword/ms-excel in their MIME; a bare
    // compound-document probe is the thumbnail store.
    assert_eq!(class_for_mime("application/CDFV2"), DocClass::Thumbsdb);
    assert_eq!(class_for_mime("application/x-ole-storage"), DocClass::Thumbsdb);
}

#[test]
fn test_media_and_binary_families() {
    assert_eq!(class_for_mime("image/png"), DocClass::Image);
    assert_eq!(class_for_mime("audio/mpeg"), DocClass::Audio);
    assert_eq!(class_for_mime("video/mp4"), DocClass::Video);
    assert_eq!(class_for_mime("application/x-dosexec"), DocClass::Executable);
    assert_eq!(class_for_mime("application/x-pie-executable"), DocClass::Executable);
    assert_eq!(class_for_mime("application/pdf"), DocClass::Pdf);
    assert_eq!(class_for_mime("message/rfc822"), DocClass::Message);
    assert_eq!(class_for_mime("application/vnd.ms-outlook"), DocClass::Message);
    assert_eq!(class_for_mime("application/vnd.sqlite3"), DocClass::Sqlite);
    assert_eq!(class_for_mime("application/vnd.tcpdump.pcap"), DocClass::Pcap);
    assert_eq!(class_for_mime("application/x-rpm"), DocClass::Package);
    assert_eq!(class_for_mime("application/vnd.debian.binary-package"), DocClass::Package);
    assert_eq!(class_for_mime("application/octet-stream"), DocClass::Raw);
}

#[test]
fn test_unmatched_mime_is_unknown() {
    assert_eq!(class_for_mime("application/x-never-heard-of-it"), DocClass::Unknown);
    assert_eq!(class_for_mime(""), DocClass::Unknown);
}

#[test]
fn test_matching_is_case_insensitive() {
    assert_eq!(class_for_mime("Application/PDF"), DocClass::Pdf);
    assert_eq!(class_for_mime("IMAGE/JPEG"), DocClass::Image);
}

#[test]
fn test_timeout_categories_and_expansion_flags() {
    let image = entry_for_mime("image/png").unwrap();
    assert_eq!(image.timeout, TimeoutClass::Image);
    assert_eq!(image.expansion, Expansion::Never);

    let audio = entry_for_mime("audio/flac").unwrap();
    assert_eq!(audio.timeout, TimeoutClass::Audio);

    let archive = entry_for_mime("application/zip").unwrap();
    assert_eq!(archive.expansion, Expansion::Always);

    let pdf = entry_for_mime("application/pdf").unwrap();
    assert_eq!(pdf.expansion, Expansion::WhenSparse);
}
