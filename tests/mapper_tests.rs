//! Path/URL mapper tests: protocol prefix triples and nested fragments.

use std::path::Path;

use sharecrawl::mapper::{CrawlTarget, extension_of};

#[test]
fn test_smb_prefix_maps_to_file_scheme() {
    let target = CrawlTarget::new(Path::new("smb/fs01/share"));
    assert_eq!(target.server(), "fs01");
    assert_eq!(target.share(), "share");
    assert_eq!(
        target.logical_url(Path::new("smb/fs01/share/Finance/Q1.docx")),
        "file://fs01/share/Finance/Q1.docx"
    );
}

#[test]
fn test_nfs_prefix_also_maps_to_file_scheme() {
    let target = CrawlTarget::new(Path::new("nfs/nas2/exports"));
    assert_eq!(
        target.logical_url(Path::new("nfs/nas2/exports/home/readme.txt")),
        "file://nas2/exports/home/readme.txt"
    );
}

#[test]
fn test_http_prefix_keeps_its_scheme() {
    let target = CrawlTarget::new(Path::new("https/intranet.corp/wiki"));
    assert_eq!(target.server(), "intranet.corp");
    assert_eq!(target.share(), "wiki");
    assert_eq!(
        target.logical_url(Path::new("https/intranet.corp/wiki/page.html")),
        "https://intranet.corp/wiki/page.html"
    );
}

#[test]
fn test_unrecognized_prefix_falls_back_to_raw_path() {
    let target = CrawlTarget::new(Path::new("local/data"));
    // Unrecognized prefix: raw-path URL, no invented server/share.
    assert_eq!(target.server(), "");
    assert_eq!(target.share(), "");
    assert_eq!(
        target.logical_url(Path::new("local/data/notes.txt")),
        "local/data/notes.txt"
    );
}

#[test]
fn test_absolute_mount_point_with_prefix() {
    let target = CrawlTarget::new(Path::new("/mnt/smb/fs01/share"));
    // The triple is parsed from the first *recognized* leading segment; an
    // absolute mount prefix before it means no protocol parse.
    assert_eq!(target.server(), "");
}

#[test]
fn test_nested_url_appends_fragment() {
    let target = CrawlTarget::new(Path::new("smb/fs01/share"));
    let parent = target.logical_url(Path::new("smb/fs01/share/bundle.zip"));
    assert_eq!(
        target.nested_url(&parent, "report.pdf"),
        "file://fs01/share/bundle.zip#report.pdf"
    );
    // Nesting composes: deeper levels keep appending fragments.
    let deeper = target.nested_url(&target.nested_url(&parent, "inner.zip"), "doc.docx");
    assert_eq!(deeper, "file://fs01/share/bundle.zip#inner.zip#doc.docx");
}

#[test]
fn test_extension_extraction() {
    assert_eq!(extension_of(Path::new("a/b/Q1.DOCX")), "docx");
    assert_eq!(extension_of(Path::new("a/b/noext")), "");
    assert_eq!(extension_of(Path::new("a/b/archive.tar.gz")), "gz");
}
