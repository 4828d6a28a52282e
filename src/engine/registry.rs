//! Extractor registry: the single ordered table mapping MIME pattern
//! families to document classes, timeout categories, and nested-expansion
//! behavior. First match wins; order is the tie-break.

use crate::types::DocClass;

/// Timeout category an adapter runs under. The engine resolves the category
/// to configured seconds; adapters never see the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeoutClass {
    Default,
    Image,
    Audio,
}

/// When an adapter's scratch output re-enters the engine as nested files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expansion {
    /// Adapter never produces a scratch directory.
    Never,
    /// Scratch contents always re-enter (archives, mail, containers).
    /// Fan-out is unbounded.
    Always,
    /// Media fallback: scratch is only populated when primary text came in
    /// under the sparse-text threshold, and fan-out is capped by the
    /// configured `ocr-max-images`.
    WhenSparse,
}

/// One registry row.
pub struct RegistryEntry {
    pub class: DocClass,
    /// Normalized substrings matched against the lowercased MIME string.
    pub patterns: &'static [&'static str],
    pub timeout: TimeoutClass,
    pub expansion: Expansion,
}

/// Declared matching order. More specific families come before the broad
/// `text/`, `image/`, and `octet-stream` catch-alls; OLE-era office comes
/// before the generic compound-document pattern that Thumbs.db relies on.
pub const REGISTRY: &[RegistryEntry] = &[
    RegistryEntry {
        class: DocClass::Html,
        patterns: &["html", "xhtml"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Never,
    },
    RegistryEntry {
        class: DocClass::Word,
        patterns: &["msword", "wordprocessingml", "word"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::WhenSparse,
    },
    RegistryEntry {
        class: DocClass::Excel,
        patterns: &["ms-excel", "spreadsheetml", "excel"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::WhenSparse,
    },
    RegistryEntry {
        class: DocClass::Powerpoint,
        patterns: &["ms-powerpoint", "presentationml", "powerpoint"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::WhenSparse,
    },
    RegistryEntry {
        class: DocClass::Visio,
        patterns: &["visio", "opendocument"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::WhenSparse,
    },
    RegistryEntry {
        class: DocClass::Pdf,
        patterns: &["pdf"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::WhenSparse,
    },
    RegistryEntry {
        class: DocClass::Lnk,
        patterns: &["ms-shortcut", "shellink"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Never,
    },
    RegistryEntry {
        class: DocClass::Winevent,
        patterns: &["evtx", "ms-evtx"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Never,
    },
    RegistryEntry {
        class: DocClass::Message,
        patterns: &["message/", "rfc822", "ms-outlook", "vnd.ms-outlook"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Always,
    },
    RegistryEntry {
        class: DocClass::Sqlite,
        patterns: &["sqlite"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Never,
    },
    RegistryEntry {
        class: DocClass::Pcap,
        patterns: &["pcap", "tcpdump"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Never,
    },
    RegistryEntry {
        class: DocClass::Bytecode,
        patterns: &["python-bytecode", "x-bytecode"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Never,
    },
    RegistryEntry {
        class: DocClass::Package,
        patterns: &["rpm", "debian"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Always,
    },
    RegistryEntry {
        class: DocClass::Archive,
        patterns: &[
            "zip",
            "rar",
            "tar",
            "gzip",
            "compressed",
            "msi",
            "java-archive",
            "x-archive",
            "7z",
            "cab",
        ],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Always,
    },
    // Thumbs.db probes as a bare OLE compound document; real office OLE
    // files matched msword/ms-excel above.
    RegistryEntry {
        class: DocClass::Thumbsdb,
        patterns: &["cdfv2", "x-ole-storage"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Always,
    },
    RegistryEntry {
        class: DocClass::Executable,
        patterns: &[
            "executable",
            "x-dosexec",
            "x-elf",
            "x-pie-executable",
            "x-sharedlib",
            "x-mach",
        ],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Never,
    },
    RegistryEntry {
        class: DocClass::Image,
        patterns: &["image/"],
        timeout: TimeoutClass::Image,
        expansion: Expansion::Never,
    },
    RegistryEntry {
        class: DocClass::Audio,
        patterns: &["audio/"],
        timeout: TimeoutClass::Audio,
        expansion: Expansion::Never,
    },
    RegistryEntry {
        class: DocClass::Video,
        patterns: &["video/"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Always,
    },
    RegistryEntry {
        class: DocClass::Text,
        patterns: &["text/"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Never,
    },
    RegistryEntry {
        class: DocClass::Raw,
        patterns: &["octet-stream"],
        timeout: TimeoutClass::Default,
        expansion: Expansion::Never,
    },
];

/// Resolve a MIME string to a registry entry. None means class `unknown`.
pub fn entry_for_mime(mime: &str) -> Option<&'static RegistryEntry> {
    let mime = mime.to_ascii_lowercase();
    REGISTRY
        .iter()
        .find(|entry| entry.patterns.iter().any(|p| mime.contains(p)))
}

/// Class tag for a MIME string, falling back to `unknown`.
pub fn class_for_mime(mime: &str) -> DocClass {
    entry_for_mime(mime).map(|e| e.class).unwrap_or(DocClass::Unknown)
}

/// Registry metadata for a class (used for nested files whose class is
/// known but whose MIME string is gone). Falls back to default timeout, no
/// expansion.
pub fn entry_for_class(class: DocClass) -> Option<&'static RegistryEntry> {
    REGISTRY.iter().find(|entry| entry.class == class)
}
