//! Path/URL mapping: resolve on-disk paths to the logical URLs recorded in
//! the index, based on the root's protocol prefix triple.

use std::path::{Component, Path, PathBuf};

/// Protocol prefixes recognized in the root's first path segment, paired
/// with the URL scheme they map to. `smb`/`nfs` become `file` so the URL is
/// clickable in OS file browsers; mirror protocols keep their own scheme.
const PROTOCOL_SCHEMES: &[(&str, &str)] = &[
    ("smb", "file"),
    ("nfs", "file"),
    ("ftp", "ftp"),
    ("http", "http"),
    ("https", "https"),
];

/// A crawl target: the root directory plus the protocol prefix triple parsed
/// from its leading path segments. Immutable for the lifetime of a run.
#[derive(Clone, Debug)]
pub struct CrawlTarget {
    root: PathBuf,
    /// (scheme, server, share) when the first segment is a recognized
    /// protocol; None otherwise.
    prefix: Option<Prefix>,
}

#[derive(Clone, Debug)]
struct Prefix {
    scheme: &'static str,
    server: String,
    share: String,
    /// The on-disk path covering `<protocol>/<server>/<share>`; logical URLs
    /// are built from paths relative to this.
    base: PathBuf,
}

fn normal_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

impl CrawlTarget {
    /// Parse the protocol prefix triple out of `root` as given (not
    /// canonicalized; the operator's spelling of the root determines the
    /// URL space).
    pub fn new(root: &Path) -> Self {
        let segments = normal_segments(root);
        let prefix = segments.first().and_then(|first| {
            let scheme = PROTOCOL_SCHEMES
                .iter()
                .find(|(p, _)| first.eq_ignore_ascii_case(p))
                .map(|(_, s)| *s)?;
            let server = segments.get(1).cloned().unwrap_or_default();
            let share = segments.get(2).cloned().unwrap_or_default();
            // Rebuild the on-disk base covering the triple, preserving any
            // leading root/prefix components of the original path.
            let mut base = PathBuf::new();
            let mut taken = 0;
            for c in root.components() {
                match c {
                    Component::Normal(_) => {
                        if taken == 3 {
                            break;
                        }
                        taken += 1;
                        base.push(c);
                    }
                    other => base.push(other),
                }
            }
            Some(Prefix {
                scheme,
                server,
                share,
                base,
            })
        });
        Self {
            root: root.to_path_buf(),
            prefix,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Server component of the prefix triple, empty when the root has no
    /// recognized protocol prefix.
    pub fn server(&self) -> &str {
        self.prefix.as_ref().map(|p| p.server.as_str()).unwrap_or("")
    }

    pub fn share(&self) -> &str {
        self.prefix.as_ref().map(|p| p.share.as_str()).unwrap_or("")
    }

    /// Logical URL for a file discovered on disk. With a recognized prefix:
    /// `<scheme>://<server>/<share>/<rest>`; otherwise the physical path
    /// itself. Stable across re-crawls of the same root.
    pub fn logical_url(&self, physical: &Path) -> String {
        match &self.prefix {
            Some(p) => {
                let rest = physical
                    .strip_prefix(&p.base)
                    .unwrap_or(physical)
                    .to_string_lossy()
                    .replace('\\', "/");
                let mut url = format!("{}://{}", p.scheme, p.server);
                if !p.share.is_empty() {
                    url.push('/');
                    url.push_str(&p.share);
                }
                if !rest.is_empty() {
                    url.push('/');
                    url.push_str(&rest);
                }
                url
            }
            None => physical.to_string_lossy().replace('\\', "/"),
        }
    }

    /// Logical URL for a file nested inside `parent_url` (archive member,
    /// extracted image, mail attachment). The parent's physical path stays
    /// the record's physical path; only the URL gains the fragment.
    pub fn nested_url(&self, parent_url: &str, nested_name: &str) -> String {
        format!("{parent_url}#{nested_name}")
    }
}

/// Filename suffix after the last dot, lowercased; empty if none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}
