//! Directory listing: request path normalization, reading, classification
//! and ordering.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ListError, Result};
use crate::natural::sort_key;

/// A child as reported by the filesystem, before filtering and formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChild {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// Read access to directory contents.
pub trait DirectoryReader: Send + Sync {
    fn read_children(&self, dir: &Path) -> io::Result<Vec<RawChild>>;
}

/// Reads the local filesystem. Symlinks are followed, so a link to a
/// directory lists as a directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl DirectoryReader for LocalFs {
    fn read_children(&self, dir: &Path) -> io::Result<Vec<RawChild>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = match entry.file_name().into_string() {
                Ok(n) => n,
                Err(raw) => {
                    warn!(
                        "Skipping entry with non-UTF8 filename {:?} in {}",
                        raw,
                        dir.display()
                    );
                    continue;
                }
            };
            // Dangling symlinks fall back to the link's own metadata.
            let metadata = match fs::metadata(entry.path()) {
                Ok(m) => m,
                Err(_) => entry.metadata()?,
            };
            children.push(RawChild {
                name,
                is_dir: metadata.is_dir(),
                size: metadata.len(),
            });
        }
        Ok(children)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    /// Bracketed size such as `[1.50KB]`; empty for directories.
    pub size_label: String,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Result of listing one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// The normalized request path the entries belong to.
    pub path: String,
    pub entries: Vec<Entry>,
}

/// Normalizes a raw request path.
///
/// Empty input becomes `/` and a trailing `/` is always present. A single
/// trailing `..` hop is folded away together with the segment before it
/// (`/a/b/..` becomes `/a/`). Only one hop is stripped per call: browse links
/// are built by appending `..` to an already normalized path, so one hop is
/// all a well-formed request carries.
pub fn normalize_path(raw: &str) -> String {
    let mut path = if raw.is_empty() {
        String::from("/")
    } else {
        raw.to_string()
    };
    if !path.ends_with('/') {
        path.push('/');
    }

    let segments: Vec<&str> = path.split('/').collect();
    let n = segments.len();
    if n > 2 && segments[n - 2] == ".." {
        let mut folded = segments[..n - 3].join("/");
        folded.push('/');
        return folded;
    }
    path
}

/// Joins a normalized request path onto `root`.
pub fn resolve(root: &Path, normalized: &str) -> Result<PathBuf> {
    if normalized.split('/').any(|segment| segment == "..") {
        return Err(ListError::Escape {
            path: normalized.to_string(),
        });
    }
    Ok(root.join(normalized.trim_start_matches('/')))
}

/// Formats a byte count the way listings show it: `[512B]`, `[1.50KB]`,
/// `[1.50MB]`, `[1.00G]`.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1 << 10;
    const MB: u64 = 1 << 20;
    const GB: u64 = 1 << 30;

    let b = bytes as f64;
    if bytes >= GB {
        format!("[{:.2}G]", b / GB as f64)
    } else if bytes >= MB {
        format!("[{:.2}MB]", b / MB as f64)
    } else if bytes >= KB {
        format!("[{:.2}KB]", b / KB as f64)
    } else {
        format!("[{}B]", bytes)
    }
}

/// Lists the non-hidden children of `root` + `requested`, directories first,
/// each group in natural order.
pub fn list_directory<R>(reader: &R, root: &Path, requested: &str) -> Result<Listing>
where
    R: DirectoryReader + ?Sized,
{
    let path = normalize_path(requested);
    let dir = resolve(root, &path)?;

    let children = reader
        .read_children(&dir)
        .map_err(|source| ListError::Filesystem {
            path: dir.clone(),
            source,
        })?;

    let mut entries: Vec<Entry> = children
        .into_iter()
        .filter(|child| !child.name.starts_with('.'))
        .map(|child| {
            if child.is_dir {
                Entry {
                    name: child.name,
                    kind: EntryKind::Directory,
                    size_label: String::new(),
                }
            } else {
                Entry {
                    size_label: format_size(child.size),
                    name: child.name,
                    kind: EntryKind::File,
                }
            }
        })
        .collect();

    entries.sort_by_cached_key(|e| (e.kind, sort_key(&e.name), e.name.clone()));

    debug!("Listed {} entries in {}", entries.len(), dir.display());
    Ok(Listing { path, entries })
}
