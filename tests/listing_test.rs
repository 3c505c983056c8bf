use std::fs;
use std::io;

use anyhow::Result;
use dirserve::{list_directory, EntryKind, ListError, LocalFs};
use tempfile::tempdir;

fn names(entries: &[dirserve::Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.name.as_str()).collect()
}

#[test]
fn lists_real_directory_in_natural_order() -> Result<()> {
    let root = tempdir()?;
    let base = root.path();

    fs::create_dir(base.join("season10"))?;
    fs::create_dir(base.join("season2"))?;
    fs::create_dir(base.join(".cache"))?;
    fs::write(base.join("ep10.mkv"), vec![0u8; 1536])?;
    fs::write(base.join("ep9.mkv"), b"abc")?;
    fs::write(base.join("ep.mkv"), b"")?;
    fs::write(base.join("ep0.mkv"), b"")?;
    fs::write(base.join(".hidden"), b"secret")?;

    let listing = list_directory(&LocalFs, base, "/")?;

    assert_eq!(
        names(&listing.entries),
        ["season2", "season10", "ep.mkv", "ep0.mkv", "ep9.mkv", "ep10.mkv"]
    );
    assert_eq!(listing.entries[0].kind, EntryKind::Directory);
    assert_eq!(listing.entries[0].size_label, "");
    assert_eq!(listing.entries[4].size_label, "[3B]");
    assert_eq!(listing.entries[5].size_label, "[1.50KB]");
    Ok(())
}

#[test]
fn listing_is_idempotent() -> Result<()> {
    let root = tempdir()?;
    fs::create_dir_all(root.path().join("a/b"))?;
    fs::write(root.path().join("a/file2"), b"x")?;
    fs::write(root.path().join("a/file11"), b"x")?;

    let first = list_directory(&LocalFs, root.path(), "/a")?;
    let second = list_directory(&LocalFs, root.path(), "/a/")?;
    assert_eq!(first, second);
    assert_eq!(names(&first.entries), ["b", "file2", "file11"]);
    Ok(())
}

#[test]
fn parent_hop_returns_to_parent() -> Result<()> {
    let root = tempdir()?;
    fs::create_dir_all(root.path().join("a/b"))?;

    let listing = list_directory(&LocalFs, root.path(), "/a/b/..")?;
    assert_eq!(listing.path, "/a/");
    assert_eq!(names(&listing.entries), ["b"]);
    Ok(())
}

#[test]
fn missing_directory_is_a_filesystem_error() -> Result<()> {
    let root = tempdir()?;
    let err = list_directory(&LocalFs, root.path(), "/nope/").unwrap_err();
    assert!(matches!(err, ListError::Filesystem { .. }));
    assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
    Ok(())
}

#[test]
fn file_path_is_a_filesystem_error() -> Result<()> {
    let root = tempdir()?;
    fs::write(root.path().join("plain.txt"), b"x")?;
    let err = list_directory(&LocalFs, root.path(), "/plain.txt").unwrap_err();
    assert!(matches!(err, ListError::Filesystem { .. }));
    Ok(())
}

#[test]
fn leftover_parent_segment_never_touches_disk() -> Result<()> {
    let root = tempdir()?;
    fs::create_dir(root.path().join("a"))?;
    let err = list_directory(&LocalFs, root.path(), "a/../../x/").unwrap_err();
    assert!(matches!(err, ListError::Escape { .. }));
    Ok(())
}

#[cfg(unix)]
#[test]
fn symlinked_directory_lists_as_directory() -> Result<()> {
    let root = tempdir()?;
    fs::create_dir(root.path().join("real"))?;
    std::os::unix::fs::symlink(root.path().join("real"), root.path().join("link"))?;
    std::os::unix::fs::symlink(root.path().join("gone"), root.path().join("dangling"))?;

    let listing = list_directory(&LocalFs, root.path(), "")?;
    let kinds: Vec<_> = listing.entries.iter().map(|e| (e.name.as_str(), e.kind)).collect();
    assert_eq!(
        kinds,
        [
            ("link", EntryKind::Directory),
            ("real", EntryKind::Directory),
            ("dangling", EntryKind::File),
        ]
    );
    Ok(())
}
