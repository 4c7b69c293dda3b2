//! Filesystem helpers used while staging inputs.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

/// Sums the size in bytes of every regular file beneath `path`. Symbolic links
/// are not followed. A missing path has a size of zero.
pub fn dir_bytes(path: &Path) -> io::Result<u64> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err),
    };

    if metadata.is_file() {
        return Ok(metadata.len());
    }

    if !metadata.is_dir() {
        return Ok(0);
    }

    let mut total = 0;
    for entry in fs::read_dir(path)? {
        total += dir_bytes(&entry?.path())?;
    }

    Ok(total)
}

/// Whether `path` is a directory with no entries. A missing directory counts
/// as empty.
pub fn is_empty_dir(path: &Path) -> io::Result<bool> {
    match fs::read_dir(path) {
        Ok(mut entries) => Ok(entries.next().is_none()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(err) => Err(err),
    }
}

/// Sorted entries of a directory.
fn sorted_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

/// Finds the shallowest directory beneath `root` (including `root` itself)
/// whose file name is exactly `name`. Ties at the same depth are broken by
/// path order so the result is deterministic.
pub fn find_dir_named(root: &Path, name: &str) -> io::Result<Option<PathBuf>> {
    if !root.is_dir() {
        return Ok(None);
    }

    let mut queue = VecDeque::from([root.to_path_buf()]);
    while let Some(dir) = queue.pop_front() {
        if dir.file_name().map_or(false, |n| n == name) {
            return Ok(Some(dir));
        }

        for entry in sorted_entries(&dir)? {
            let is_real_dir = fs::symlink_metadata(&entry)?.is_dir();
            if is_real_dir {
                queue.push_back(entry);
            }
        }
    }

    Ok(None)
}

/// Lists every regular file beneath `root` whose extension is `ext`, sorted by
/// path.
pub fn files_with_extension(root: &Path, ext: &str) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in sorted_entries(&dir)? {
            let metadata = fs::symlink_metadata(&entry)?;
            if metadata.is_dir() {
                pending.push(entry);
            } else if entry.extension().map_or(false, |e| e == ext) {
                found.push(entry);
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Whether `path` lies beneath `root`. Both paths are canonicalized when they
/// exist so that symlinked scratch directories compare correctly.
pub fn is_within(path: &Path, root: &Path) -> bool {
    let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    path.starts_with(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_bytes_sums_nested_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.pod5"), vec![0u8; 10]).unwrap();
        fs::create_dir_all(tmp.path().join("nested/deeper")).unwrap();
        fs::write(tmp.path().join("nested/deeper/b.pod5"), vec![0u8; 32]).unwrap();

        assert_eq!(dir_bytes(tmp.path()).unwrap(), 42);
        assert_eq!(dir_bytes(&tmp.path().join("missing")).unwrap(), 0);
    }

    #[test]
    fn test_is_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(is_empty_dir(tmp.path()).unwrap());
        assert!(is_empty_dir(&tmp.path().join("missing")).unwrap());

        fs::write(tmp.path().join("x"), b"x").unwrap();
        assert!(!is_empty_dir(tmp.path()).unwrap());
    }

    #[test]
    fn test_find_dir_named_prefers_shallowest() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("b/deep/fast5")).unwrap();
        fs::create_dir_all(tmp.path().join("a/fast5")).unwrap();

        let found = find_dir_named(tmp.path(), "fast5").unwrap();
        assert_eq!(found, Some(tmp.path().join("a/fast5")));
        assert_eq!(find_dir_named(tmp.path(), "pod5").unwrap(), None);
    }

    #[test]
    fn test_files_with_extension() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("b.fast5"), b"").unwrap();
        fs::write(tmp.path().join("sub/a.fast5"), b"").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"").unwrap();

        let found = files_with_extension(tmp.path(), "fast5").unwrap();
        assert_eq!(
            found,
            vec![tmp.path().join("b.fast5"), tmp.path().join("sub/a.fast5")]
        );
    }

    #[test]
    fn test_is_within() {
        let tmp = tempfile::tempdir().unwrap();
        let inside = tmp.path().join("sample/run");
        fs::create_dir_all(&inside).unwrap();

        assert!(is_within(&inside, tmp.path()));
        assert!(!is_within(Path::new("/data/runA"), tmp.path()));
    }
}
