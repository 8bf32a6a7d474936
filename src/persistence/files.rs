use super::error::{io_err, StoreError};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::Builder;

/// Ensure the directory holding `path` exists
pub fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir).map_err(io_err(dir)),
        _ => Ok(()),
    }
}

/// Atomically write content to a file using temp file + rename.
///
/// The temp file lives in the same directory as the target so the rename
/// never crosses filesystems. Until the final rename the target is untouched.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let prefix = format!(
        "{}.tmp-",
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );

    let mut temp_file = Builder::new()
        .prefix(&prefix)
        .tempfile_in(dir)
        .map_err(io_err(dir))?;

    temp_file.write_all(content).map_err(io_err(temp_file.path()))?;
    temp_file.flush().map_err(io_err(temp_file.path()))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(io_err(temp_file.path()))?;

    // Dropping a failed persist removes the temp file.
    temp_file
        .persist(path)
        .map_err(|e| io_err(path)(e.error))?;

    Ok(())
}

/// Plain (non-atomic) full write
pub fn write_file(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    fs::write(path, content).map_err(io_err(path))
}

/// Read file content, returning `None` if the file doesn't exist
pub fn read_file(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path)(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.json");

        atomic_write(&test_file, b"Hello, world!").unwrap();

        let read_content = read_file(&test_file).unwrap().unwrap();
        assert_eq!(read_content, b"Hello, world!");
    }

    #[test]
    fn test_atomic_write_replaces_and_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.json");

        atomic_write(&test_file, b"first").unwrap();
        atomic_write(&test_file, b"second").unwrap();

        assert_eq!(read_file(&test_file).unwrap().unwrap(), b"second");
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_read_nonexistent_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("nonexistent.json");

        assert!(read_file(&test_file).unwrap().is_none());
    }

    #[test]
    fn test_ensure_parent_dir_creates_nested() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("a").join("b").join("state.json");

        ensure_parent_dir(&test_file).unwrap();
        assert!(temp_dir.path().join("a").join("b").is_dir());
    }
}
