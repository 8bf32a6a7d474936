use super::error::{io_err, StoreError};
use super::files::{read_file, write_file};
use chrono::{DateTime, Duration, Utc};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Number of timestamped backups kept next to the state file
pub const MAX_ROTATING_BACKUPS: usize = 10;

const ROTATING_STAMP: &str = "%Y%m%d-%H%M%S%.9f";
const CORRUPT_STAMP: &str = "%Y%m%d-%H%M%S";

/// Path of the "latest" backup: `<path>.bak`
pub fn latest_backup_path(path: &Path) -> PathBuf {
    with_suffix(path, ".bak")
}

/// Path of a rotating backup taken at `at`: `<path>.bak.<timestamp>`
pub fn rotating_backup_path(path: &Path, at: DateTime<Utc>) -> PathBuf {
    with_suffix(path, &format!(".bak.{}", at.format(ROTATING_STAMP)))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Copy the current state file (if any) to the latest backup and a fresh
/// rotating backup, then prune old rotating backups.
pub fn backup_current(path: &Path) -> Result<(), StoreError> {
    let Some(data) = read_file(path)? else {
        return Ok(());
    };

    write_file(&latest_backup_path(path), &data)?;

    // Names must stay unique and increasing even on coarse clocks.
    let mut at = Utc::now();
    let mut rotating = rotating_backup_path(path, at);
    while rotating.exists() {
        at = at + Duration::nanoseconds(1);
        rotating = rotating_backup_path(path, at);
    }
    write_file(&rotating, &data)?;
    tracing::debug!(backup = %rotating.display(), "wrote rotating backup");

    prune_rotating_backups(path)
}

/// All rotating backups for `path`, sorted oldest first
pub fn rotating_backups(path: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let dir = parent_dir(path);
    let Some(file_name) = path.file_name() else {
        return Ok(Vec::new());
    };
    let prefix = format!("{}.bak.", file_name.to_string_lossy());

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_err(dir)(e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(io_err(dir))?;
        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with(&prefix) {
                files.push(entry.path());
            }
        }
    }

    // Timestamps sort lexically in chronological order
    files.sort();
    Ok(files)
}

/// Delete rotating backups beyond the newest `MAX_ROTATING_BACKUPS`
pub fn prune_rotating_backups(path: &Path) -> Result<(), StoreError> {
    let files = rotating_backups(path)?;
    if files.len() <= MAX_ROTATING_BACKUPS {
        return Ok(());
    }

    let excess = files.len() - MAX_ROTATING_BACKUPS;
    for old in &files[..excess] {
        match fs::remove_file(old) {
            Ok(()) => tracing::debug!(backup = %old.display(), "pruned rotating backup"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(old)(e)),
        }
    }
    Ok(())
}

/// Backup files that could restore `path`, newest modification time first
pub fn backup_candidates(path: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let latest = latest_backup_path(path);
    let mut paths = Vec::new();
    if latest.exists() {
        paths.push(latest);
    }
    paths.extend(rotating_backups(path)?);

    // Unreadable mtimes sort as oldest; names break ties
    let mut candidates: Vec<(SystemTime, PathBuf)> = paths
        .into_iter()
        .map(|p| {
            let modified = fs::metadata(&p)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, p)
        })
        .collect();
    candidates.sort_by(|a, b| b.cmp(a));

    Ok(candidates.into_iter().map(|(_, p)| p).collect())
}

/// Move a corrupt state file aside as `<stem>.corrupt-<timestamp><.ext>`.
///
/// Returns `None` if the file has already vanished.
pub fn quarantine_corrupt(path: &Path) -> Result<Option<PathBuf>, StoreError> {
    match fs::metadata(path) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(path)(e)),
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let stamp = Utc::now().format(CORRUPT_STAMP);
    let target = parent_dir(path).join(format!("{}.corrupt-{}{}", stem, stamp, ext));

    fs::rename(path, &target).map_err(io_err(path))?;
    Ok(Some(target))
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_backup_paths() {
        let path = Path::new("/tmp/data/state.json");
        assert_eq!(latest_backup_path(path), PathBuf::from("/tmp/data/state.json.bak"));

        let at = Utc.with_ymd_and_hms(2026, 2, 19, 12, 30, 5).unwrap() + Duration::nanoseconds(42);
        assert_eq!(
            rotating_backup_path(path, at),
            PathBuf::from("/tmp/data/state.json.bak.20260219-123005.000000042")
        );
    }

    #[test]
    fn test_rotating_names_sort_chronologically() {
        let path = Path::new("state.json");
        let earlier = Utc.with_ymd_and_hms(2026, 2, 19, 9, 59, 59).unwrap();
        let later = earlier + Duration::nanoseconds(1);
        let much_later = Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).unwrap();

        let a = rotating_backup_path(path, earlier);
        let b = rotating_backup_path(path, later);
        let c = rotating_backup_path(path, much_later);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_backup_current_without_file_is_noop() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state.json");

        backup_current(&path).unwrap();
        assert!(!latest_backup_path(&path).exists());
        assert!(rotating_backups(&path).unwrap().is_empty());
    }

    #[test]
    fn test_backup_current_copies_verbatim() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state.json");
        fs::write(&path, "{\"lists\": []}").unwrap();

        backup_current(&path).unwrap();

        assert_eq!(fs::read_to_string(latest_backup_path(&path)).unwrap(), "{\"lists\": []}");
        let rotating = rotating_backups(&path).unwrap();
        assert_eq!(rotating.len(), 1);
        assert_eq!(fs::read_to_string(&rotating[0]).unwrap(), "{\"lists\": []}");
    }

    #[test]
    fn test_prune_keeps_newest() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state.json");
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        for i in 0..13 {
            fs::write(rotating_backup_path(&path, base + Duration::seconds(i)), "{}").unwrap();
        }

        prune_rotating_backups(&path).unwrap();

        let remaining = rotating_backups(&path).unwrap();
        assert_eq!(remaining.len(), MAX_ROTATING_BACKUPS);
        assert_eq!(remaining[0], rotating_backup_path(&path, base + Duration::seconds(3)));
        assert_eq!(
            remaining.last().unwrap(),
            &rotating_backup_path(&path, base + Duration::seconds(12))
        );
    }

    #[test]
    fn test_rotating_backups_ignores_other_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state.json");
        fs::write(temp_dir.path().join("state.json.bak"), "{}").unwrap();
        fs::write(temp_dir.path().join("other.json.bak.20260101-000000.000000000"), "{}").unwrap();
        fs::write(temp_dir.path().join("state.json.bak.20260101-000000.000000000"), "{}").unwrap();

        let found = rotating_backups(&path).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_quarantine_corrupt() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state.json");
        fs::write(&path, "{bad").unwrap();

        let moved = quarantine_corrupt(&path).unwrap().unwrap();
        assert!(!path.exists());
        let name = moved.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("state.corrupt-"));
        assert!(name.ends_with(".json"));
        assert_eq!(fs::read_to_string(&moved).unwrap(), "{bad");

        assert!(quarantine_corrupt(&path).unwrap().is_none());
    }

    #[test]
    fn test_backup_candidates_newest_first_with_name_tie_break() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("state.json");
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let older = rotating_backup_path(&path, base);
        let newer = rotating_backup_path(&path, base + Duration::seconds(1));
        let latest = latest_backup_path(&path);
        for p in [&older, &newer, &latest] {
            fs::write(p, "{}").unwrap();
        }
        let stamp = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        for p in [&older, &newer, &latest] {
            fs::File::options().write(true).open(p).unwrap().set_modified(stamp).unwrap();
        }
        let fresher = stamp + std::time::Duration::from_secs(60);
        fs::File::options().write(true).open(&older).unwrap().set_modified(fresher).unwrap();

        let candidates = backup_candidates(&path).unwrap();
        // Equal mtimes fall back to descending names
        assert_eq!(candidates, vec![older, newer, latest]);
    }
}
