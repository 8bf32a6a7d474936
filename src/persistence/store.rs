use super::backup::{backup_candidates, backup_current, quarantine_corrupt};
use super::error::StoreError;
use super::files::{atomic_write, ensure_parent_dir, read_file, write_file};
use crate::domain::AppState;
use std::fs;
use std::path::Path;

/// Load state from a JSON file.
///
/// A missing file is not an error: it yields a fresh empty state.
pub fn load(path: &Path) -> Result<AppState, StoreError> {
    match read_file(path)? {
        Some(data) => decode_state(path, &data),
        None => Ok(AppState::new()),
    }
}

/// Write state as indented JSON (not atomic; for initial/non-interactive writes)
pub fn save(path: &Path, state: &AppState) -> Result<(), StoreError> {
    ensure_parent_dir(path)?;
    write_file(path, &encode_state(state)?)
}

/// Crash-safe write used after every interactive mutation.
///
/// Backs up the current file first, then replaces it via temp file + rename.
/// A crash before the rename leaves the previous file intact.
pub fn autosave(path: &Path, state: &AppState) -> Result<(), StoreError> {
    ensure_parent_dir(path)?;
    backup_current(path)?;
    atomic_write(path, &encode_state(state)?)?;
    tracing::debug!(path = %path.display(), "autosaved state");
    Ok(())
}

/// Load state, recovering from the newest valid backup if the file is corrupt.
///
/// Returns the state plus an optional status message describing any recovery.
/// Non-corruption failures (and I/O faults during recovery) are returned as errors.
pub fn load_with_recovery(path: &Path) -> Result<(AppState, Option<String>), StoreError> {
    let err = match load(path) {
        Ok(state) => return Ok((state, None)),
        Err(err) if err.is_corruption() => err,
        Err(err) => return Err(err),
    };
    tracing::warn!(path = %path.display(), error = %err, "state file is corrupt, attempting recovery");

    let corrupt_path = quarantine_corrupt(path)?;
    let moved_note = corrupt_path
        .as_deref()
        .map(|p| format!(" (bad file moved to {})", file_name(p)))
        .unwrap_or_default();

    for candidate in backup_candidates(path)? {
        let data = match fs::read(&candidate) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(backup = %candidate.display(), error = %e, "skipping unreadable backup");
                continue;
            }
        };
        let state = match decode_state(&candidate, &data) {
            Ok(state) => state,
            Err(e) => {
                tracing::debug!(backup = %candidate.display(), error = %e, "skipping invalid backup");
                continue;
            }
        };

        save(path, &state)?;
        tracing::info!(backup = %candidate.display(), "recovered state from backup");
        let msg = format!(
            "Recovered corrupted state from {}{}",
            file_name(&candidate),
            moved_note
        );
        return Ok((state, Some(msg)));
    }

    let empty = AppState::new();
    save(path, &empty)?;
    tracing::info!(path = %path.display(), "no valid backup found, started with empty state");
    let msg = format!(
        "Corrupted state had no valid backup; started with an empty state{}",
        moved_note
    );
    Ok((empty, Some(msg)))
}

/// Decode file content into a state, applying defaults for missing fields
pub fn decode_state(path: &Path, data: &[u8]) -> Result<AppState, StoreError> {
    let mut state: AppState = serde_json::from_slice(data).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    state.apply_defaults();
    Ok(state)
}

/// Encode a state as two-space indented JSON with a trailing newline
pub fn encode_state(state: &AppState) -> Result<Vec<u8>, StoreError> {
    let mut data = serde_json::to_vec_pretty(state).map_err(StoreError::Encode)?;
    data.push(b'\n');
    Ok(data)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
