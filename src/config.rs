use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the data directory, both local and under the home directory
pub const DATA_DIR_NAME: &str = ".tasklists";

/// State file name inside the data directory
pub const STATE_FILE_NAME: &str = "state.json";

/// Resolve the state file: an explicit path wins, then a local `.tasklists`
/// directory, then the global `~/.tasklists`
pub fn state_file(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    Ok(get_data_dir()?.join(STATE_FILE_NAME))
}

/// Get the data directory - checks for a local .tasklists first, then falls back to ~/.tasklists
pub fn get_data_dir() -> Result<PathBuf> {
    let current_dir = std::env::current_dir().context("Could not determine current directory")?;
    if let Some(local_dir) = find_local_data_dir(&current_dir) {
        return Ok(local_dir);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(DATA_DIR_NAME))
}

/// Find a local .tasklists directory by walking up the directory tree
pub fn find_local_data_dir(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Create a local .tasklists directory inside `dir`
pub fn init_local_data_dir(dir: &Path) -> Result<PathBuf> {
    let data_dir = dir.join(DATA_DIR_NAME);
    if data_dir.exists() {
        anyhow::bail!("Data directory already exists: {}", data_dir.display());
    }

    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create directory: {}", data_dir.display()))?;
    Ok(data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_file_wins() {
        let path = PathBuf::from("/tmp/elsewhere/custom.json");
        assert_eq!(state_file(Some(path.clone())).unwrap(), path);
    }

    #[test]
    fn test_get_data_dir() {
        let dir = get_data_dir().unwrap();
        assert!(dir.to_string_lossy().contains(DATA_DIR_NAME));
    }

    #[test]
    fn test_find_local_data_dir_walks_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let nested = root.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_local_data_dir(&nested), None);

        let data_dir = init_local_data_dir(root).unwrap();
        assert_eq!(find_local_data_dir(&nested), Some(data_dir));
    }

    #[test]
    fn test_init_fails_when_present() {
        let temp_dir = tempfile::tempdir().unwrap();
        init_local_data_dir(temp_dir.path()).unwrap();

        let err = init_local_data_dir(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_local_file_is_ignored() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(DATA_DIR_NAME), "not a dir").unwrap();
        assert_eq!(find_local_data_dir(temp_dir.path()), None);
    }
}
