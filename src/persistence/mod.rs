pub mod backup;
pub mod error;
pub mod files;
pub mod store;

pub use backup::{latest_backup_path, rotating_backup_path, rotating_backups, MAX_ROTATING_BACKUPS};
pub use error::StoreError;
pub use files::atomic_write;
pub use store::{autosave, decode_state, encode_state, load, load_with_recovery, save};
