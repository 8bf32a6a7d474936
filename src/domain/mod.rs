pub mod enums;
pub mod model;
pub mod normalize;
pub mod views;

pub use enums::{Direction, Filter, Focus, Priority};
pub use model::{is_unset, AppState, ArchivedEntry, List, Metadata, SessionContext, Task, SCHEMA_VERSION};
pub use normalize::{normalize_state, ordered_task_indexes, renormalize_list};
pub use views::{archive_line, list_line, priority_badge, task_line};
