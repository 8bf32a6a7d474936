/// Coarse classification of service failures, for rendering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A list or task id did not resolve
    NotFound,
    /// Empty required text or out-of-range enum value
    Validation,
    /// Already at the top or bottom of a manual order
    OrderingBoundary,
    /// Nothing to undo, archive or delete
    EmptyOperation,
}

impl ErrorKind {
    /// Normal negative outcomes a caller may silently ignore
    pub fn is_benign(&self) -> bool {
        matches!(self, ErrorKind::OrderingBoundary | ErrorKind::EmptyOperation)
    }
}

/// Errors returned by the mutation service. State is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("list not found")]
    ListNotFound,
    #[error("task not found")]
    TaskNotFound,
    #[error("name must not be empty")]
    InvalidName,
    #[error("task text must not be empty")]
    InvalidTask,
    #[error("list id must not be empty")]
    InvalidListRef,
    #[error("invalid filter: {0:?}")]
    InvalidFilter(String),
    #[error("invalid priority: {0}")]
    InvalidPriority(i64),
    #[error("invalid session focus: {0:?}")]
    InvalidSessionFocus(String),
    #[error("task is already at top")]
    TaskAlreadyAtTop,
    #[error("task is already at bottom")]
    TaskAlreadyAtBottom,
    #[error("list is already at top")]
    ListAlreadyAtTop,
    #[error("list is already at bottom")]
    ListAlreadyAtBottom,
    #[error("no completed tasks to clear")]
    NoCompletedToClear,
    #[error("no tasks in list")]
    NoTasksInList,
    #[error("nothing to undo")]
    NothingToUndo,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::ListNotFound | ServiceError::TaskNotFound => ErrorKind::NotFound,
            ServiceError::InvalidName
            | ServiceError::InvalidTask
            | ServiceError::InvalidListRef
            | ServiceError::InvalidFilter(_)
            | ServiceError::InvalidPriority(_)
            | ServiceError::InvalidSessionFocus(_) => ErrorKind::Validation,
            ServiceError::TaskAlreadyAtTop
            | ServiceError::TaskAlreadyAtBottom
            | ServiceError::ListAlreadyAtTop
            | ServiceError::ListAlreadyAtBottom => ErrorKind::OrderingBoundary,
            ServiceError::NoCompletedToClear
            | ServiceError::NoTasksInList
            | ServiceError::NothingToUndo => ErrorKind::EmptyOperation,
        }
    }
}
