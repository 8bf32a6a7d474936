use crate::domain::{
    is_unset, normalize_state, ordered_task_indexes, renormalize_list, AppState, ArchivedEntry, Direction, Filter,
    Focus, List, Priority, Task,
};
use crate::error::ServiceError;
use crate::undo::UndoStack;
use chrono::Utc;
use uuid::Uuid;

type Result<T> = std::result::Result<T, ServiceError>;

/// Owns the live state and applies every list/task/archive mutation.
///
/// Each mutating call validates first, then snapshots the whole state for undo,
/// then mutates and renumbers the affected list. A failed call leaves both the
/// state and the undo stack untouched. Accessors hand out clones.
#[derive(Debug, Clone)]
pub struct Service {
    state: AppState,
    undo: UndoStack,
}

impl Service {
    pub fn new(state: AppState) -> Self {
        Self {
            state: normalize_state(state),
            undo: UndoStack::new(),
        }
    }

    /// Copy of the current state, e.g. for persisting
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn lists(&self) -> Vec<List> {
        self.state.lists.clone()
    }

    pub fn get_list(&self, id: &str) -> Result<List> {
        self.state
            .lists
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or(ServiceError::ListNotFound)
    }

    /// Tasks of one list in manual order. A blank id returns every task,
    /// sorted by list id, then position, then id.
    pub fn tasks(&self, list_id: &str) -> Vec<Task> {
        let list_id = list_id.trim();
        if list_id.is_empty() {
            let mut all = self.state.tasks.clone();
            all.sort_by(|a, b| {
                a.list_id
                    .cmp(&b.list_id)
                    .then_with(|| a.position.cmp(&b.position))
                    .then_with(|| a.id.cmp(&b.id))
            });
            return all;
        }

        ordered_task_indexes(&self.state.tasks, list_id)
            .into_iter()
            .map(|i| self.state.tasks[i].clone())
            .collect()
    }

    pub fn get_task(&self, id: &str) -> Result<Task> {
        self.state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(ServiceError::TaskNotFound)
    }

    /// All tasks passing the current filter whose text contains the query
    /// (case-insensitive)
    pub fn filtered_tasks(&self) -> Vec<Task> {
        let query = self.state.query.trim().to_lowercase();
        let filter = self.state.filter;
        self.tasks("")
            .into_iter()
            .filter(|t| filter.matches(t.done))
            .filter(|t| query.is_empty() || t.text.to_lowercase().contains(&query))
            .collect()
    }

    /// Archive entries in the order they were archived
    pub fn archived(&self) -> Vec<ArchivedEntry> {
        self.state.archived.clone()
    }

    /// Archive entries newest first, optionally limited to one list.
    ///
    /// Entries written before origin list ids were recorded are matched by list
    /// name, which is ambiguous when two lists share a name.
    pub fn archived_for_list(&self, list_id: &str) -> Result<Vec<ArchivedEntry>> {
        let list_id = list_id.trim();
        let list = if list_id.is_empty() {
            None
        } else {
            Some(self.get_list(list_id)?)
        };

        Ok(self
            .state
            .archived
            .iter()
            .rev()
            .filter(|e| match &list {
                None => true,
                Some(l) if !e.origin_list_id.is_empty() => e.origin_list_id == l.id,
                Some(l) => e.origin_list.trim() == l.name.trim(),
            })
            .cloned()
            .collect())
    }

    /// Number of snapshots available to `undo`
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn create_list(&mut self, name: &str, color: &str) -> Result<List> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidName);
        }
        let now = Utc::now();
        let list = List {
            id: new_id(),
            name: name.to_string(),
            color: color.trim().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.snapshot();
        self.state.lists.push(list.clone());
        tracing::debug!(list_id = %list.id, "created list");
        Ok(list)
    }

    pub fn update_list(&mut self, id: &str, name: &str, color: &str) -> Result<List> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidName);
        }
        let idx = self.list_index(id).ok_or(ServiceError::ListNotFound)?;

        self.snapshot();
        let list = &mut self.state.lists[idx];
        list.name = name.to_string();
        list.color = color.trim().to_string();
        list.updated_at = Utc::now();
        tracing::debug!(list_id = %id, "updated list");
        Ok(list.clone())
    }

    /// Delete a list together with all of its tasks
    pub fn delete_list(&mut self, id: &str) -> Result<()> {
        let idx = self.list_index(id).ok_or(ServiceError::ListNotFound)?;

        self.snapshot();
        self.state.lists.remove(idx);
        self.state.tasks.retain(|t| t.list_id != id);
        tracing::debug!(list_id = %id, "deleted list");
        Ok(())
    }

    /// Swap a list with its neighbour in the list order
    pub fn move_list(&mut self, id: &str, direction: Direction) -> Result<List> {
        let idx = self.list_index(id).ok_or(ServiceError::ListNotFound)?;
        let target = match step(idx, direction, self.state.lists.len()) {
            Some(target) => target,
            None if direction == Direction::Up => return Err(ServiceError::ListAlreadyAtTop),
            None => return Err(ServiceError::ListAlreadyAtBottom),
        };

        self.snapshot();
        self.state.lists.swap(idx, target);
        let now = Utc::now();
        self.state.lists[idx].updated_at = now;
        self.state.lists[target].updated_at = now;
        Ok(self.state.lists[target].clone())
    }

    /// Add a task to a list, placed just before the first done task
    pub fn create_task(&mut self, list_id: &str, text: &str) -> Result<Task> {
        let list_id = list_id.trim();
        if list_id.is_empty() {
            return Err(ServiceError::InvalidListRef);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::InvalidTask);
        }
        if !self.state.has_list(list_id) {
            return Err(ServiceError::ListNotFound);
        }

        let insert_pos = self.next_todo_insert_position(list_id);
        let now = Utc::now();
        let task = Task {
            id: new_id(),
            list_id: list_id.to_string(),
            text: text.to_string(),
            done: false,
            priority: Priority::None,
            position: insert_pos,
            created_at: now,
            updated_at: now,
        };
        let task_id = task.id.clone();

        self.snapshot();
        for t in self.state.tasks.iter_mut() {
            if t.list_id == list_id && t.position >= insert_pos {
                t.position += 1;
            }
        }
        self.state.tasks.push(task);
        renormalize_list(&mut self.state.tasks, list_id);
        tracing::debug!(task_id = %task_id, list_id = %list_id, "created task");
        self.get_task(&task_id)
    }

    pub fn update_task(&mut self, id: &str, text: &str) -> Result<Task> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::InvalidTask);
        }
        let idx = self.task_index(id).ok_or(ServiceError::TaskNotFound)?;

        self.snapshot();
        let task = &mut self.state.tasks[idx];
        task.text = text.to_string();
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        let idx = self.task_index(id).ok_or(ServiceError::TaskNotFound)?;

        self.snapshot();
        let removed = self.state.tasks.remove(idx);
        renormalize_list(&mut self.state.tasks, &removed.list_id);
        tracing::debug!(task_id = %id, "deleted task");
        Ok(())
    }

    /// Flip the done flag. A task that becomes done sinks to the bottom of its
    /// list; un-doing it leaves it where it is.
    pub fn toggle_done(&mut self, id: &str) -> Result<Task> {
        let idx = self.task_index(id).ok_or(ServiceError::TaskNotFound)?;

        self.snapshot();
        let task = &mut self.state.tasks[idx];
        task.done = !task.done;
        task.updated_at = Utc::now();

        if task.done {
            let list_id = task.list_id.clone();
            let max_pos = self
                .state
                .tasks
                .iter()
                .enumerate()
                .filter(|(i, t)| *i != idx && t.list_id == list_id)
                .map(|(_, t)| t.position)
                .max()
                .unwrap_or(0);
            self.state.tasks[idx].position = max_pos + 1;
            renormalize_list(&mut self.state.tasks, &list_id);
        }
        Ok(self.state.tasks[idx].clone())
    }

    /// Set priority from its numeric level (0-3). Setting the current value is
    /// a no-op and records no undo snapshot.
    pub fn set_task_priority(&mut self, id: &str, level: i64) -> Result<Task> {
        let priority = Priority::from_level(level).ok_or(ServiceError::InvalidPriority(level))?;
        let idx = self.task_index(id).ok_or(ServiceError::TaskNotFound)?;

        if self.state.tasks[idx].priority == priority {
            return Ok(self.state.tasks[idx].clone());
        }

        self.snapshot();
        let task = &mut self.state.tasks[idx];
        task.priority = priority;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    /// Swap a task with its neighbour in its list's manual order
    pub fn move_task(&mut self, id: &str, direction: Direction) -> Result<Task> {
        let idx = self.task_index(id).ok_or(ServiceError::TaskNotFound)?;
        let list_id = self.state.tasks[idx].list_id.clone();
        let ordered = ordered_task_indexes(&self.state.tasks, &list_id);
        let current = ordered
            .iter()
            .position(|&i| i == idx)
            .ok_or(ServiceError::TaskNotFound)?;
        let target = match step(current, direction, ordered.len()) {
            Some(target) => target,
            None if direction == Direction::Up => return Err(ServiceError::TaskAlreadyAtTop),
            None => return Err(ServiceError::TaskAlreadyAtBottom),
        };

        self.snapshot();
        let (a, b) = (ordered[current], ordered[target]);
        let pos_a = self.state.tasks[a].position;
        self.state.tasks[a].position = self.state.tasks[b].position;
        self.state.tasks[b].position = pos_a;
        let now = Utc::now();
        self.state.tasks[a].updated_at = now;
        self.state.tasks[b].updated_at = now;
        renormalize_list(&mut self.state.tasks, &list_id);
        Ok(self.state.tasks[a].clone())
    }

    /// Move every done task of a list into the archive
    pub fn clear_completed_to_archive(&mut self, list_id: &str) -> Result<usize> {
        let list = self.require_list(list_id)?;
        self.archive_where(&list, |t| t.done, ServiceError::NoCompletedToClear)
    }

    /// Move every task of a list into the archive, done or not
    pub fn archive_all_to_archive(&mut self, list_id: &str) -> Result<usize> {
        let list = self.require_list(list_id)?;
        self.archive_where(&list, |_| true, ServiceError::NoTasksInList)
    }

    /// Remove every task of a list without archiving
    pub fn delete_all_tasks(&mut self, list_id: &str) -> Result<usize> {
        let list = self.require_list(list_id)?;
        let removed = self.state.tasks.iter().filter(|t| t.list_id == list.id).count();
        if removed == 0 {
            return Err(ServiceError::NoTasksInList);
        }

        self.snapshot();
        self.state.tasks.retain(|t| t.list_id != list.id);
        renormalize_list(&mut self.state.tasks, &list.id);
        tracing::debug!(list_id = %list.id, removed, "deleted all tasks");
        Ok(removed)
    }

    pub fn set_filter(&mut self, filter: &str) -> Result<Filter> {
        let filter: Filter = filter.parse().map_err(ServiceError::InvalidFilter)?;
        self.state.filter = filter;
        Ok(filter)
    }

    pub fn set_query(&mut self, query: &str) {
        self.state.query = query.trim().to_string();
    }

    /// Remember the active list and focused pane. An empty focus keeps the
    /// current one; an unknown list id is silently cleared.
    pub fn set_session_context(&mut self, active_list_id: &str, focus: &str) -> Result<()> {
        let focus = focus.trim();
        let focus: Option<Focus> = if focus.is_empty() {
            None
        } else {
            Some(focus.parse().map_err(ServiceError::InvalidSessionFocus)?)
        };

        let session = &mut self.state.metadata.session;
        if let Some(focus) = focus {
            session.focus = focus;
        }
        session.active_list_id = if self.state.lists.iter().any(|l| l.id == active_list_id) {
            active_list_id.to_string()
        } else {
            String::new()
        };
        Ok(())
    }

    pub fn mark_onboarding_seen(&mut self) {
        self.state.metadata.first_run = false;
    }

    /// Restore the state from before the most recent mutation
    pub fn undo(&mut self) -> Result<()> {
        let previous = self.undo.pop().ok_or(ServiceError::NothingToUndo)?;
        self.state = previous;
        tracing::debug!(remaining = self.undo.len(), "undid last change");
        Ok(())
    }

    fn snapshot(&mut self) {
        self.undo.push(self.state.clone());
    }

    fn list_index(&self, id: &str) -> Option<usize> {
        self.state.lists.iter().position(|l| l.id == id)
    }

    fn task_index(&self, id: &str) -> Option<usize> {
        self.state.tasks.iter().position(|t| t.id == id)
    }

    fn require_list(&self, list_id: &str) -> Result<List> {
        let list_id = list_id.trim();
        if list_id.is_empty() {
            return Err(ServiceError::InvalidListRef);
        }
        self.get_list(list_id)
    }

    /// Position for a new open task: the first done task's slot, or the end
    fn next_todo_insert_position(&self, list_id: &str) -> u32 {
        let mut first_done: Option<u32> = None;
        let mut max_pos = 0;
        for t in self.state.tasks.iter().filter(|t| t.list_id == list_id) {
            max_pos = max_pos.max(t.position);
            if t.done && t.position > 0 {
                first_done = Some(first_done.map_or(t.position, |p| p.min(t.position)));
            }
        }
        first_done.unwrap_or(max_pos + 1)
    }

    fn archive_where(&mut self, list: &List, pick: impl Fn(&Task) -> bool, none_err: ServiceError) -> Result<usize> {
        let now = Utc::now();
        let entries: Vec<ArchivedEntry> = self
            .state
            .tasks
            .iter()
            .filter(|t| t.list_id == list.id && pick(t))
            .map(|t| ArchivedEntry {
                id: new_id(),
                task_text: t.text.clone(),
                origin_list_id: list.id.clone(),
                origin_list: list.name.clone(),
                priority: t.priority,
                done_at: if t.done && !is_unset(&t.updated_at) {
                    t.updated_at
                } else {
                    now
                },
                archived_at: now,
            })
            .collect();
        if entries.is_empty() {
            return Err(none_err);
        }

        self.snapshot();
        self.state.tasks.retain(|t| !(t.list_id == list.id && pick(t)));
        renormalize_list(&mut self.state.tasks, &list.id);
        let count = entries.len();
        self.state.archived.extend(entries);
        tracing::debug!(list_id = %list.id, count, "archived tasks");
        Ok(count)
    }
}

/// Neighbour index one step in `direction`, if it is inside `0..len`
fn step(idx: usize, direction: Direction, len: usize) -> Option<usize> {
    let target = idx.checked_add_signed(direction.delta())?;
    (target < len).then_some(target)
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}
