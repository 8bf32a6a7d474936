use super::model::{AppState, Task};
use std::collections::BTreeMap;

/// Indexes into `tasks` for one list, in manual display order.
///
/// Sorted by position, then id as a tie-break for duplicate positions.
pub fn ordered_task_indexes(tasks: &[Task], list_id: &str) -> Vec<usize> {
    let mut indexes: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.list_id == list_id)
        .map(|(i, _)| i)
        .collect();
    indexes.sort_by(|&a, &b| {
        let (a, b) = (&tasks[a], &tasks[b]);
        a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id))
    });
    indexes
}

/// Reassign positions 1..N for one list in its current display order
pub fn renormalize_list(tasks: &mut [Task], list_id: &str) {
    for (order, idx) in ordered_task_indexes(tasks, list_id).into_iter().enumerate() {
        tasks[idx].position = order as u32 + 1;
    }
}

/// One-time cleanup of a loaded or freshly built state.
///
/// Applies defaults, drops a stale active-list reference and renumbers every
/// list. Existing positions are honored; tasks without one (or tied) keep
/// their stored order, after the positioned ones.
pub fn normalize_state(mut state: AppState) -> AppState {
    state.apply_defaults();

    let mut grouped: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, task) in state.tasks.iter().enumerate() {
        grouped.entry(task.list_id.clone()).or_default().push(i);
    }

    for indexes in grouped.values_mut() {
        let tasks = &state.tasks;
        // Stable sort keeps array order for ties and unpositioned tasks
        indexes.sort_by_key(|&i| {
            let pos = tasks[i].position;
            (pos == 0, pos)
        });
        for (order, &idx) in indexes.iter().enumerate() {
            state.tasks[idx].position = order as u32 + 1;
        }
    }

    let active = &state.metadata.session.active_list_id;
    if !active.is_empty() && !state.has_list(active) {
        state.metadata.session.active_list_id.clear();
    }

    state
}
