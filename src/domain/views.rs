use super::enums::Priority;
use super::model::{ArchivedEntry, List, Task};

/// Short badge for a priority level
pub fn priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::None => "   ",
        Priority::Low => "!  ",
        Priority::Medium => "!! ",
        Priority::High => "!!!",
    }
}

/// Checkbox glyph for a task's done flag
fn checkbox(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

/// One line describing a list: `id  name (color)`
pub fn list_line(list: &List) -> String {
    if list.color.is_empty() {
        format!("{}  {}", list.id, list.name)
    } else {
        format!("{}  {} ({})", list.id, list.name, list.color)
    }
}

/// One line describing a task: `pos. [x] !!! text  (id)`
pub fn task_line(task: &Task) -> String {
    format!(
        "{:>3}. {} {} {}  ({})",
        task.position,
        checkbox(task.done),
        priority_badge(task.priority),
        task.text,
        task.id
    )
}

/// One line describing an archive entry
pub fn archive_line(entry: &ArchivedEntry) -> String {
    format!(
        "{}  {} {}  [{}]",
        entry.archived_at.format("%Y-%m-%d %H:%M"),
        priority_badge(entry.priority),
        entry.task_text,
        entry.origin_list
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_priority_badge() {
        assert_eq!(priority_badge(Priority::None), "   ");
        assert_eq!(priority_badge(Priority::High), "!!!");
    }

    #[test]
    fn test_list_line() {
        let now = Utc::now();
        let mut list = List {
            id: "abc".to_string(),
            name: "Inbox".to_string(),
            color: String::new(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(list_line(&list), "abc  Inbox");
        list.color = "blue".to_string();
        assert_eq!(list_line(&list), "abc  Inbox (blue)");
    }

    #[test]
    fn test_task_line() {
        let now = Utc::now();
        let task = Task {
            id: "t1".to_string(),
            list_id: "l1".to_string(),
            text: "Buy milk".to_string(),
            done: true,
            priority: Priority::Medium,
            position: 2,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(task_line(&task), "  2. [x] !!  Buy milk  (t1)");
    }

    #[test]
    fn test_archive_line() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 5, 0).unwrap();
        let entry = ArchivedEntry {
            id: "a1".to_string(),
            task_text: "Ship it".to_string(),
            origin_list_id: "l1".to_string(),
            origin_list: "Work".to_string(),
            priority: Priority::None,
            done_at: at,
            archived_at: at,
        };
        assert_eq!(archive_line(&entry), "2026-03-01 09:05      Ship it  [Work]");
    }
}
