use super::enums::{Filter, Focus, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Schema version written by this build
pub const SCHEMA_VERSION: u32 = 1;

/// A named container of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: DateTime<Utc>,
}

/// A single todo item. `position` is its manual order within the owning list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub list_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub done: bool,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Priority::is_none")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "lenient_position", skip_serializing_if = "is_zero")]
    pub position: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: DateTime<Utc>,
}

/// Historic record of a task moved out of its list.
///
/// `origin_list` is a copy of the list name at archive time and survives
/// later renames or deletion of the list. Older files carry no
/// `origin_list_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_text: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub origin_list_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub origin_list: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Priority::is_none")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "null_as_default")]
    pub done_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived_at: DateTime<Utc>,
}

/// UI context restored on the next start
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub active_list_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub focus: Focus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: u32,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_false")]
    pub first_run: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session: SessionContext,
}

/// The full persisted state; also the unit of undo snapshots
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default, deserialize_with = "null_as_default")]
    pub lists: Vec<List>,
    /// Insertion order, not display order
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
    #[serde(default, deserialize_with = "null_as_default", rename = "archivedCompleted")]
    pub archived: Vec<ArchivedEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filter: Filter,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub query: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Metadata,
}

impl AppState {
    /// Fresh state for a first run
    pub fn new() -> Self {
        Self {
            metadata: Metadata {
                version: SCHEMA_VERSION,
                first_run: true,
                session: SessionContext::default(),
            },
            ..Self::default()
        }
    }

    /// Fill in defaults for fields older files leave out.
    ///
    /// Containers, filter and focus already default during decoding; only the
    /// schema version needs patching.
    pub fn apply_defaults(&mut self) {
        if self.metadata.version == 0 {
            self.metadata.version = SCHEMA_VERSION;
        }
    }

    pub fn has_list(&self, list_id: &str) -> bool {
        self.lists.iter().any(|l| l.id == list_id)
    }
}

/// True for timestamps that were never set (missing from the file or zero)
pub fn is_unset(ts: &DateTime<Utc>) -> bool {
    ts.timestamp() <= 0
}

/// Decode an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Positions below 1 (or too large to fit) mean "unpositioned"
fn lenient_position<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?.unwrap_or(0);
    Ok(u32::try_from(raw).unwrap_or(0))
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample_state() -> AppState {
        let now = Utc.with_ymd_and_hms(2026, 2, 19, 12, 30, 0).unwrap();
        AppState {
            lists: vec![List {
                id: "l1".to_string(),
                name: "Inbox".to_string(),
                color: "blue".to_string(),
                created_at: now,
                updated_at: now,
            }],
            tasks: vec![
                Task {
                    id: "t1".to_string(),
                    list_id: "l1".to_string(),
                    text: "Write report".to_string(),
                    done: false,
                    priority: Priority::High,
                    position: 1,
                    created_at: now,
                    updated_at: now,
                },
                Task {
                    id: "t2".to_string(),
                    list_id: "l1".to_string(),
                    text: "Zero fields".to_string(),
                    done: true,
                    priority: Priority::None,
                    position: 0,
                    created_at: now,
                    updated_at: now,
                },
            ],
            archived: vec![ArchivedEntry {
                id: "a1".to_string(),
                task_text: "Old".to_string(),
                origin_list_id: String::new(),
                origin_list: "Inbox".to_string(),
                priority: Priority::Low,
                done_at: now,
                archived_at: now,
            }],
            filter: Filter::Done,
            query: "report".to_string(),
            metadata: Metadata {
                version: 1,
                first_run: false,
                session: SessionContext {
                    active_list_id: "l1".to_string(),
                    focus: Focus::Tasks,
                },
            },
        }
    }

    #[test]
    fn test_new_state_defaults() {
        let state = AppState::new();
        assert!(state.lists.is_empty());
        assert!(state.tasks.is_empty());
        assert!(state.archived.is_empty());
        assert_eq!(state.filter, Filter::All);
        assert_eq!(state.metadata.version, 1);
        assert!(state.metadata.first_run);
        assert_eq!(state.metadata.session.focus, Focus::Lists);
    }

    #[test]
    fn test_serialization_round_trip() {
        let state = sample_state();
        let json = serde_json::to_string_pretty(&state).unwrap();
        let decoded: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_zero_valued_fields_are_omitted() {
        let state = sample_state();
        let value = serde_json::to_value(&state).unwrap();

        let zero_task = &value["tasks"][1];
        assert!(zero_task.get("priority").is_none());
        assert!(zero_task.get("position").is_none());
        assert_eq!(value["tasks"][0]["priority"], 3);
        assert_eq!(value["tasks"][0]["listId"], "l1");

        let entry = &value["archivedCompleted"][0];
        assert!(entry.get("originListId").is_none());
        assert_eq!(entry["originList"], "Inbox");
        assert!(value["metadata"].get("firstRun").is_none());
    }

    #[test]
    fn test_apply_defaults_sets_version() {
        let mut state: AppState = serde_json::from_str(r#"{"lists":[],"tasks":[]}"#).unwrap();
        assert_eq!(state.metadata.version, 0);
        state.apply_defaults();
        assert_eq!(state.metadata.version, 1);
        assert_eq!(state.filter, Filter::All);
        assert_eq!(state.metadata.session.focus, Focus::Lists);
    }

    #[test]
    fn test_is_unset() {
        assert!(is_unset(&DateTime::<Utc>::default()));
        let go_zero: DateTime<Utc> = serde_json::from_str("\"0001-01-01T00:00:00Z\"").unwrap();
        assert!(is_unset(&go_zero));
        assert!(!is_unset(&Utc::now()));
    }

    #[test]
    fn test_explicit_nulls_decode_as_defaults() {
        let json = r#"{
            "lists": [{"id": "l1", "name": "Inbox", "color": null, "createdAt": null}],
            "tasks": [{"id": "t1", "listId": "l1", "text": "a", "done": null, "priority": null, "position": null}],
            "archivedCompleted": null,
            "filter": null,
            "query": null,
            "metadata": {"version": null, "session": {"activeListId": null, "focus": null}}
        }"#;
        let state: AppState = serde_json::from_str(json).unwrap();

        assert_eq!(state.lists[0].color, "");
        assert!(is_unset(&state.lists[0].created_at));
        let task = &state.tasks[0];
        assert!(!task.done);
        assert_eq!(task.priority, Priority::None);
        assert_eq!(task.position, 0);
        assert!(state.archived.is_empty());
        assert_eq!(state.filter, Filter::All);
        assert_eq!(state.query, "");
        assert_eq!(state.metadata.session.focus, Focus::Lists);
    }

    #[test]
    fn test_out_of_range_positions_decode_as_unpositioned() {
        let json = r#"{"tasks": [
            {"id": "a", "listId": "l", "text": "a", "position": -1},
            {"id": "b", "listId": "l", "text": "b", "position": 99999999999},
            {"id": "c", "listId": "l", "text": "c", "position": 4}
        ]}"#;
        let state: AppState = serde_json::from_str(json).unwrap();

        let positions: Vec<u32> = state.tasks.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 0, 4]);
    }

    #[test]
    fn test_missing_strings_decode_as_empty() {
        let state: AppState = serde_json::from_str(r#"{"tasks": [{"listId": "l"}], "archivedCompleted": [{}]}"#).unwrap();
        assert_eq!(state.tasks[0].id, "");
        assert_eq!(state.tasks[0].text, "");
        assert_eq!(state.archived[0].task_text, "");
    }
}
