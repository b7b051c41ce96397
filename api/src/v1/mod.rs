mod datetime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_CATEGORY: &str = "Life";
pub const DEFAULT_PRIORITY: i64 = 4;

/// A persisted todo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub deadline: Option<DateTime<Utc>>,
    /// One of `Work`, `Study` or `Life` by convention.
    pub category: String,
    /// Eisenhower quadrant, 1 (urgent and important) to 4.
    pub priority: i64,
}

impl Todo {
    pub fn toggle(&mut self) {
        self.is_completed = !self.is_completed;
    }
}

/// Body of a create request. Only `title` is required.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, deserialize_with = "datetime::deserialize_option")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_priority")]
    pub priority: i64,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            is_completed: false,
            deadline: None,
            category: default_category(),
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_title(&self.title)
    }

    pub fn into_todo(self, id: i64) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            is_completed: self.is_completed,
            deadline: self.deadline,
            category: self.category,
            priority: self.priority,
        }
    }
}

/// Body of a partial update.
///
/// `None` means the field was not sent. For the nullable columns
/// `Some(None)` means the client sent `null` and the value is cleared.
/// The other columns reject `null` while deserializing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(
        default,
        deserialize_with = "datetime::deserialize_patch",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl TodoPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.title {
            Some(ref title) => require_title(title),
            None => Ok(()),
        }
    }

    /// Overwrites every field that is present, leaving the rest untouched.
    pub fn apply(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }

        if let Some(description) = self.description {
            todo.description = description;
        }

        if let Some(is_completed) = self.is_completed {
            todo.is_completed = is_completed;
        }

        if let Some(deadline) = self.deadline {
            todo.deadline = deadline;
        }

        if let Some(category) = self.category {
            todo.category = category;
        }

        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
    }
}

/// Query string of the list endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoFilter {
    pub completed: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } => *field,
        }
    }
}

fn require_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::Empty { field: "title" });
    }

    Ok(())
}

fn default_category() -> String {
    String::from(DEFAULT_CATEGORY)
}

fn default_priority() -> i64 {
    DEFAULT_PRIORITY
}

// Paired with `#[serde(default)]`, this is only reached when the key exists,
// so an omitted key stays `None` and `null` reaches `T`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn stored() -> Todo {
        Todo {
            id: 1,
            title: String::from("A"),
            description: Some(String::from("notes")),
            is_completed: true,
            deadline: Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
            category: String::from("Work"),
            priority: 2,
        }
    }

    #[test]
    fn new_todo_fills_defaults() {
        let todo: NewTodo = serde_json::from_value(json!({ "title": "buy milk" })).unwrap();

        assert_eq!(todo, NewTodo::new("buy milk"));
        assert_eq!(todo.category, "Life");
        assert_eq!(todo.priority, 4);
        assert!(!todo.is_completed);
    }

    #[test]
    fn new_todo_requires_title() {
        let result = serde_json::from_value::<NewTodo>(json!({ "priority": 1 }));
        assert!(result.is_err());

        let todo = NewTodo::new("   ");
        assert_eq!(
            todo.validate(),
            Err(ValidationError::Empty { field: "title" })
        );
    }

    #[test]
    fn new_todo_rejects_bad_deadline() {
        let result = serde_json::from_value::<NewTodo>(json!({
            "title": "report",
            "deadline": "next friday",
        }));

        assert!(result.is_err());
    }

    #[test]
    fn new_todo_accepts_null_deadline() {
        let todo: NewTodo =
            serde_json::from_value(json!({ "title": "report", "deadline": null })).unwrap();

        assert_eq!(todo.deadline, None);
    }

    #[test]
    fn patch_distinguishes_false_from_absent() {
        let absent: TodoPatch = serde_json::from_value(json!({})).unwrap();
        let explicit: TodoPatch =
            serde_json::from_value(json!({ "is_completed": false })).unwrap();

        assert_eq!(absent, TodoPatch::default());
        assert_eq!(absent.is_completed, None);
        assert_eq!(explicit.is_completed, Some(false));
    }

    #[test]
    fn patch_null_clears_nullable_fields() {
        let patch: TodoPatch =
            serde_json::from_value(json!({ "description": null, "deadline": null })).unwrap();

        let mut todo = stored();
        patch.apply(&mut todo);

        assert_eq!(todo.description, None);
        assert_eq!(todo.deadline, None);
        assert_eq!(todo.title, "A");
    }

    #[test]
    fn patch_rejects_null_for_required_fields() {
        for field in ["title", "is_completed", "category", "priority"] {
            let body = serde_json::Map::from_iter([(field.to_owned(), serde_json::Value::Null)]);
            let result = serde_json::from_value::<TodoPatch>(body.into());
            assert!(result.is_err(), "{field} accepted null");
        }
    }

    #[test]
    fn patch_preserves_untouched_fields() {
        let patch: TodoPatch = serde_json::from_value(json!({ "priority": 1 })).unwrap();

        let mut todo = stored();
        patch.apply(&mut todo);

        assert_eq!(todo, Todo { priority: 1, ..stored() });
    }

    #[test]
    fn patch_rejects_empty_title() {
        let patch = TodoPatch {
            title: Some(String::new()),
            ..Default::default()
        };

        assert!(patch.validate().is_err());
        assert!(TodoPatch::default().validate().is_ok());
    }

    #[test]
    fn patch_serializes_sparsely() {
        let patch = TodoPatch {
            description: Some(None),
            priority: Some(3),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "description": null, "priority": 3 })
        );
    }

    #[test]
    fn toggle_flips_completion() {
        let mut todo = stored();

        todo.toggle();
        assert!(!todo.is_completed);

        todo.toggle();
        assert!(todo.is_completed);
    }
}
