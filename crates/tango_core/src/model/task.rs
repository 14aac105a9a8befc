use serde::{Deserialize, Serialize};
use std::fmt;
use time::Date;

/// Opaque task identifier, stable for the lifetime of the task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    #[serde(default)]
    pub deadline: Option<Date>,
}

/// Deadline proposal returned by the suggestion service.
///
/// Field names follow the service's camelCase wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub suggested_deadline: String,
    pub reasoning: String,
}

impl Suggestion {
    pub fn new<D: Into<String>, R: Into<String>>(suggested_deadline: D, reasoning: R) -> Self {
        Self {
            suggested_deadline: suggested_deadline.into(),
            reasoning: reasoning.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Suggestion, Task, TaskId};
    use time::macros::date;

    #[test]
    fn task_has_required_fields() {
        let task = Task {
            id: TaskId::new("task-1"),
            text: "Write report".to_string(),
            completed: false,
            deadline: Some(date!(2024 - 06 - 01)),
        };

        assert_eq!(task.id.as_str(), "task-1");
        assert_eq!(task.text, "Write report");
        assert!(!task.completed);
        assert_eq!(task.deadline, Some(date!(2024 - 06 - 01)));
    }

    #[test]
    fn suggestion_uses_camel_case_keys() {
        let suggestion: Suggestion = serde_json::from_value(serde_json::json!({
            "suggestedDeadline": "2024-06-03",
            "reasoning": "short task"
        }))
        .unwrap();

        assert_eq!(suggestion, Suggestion::new("2024-06-03", "short task"));

        let value = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(value["suggestedDeadline"], "2024-06-03");
    }

    #[test]
    fn task_serializes_deadline_as_calendar_date() {
        let task = Task {
            id: TaskId::new("task-2"),
            text: "demo".to_string(),
            completed: true,
            deadline: Some(date!(2024 - 06 - 01)),
        };

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["id"], "task-2");
        assert_eq!(value["deadline"], "2024-06-01");
    }
}
