use tabled::settings::Style;
use tabled::{Table, Tabled};
use tango_core::config::Palette;
use tango_core::controller::{Outcome, Resolution};
use tango_core::model::{Suggestion, Task};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Deadline")]
    deadline: String,
}

pub fn task_table(tasks: &[Task], palette: &Palette) -> String {
    if tasks.is_empty() {
        return "No tasks yet.".to_string();
    }

    let rows = tasks.iter().map(|task| {
        let text = if task.completed {
            palette.mutedize(&task.text)
        } else {
            task.text.clone()
        };
        TaskRow {
            id: task.id.to_string(),
            done: if task.completed { "[x]" } else { "[ ]" },
            text,
            deadline: task
                .deadline
                .map(|date| date.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    });

    Table::new(rows).with(Style::sharp()).to_string()
}

/// One-line description, e.g. `Write report (task-1) (Deadline: 2024-06-01)`.
pub fn task_line(task: &Task) -> String {
    match task.deadline {
        Some(date) => format!("{} ({}) (Deadline: {})", task.text, task.id, date),
        None => format!("{} ({})", task.text, task.id),
    }
}

pub fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "text": task.text,
        "completed": task.completed,
        "deadline": task.deadline.map(|date| date.to_string()),
    })
}

pub fn tasks_json(tasks: &[Task]) -> serde_json::Value {
    serde_json::Value::Array(tasks.iter().map(task_json).collect())
}

pub fn suggestion_text(suggestion: &Suggestion, palette: &Palette) -> String {
    format!(
        "Suggested Deadline: {}\nReasoning: {}",
        palette.accentize(&suggestion.suggested_deadline),
        suggestion.reasoning
    )
}

pub fn suggestion_json(suggestion: Option<&Suggestion>) -> serde_json::Value {
    match suggestion {
        Some(suggestion) => serde_json::json!({
            "suggestedDeadline": suggestion.suggested_deadline,
            "reasoning": suggestion.reasoning,
        }),
        None => serde_json::Value::Null,
    }
}

/// Text for a resolved request. Failures are reported through the notifier, so they render as `None`.
pub fn outcome_text(outcome: &Outcome, palette: &Palette) -> Option<String> {
    match &outcome.resolution {
        Resolution::Applied(suggestion) => Some(suggestion_text(suggestion, palette)),
        Resolution::Superseded(_) => Some(format!(
            "Suggestion for {} arrived after a newer request; kept with the task only",
            outcome.task_id
        )),
        Resolution::Failed => None,
    }
}

pub fn outcome_json(outcome: &Outcome) -> serde_json::Value {
    let (status, suggestion) = match &outcome.resolution {
        Resolution::Applied(suggestion) => ("applied", Some(suggestion)),
        Resolution::Superseded(suggestion) => ("superseded", Some(suggestion)),
        Resolution::Failed => ("failed", None),
    };
    serde_json::json!({
        "task_id": outcome.task_id,
        "status": status,
        "suggestion": suggestion_json(suggestion),
    })
}
