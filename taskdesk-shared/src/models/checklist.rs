/// Checklist normalization and progress/status reconciliation
///
/// A task's checklist drives its progress and, through it, its status:
///
/// ```text
/// completed / total  →  progress = round(100 * completed / total)   (0 when empty)
/// progress == 100 && total > 0  →  Completed
/// progress > 0                  →  In Progress
/// otherwise                     →  Pending
/// ```
///
/// Setting the status directly to `Completed` goes the other way and marks
/// every item done. Setting it to `Pending` or `In Progress` leaves the
/// checklist and progress untouched.
///
/// # Example
///
/// ```
/// use taskdesk_shared::models::checklist::{reconcile, ChecklistItem};
/// use taskdesk_shared::models::task::TaskStatus;
///
/// let items = vec![
///     ChecklistItem::new("Draft", true),
///     ChecklistItem::new("Review", true),
///     ChecklistItem::new("Publish", false),
/// ];
///
/// let outcome = reconcile(&items);
/// assert_eq!(outcome.progress, 67);
/// assert_eq!(outcome.status, TaskStatus::InProgress);
/// ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::task::TaskStatus;

/// One sub-task entry of a task checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub is_completed: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>, is_completed: bool) -> Self {
        Self {
            text: text.into(),
            is_completed,
        }
    }
}

/// Result of recomputing a checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub completed_count: usize,
    pub total_count: usize,
    pub progress: i32,
    pub status: TaskStatus,
}

/// Normalizes loosely-typed checklist items sent by clients
///
/// `text` falls back to an empty string. An item counts as completed when
/// either `isCompleted` or the older `completed` key holds a truthy value.
pub fn normalize_items(raw: &[Value]) -> Vec<ChecklistItem> {
    raw.iter().map(normalize_item).collect()
}

fn normalize_item(raw: &Value) -> ChecklistItem {
    let text = match raw.get("text") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    let is_completed = is_truthy(raw.get("isCompleted")) || is_truthy(raw.get("completed"));

    ChecklistItem { text, is_completed }
}

/// JavaScript truthiness of a JSON value; a missing key is falsy
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Integer percentage, rounded half up; 0 for an empty checklist
pub fn progress_percent(completed: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }

    ((200 * completed + total) / (2 * total)) as i32
}

/// Status implied by a checklist's progress
pub fn status_for_progress(progress: i32, total: usize) -> TaskStatus {
    if progress == 100 && total > 0 {
        TaskStatus::Completed
    } else if progress > 0 {
        TaskStatus::InProgress
    } else {
        TaskStatus::Pending
    }
}

/// `(completed, total)` item counts
pub fn completion_counts(items: &[ChecklistItem]) -> (usize, usize) {
    let completed = items.iter().filter(|item| item.is_completed).count();
    (completed, items.len())
}

/// Computes counts, progress and status for a checklist
pub fn reconcile(items: &[ChecklistItem]) -> Reconciliation {
    let (completed_count, total_count) = completion_counts(items);
    let progress = progress_percent(completed_count, total_count);

    Reconciliation {
        completed_count,
        total_count,
        progress,
        status: status_for_progress(progress, total_count),
    }
}

/// Marks every item as completed
pub fn complete_all(items: &mut [ChecklistItem]) {
    for item in items.iter_mut() {
        item.is_completed = true;
    }
}
