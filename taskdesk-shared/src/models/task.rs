/// Task model and database operations
///
/// Tasks are created by admins, assigned to a single user and tracked through
/// a checklist. Progress and status follow the checklist as described in
/// [`super::checklist`].
///
/// # Status lifecycle
///
/// ```text
/// Pending ──(some items done)──► In Progress ──(all items done)──► Completed
///    ▲                                │                               │
///    └──────(items unchecked)─────────┴───────────────────────────────┘
///
/// any ──(status set to Completed)──► Completed, every item done, progress 100
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('Low', 'Medium', 'High');
/// CREATE TYPE task_status AS ENUM ('Pending', 'In Progress', 'Completed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     priority task_priority NOT NULL DEFAULT 'Medium',
///     status task_status NOT NULL DEFAULT 'Pending',
///     due_date TIMESTAMPTZ NOT NULL,
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     attachments TEXT[] NOT NULL DEFAULT '{}',
///     todo_checklist JSONB NOT NULL DEFAULT '[]',
///     progress INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::checklist::ChecklistItem;
/// use taskdesk_shared::models::task::{CreateTask, Task, TaskPriority, TaskStatus};
/// use chrono::{Duration, Utc};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, admin_id: Uuid, member_id: Uuid) -> Result<(), sqlx::Error> {
/// let mut task = Task::create(&pool, CreateTask {
///     title: "Ship release".to_string(),
///     description: String::new(),
///     priority: TaskPriority::High,
///     due_date: Utc::now() + Duration::days(3),
///     assigned_to: member_id,
///     created_by: admin_id,
///     attachments: vec![],
///     todo_checklist: vec![ChecklistItem::new("Tag build", false)],
/// }).await?;
///
/// task.apply_status(Some(TaskStatus::Completed));
/// let saved = task.save(&pool).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::checklist::{self, ChecklistItem, Reconciliation};
use super::user::{User, UserRole, UserSummary};

const TASK_COLUMNS: &str = "id, title, description, priority, status, due_date, assigned_to, \
     created_by, attachments, todo_checklist, progress, created_at, updated_at";

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    Pending,

    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,

    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

/// Which tasks a caller can see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// Every task (admin view)
    All,

    /// Tasks assigned to one user (member view)
    AssignedTo(Uuid),
}

impl TaskScope {
    /// Admins see everything, members only their own assignments
    pub fn for_user(user_id: Uuid, role: UserRole) -> Self {
        if role.is_admin() {
            TaskScope::All
        } else {
            TaskScope::AssignedTo(user_id)
        }
    }

    fn assignee(&self) -> Option<Uuid> {
        match self {
            TaskScope::All => None,
            TaskScope::AssignedTo(id) => Some(*id),
        }
    }
}

/// Task row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,

    /// Cleared when the assignee is deleted
    pub assigned_to: Option<Uuid>,

    pub created_by: Option<Uuid>,
    pub attachments: Vec<String>,

    #[serde(rename = "todoCheckList")]
    pub todo_checklist: Json<Vec<ChecklistItem>>,

    /// 0-100
    pub progress: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub assigned_to: Uuid,
    pub created_by: Uuid,
    pub attachments: Vec<String>,
    pub todo_checklist: Vec<ChecklistItem>,
}

/// Admin edit of a task; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub attachments: Option<Vec<String>>,
    pub todo_checklist: Option<Vec<ChecklistItem>>,
}

/// Per-status totals within a scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub all: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
}

/// Count of tasks sharing a status, a priority and whether the due date has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct TaskGroupCount {
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub past_due: bool,
    pub count: i64,
}

/// Task row joined with its assignee, for the task report
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskReportRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub assignee_name: Option<String>,
    pub assignee_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskReportRow {
    /// `"Name (email)"`, or `"Unassigned"`
    pub fn assigned_to_label(&self) -> String {
        match (&self.assignee_name, &self.assignee_email) {
            (Some(name), Some(email)) => format!("{name} ({email})"),
            _ => "Unassigned".to_string(),
        }
    }
}

/// Task as returned by the API, with the assignee populated
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    pub assigned_to: Option<UserSummary>,
    pub created_by: Option<Uuid>,
    pub attachments: Vec<String>,
    #[serde(rename = "todoCheckList")]
    pub todo_checklist: Vec<ChecklistItem>,
    pub progress: i32,
    pub completed_count: usize,
    pub total_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskView {
    pub fn new(task: Task, assigned_to: Option<UserSummary>) -> Self {
        let counts = task.completion();

        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
            assigned_to,
            created_by: task.created_by,
            attachments: task.attachments,
            todo_checklist: task.todo_checklist.0,
            progress: task.progress,
            completed_count: counts.completed_count,
            total_count: counts.total_count,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

impl Task {
    /// Checklist counts and the progress/status they imply
    pub fn completion(&self) -> Reconciliation {
        checklist::reconcile(&self.todo_checklist)
    }

    pub fn is_assigned_to(&self, user_id: Uuid) -> bool {
        self.assigned_to == Some(user_id)
    }

    /// Replaces the checklist (when given) and recomputes progress and status
    ///
    /// Without a new checklist the stored one is re-evaluated.
    pub fn apply_checklist(&mut self, items: Option<Vec<ChecklistItem>>) -> Reconciliation {
        if let Some(items) = items {
            self.todo_checklist = Json(items);
        }

        let outcome = checklist::reconcile(&self.todo_checklist);
        self.progress = outcome.progress;
        self.status = outcome.status;
        outcome
    }

    /// Sets the status directly
    ///
    /// `Completed` marks every checklist item done and sets progress to 100.
    /// Other statuses leave the checklist and progress as they are.
    pub fn apply_status(&mut self, status: Option<TaskStatus>) {
        if let Some(status) = status {
            self.status = status;
        }

        if self.status == TaskStatus::Completed {
            checklist::complete_all(&mut self.todo_checklist);
            self.progress = 100;
        }
    }

    /// Applies an admin edit. Empty strings keep the current title/description.
    pub fn apply_update(&mut self, update: UpdateTask) {
        if let Some(title) = update.title.filter(|t| !t.trim().is_empty()) {
            self.title = title;
        }
        if let Some(description) = update.description.filter(|d| !d.is_empty()) {
            self.description = description;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        if let Some(assigned_to) = update.assigned_to {
            self.assigned_to = Some(assigned_to);
        }
        if let Some(attachments) = update.attachments {
            self.attachments = attachments;
        }
        if update.todo_checklist.is_some() {
            self.apply_checklist(update.todo_checklist);
        }
    }

    /// Creates a task; progress and status are derived from the checklist
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let outcome = checklist::reconcile(&data.todo_checklist);

        let query = format!(
            "INSERT INTO tasks (title, description, priority, status, due_date, assigned_to,
                                created_by, attachments, todo_checklist, progress)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(data.title)
            .bind(data.description)
            .bind(data.priority)
            .bind(outcome.status)
            .bind(data.due_date)
            .bind(data.assigned_to)
            .bind(data.created_by)
            .bind(data.attachments)
            .bind(Json(data.todo_checklist))
            .bind(outcome.progress)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");

        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Loads a task with its assignee populated
    pub async fn find_with_assignee(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<TaskView>, sqlx::Error> {
        let Some(task) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let assignee = match task.assigned_to {
            Some(user_id) => User::find_summaries(pool, &[user_id])
                .await?
                .remove(&user_id),
            None => None,
        };

        Ok(Some(TaskView::new(task, assignee)))
    }

    /// Lists tasks in scope, optionally filtered by status, newest first
    pub async fn list(
        pool: &PgPool,
        scope: TaskScope,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        Self::recent(pool, scope, status, None).await
    }

    /// Most recently created tasks in scope
    pub async fn recent(
        pool: &PgPool,
        scope: TaskScope,
        status: Option<TaskStatus>,
        limit: Option<i64>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE ($1::uuid IS NULL OR assigned_to = $1)
               AND ($2::task_status IS NULL OR status = $2)
             ORDER BY created_at DESC
             LIMIT $3"
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(scope.assignee())
            .bind(status)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Totals per status within a scope
    pub async fn status_summary(
        pool: &PgPool,
        scope: TaskScope,
    ) -> Result<StatusSummary, sqlx::Error> {
        let (all, pending, in_progress, completed): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'Pending'),
                   COUNT(*) FILTER (WHERE status = 'In Progress'),
                   COUNT(*) FILTER (WHERE status = 'Completed')
            FROM tasks
            WHERE ($1::uuid IS NULL OR assigned_to = $1)
            "#,
        )
        .bind(scope.assignee())
        .fetch_one(pool)
        .await?;

        Ok(StatusSummary {
            all,
            pending,
            in_progress,
            completed,
        })
    }

    /// Task counts grouped by status, priority and whether `now` is past the due date
    pub async fn group_counts(
        pool: &PgPool,
        scope: TaskScope,
        now: DateTime<Utc>,
    ) -> Result<Vec<TaskGroupCount>, sqlx::Error> {
        sqlx::query_as::<_, TaskGroupCount>(
            r#"
            SELECT status, priority, (due_date < $2) AS past_due, COUNT(*) AS count
            FROM tasks
            WHERE ($1::uuid IS NULL OR assigned_to = $1)
            GROUP BY 1, 2, 3
            "#,
        )
        .bind(scope.assignee())
        .bind(now)
        .fetch_all(pool)
        .await
    }

    /// Persists every mutable field; returns `None` if the task was deleted meanwhile
    pub async fn save(&self, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks
             SET title = $2, description = $3, priority = $4, status = $5, due_date = $6,
                 assigned_to = $7, attachments = $8, todo_checklist = $9, progress = $10,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(self.id)
            .bind(&self.title)
            .bind(&self.description)
            .bind(self.priority)
            .bind(self.status)
            .bind(self.due_date)
            .bind(self.assigned_to)
            .bind(&self.attachments)
            .bind(&self.todo_checklist)
            .bind(self.progress)
            .fetch_optional(pool)
            .await
    }

    /// Applies an admin edit and persists it
    pub async fn update(
        mut self,
        pool: &PgPool,
        update: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        self.apply_update(update);
        self.save(pool).await
    }

    /// Persists only the checklist, progress and status
    pub async fn save_progress(&self, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks
             SET todo_checklist = $2, progress = $3, status = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(self.id)
            .bind(&self.todo_checklist)
            .bind(self.progress)
            .bind(self.status)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Every task with its assignee's name and email, oldest first
    pub async fn list_for_report(pool: &PgPool) -> Result<Vec<TaskReportRow>, sqlx::Error> {
        sqlx::query_as::<_, TaskReportRow>(
            r#"
            SELECT t.id, t.title, t.description, t.status, t.priority, t.due_date,
                   u.name AS assignee_name, u.email AS assignee_email,
                   t.created_at, t.updated_at
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_to
            ORDER BY t.created_at
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Resolves assignees and converts tasks into API views
    pub async fn populate(pool: &PgPool, tasks: Vec<Task>) -> Result<Vec<TaskView>, sqlx::Error> {
        let mut ids: Vec<Uuid> = tasks.iter().filter_map(|t| t.assigned_to).collect();
        ids.sort_unstable();
        ids.dedup();

        let users = User::find_summaries(pool, &ids).await?;

        Ok(tasks
            .into_iter()
            .map(|task| {
                let assignee = task.assigned_to.and_then(|id| users.get(&id).cloned());
                TaskView::new(task, assignee)
            })
            .collect())
    }
}

/// Parses a due date sent as RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD`
///
/// Values without an offset are taken as UTC; a bare date is midnight.
pub fn parse_due_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde helper for optional due dates in request bodies
pub fn deserialize_optional_due_date<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;

    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_due_date(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid due date: {value}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample_task(items: Vec<ChecklistItem>) -> Task {
        let outcome = checklist::reconcile(&items);
        Task {
            id: Uuid::new_v4(),
            title: "Write report".to_string(),
            description: "Quarterly numbers".to_string(),
            priority: TaskPriority::Medium,
            status: outcome.status,
            due_date: Utc::now() + Duration::days(1),
            assigned_to: Some(Uuid::new_v4()),
            created_by: Some(Uuid::new_v4()),
            attachments: vec![],
            todo_checklist: Json(items),
            progress: outcome.progress,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_serializes_with_space() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        let parsed: TaskStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(parsed, TaskStatus::InProgress);
        assert_eq!(TaskStatus::InProgress.as_str(), "In Progress");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn test_scope_for_user() {
        let id = Uuid::new_v4();
        assert_eq!(TaskScope::for_user(id, UserRole::Admin), TaskScope::All);
        assert_eq!(
            TaskScope::for_user(id, UserRole::Member),
            TaskScope::AssignedTo(id)
        );
        assert_eq!(TaskScope::AssignedTo(id).assignee(), Some(id));
        assert_eq!(TaskScope::All.assignee(), None);
    }

    #[test]
    fn test_checklist_replace_recomputes_progress_and_status() {
        let mut task = sample_task(vec![]);
        let outcome = task.apply_checklist(Some(vec![
            ChecklistItem::new("a", true),
            ChecklistItem::new("b", true),
            ChecklistItem::new("c", false),
        ]));

        assert_eq!(outcome.progress, 67);
        assert_eq!(task.progress, 67);
        assert_eq!(task.status, TaskStatus::InProgress);

        task.apply_checklist(Some(vec![
            ChecklistItem::new("a", true),
            ChecklistItem::new("b", true),
        ]));
        assert_eq!(task.progress, 100);
        assert_eq!(task.status, TaskStatus::Completed);

        task.apply_checklist(Some(vec![ChecklistItem::new("a", false)]));
        assert_eq!(task.progress, 0);
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn test_checklist_without_items_reevaluates_stored_list() {
        let mut task = sample_task(vec![ChecklistItem::new("a", true)]);
        task.status = TaskStatus::Pending;
        task.progress = 0;

        task.apply_checklist(None);
        assert_eq!(task.progress, 100);
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[test]
    fn test_clearing_checklist_resets_to_pending() {
        let mut task = sample_task(vec![ChecklistItem::new("a", true)]);
        task.apply_checklist(Some(vec![]));
        assert_eq!(task.progress, 0);
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn test_status_completed_forces_checklist() {
        let mut task = sample_task(vec![
            ChecklistItem::new("a", false),
            ChecklistItem::new("b", true),
        ]);

        task.apply_status(Some(TaskStatus::Completed));

        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.progress, 100);
        assert!(task.todo_checklist.iter().all(|i| i.is_completed));
    }

    #[test]
    fn test_status_completed_with_empty_checklist_sets_full_progress() {
        let mut task = sample_task(vec![]);
        task.apply_status(Some(TaskStatus::Completed));
        assert_eq!(task.progress, 100);
    }

    #[test]
    fn test_status_pending_leaves_checklist_untouched() {
        let mut task = sample_task(vec![
            ChecklistItem::new("a", true),
            ChecklistItem::new("b", true),
        ]);
        assert_eq!(task.status, TaskStatus::Completed);

        task.apply_status(Some(TaskStatus::Pending));

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.progress, 100);
        assert!(task.todo_checklist.iter().all(|i| i.is_completed));
    }

    #[test]
    fn test_missing_status_keeps_current() {
        let mut task = sample_task(vec![ChecklistItem::new("a", false)]);
        task.apply_status(None);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.progress, 0);
    }

    #[test]
    fn test_apply_update_ignores_empty_strings() {
        let mut task = sample_task(vec![]);
        let new_assignee = Uuid::new_v4();

        task.apply_update(UpdateTask {
            title: Some("  ".to_string()),
            description: Some(String::new()),
            priority: Some(TaskPriority::High),
            assigned_to: Some(new_assignee),
            ..Default::default()
        });

        assert_eq!(task.title, "Write report");
        assert_eq!(task.description, "Quarterly numbers");
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.assigned_to, Some(new_assignee));
    }

    #[test]
    fn test_apply_update_with_checklist_reconciles() {
        let mut task = sample_task(vec![]);
        task.apply_update(UpdateTask {
            todo_checklist: Some(vec![
                ChecklistItem::new("a", true),
                ChecklistItem::new("b", false),
            ]),
            ..Default::default()
        });

        assert_eq!(task.progress, 50);
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn test_view_counts_and_json_keys() {
        let task = sample_task(vec![
            ChecklistItem::new("a", true),
            ChecklistItem::new("b", false),
        ]);
        let json = serde_json::to_value(TaskView::new(task, None)).unwrap();

        assert_eq!(json["completedCount"], 1);
        assert_eq!(json["totalCount"], 2);
        assert_eq!(json["progress"], 50);
        assert_eq!(json["status"], "In Progress");
        assert!(json["todoCheckList"].is_array());
        assert!(json["assignedTo"].is_null());
        assert!(json.get("dueDate").is_some());
    }

    #[test]
    fn test_report_label() {
        let row = TaskReportRow {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: String::new(),
            status: TaskStatus::Pending,
            priority: TaskPriority::Low,
            due_date: Utc::now(),
            assignee_name: Some("Ada".to_string()),
            assignee_email: Some("ada@example.com".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(row.assigned_to_label(), "Ada (ada@example.com)");

        let unassigned = TaskReportRow {
            assignee_name: None,
            assignee_email: None,
            ..row
        };
        assert_eq!(unassigned.assigned_to_label(), "Unassigned");
    }

    #[test]
    fn test_parse_due_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap();
        assert_eq!(parse_due_date("2025-03-14"), Some(midnight));
        assert_eq!(parse_due_date("2025-03-14T00:00:00Z"), Some(midnight));
        assert_eq!(parse_due_date("2025-03-14T02:00:00+02:00"), Some(midnight));
        assert_eq!(parse_due_date("2025-03-14T00:00"), Some(midnight));
        assert_eq!(parse_due_date("2025-03-14T00:00:00.000"), Some(midnight));
        assert_eq!(parse_due_date("next tuesday"), None);
    }

    #[test]
    fn test_deserialize_optional_due_date() {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default, deserialize_with = "deserialize_optional_due_date")]
            due: Option<DateTime<Utc>>,
        }

        let body: Body = serde_json::from_str(r#"{"due": "2025-01-02"}"#).unwrap();
        assert!(body.due.is_some());

        let body: Body = serde_json::from_str(r#"{}"#).unwrap();
        assert!(body.due.is_none());

        let body: Body = serde_json::from_str(r#"{"due": ""}"#).unwrap();
        assert!(body.due.is_none());

        assert!(serde_json::from_str::<Body>(r#"{"due": "soon"}"#).is_err());
    }
}
