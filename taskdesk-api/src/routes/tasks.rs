/// Task endpoints
///
/// # Endpoints
///
/// - `GET /api/tasks?status=` - Tasks in the caller's scope with a status summary
/// - `POST /api/tasks` - Create a task (admin)
/// - `GET /api/tasks/dashboard-tasks` - Dashboard over all tasks (admin)
/// - `GET /api/tasks/user-dashboard-tasks` - Dashboard over the caller's tasks
/// - `GET /api/tasks/:id` - One task (assignee or admin)
/// - `PUT /api/tasks/:id` - Edit a task (admin)
/// - `DELETE /api/tasks/:id` - Delete a task (admin)
/// - `PUT /api/tasks/:id/status` - Change status (assignee or admin)
/// - `PUT /api/tasks/:id/todo` - Replace the checklist (assignee or admin)
///
/// Members only ever see tasks assigned to them; admins see every task.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use taskdesk_shared::{
    auth::{
        authorization::{require_admin, require_task_access},
        middleware::AuthContext,
    },
    models::{
        checklist::normalize_items,
        dashboard::DashboardData,
        task::{
            deserialize_optional_due_date, CreateTask, StatusSummary, Task, TaskPriority,
            TaskScope, TaskStatus, TaskView, UpdateTask,
        },
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// `?status=` filter for the task list
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<String>,
}

impl ListTasksQuery {
    /// Empty or `All` means no filter
    pub fn status_filter(&self) -> ApiResult<Option<TaskStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("All") => Ok(None),
            Some(value) => TaskStatus::ALL
                .into_iter()
                .find(|status| status.as_str() == value)
                .map(Some)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid status filter: {value}"))),
        }
    }
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default, deserialize_with = "deserialize_optional_due_date")]
    pub due_date: Option<DateTime<Utc>>,

    pub assigned_to: Option<Uuid>,

    #[serde(default, alias = "attachements")]
    pub attachments: Vec<String>,

    /// Loosely typed items, normalized before storing
    #[serde(default, rename = "todoCheckList")]
    pub todo_checklist: Vec<Value>,
}

/// Admin edit; absent fields keep their current value
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "deserialize_optional_due_date")]
    pub due_date: Option<DateTime<Utc>>,

    pub assigned_to: Option<Uuid>,

    #[serde(alias = "attachements")]
    pub attachments: Option<Vec<String>>,

    #[serde(rename = "todoCheckList")]
    pub todo_checklist: Option<Vec<Value>>,
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(req: UpdateTaskRequest) -> Self {
        UpdateTask {
            title: req.title,
            description: req.description,
            priority: req.priority,
            due_date: req.due_date,
            assigned_to: req.assigned_to,
            attachments: req.attachments,
            todo_checklist: req.todo_checklist.as_deref().map(normalize_items),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateChecklistRequest {
    #[serde(rename = "todoCheckList")]
    pub todo_checklist: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub tasks: Vec<TaskView>,
    pub status_summary: StatusSummary,
}

/// `{ message, data }`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    fn new(message: &str, data: T) -> Self {
        Self {
            message: message.to_string(),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    pub message: String,
    pub task: TaskView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistResponse {
    pub message: String,
    pub data: TaskView,
    pub progress: i32,
    pub completed_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

async fn load_task(pool: &PgPool, task_id: Uuid) -> ApiResult<Task> {
    Task::find_by_id(pool, task_id)
        .await?
        .ok_or_else(task_not_found)
}

async fn load_view(pool: &PgPool, task_id: Uuid) -> ApiResult<TaskView> {
    Task::find_with_assignee(pool, task_id)
        .await?
        .ok_or_else(task_not_found)
}

/// Assignees must be existing users
async fn ensure_assignee_exists(pool: &PgPool, user_id: Uuid) -> ApiResult<()> {
    if User::find_by_id(pool, user_id).await?.is_none() {
        return Err(ApiError::invalid_field(
            "assignedTo",
            "Assigned user does not exist",
        ));
    }
    Ok(())
}

/// List tasks
///
/// # Response
///
/// ```json
/// {
///   "message": "Tasks fetched successfully",
///   "data": {
///     "tasks": [{ "id": "...", "title": "...", "completedCount": 1, "totalCount": 3, ... }],
///     "statusSummary": { "all": 4, "pending": 1, "inProgress": 2, "completed": 1 }
///   }
/// }
/// ```
///
/// The summary always covers the whole scope, whatever the status filter.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(query): ApiQuery<ListTasksQuery>,
) -> ApiResult<Json<DataResponse<TaskList>>> {
    let scope = TaskScope::for_user(auth.user_id, auth.role);
    let status = query.status_filter()?;

    let tasks = Task::list(&state.db, scope, status).await?;
    let tasks = Task::populate(&state.db, tasks).await?;
    let status_summary = Task::status_summary(&state.db, scope).await?;

    tracing::debug!(
        user_id = %auth.user_id,
        count = tasks.len(),
        status = status.map(|s| s.as_str()),
        "Tasks listed"
    );

    Ok(Json(DataResponse::new(
        "Tasks fetched successfully",
        TaskList {
            tasks,
            status_summary,
        },
    )))
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /api/tasks
/// Content-Type: application/json
///
/// {
///   "title": "Prepare release",
///   "description": "Tag and publish",
///   "priority": "High",
///   "dueDate": "2025-03-01",
///   "assignedTo": "6f1c...",
///   "attachments": [],
///   "todoCheckList": [{ "text": "Tag", "isCompleted": false }]
/// }
/// ```
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<CreateTaskResponse>)> {
    require_admin(&auth)?;
    req.validate()?;

    let assigned_to = req
        .assigned_to
        .ok_or_else(|| ApiError::invalid_field("assignedTo", "Assigned to is required"))?;
    let due_date = req
        .due_date
        .ok_or_else(|| ApiError::invalid_field("dueDate", "Due date is required"))?;

    ensure_assignee_exists(&state.db, assigned_to).await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title.trim().to_string(),
            description: req.description,
            priority: req.priority,
            due_date,
            assigned_to,
            created_by: auth.user_id,
            attachments: req.attachments,
            todo_checklist: normalize_items(&req.todo_checklist),
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, assigned_to = %assigned_to, "Task created");

    let task = load_view(&state.db, task.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            message: "Task created successfully".to_string(),
            task,
        }),
    ))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> ApiResult<Json<DataResponse<TaskView>>> {
    let task = load_task(&state.db, task_id).await?;
    require_task_access(&auth, &task).map_err(|e| {
        tracing::warn!(task_id = %task_id, user_id = %auth.user_id, "Task read denied");
        e
    })?;

    let view = Task::populate(&state.db, vec![task])
        .await?
        .pop()
        .ok_or_else(task_not_found)?;

    Ok(Json(DataResponse::new("Task fetched successfully", view)))
}

/// Edit a task
///
/// Empty titles and descriptions are ignored. A provided checklist replaces
/// the stored one and recomputes progress and status.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<DataResponse<TaskView>>> {
    require_admin(&auth)?;
    req.validate()?;

    let task = load_task(&state.db, task_id).await?;

    if let Some(assignee) = req.assigned_to {
        ensure_assignee_exists(&state.db, assignee).await?;
    }

    task.update(&state.db, req.into())
        .await?
        .ok_or_else(task_not_found)?;

    tracing::info!(task_id = %task_id, "Task updated");

    let view = load_view(&state.db, task_id).await?;
    Ok(Json(DataResponse::new("Task updated successfully", view)))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_admin(&auth)?;

    if !Task::delete(&state.db, task_id).await? {
        return Err(task_not_found());
    }

    tracing::info!(task_id = %task_id, "Task deleted");

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

/// Change a task's status
///
/// `Completed` marks every checklist item done and sets progress to 100.
/// Other statuses leave the checklist and progress alone.
pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> ApiResult<Json<DataResponse<TaskView>>> {
    let mut task = load_task(&state.db, task_id).await?;
    require_task_access(&auth, &task).map_err(|e| {
        tracing::warn!(task_id = %task_id, user_id = %auth.user_id, "Status update denied");
        e
    })?;

    task.apply_status(req.status);
    task.save_progress(&state.db)
        .await?
        .ok_or_else(task_not_found)?;

    tracing::info!(task_id = %task_id, status = task.status.as_str(), "Task status updated");

    let view = load_view(&state.db, task_id).await?;
    Ok(Json(DataResponse::new("Task status updated successfully", view)))
}

/// Replace a task's checklist
///
/// # Response
///
/// ```json
/// {
///   "message": "Task check list updated successfully",
///   "data": { ... },
///   "progress": 67,
///   "completedCount": 2,
///   "totalCount": 3
/// }
/// ```
pub async fn update_task_checklist(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateChecklistRequest>,
) -> ApiResult<Json<ChecklistResponse>> {
    let mut task = load_task(&state.db, task_id).await?;
    require_task_access(&auth, &task).map_err(|e| {
        tracing::warn!(task_id = %task_id, user_id = %auth.user_id, "Checklist update denied");
        e
    })?;

    let outcome = task.apply_checklist(req.todo_checklist.as_deref().map(normalize_items));
    task.save_progress(&state.db)
        .await?
        .ok_or_else(task_not_found)?;

    tracing::info!(
        task_id = %task_id,
        progress = outcome.progress,
        status = outcome.status.as_str(),
        "Task checklist updated"
    );

    let view = load_view(&state.db, task_id).await?;
    Ok(Json(ChecklistResponse {
        message: "Task check list updated successfully".to_string(),
        data: view,
        progress: outcome.progress,
        completed_count: outcome.completed_count,
        total_count: outcome.total_count,
    }))
}

/// Dashboard over every task (admin)
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DashboardData>> {
    require_admin(&auth)?;

    let data = DashboardData::load(&state.db, TaskScope::All, Utc::now()).await?;
    Ok(Json(data))
}

/// Dashboard over the caller's assigned tasks
pub async fn user_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DashboardData>> {
    let data =
        DashboardData::load(&state.db, TaskScope::AssignedTo(auth.user_id), Utc::now()).await?;
    Ok(Json(data))
}
