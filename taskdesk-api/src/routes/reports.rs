/// Spreadsheet report export (admin only)
///
/// # Endpoints
///
/// - `GET /api/reports/export-tasks` - `tasks_report.xlsx`, one row per task
/// - `GET /api/reports/export-users` - `user_task_report.xlsx`, one row per user
///
/// Both answer with an XLSX attachment:
///
/// ```text
/// Content-Type: application/vnd.openxmlformats-officedocument.spreadsheetml.sheet
/// Content-Disposition: attachment; filename="tasks_report.xlsx"
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use taskdesk_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::{
        task::{Task, TaskReportRow},
        user::{User, UserTaskReportRow},
    },
};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const TASK_HEADERS: [(&str, f64); 9] = [
    ("Task ID", 38.0),
    ("Title", 30.0),
    ("Description", 50.0),
    ("Status", 15.0),
    ("Priority", 12.0),
    ("Due Date", 20.0),
    ("Assigned To", 35.0),
    ("Created At", 20.0),
    ("Updated At", 20.0),
];

const USER_HEADERS: [(&str, f64); 7] = [
    ("User Name", 30.0),
    ("Email", 40.0),
    ("Total Assigned Tasks", 22.0),
    ("Pending Tasks", 16.0),
    ("In Progress Tasks", 18.0),
    ("Completed Tasks", 18.0),
    ("Overdue Tasks", 16.0),
];

pub async fn export_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Response> {
    require_admin(&auth)?;

    let rows = Task::list_for_report(&state.db).await?;
    let buffer = tasks_workbook(&rows)?;

    tracing::info!(rows = rows.len(), bytes = buffer.len(), "Task report exported");

    Ok(attachment("tasks_report.xlsx", buffer))
}

pub async fn export_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Response> {
    require_admin(&auth)?;

    let rows = User::user_report_rows(&state.db, Utc::now()).await?;
    let buffer = users_workbook(&rows)?;

    tracing::info!(rows = rows.len(), bytes = buffer.len(), "User report exported");

    Ok(attachment("user_task_report.xlsx", buffer))
}

fn attachment(file_name: &str, buffer: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        Bytes::from(buffer),
    )
        .into_response()
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Builds the `Tasks Report` workbook
pub fn tasks_workbook(rows: &[TaskReportRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Tasks Report")?;

    for (col, (title, width)) in TASK_HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, *title, &header_format)?;
        worksheet.set_column_width(col, *width)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let r = index as u32 + 1;
        worksheet.write_string(r, 0, row.id.to_string())?;
        worksheet.write_string(r, 1, &row.title)?;
        worksheet.write_string(r, 2, &row.description)?;
        worksheet.write_string(r, 3, row.status.as_str())?;
        worksheet.write_string(r, 4, row.priority.as_str())?;
        worksheet.write_string(r, 5, format_timestamp(row.due_date))?;
        worksheet.write_string(r, 6, row.assigned_to_label())?;
        worksheet.write_string(r, 7, format_timestamp(row.created_at))?;
        worksheet.write_string(r, 8, format_timestamp(row.updated_at))?;
    }

    workbook.save_to_buffer()
}

/// Builds the `User Task Report` workbook
pub fn users_workbook(rows: &[UserTaskReportRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("User Task Report")?;

    for (col, (title, width)) in USER_HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, *title, &header_format)?;
        worksheet.set_column_width(col, *width)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let r = index as u32 + 1;
        worksheet.write_string(r, 0, &row.name)?;
        worksheet.write_string(r, 1, &row.email)?;
        worksheet.write_number(r, 2, row.tasks_count as f64)?;
        worksheet.write_number(r, 3, row.pending_tasks as f64)?;
        worksheet.write_number(r, 4, row.in_progress_tasks as f64)?;
        worksheet.write_number(r, 5, row.completed_tasks as f64)?;
        worksheet.write_number(r, 6, row.overdue_tasks as f64)?;
    }

    workbook.save_to_buffer()
}
