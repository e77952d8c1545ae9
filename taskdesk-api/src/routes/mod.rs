/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Liveness banner and health check
/// - `auth`: Registration, login and profile endpoints
/// - `uploads`: Profile image upload
/// - `users`: User listing and removal
/// - `tasks`: Task CRUD, status and checklist updates, dashboards
/// - `reports`: XLSX report export

pub mod auth;
pub mod health;
pub mod reports;
pub mod tasks;
pub mod uploads;
pub mod users;
