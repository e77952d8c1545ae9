/// Database models for TaskDesk
///
/// This module contains the persisted entities and the rules that keep them
/// consistent.
///
/// # Models
///
/// - `user`: User accounts, roles and per-user task counts
/// - `task`: Tasks with priority, status, due date and checklist
/// - `checklist`: Checklist normalization and progress/status reconciliation
/// - `dashboard`: Read-only task statistics for the admin and member dashboards
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::user::{CreateUser, User, UserRole};
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     name: "Jane Doe".to_string(),
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     profile_image_url: None,
///     role: UserRole::Member,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod checklist;
pub mod dashboard;
pub mod task;
pub mod user;
