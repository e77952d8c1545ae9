/// User model and database operations
///
/// Users authenticate with email and password and carry a single role that
/// gates access to admin-only endpoints. Tasks reference users by id; a user
/// is never embedded in a task row.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('Admin', 'Member');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,            -- unique on LOWER(email)
///     password_hash VARCHAR(255) NOT NULL,
///     profile_image_url VARCHAR(1024),
///     role user_role NOT NULL DEFAULT 'Member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::user::{CreateUser, User, UserRole};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     name: "Jane Doe".to_string(),
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     profile_image_url: None,
///     role: UserRole::Member,
/// }).await?;
///
/// let found = User::find_by_email(&pool, "JANE@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, profile_image_url, role, created_at, updated_at";

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum UserRole {
    /// Manages users and tasks, sees every task
    Admin,

    /// Works on the tasks assigned to them
    Member,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Member => "Member",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Member
    }
}

/// User account row
///
/// The password hash is never serialized; use [`UserProfile`] for responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    pub name: String,

    /// Unique, compared case-insensitively
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub profile_image_url: Option<String>,

    pub role: UserRole,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Public view of a user (everything but the password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            profile_image_url: user.profile_image_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The fields of a user embedded into task responses as `assignedTo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_image_url: Option<String>,
}

/// Member listing row with per-status task counts
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserWithTaskCounts {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pending_tasks: i64,
    pub in_progress_tasks: i64,
    pub completed_tasks: i64,
}

/// Per-user row of the user task report
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserTaskReportRow {
    pub name: String,
    pub email: String,
    pub tasks_count: i64,
    pub pending_tasks: i64,
    pub in_progress_tasks: i64,
    pub completed_tasks: i64,
    pub overdue_tasks: i64,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,

    pub profile_image_url: Option<String>,
    pub role: UserRole,
}

/// Input for updating an existing user
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub profile_image_url: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.profile_image_url.is_none()
    }
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `users_email_key` when the email is
    /// already registered.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, profile_image_url, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.name)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.profile_image_url)
            .bind(data.role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email, ignoring case
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Loads the `assignedTo` summaries for a set of user ids
    ///
    /// Ids that no longer exist are simply absent from the map.
    pub async fn find_summaries(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserSummary>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let summaries = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, name, email, profile_image_url
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(summaries.into_iter().map(|s| (s.id, s)).collect())
    }

    /// Updates an existing user
    ///
    /// Returns `None` when the user doesn't exist. `updated_at` is always
    /// refreshed.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${bind_count}"));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${bind_count}"));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${bind_count}"));
        }
        if data.profile_image_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", profile_image_url = ${bind_count}"));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(url) = data.profile_image_url {
            q = q.bind(url);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a user
    ///
    /// Tasks assigned to or created by the user keep existing with the
    /// reference cleared. Returns false when the user didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists users of a role with their pending / in progress / completed
    /// task counts, newest first
    pub async fn list_by_role_with_task_counts(
        pool: &PgPool,
        role: UserRole,
    ) -> Result<Vec<UserWithTaskCounts>, sqlx::Error> {
        sqlx::query_as::<_, UserWithTaskCounts>(
            r#"
            SELECT u.id, u.name, u.email, u.role, u.profile_image_url,
                   u.created_at, u.updated_at,
                   COUNT(t.id) FILTER (WHERE t.status = 'Pending') AS pending_tasks,
                   COUNT(t.id) FILTER (WHERE t.status = 'In Progress') AS in_progress_tasks,
                   COUNT(t.id) FILTER (WHERE t.status = 'Completed') AS completed_tasks
            FROM users u
            LEFT JOIN tasks t ON t.assigned_to = u.id
            WHERE u.role = $1
            GROUP BY u.id
            ORDER BY u.created_at DESC
            "#,
        )
        .bind(role)
        .fetch_all(pool)
        .await
    }

    /// Per-user task breakdown for the user report
    ///
    /// A task counts as overdue when it is not completed and its due date is
    /// before `now`.
    pub async fn user_report_rows(
        pool: &PgPool,
        now: DateTime<Utc>,
    ) -> Result<Vec<UserTaskReportRow>, sqlx::Error> {
        sqlx::query_as::<_, UserTaskReportRow>(
            r#"
            SELECT u.name, u.email,
                   COUNT(t.id) AS tasks_count,
                   COUNT(t.id) FILTER (WHERE t.status = 'Pending') AS pending_tasks,
                   COUNT(t.id) FILTER (WHERE t.status = 'In Progress') AS in_progress_tasks,
                   COUNT(t.id) FILTER (WHERE t.status = 'Completed') AS completed_tasks,
                   COUNT(t.id) FILTER (
                       WHERE t.status <> 'Completed' AND t.due_date < $1
                   ) AS overdue_tasks
            FROM users u
            LEFT JOIN tasks t ON t.assigned_to = u.id
            GROUP BY u.id
            ORDER BY u.created_at
            "#,
        )
        .bind(now)
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
