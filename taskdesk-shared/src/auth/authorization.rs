/// Role and ownership checks
///
/// TaskDesk has two roles. Admins manage every task and user; members see
/// and update only the tasks assigned to them and edit only their own
/// profile.
///
/// | Action | Admin | Assignee | Other member |
/// |---|---|---|---|
/// | create / edit / delete task | ✓ | ✗ | ✗ |
/// | update status or checklist | ✓ | ✓ | ✗ |
/// | view task | ✓ | ✓ | ✗ |
/// | list users, export reports | ✓ | ✗ | ✗ |
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::authorization::{require_admin, require_self_or_admin};
/// use taskdesk_shared::auth::middleware::AuthContext;
/// use taskdesk_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let member = AuthContext::new(Uuid::new_v4(), UserRole::Member);
/// assert!(require_admin(&member).is_err());
/// assert!(require_self_or_admin(&member, member.user_id).is_ok());
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::task::Task;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Access denied, admin only")]
    AdminRequired,

    /// Caller is neither the assignee nor an admin
    #[error("Not authorized to access this task")]
    NotAssignee,

    #[error("Not authorized to modify this user")]
    NotSelf,
}

pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::AdminRequired)
    }
}

/// Admins, or the task's current assignee
pub fn require_task_access(auth: &AuthContext, task: &Task) -> Result<(), AuthzError> {
    if auth.is_admin() || task.is_assigned_to(auth.user_id) {
        Ok(())
    } else {
        Err(AuthzError::NotAssignee)
    }
}

pub fn require_self_or_admin(auth: &AuthContext, user_id: Uuid) -> Result<(), AuthzError> {
    if auth.is_admin() || auth.user_id == user_id {
        Ok(())
    } else {
        Err(AuthzError::NotSelf)
    }
}
